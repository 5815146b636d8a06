use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("image data is not valid base64")]
    InvalidEncoding,
    #[error("image is empty")]
    Empty,
    #[error("image exceeds {max} bytes ({actual} bytes)")]
    TooLarge { max: usize, actual: usize },
}

/// Image sent inline as base64 (avatar, payment proof).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUploadModel {
    pub file_name: String,
    pub content_type: String,
    pub data_base64: String,
}

impl ImageUploadModel {
    /// Validates type and size and returns the raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageRejection> {
        let content_type = self.content_type.trim().to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(ImageRejection::UnsupportedType(self.content_type.clone()));
        }

        // Accept data URLs as produced by browsers' FileReader.
        let payload = match self.data_base64.split_once(";base64,") {
            Some((_, data)) => data,
            None => self.data_base64.as_str(),
        };

        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| ImageRejection::InvalidEncoding)?;

        if bytes.is_empty() {
            return Err(ImageRejection::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageRejection::TooLarge {
                max: MAX_IMAGE_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, bytes: &[u8]) -> ImageUploadModel {
        ImageUploadModel {
            file_name: "proof.png".to_string(),
            content_type: content_type.to_string(),
            data_base64: general_purpose::STANDARD.encode(bytes),
        }
    }

    #[test]
    fn accepts_allowed_types_and_data_urls() {
        let mut model = upload("image/PNG", b"\x89PNG");
        assert_eq!(model.decode().unwrap(), b"\x89PNG");

        model.data_base64 = format!("data:image/png;base64,{}", model.data_base64);
        assert_eq!(model.decode().unwrap(), b"\x89PNG");
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(
            upload("application/pdf", b"%PDF").decode(),
            Err(ImageRejection::UnsupportedType("application/pdf".into()))
        );
    }

    #[test]
    fn rejects_oversized_and_empty_images() {
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            upload("image/jpeg", &big).decode(),
            Err(ImageRejection::TooLarge { .. })
        ));
        assert_eq!(upload("image/jpeg", b"").decode(), Err(ImageRejection::Empty));
    }

    #[test]
    fn rejects_garbage_encoding() {
        let mut model = upload("image/gif", b"GIF89a");
        model.data_base64 = "***".to_string();
        assert_eq!(model.decode(), Err(ImageRejection::InvalidEncoding));
    }
}
