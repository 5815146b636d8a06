use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use tracing::error;

use crate::domain::repositories::image_storage::ImageStorageClient;

#[derive(Debug, Clone)]
pub struct ImgbbConfig {
    pub upload_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Uploads images to an ImgBB-compatible host.
pub struct ImgbbClient {
    http: reqwest::Client,
    config: ImgbbConfig,
}

#[derive(Debug, Deserialize)]
pub struct ImgbbResponse {
    pub data: Option<ImgbbImage>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImgbbImage {
    pub url: Option<String>,
    pub display_url: Option<String>,
}

impl ImgbbResponse {
    pub fn into_url(self) -> Result<String> {
        if !self.success {
            anyhow::bail!("image host reported failure");
        }
        self.data
            .and_then(|data| data.url.or(data.display_url))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("image host response is missing data.url"))
    }
}

/// Strips the extension and anything the host would not accept in a name.
fn upload_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    stem.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect()
}

impl ImgbbClient {
    pub fn new(config: ImgbbConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build image host http client")?;

        Ok(Self { http, config })
    }

    /// The key travels in the form body, never in the URL.
    fn request(&self, file_name: &str, bytes: &[u8]) -> Result<reqwest::Request> {
        let mut form = vec![
            ("key", self.config.api_key.clone()),
            ("image", general_purpose::STANDARD.encode(bytes)),
        ];
        let name = upload_name(file_name);
        if !name.is_empty() {
            form.push(("name", name));
        }

        self.http
            .post(&self.config.upload_url)
            .form(&form)
            .build()
            .map_err(reqwest::Error::without_url)
            .context("failed to build image upload request")
    }
}

#[async_trait]
impl ImageStorageClient for ImgbbClient {
    async fn upload_image(&self, file_name: String, bytes: Vec<u8>) -> Result<String> {
        let resp = self
            .http
            .execute(self.request(&file_name, &bytes)?)
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to reach image host")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = %status,
                response_body = %body,
                file_name = %file_name,
                "image upload failed"
            );
            anyhow::bail!("image upload failed (status {})", status);
        }

        let parsed: ImgbbResponse = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to decode image host response")?;
        parsed.into_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_yields_url() {
        let response: ImgbbResponse = serde_json::from_value(serde_json::json!({
            "data": {"url": "https://i.ibb.co/abc/proof.png", "display_url": "https://ibb.co/abc"},
            "success": true,
            "status": 200
        }))
        .unwrap();

        assert_eq!(response.into_url().unwrap(), "https://i.ibb.co/abc/proof.png");
    }

    #[test]
    fn response_without_url_is_an_error() {
        let response: ImgbbResponse =
            serde_json::from_value(serde_json::json!({"data": {}, "success": true})).unwrap();
        assert!(response.into_url().is_err());

        let failed: ImgbbResponse =
            serde_json::from_value(serde_json::json!({"success": false})).unwrap();
        assert!(failed.into_url().is_err());
    }

    fn config() -> ImgbbConfig {
        ImgbbConfig {
            upload_url: "https://api.imgbb.com/1/upload".to_string(),
            api_key: "SUPERSECRETKEY".to_string(),
            timeout_secs: 2,
        }
    }

    #[test]
    fn api_key_stays_out_of_the_url() {
        let client = ImgbbClient::new(config()).unwrap();

        let request = client.request("proof.png", b"\x89PNG").unwrap();

        assert_eq!(request.url().query(), None);
        assert!(!request.url().as_str().contains("SUPERSECRETKEY"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_carry_the_key() {
        let client = ImgbbClient::new(ImgbbConfig {
            upload_url: "http://127.0.0.1:9/1/upload".to_string(),
            ..config()
        })
        .unwrap();

        let err = client
            .upload_image("proof.png".to_string(), b"\x89PNG".to_vec())
            .await
            .unwrap_err();

        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
    }

    #[test]
    fn upload_name_drops_extension_and_symbols() {
        assert_eq!(upload_name("chuyển khoản.png"), "chuynkhon");
        assert_eq!(upload_name("proof_01.jpeg"), "proof_01");
        assert_eq!(upload_name("noext"), "noext");
    }
}
