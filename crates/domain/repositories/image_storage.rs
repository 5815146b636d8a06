use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[automock]
#[async_trait]
pub trait ImageStorageClient {
    /// Uploads the image and returns its public URL.
    async fn upload_image(&self, file_name: String, bytes: Vec<u8>) -> Result<String>;
}
