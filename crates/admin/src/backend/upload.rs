//! Product image uploads.
//!
//! The backend stores images and answers with their public URL. A product
//! form may carry several images; they go up concurrently and the first
//! failure fails the whole batch.

use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use super::{AdminBackend, BackendError};

/// An image file received from an admin form.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Whether the browser actually attached a file.
    ///
    /// An empty file input still submits a part, with no name and no bytes.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.file_name.is_empty() && !self.bytes.is_empty()
    }

    fn into_part(self) -> Result<Part, reqwest::Error> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
    }
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

impl AdminBackend {
    /// Upload one image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the file or omits the URL.
    #[instrument(skip(self, image, token), fields(file = %image.file_name, size = image.bytes.len()))]
    pub async fn upload_image(&self, image: ImageUpload, token: &str) -> Result<String, BackendError> {
        let form = Form::new().part("image", image.into_part()?);
        let request = self
            .inner
            .client
            .post(self.url("/api/products/upload-image"))
            .multipart(form);
        let uploaded: UploadedImage = self.send(request, Some(token)).await?;
        Ok(uploaded.url)
    }

    /// Upload every image concurrently, keeping input order in the result.
    ///
    /// # Errors
    ///
    /// Returns the first upload failure.
    #[instrument(skip(self, images, token), fields(count = images.len()))]
    pub async fn upload_images(
        &self,
        images: Vec<ImageUpload>,
        token: &str,
    ) -> Result<Vec<String>, BackendError> {
        try_join_all(
            images
                .into_iter()
                .map(|image| self.upload_image(image, token)),
        )
        .await
    }
}
