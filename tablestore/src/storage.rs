//! Object-storage endpoint of the hosted store, used for image uploads.
//!
//! Uploaded objects are publicly readable; the returned URL can be written
//! straight into an `image_url` column.
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::header::CONTENT_TYPE;

use crate::{Store, StoreError};

const OBJECT_NAME_SALT_LEN: usize = 12;

impl Store {
    /// Uploads `bytes` into `bucket` under a salted variant of
    /// `suggested_name` and returns the public URL of the stored object.
    ///
    /// The suggested name only contributes its extension; the object name
    /// itself is randomized to avoid collisions between uploads.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UploadRejected` when the store answers with a
    /// non-success status, or a transport error from the request itself.
    pub async fn store_object(
        &self,
        bucket: &str,
        suggested_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let object = salted_object_name(suggested_name);
        let url = self
            .host
            .join(&format!("storage/v1/object/{bucket}/{object}"))?;
        debug!("uploading {} bytes to {url}", bytes.len());

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        request = self.credentials.apply(request);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UploadRejected(status));
        }
        self.public_object_url(bucket, &object)
    }

    /// Public download URL for an object previously stored in `bucket`.
    #[allow(clippy::missing_errors_doc)]
    pub fn public_object_url(&self, bucket: &str, object: &str) -> Result<String, StoreError> {
        Ok(self
            .host
            .join(&format!("storage/v1/object/public/{bucket}/{object}"))?
            .to_string())
    }
}

fn salted_object_name(suggested: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OBJECT_NAME_SALT_LEN)
        .map(char::from)
        .collect();
    match suggested.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{salt}.{ext}"),
        _ => salt,
    }
}
