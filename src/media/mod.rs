//! Image pipeline over S3-compatible object storage.
//!
//! Every accepted upload is decoded, optionally downscaled, re-encoded
//! as WebP and stored under a random key with public-read ACL. The
//! client is built once at startup and shared.

use std::io::Cursor;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use image::imageops::FilterType;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;

/// Why an upload was rejected. Rendered into the failure log; never
/// shown to the public caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The payload is not a decodable image.
    #[error("image decode failed")]
    Decode,
    /// WebP re-encoding failed.
    #[error("webp encode failed")]
    Encode,
    /// The storage backend rejected the object.
    #[error("storage put failed")]
    Store,
}

/// S3-backed media store.
#[derive(Debug, Clone)]
pub struct MediaStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl MediaStore {
    /// Builds the store and its single long-lived S3 client from the
    /// configured endpoint and static credentials.
    pub async fn connect(config: &AppConfig) -> Self {
        let credentials = Credentials::new(
            config.s3_access_key.clone(),
            config.s3_secret_key.clone(),
            None,
            None,
            "static",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .endpoint_url(config.s3_endpoint.clone())
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.s3_bucket.clone(),
            public_base_url: config.media_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Re-encodes an upload as WebP and stores it, returning the public
    /// URL. `max_width` caps the width; narrower images are stored
    /// as-is.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] naming the rejection stage.
    pub async fn upload(
        &self,
        data: &[u8],
        original_name: &str,
        folder: &str,
        max_width: Option<u32>,
    ) -> Result<String, UploadError> {
        let mut img = image::load_from_memory(data).map_err(|e| {
            warn!(original_name, error = %e, "upload rejected: not a decodable image");
            UploadError::Decode
        })?;

        if let Some(max_width) = max_width
            && img.width() > max_width
        {
            let height = scaled_height(img.width(), img.height(), max_width);
            img = img.resize_exact(max_width, height, FilterType::Triangle);
        }

        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::WebP)
            .map_err(|e| {
                warn!(original_name, error = %e, "webp encoding failed");
                UploadError::Encode
            })?;

        let key = object_key(folder, original_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(encoded))
            .content_type("image/webp")
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                warn!(original_name, key, error = %e, "object storage put failed");
                UploadError::Store
            })?;

        Ok(format!("{}/{key}", self.public_base_url))
    }

    /// Deletes the object behind a previously returned public URL.
    /// Best effort: failures are logged and swallowed so record
    /// deletion never blocks on storage.
    pub async fn delete_by_url(&self, url: &str) {
        let Some(key) = self.key_for_url(url) else {
            warn!(url, "skipping delete of foreign media url");
            return;
        };
        if let Err(e) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            warn!(key, error = %e, "object storage delete failed");
        }
    }

    /// Maps a public URL back to its object key, when the URL belongs
    /// to this store.
    #[must_use]
    pub fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }
}

/// Height preserving the aspect ratio at the capped width.
fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled = u64::from(height) * u64::from(max_width) / u64::from(width);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// `{folder}/{uuid}_{stem}.webp`, with the client's extension dropped.
fn object_key(folder: &str, original_name: &str) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map_or(original_name, |(stem, _ext)| stem);
    format!("{folder}/{}_{stem}.webp", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_replaces_the_extension() {
        let key = object_key("estate", "kitchen.jpeg");
        assert!(key.starts_with("estate/"));
        assert!(key.ends_with("_kitchen.webp"));
        assert!(!key.contains(".jpeg"));
    }

    #[test]
    fn object_key_tolerates_no_extension() {
        let key = object_key("avatars", "photo");
        assert!(key.ends_with("_photo.webp"));
    }

    #[test]
    fn scaled_height_preserves_aspect() {
        assert_eq!(scaled_height(4000, 3000, 1920), 1440);
        assert_eq!(scaled_height(4000, 3000, 560), 420);
        // Degenerate inputs never produce a zero dimension.
        assert_eq!(scaled_height(10_000, 1, 560), 1);
    }
}
