//! Listing service: orchestrates validation, the image pipeline and
//! the repository.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::{try_join, try_join_all};
use serde_json::{Map, Value};
use sqlx::types::Json;
use tracing::info;

use crate::domain::{Audience, ImagePair, Listing, ListingQuery};
use crate::error::ApiError;
use crate::media::MediaStore;
use crate::persistence::ListingRepo;
use crate::service::property::{UploadFile, parse_property};
use uuid::Uuid;

/// Storage folder for listing images.
const IMAGE_FOLDER: &str = "estate";
/// Width cap for the full-size rendition.
pub(crate) const FULL_WIDTH: u32 = 1920;
/// Width cap for the thumbnail rendition.
pub(crate) const THUMB_WIDTH: u32 = 560;
/// Hard cap on images per listing submission.
pub const MAX_LISTING_IMAGES: usize = 30;

/// Orchestration layer for listing operations.
#[derive(Debug, Clone)]
pub struct ListingService {
    listings: ListingRepo,
    media: Arc<MediaStore>,
}

impl ListingService {
    /// Creates a new `ListingService`.
    #[must_use]
    pub fn new(listings: ListingRepo, media: Arc<MediaStore>) -> Self {
        Self { listings, media }
    }

    /// Searches listings with the audience's visibility rules applied.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on repository failure.
    pub async fn search(
        &self,
        params: &HashMap<String, String>,
        audience: Audience,
    ) -> Result<(Vec<Listing>, ListingQuery), ApiError> {
        let query = ListingQuery::from_params(params, audience);
        let rows = self.listings.search(&query, audience).await?;
        Ok((rows, query))
    }

    /// Fetches one listing. For the public audience a record outside
    /// the `active`/`sold` states does not exist, and hidden address
    /// parts are redacted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent or invisible.
    pub async fn get(&self, id: Uuid, audience: Audience) -> Result<Listing, ApiError> {
        let mut listing = self
            .listings
            .find_by_id(id, audience)
            .await?
            .ok_or_else(|| ApiError::NotFound("listing not found".into()))?;
        if !audience.is_admin_service() {
            if !listing.publicly_fetchable() {
                return Err(ApiError::NotFound("listing not found".into()));
            }
            listing.redact_hidden_geo();
        }
        Ok(listing)
    }

    /// Creates a listing from a multipart submission. All images must
    /// upload; a single failure aborts the whole creation.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for invalid payloads, upload failures or
    /// repository failures.
    pub async fn create(
        &self,
        payload: Map<String, Value>,
        files: Vec<UploadFile>,
    ) -> Result<Listing, ApiError> {
        let mut parsed = parse_property(payload)?;
        parsed.fields.images = Json(upload_all(&self.media, &files).await?);
        let listing = self
            .listings
            .insert(
                &parsed.fields,
                parsed.business_type.as_deref(),
                parsed.visibility_status.as_deref(),
            )
            .await?;
        info!(id = %listing.id, "listing created");
        Ok(listing)
    }

    /// Replaces a listing. The image set becomes `existingImages` from
    /// the payload plus any newly uploaded files; images the client
    /// dropped are deleted from storage afterwards, best effort.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for invalid payloads, upload failures,
    /// a missing listing or repository failures.
    pub async fn update(
        &self,
        id: Uuid,
        payload: Map<String, Value>,
        files: Vec<UploadFile>,
    ) -> Result<Listing, ApiError> {
        let before = self
            .listings
            .find_by_id(id, Audience::AdminService)
            .await?
            .ok_or_else(|| ApiError::NotFound("listing not found".into()))?;

        let mut parsed = parse_property(payload)?;
        let mut images = parsed.existing_images.take().unwrap_or_default();
        images.extend(upload_all(&self.media, &files).await?);
        parsed.fields.images = Json(images);

        let updated = self
            .listings
            .update(
                id,
                &parsed.fields,
                parsed.business_type.as_deref(),
                parsed.visibility_status.as_deref(),
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("listing not found".into()))?;

        self.cleanup_dropped(&before.fields.images.0, &updated.fields.images.0)
            .await;
        Ok(updated)
    }

    /// Deletes a listing and, best effort, its stored images.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn delete(&self, id: Uuid) -> Result<Listing, ApiError> {
        let removed = self
            .listings
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("listing not found".into()))?;
        for pair in &removed.fields.images.0 {
            self.media.delete_by_url(&pair.image_url).await;
            self.media.delete_by_url(&pair.thumbnail_url).await;
        }
        info!(id = %removed.id, "listing deleted");
        Ok(removed)
    }

    async fn cleanup_dropped(&self, before: &[ImagePair], after: &[ImagePair]) {
        for pair in before {
            if !after.contains(pair) {
                self.media.delete_by_url(&pair.image_url).await;
                self.media.delete_by_url(&pair.thumbnail_url).await;
            }
        }
    }
}

/// Uploads both renditions of every file concurrently. Any failure
/// aborts the batch with a storage error; partial uploads are left for
/// the storage lifecycle rules to reap.
async fn upload_all(media: &MediaStore, files: &[UploadFile]) -> Result<Vec<ImagePair>, ApiError> {
    if files.len() > MAX_LISTING_IMAGES {
        return Err(ApiError::Unprocessable(format!(
            "at most {MAX_LISTING_IMAGES} images per listing"
        )));
    }
    try_join_all(files.iter().map(|file| upload_pair(media, file))).await
}

/// Uploads the full-size and thumbnail renditions of one file.
pub(crate) async fn upload_pair(
    media: &MediaStore,
    file: &UploadFile,
) -> Result<ImagePair, ApiError> {
    let full = media.upload(
        &file.data,
        &file.original_name,
        IMAGE_FOLDER,
        Some(FULL_WIDTH),
    );
    let thumb = media.upload(
        &file.data,
        &file.original_name,
        IMAGE_FOLDER,
        Some(THUMB_WIDTH),
    );
    let (image_url, thumbnail_url) = try_join(full, thumb)
        .await
        .map_err(|_| ApiError::Storage("image upload failed".into()))?;
    Ok(ImagePair {
        image_url,
        thumbnail_url,
    })
}
