//! Sell order service: intake, lifecycle updates and the one-shot
//! listing materialization.

use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::order::requests_completion;
use crate::domain::{Audience, ImagePair, SellOrder};
use crate::error::ApiError;
use crate::media::MediaStore;
use crate::notify::TelegramNotifier;
use crate::persistence::{FailedUploadRepo, ListingRepo, SellOrderRepo};
use crate::service::listings::{FULL_WIDTH, THUMB_WIDTH};
use crate::service::property::{UploadFile, parse_property};

/// Storage folder for order images.
const IMAGE_FOLDER: &str = "orders";
/// Hard cap on images per order submission.
pub const MAX_ORDER_IMAGES: usize = 10;

/// Orchestration layer for the sell order workflow.
#[derive(Debug, Clone)]
pub struct SellOrderService {
    orders: SellOrderRepo,
    listings: ListingRepo,
    media: Arc<MediaStore>,
    failed_uploads: FailedUploadRepo,
    notifier: Arc<TelegramNotifier>,
}

impl SellOrderService {
    /// Creates a new `SellOrderService`.
    #[must_use]
    pub fn new(
        orders: SellOrderRepo,
        listings: ListingRepo,
        media: Arc<MediaStore>,
        failed_uploads: FailedUploadRepo,
        notifier: Arc<TelegramNotifier>,
    ) -> Self {
        Self {
            orders,
            listings,
            media,
            failed_uploads,
            notifier,
        }
    }

    /// Lists orders, optionally narrowed to one status.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on repository failure.
    pub async fn list(
        &self,
        status: Option<&str>,
        audience: Audience,
    ) -> Result<Vec<SellOrder>, ApiError> {
        self.orders.list(status, audience).await
    }

    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn get(&self, id: Uuid, audience: Audience) -> Result<SellOrder, ApiError> {
        self.orders
            .find_by_id(id, audience)
            .await?
            .ok_or_else(|| ApiError::NotFound("order not found".into()))
    }

    /// Creates an intake order from a public multipart submission.
    ///
    /// Unlike listing creation, an image that fails to upload does not
    /// reject the submission: the failure is recorded in the upload
    /// log and the image is skipped, so a seller never loses their
    /// request to a broken photo.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for invalid payloads or repository
    /// failures.
    pub async fn create(
        &self,
        payload: Map<String, Value>,
        files: Vec<UploadFile>,
    ) -> Result<SellOrder, ApiError> {
        if files.len() > MAX_ORDER_IMAGES {
            return Err(ApiError::Unprocessable(format!(
                "at most {MAX_ORDER_IMAGES} images per order"
            )));
        }
        let mut parsed = parse_property(payload)?;

        let mut images = Vec::with_capacity(files.len());
        for file in &files {
            match self.upload_pair(file).await {
                Ok(pair) => images.push(pair),
                Err(reason) => {
                    if let Err(e) = self
                        .failed_uploads
                        .insert(&file.original_name, &reason)
                        .await
                    {
                        warn!(error = %e, "could not record failed upload");
                    }
                }
            }
        }
        parsed.fields.images = Json(images);

        let order = self.orders.insert(&parsed.fields).await?;
        self.notifier.sell_order_created(&order).await;
        info!(id = %order.id, "sell order created");
        Ok(order)
    }

    /// Updates an order. An explicit `completed` status claims the
    /// completion transition first; only the claim winner materializes
    /// a listing, so repeated or concurrent completions create exactly
    /// one object.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for invalid payloads, a missing order or
    /// repository failures.
    pub async fn update(
        &self,
        id: Uuid,
        payload: Map<String, Value>,
    ) -> Result<SellOrder, ApiError> {
        let existing = self
            .orders
            .find_by_id(id, Audience::AdminService)
            .await?
            .ok_or_else(|| ApiError::NotFound("order not found".into()))?;

        let mut parsed = parse_property(payload)?;
        let images: Vec<ImagePair> = parsed
            .existing_images
            .take()
            .unwrap_or_else(|| existing.fields.images.0.clone());
        parsed.fields.images = Json(images);

        // Claim before writing the status column: the claim is the only
        // place allowed to observe the not-yet-completed state.
        let won_completion = requests_completion(parsed.status.as_deref())
            && self.orders.complete_if_pending(id).await?;

        let mut updated = self
            .orders
            .update(
                id,
                &parsed.fields,
                parsed.status.as_deref(),
                parsed.decline_reason.as_deref(),
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("order not found".into()))?;

        if won_completion {
            let listing = self.listings.insert_from_order(&updated.fields).await?;
            self.orders.set_created_object(id, listing.id).await?;
            updated.created_object_id = Some(listing.id);
            info!(order = %id, listing = %listing.id, "order completed, listing materialized");
        }
        Ok(updated)
    }

    /// Deletes an order and, best effort, its stored images.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when absent.
    pub async fn delete(&self, id: Uuid) -> Result<SellOrder, ApiError> {
        let removed = self
            .orders
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("order not found".into()))?;
        for pair in &removed.fields.images.0 {
            self.media.delete_by_url(&pair.image_url).await;
            self.media.delete_by_url(&pair.thumbnail_url).await;
        }
        Ok(removed)
    }

    /// Uploads both renditions of one file; the error is the reason
    /// recorded in the upload log.
    async fn upload_pair(&self, file: &UploadFile) -> Result<ImagePair, String> {
        let image_url = self
            .media
            .upload(
                &file.data,
                &file.original_name,
                IMAGE_FOLDER,
                Some(FULL_WIDTH),
            )
            .await
            .map_err(|e| e.to_string())?;
        let thumbnail_url = self
            .media
            .upload(
                &file.data,
                &file.original_name,
                IMAGE_FOLDER,
                Some(THUMB_WIDTH),
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(ImagePair {
            image_url,
            thumbnail_url,
        })
    }
}
