//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod feedbacks;
pub mod listings;
pub mod sell_orders;
pub mod system;
pub mod users;

use axum::Router;
use axum::extract::Multipart;
use serde_json::{Map, Value};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::service::UploadFile;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(listings::routes())
        .merge(sell_orders::routes())
        .merge(feedbacks::routes())
        .merge(auth::routes())
        .merge(users::routes())
        .merge(system::routes())
}

/// Drains a multipart form into text fields and file parts. Text
/// fields keep their raw string values; nested JSON is parsed later,
/// at the service layer.
pub(crate) async fn collect_multipart(
    mut multipart: Multipart,
) -> Result<(Map<String, Value>, Vec<UploadFile>), ApiError> {
    let mut fields = Map::new();
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if let Some(file_name) = field.file_name() {
            let original_name = file_name.to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("unreadable file part: {e}")))?;
            files.push(UploadFile {
                original_name,
                data,
            });
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("unreadable field {name}: {e}")))?;
            fields.insert(name, Value::String(text));
        }
    }
    Ok((fields, files))
}
