//! Catalog routes: `GET /media` and `GET /media/:id`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vidserve_common::MediaEntry;

use crate::server::{blocking, error::AppError, AppContext};

pub fn media_routes() -> Router<AppContext> {
    Router::new()
        .route("/media", get(list_media))
        .route("/media/:id", get(get_media))
}

/// List every servable video under the media root.
async fn list_media(State(ctx): State<AppContext>) -> Result<Json<Vec<MediaEntry>>, AppError> {
    let index = ctx.index.clone();
    let entries = blocking(move || index.list()).await?;
    Ok(Json(entries))
}

/// Metadata for one video; 404 if it no longer exists or is not servable.
async fn get_media(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<MediaEntry>, AppError> {
    let index = ctx.index.clone();
    let entry = blocking(move || index.lookup(&id)).await?;
    Ok(Json(entry))
}
