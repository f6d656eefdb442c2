//! Media streaming module.
//!
//! Serves video files with HTTP range request support.
//!
//! # Routes
//!
//! - `GET /stream/{id}` - Whole file (200), byte range (206), or 416

mod direct;

pub use direct::{respond, stream_media, STREAM_CHUNK_SIZE};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the streaming router, nested under `/stream`.
pub fn stream_router() -> Router<AppContext> {
    Router::new().route("/:id", get(stream_media))
}
