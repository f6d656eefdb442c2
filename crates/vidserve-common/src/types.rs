//! Core data types shared by the media index and the HTTP API.

use serde::{Deserialize, Serialize};

use crate::token::MediaToken;

/// One servable video file under the media root.
///
/// Entries are rebuilt from the filesystem on every catalog request and never
/// persisted. The `id` is derived from `path` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaEntry {
    /// Opaque identifier used in `/media/:id` and `/stream/:id`.
    pub id: MediaToken,
    /// File name (last path component).
    pub name: String,
    /// Path relative to the media root, `/`-separated.
    pub path: String,
    /// Size in bytes at the time of the scan.
    pub size: u64,
    /// Content type guessed from the extension.
    pub mime: String,
}

impl MediaEntry {
    /// Build an entry for `relative_path`, deriving its id and name.
    pub fn new(relative_path: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        let path = relative_path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            id: MediaToken::encode(&path),
            name,
            path,
            size,
            mime: mime.into(),
        }
    }
}
