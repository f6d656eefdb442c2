use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vidserve_media::{MediaIndex, ScanErrorPolicy, SymlinkPolicy};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared key required on /media and /stream routes (Authorization: Bearer
    /// header or `?key=` query parameter). Unset disables the check.
    #[serde(default)]
    pub access_key: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            access_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory whose video files are served
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Allow-listed extensions, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Follow symlinks that stay inside the media root (default: skip them)
    #[serde(default)]
    pub follow_symlinks: bool,

    #[serde(default)]
    pub scan_errors: ScanErrors,
}

fn default_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_extensions() -> Vec<String> {
    vidserve_common::paths::video_extensions()
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            follow_symlinks: false,
            scan_errors: ScanErrors::default(),
        }
    }
}

/// Whether an unreadable subdirectory is skipped or fails the listing.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanErrors {
    #[default]
    Continue,
    Abort,
}

impl MediaConfig {
    /// Build the media index described by this section.
    pub fn index(&self) -> MediaIndex {
        let symlinks = if self.follow_symlinks {
            SymlinkPolicy::Follow
        } else {
            SymlinkPolicy::Skip
        };
        let scan_errors = match self.scan_errors {
            ScanErrors::Continue => ScanErrorPolicy::Continue,
            ScanErrors::Abort => ScanErrorPolicy::Abort,
        };

        MediaIndex::new(&self.root)
            .with_extensions(&self.extensions)
            .with_symlinks(symlinks)
            .with_scan_errors(scan_errors)
    }
}
