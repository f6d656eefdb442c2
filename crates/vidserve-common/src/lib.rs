//! Vidserve-Common: Shared types, tokens, and path utilities.
//!
//! - **Media tokens**: reversible, URL-safe identifiers for relative paths
//! - **Core types**: the [`MediaEntry`] catalog record
//! - **Path utilities**: video extension checks and media-root containment
//! - **Error handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use vidserve_common::paths::{is_video_file, join_within_root};
//! use vidserve_common::MediaToken;
//!
//! let token = MediaToken::encode("sub/b.mkv");
//! let relative = token.decode().unwrap();
//! assert!(is_video_file(Path::new(&relative)));
//! assert!(join_within_root(Path::new("/srv/media"), &relative).is_ok());
//! ```

pub mod error;
pub mod paths;
pub mod token;
pub mod types;

pub use error::{Error, Result};
pub use token::MediaToken;
pub use types::*;
