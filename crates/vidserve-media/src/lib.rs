//! Vidserve-Media: the media index and HTTP byte-range resolution.
//!
//! - [`index`]: walks the media root and looks up files by [`MediaToken`]
//! - [`range`]: turns a `Range` header and a file size into a [`RangeOutcome`]
//! - [`mime`]: content-type lookup by extension
//!
//! [`MediaToken`]: vidserve_common::MediaToken

pub mod index;
pub mod mime;
pub mod range;

pub use index::{MediaIndex, ResolvedMedia, ScanErrorPolicy, SymlinkPolicy};
pub use range::{resolve_range, RangeError, RangeOutcome, RangeSpec, ResolvedWindow};
