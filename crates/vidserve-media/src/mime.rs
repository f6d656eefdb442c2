//! Content-type lookup by file extension.

use std::path::Path;

/// Fallback for extensions `mime_guess` does not know.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess the `Content-Type` for a media file from its extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vidserve_media::mime::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("movie.mp4")), "video/mp4");
/// assert_eq!(content_type_for(Path::new("movie.unknownext")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
