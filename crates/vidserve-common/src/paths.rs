//! Path utilities: video extension checks and media-root containment.
//!
//! The media index and the streaming routes both rely on these helpers to
//! decide which files are servable and to keep decoded paths from escaping
//! the media root.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Default allow-list of servable video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "m4v", "webm"];

/// Check if a path has one of the default video file extensions.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vidserve_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.MP4")));
/// assert!(!is_video_file(Path::new("notes.txt")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    has_allowed_extension(path, VIDEO_EXTENSIONS)
}

/// Check if a path's lowercase extension is in `allowed`.
///
/// Entries in `allowed` are expected to be lowercase and without a dot.
pub fn has_allowed_extension<S: AsRef<str>>(path: &Path, allowed: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            allowed.iter().any(|a| a.as_ref() == ext)
        })
        .unwrap_or(false)
}

/// Get the default list of video file extensions.
#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}

/// Render a root-relative path with `/` separators.
///
/// Returns `None` when a component is not valid UTF-8 or is not a plain
/// file or directory name.
pub fn to_relative_string(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Join a decoded relative path onto `root`, refusing anything that could
/// leave it.
///
/// Only plain name components are accepted. `..`, `.`, absolute paths, drive
/// prefixes, empty segments and backslashes are rejected as [`Error::NotFound`]
/// without touching the filesystem.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vidserve_common::paths::join_within_root;
///
/// let root = Path::new("/srv/media");
/// assert_eq!(
///     join_within_root(root, "movies/a.mp4").unwrap(),
///     Path::new("/srv/media/movies/a.mp4")
/// );
/// assert!(join_within_root(root, "../etc/passwd").is_err());
/// assert!(join_within_root(root, "/etc/passwd").is_err());
/// ```
pub fn join_within_root(root: &Path, relative: &str) -> Result<PathBuf> {
    if relative.is_empty() || relative.contains('\\') || relative.contains('\0') {
        return Err(Error::not_found(relative));
    }

    let mut joined = root.to_path_buf();
    for segment in relative.split('/') {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == segment => joined.push(name),
            _ => return Err(Error::not_found(relative)),
        }
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("movie.mp4")));
        assert!(is_video_file(Path::new("movie.mkv")));
        assert!(is_video_file(Path::new("movie.avi")));
        assert!(is_video_file(Path::new("movie.mov")));
        assert!(is_video_file(Path::new("movie.m4v")));
        assert!(is_video_file(Path::new("movie.webm")));

        // Case insensitive
        assert!(is_video_file(Path::new("movie.MKV")));
        assert!(is_video_file(Path::new("movie.Mp4")));

        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("subtitle.srt")));
        assert!(!is_video_file(Path::new("no_extension")));
        assert!(!is_video_file(Path::new("")));
    }

    #[test]
    fn test_has_allowed_extension_custom_list() {
        let allowed = vec!["ts".to_string()];
        assert!(has_allowed_extension(Path::new("clip.TS"), &allowed));
        assert!(!has_allowed_extension(Path::new("clip.mp4"), &allowed));
    }

    #[test]
    fn test_multiple_dots_and_hidden() {
        assert!(is_video_file(Path::new("movie.1080p.mkv")));
        assert!(is_video_file(Path::new(".hidden.mp4")));
        assert!(!is_video_file(Path::new("movie.mkv.part")));
    }

    #[test]
    fn test_to_relative_string() {
        assert_eq!(
            to_relative_string(Path::new("sub/dir/b.mkv")).as_deref(),
            Some("sub/dir/b.mkv")
        );
        assert_eq!(to_relative_string(Path::new("a.mp4")).as_deref(), Some("a.mp4"));
        assert_eq!(to_relative_string(Path::new("")), None);
        assert_eq!(to_relative_string(Path::new("../a.mp4")), None);
        assert_eq!(to_relative_string(Path::new("/a.mp4")), None);
    }

    #[test]
    fn test_join_within_root_accepts_plain_names() {
        let root = Path::new("/srv/media");
        assert_eq!(
            join_within_root(root, "a.mp4").unwrap(),
            PathBuf::from("/srv/media/a.mp4")
        );
        assert_eq!(
            join_within_root(root, "sub/b.mkv").unwrap(),
            PathBuf::from("/srv/media/sub/b.mkv")
        );
        assert_eq!(
            join_within_root(root, "..hidden..mp4").unwrap(),
            PathBuf::from("/srv/media/..hidden..mp4")
        );
    }

    #[test]
    fn test_join_within_root_rejects_traversal() {
        let root = Path::new("/srv/media");
        for bad in [
            "..",
            "../a.mp4",
            "sub/../../a.mp4",
            "/etc/passwd",
            "./a.mp4",
            "sub/./a.mp4",
            "sub//a.mp4",
            "sub/",
            "",
            "..\\a.mp4",
            "a\0.mp4",
        ] {
            assert!(
                matches!(join_within_root(root, bad), Err(Error::NotFound(_))),
                "accepted {bad:?}"
            );
        }
    }
}
