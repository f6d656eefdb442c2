//! Media index: discovers servable videos under the media root.
//!
//! The filesystem is the only source of truth. [`MediaIndex::list`] walks the
//! root on every call and [`MediaIndex::lookup`] re-stats the file on every
//! call; nothing is cached between requests.

use std::fs::{File, Metadata};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use vidserve_common::paths::{has_allowed_extension, join_within_root, to_relative_string};
use vidserve_common::{token, Error, MediaEntry, Result};
use walkdir::WalkDir;

use crate::mime::content_type_for;

/// How symbolic links under the media root are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SymlinkPolicy {
    /// Symlinks are never listed, descended into, or resolved by lookup.
    #[default]
    Skip,
    /// Symlinks are followed as long as their target stays inside the root.
    Follow,
}

/// What a scan does when part of the tree cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanErrorPolicy {
    /// The unreadable subtree contributes no entries; the scan goes on.
    #[default]
    Continue,
    /// The first traversal error fails the whole listing.
    Abort,
}

/// A looked-up media file together with the absolute path to open.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub path: PathBuf,
    pub entry: MediaEntry,
    identity: FileIdentity,
}

impl ResolvedMedia {
    /// Open the resolved file.
    ///
    /// The opened handle must be the same file that passed the checks in
    /// [`MediaIndex::resolve`]. A path component swapped for a symlink (or the
    /// file replaced) in between is refused as [`Error::NotFound`]. Once open,
    /// reads go through the handle and later path changes do not matter.
    pub fn open(&self) -> Result<File> {
        let file =
            File::open(&self.path).map_err(|_| Error::not_found(self.entry.path.as_str()))?;
        let metadata = file.metadata()?;
        if FileIdentity::of(&metadata) != self.identity {
            debug!(path = ?self.path, "File changed between lookup and open");
            return Err(Error::not_found(self.entry.path.as_str()));
        }
        Ok(file)
    }
}

/// Identifies a file independent of the path used to reach it. Off unix
/// there is nothing to compare and every file matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }

    #[cfg(not(unix))]
    fn of(_metadata: &Metadata) -> Self {
        Self {}
    }
}

/// Catalog of the video files under one media root.
#[derive(Debug, Clone)]
pub struct MediaIndex {
    root: PathBuf,
    extensions: Vec<String>,
    symlinks: SymlinkPolicy,
    scan_errors: ScanErrorPolicy,
}

impl MediaIndex {
    /// Create an index over `root` with the default video allow-list.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vidserve_common::paths::video_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            symlinks: SymlinkPolicy::default(),
            scan_errors: ScanErrorPolicy::default(),
        }
    }

    /// Replace the extension allow-list. Leading dots and case are ignored.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    pub fn with_scan_errors(mut self, policy: ScanErrorPolicy) -> Self {
        self.scan_errors = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Walk the media root and return every allow-listed regular file.
    ///
    /// Order is unspecified. A missing or non-directory root is an error
    /// under either [`ScanErrorPolicy`].
    pub fn list(&self) -> Result<Vec<MediaEntry>> {
        let metadata = std::fs::metadata(&self.root)?;
        if !metadata.is_dir() {
            return Err(Error::Io(std::io::Error::other(format!(
                "media root is not a directory: {}",
                self.root.display()
            ))));
        }

        let canonical_root = match self.symlinks {
            SymlinkPolicy::Follow => Some(self.root.canonicalize()?),
            SymlinkPolicy::Skip => None,
        };

        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(self.symlinks == SymlinkPolicy::Follow) {
            let entry = match entry {
                Ok(entry) => entry,
                // Continue: the unreadable directory yields this one error and
                // the walk moves on to its siblings.
                Err(e) => match self.scan_errors {
                    ScanErrorPolicy::Continue => {
                        debug!(path = ?e.path(), error = %e, "Skipping unreadable path");
                        continue;
                    }
                    ScanErrorPolicy::Abort => return Err(Error::Io(e.into())),
                },
            };

            // With Skip, a symlink's own file type is reported and never
            // matches `is_file`.
            if !entry.file_type().is_file() {
                continue;
            }

            let file_path = entry.path();
            if !has_allowed_extension(file_path, &self.extensions) {
                continue;
            }

            if let Some(root) = &canonical_root {
                match file_path.canonicalize() {
                    Ok(target) if target.starts_with(root) => {}
                    Ok(target) => {
                        debug!(path = ?file_path, target = ?target, "Skipping symlink that leaves the media root");
                        continue;
                    }
                    Err(e) => {
                        debug!(path = ?file_path, error = %e, "Skipping unresolvable path");
                        continue;
                    }
                }
            }

            let Some(relative) = file_path
                .strip_prefix(&self.root)
                .ok()
                .and_then(to_relative_string)
            else {
                warn!("Skipping file with non UTF-8 path: {:?}", file_path);
                continue;
            };

            // Every listed id must be resolvable by lookup.
            if join_within_root(&self.root, &relative).is_err() {
                warn!("Skipping file whose name cannot be used in an id: {:?}", file_path);
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => match self.scan_errors {
                    ScanErrorPolicy::Continue => {
                        debug!(path = ?file_path, error = %e, "Skipping file that vanished during scan");
                        continue;
                    }
                    ScanErrorPolicy::Abort => return Err(Error::Io(e.into())),
                },
            };

            entries.push(MediaEntry::new(relative, size, content_type_for(file_path)));
        }

        info!("Listed {} media files under {:?}", entries.len(), self.root);
        Ok(entries)
    }

    /// Look up a single media file by its token.
    ///
    /// Decoding failures are [`Error::InvalidToken`]; everything else that
    /// keeps the token from naming a servable file is [`Error::NotFound`].
    pub fn lookup(&self, id: &str) -> Result<MediaEntry> {
        self.resolve(id).map(|resolved| resolved.entry)
    }

    /// Like [`lookup`](Self::lookup), also returning the path to open.
    ///
    /// The decoded path is checked lexically before any filesystem access, so
    /// `..` or absolute paths never cause a stat outside the root.
    pub fn resolve(&self, id: &str) -> Result<ResolvedMedia> {
        let relative = token::decode(id)?;
        let candidate = join_within_root(&self.root, &relative)?;

        if !has_allowed_extension(&candidate, &self.extensions) {
            return Err(Error::not_found(relative));
        }
        // Named after the requested path, not a symlink target, as in `list`.
        let mime = content_type_for(&candidate);

        let (path, metadata) = match self.symlinks {
            SymlinkPolicy::Skip => {
                let metadata = self.stat_without_symlinks(&relative)?;
                (candidate, metadata)
            }
            SymlinkPolicy::Follow => {
                let root = self
                    .root
                    .canonicalize()
                    .map_err(|_| Error::not_found(relative.as_str()))?;
                let target = candidate
                    .canonicalize()
                    .map_err(|_| Error::not_found(relative.as_str()))?;
                if !target.starts_with(&root) {
                    debug!(id, target = ?target, "Lookup resolved outside the media root");
                    return Err(Error::not_found(relative));
                }
                let metadata =
                    std::fs::metadata(&target).map_err(|_| Error::not_found(relative.as_str()))?;
                (target, metadata)
            }
        };

        if !metadata.is_file() {
            return Err(Error::not_found(relative));
        }

        Ok(ResolvedMedia {
            entry: MediaEntry::new(relative, metadata.len(), mime),
            identity: FileIdentity::of(&metadata),
            path,
        })
    }

    /// lstat each component below the root, refusing any symlink.
    fn stat_without_symlinks(&self, relative: &str) -> Result<Metadata> {
        let mut current = self.root.clone();
        let mut last = None;
        for segment in relative.split('/') {
            current.push(segment);
            let metadata = std::fs::symlink_metadata(&current)
                .map_err(|_| Error::not_found(relative))?;
            if metadata.file_type().is_symlink() {
                debug!(path = ?current, "Lookup refused symlink");
                return Err(Error::not_found(relative));
            }
            last = Some(metadata);
        }
        last.ok_or_else(|| Error::not_found(relative))
    }
}
