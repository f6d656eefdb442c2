//! HTTP `Range` header resolution.
//!
//! Only a single `bytes=<start>-<end>` range is understood. The header is
//! parsed into a [`RangeSpec`] first and then checked against the file size,
//! which yields a [`RangeOutcome`] the stream responder can render directly:
//!
//! - no header: [`RangeOutcome::FullFile`] (200)
//! - satisfiable: [`RangeOutcome::Partial`] (206)
//! - malformed or out of bounds: [`RangeOutcome::Unsatisfiable`] (416)

use std::fmt;

/// A client-supplied byte range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// No `Range` header; the whole file.
    Full,
    /// `bytes=-n`: the last `n` bytes.
    Suffix(u64),
    /// `bytes=start-`: from `start` to end of file.
    Prefix(u64),
    /// `bytes=start-end`: inclusive range.
    Bounded(u64, u64),
}

/// Why a `Range` header value failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range unit must be `bytes=`")]
    UnsupportedUnit,

    #[error("malformed byte range: {0:?}")]
    Malformed(String),
}

/// An inclusive byte window that is known to lie inside the file.
///
/// Invariant: `start <= end < file_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: u64,
    pub end: u64,
    pub file_size: u64,
}

impl ResolvedWindow {
    /// Number of bytes in the window.
    pub fn chunk_size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.file_size)
    }
}

/// What the stream responder should send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    FullFile { file_size: u64 },
    Partial(ResolvedWindow),
    Unsatisfiable { file_size: u64 },
}

impl RangeOutcome {
    /// Size of the file the outcome was resolved against.
    pub fn file_size(&self) -> u64 {
        match self {
            RangeOutcome::FullFile { file_size } => *file_size,
            RangeOutcome::Partial(window) => window.file_size,
            RangeOutcome::Unsatisfiable { file_size } => *file_size,
        }
    }
}

impl RangeSpec {
    /// Parse an optional header value. A missing header is [`RangeSpec::Full`].
    pub fn from_header(header: Option<&str>) -> Result<Self, RangeError> {
        match header {
            None => Ok(RangeSpec::Full),
            Some(value) => Self::parse(value),
        }
    }

    /// Parse a `Range` header value of the form `bytes=<start>-<end>`.
    ///
    /// Each side is either empty or a run of ASCII digits that fits in a
    /// `u64`; at least one side must be present. Whitespace, signs, other
    /// units and multi-range lists are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidserve_media::range::RangeSpec;
    ///
    /// assert_eq!(RangeSpec::parse("bytes=0-499").unwrap(), RangeSpec::Bounded(0, 499));
    /// assert_eq!(RangeSpec::parse("bytes=500-").unwrap(), RangeSpec::Prefix(500));
    /// assert_eq!(RangeSpec::parse("bytes=-500").unwrap(), RangeSpec::Suffix(500));
    /// assert!(RangeSpec::parse("bytes=abc").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let spec = value
            .strip_prefix("bytes=")
            .ok_or(RangeError::UnsupportedUnit)?;

        let (start, end) = spec
            .split_once('-')
            .ok_or_else(|| RangeError::Malformed(spec.to_string()))?;

        let start = parse_position(start, spec)?;
        let end = parse_position(end, spec)?;

        match (start, end) {
            (Some(start), Some(end)) => Ok(RangeSpec::Bounded(start, end)),
            (Some(start), None) => Ok(RangeSpec::Prefix(start)),
            (None, Some(suffix)) => Ok(RangeSpec::Suffix(suffix)),
            (None, None) => Err(RangeError::Malformed(spec.to_string())),
        }
    }

    /// Resolve this request against a file of `file_size` bytes.
    ///
    /// The shape is turned into a candidate window first; the bounds check
    /// (`end < file_size`, `start <= end`) is then applied uniformly. A
    /// zero-length file can only ever be served whole.
    pub fn resolve(self, file_size: u64) -> RangeOutcome {
        let unsatisfiable = RangeOutcome::Unsatisfiable { file_size };

        let (start, end) = match self {
            RangeSpec::Full => return RangeOutcome::FullFile { file_size },
            RangeSpec::Bounded(start, end) => (start, end),
            RangeSpec::Prefix(start) => match file_size.checked_sub(1) {
                Some(last) => (start, last),
                None => return unsatisfiable,
            },
            RangeSpec::Suffix(0) => return unsatisfiable,
            RangeSpec::Suffix(n) => match file_size.checked_sub(1) {
                Some(last) => (file_size.saturating_sub(n), last),
                None => return unsatisfiable,
            },
        };

        if end >= file_size || start > end {
            return unsatisfiable;
        }

        RangeOutcome::Partial(ResolvedWindow {
            start,
            end,
            file_size,
        })
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::Full => f.write_str("full"),
            RangeSpec::Suffix(n) => write!(f, "bytes=-{n}"),
            RangeSpec::Prefix(start) => write!(f, "bytes={start}-"),
            RangeSpec::Bounded(start, end) => write!(f, "bytes={start}-{end}"),
        }
    }
}

/// Resolve a raw, optional `Range` header against `file_size`.
///
/// Parse failures are treated the same as out-of-bounds ranges.
pub fn resolve_range(header: Option<&str>, file_size: u64) -> RangeOutcome {
    match RangeSpec::from_header(header) {
        Ok(spec) => spec.resolve(file_size),
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting Range header");
            RangeOutcome::Unsatisfiable { file_size }
        }
    }
}

fn parse_position(text: &str, spec: &str) -> Result<Option<u64>, RangeError> {
    if text.is_empty() {
        return Ok(None);
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(spec.to_string()));
    }
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| RangeError::Malformed(spec.to_string()))
}
