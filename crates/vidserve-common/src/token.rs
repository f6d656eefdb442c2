//! Opaque media tokens.
//!
//! A [`MediaToken`] stands in for a file's path relative to the media root.
//! It is the unpadded URL-safe base64 form of the path's UTF-8 bytes, so it
//! can be dropped into a URL path segment without percent-encoding and
//! decoded back to the exact same path.
//!
//! Decoding never touches the filesystem and never checks that the path stays
//! inside the media root; see [`crate::paths::join_within_root`] for that.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// URL-safe opaque identifier for a media file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaToken(String);

impl MediaToken {
    /// Encode a relative path (with `/` separators) into a token.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidserve_common::MediaToken;
    ///
    /// let token = MediaToken::encode("movies/heat.mkv");
    /// assert_eq!(token.decode().unwrap(), "movies/heat.mkv");
    /// assert!(!token.as_str().contains('='));
    /// ```
    #[must_use]
    pub fn encode(relative_path: &str) -> Self {
        Self(URL_SAFE_NO_PAD.encode(relative_path.as_bytes()))
    }

    /// Decode this token back into the relative path it was built from.
    pub fn decode(&self) -> Result<String> {
        decode(&self.0)
    }

    /// The token text as it appears in URLs.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decode an arbitrary, possibly hostile, token string into a relative path.
///
/// Fails on an empty token, characters outside the URL-safe alphabet,
/// padding, non-canonical trailing bits, and payloads that are not UTF-8.
pub fn decode(token: &str) -> Result<String> {
    if token.is_empty() {
        return Err(Error::invalid_token("empty token"));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| Error::invalid_token(e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| Error::invalid_token("token is not valid UTF-8"))
}

impl FromStr for MediaToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for MediaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_url_safe() {
        let token = MediaToken::encode("Season 1/Episode ?#&+.mkv");
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(MediaToken::encode("a.mp4"), MediaToken::encode("a.mp4"));
        assert_ne!(MediaToken::encode("a.mp4"), MediaToken::encode("b.mp4"));
    }

    #[test]
    fn test_round_trip_unicode() {
        let path = "Filme/Amélie (2001)/アメリ.mkv";
        assert_eq!(MediaToken::encode(path).decode().unwrap(), path);
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode(""), Err(Error::InvalidToken(_))));
    }

    #[test]
    fn test_decode_rejects_bad_alphabet() {
        assert!(decode("abc$").is_err());
        assert!(decode("a+b/").is_err());
        assert!(decode("a b").is_err());
    }

    #[test]
    fn test_decode_rejects_padding() {
        // "a" encodes to "YQ" unpadded.
        assert_eq!(decode("YQ").unwrap(), "a");
        assert!(decode("YQ==").is_err());
    }

    #[test]
    fn test_decode_rejects_non_canonical_trailing_bits() {
        // "YR" carries the same leading bits as "YQ" but nonzero padding bits.
        assert!(decode("YR").is_err());
    }

    #[test]
    fn test_decode_rejects_invalid_length() {
        assert!(decode("Y").is_err());
    }

    #[test]
    fn test_decode_rejects_non_utf8() {
        let token = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0x00]);
        assert!(matches!(decode(&token), Err(Error::InvalidToken(_))));
    }

    #[test]
    fn test_decode_does_not_validate_containment() {
        let token = MediaToken::encode("../../etc/passwd");
        assert_eq!(token.decode().unwrap(), "../../etc/passwd");
    }

    #[test]
    fn test_from_str_validates() {
        let token: MediaToken = "YS5tcDQ".parse().unwrap();
        assert_eq!(token.decode().unwrap(), "a.mp4");
        assert!("!!".parse::<MediaToken>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let token = MediaToken::encode("a.mp4");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"YS5tcDQ\"");
    }

    proptest! {
        #[test]
        fn prop_round_trip_printable(path in "[[:print:]]{1,64}") {
            let token = MediaToken::encode(&path);
            prop_assert_eq!(token.decode().unwrap(), path);
        }

        #[test]
        fn prop_round_trip_unicode(path in "\\PC{1,32}") {
            let token = MediaToken::encode(&path);
            prop_assert_eq!(decode(token.as_str()).unwrap(), path);
        }

        #[test]
        fn prop_decode_never_panics(input in "\\PC{0,48}") {
            let _ = decode(&input);
        }
    }
}
