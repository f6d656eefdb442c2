//! Access-key middleware for the media and stream routes.
//!
//! The key may arrive as `Authorization: Bearer <key>` or, for players that
//! cannot set headers on `<video src>`, as a `?key=<key>` query parameter.

use crate::server::error::AppError;
use crate::server::AppContext;
use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use vidserve_common::Error;

/// Query string carrying the access key.
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

type HmacSha256 = Hmac<Sha256>;

/// Constant-time key comparison.
///
/// Both keys are MACed under the expected key and the tags compared with
/// `verify_slice`, so timing depends on neither the presented key's length
/// nor where it first differs.
fn key_matches(expected: &str, presented: &str) -> bool {
    let tag = |input: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(input.as_bytes());
            mac
        })
    };

    let (Ok(reference), Ok(candidate)) = (tag(expected), tag(presented)) else {
        return false;
    };
    candidate
        .verify_slice(&reference.finalize().into_bytes())
        .is_ok()
}

/// Check a presented key against the configured one.
fn check_access(
    expected: Option<&str>,
    bearer_token: Option<&str>,
    query_key: Option<&str>,
) -> Result<(), Error> {
    let Some(expected) = expected else {
        return Ok(());
    };

    // Both sources are always compared.
    let bearer_ok = bearer_token.is_some_and(|key| key_matches(expected, key));
    let query_ok = query_key.is_some_and(|key| key_matches(expected, key));
    if bearer_ok | query_ok {
        return Ok(());
    }

    Err(Error::Unauthorized)
}

/// Middleware rejecting requests without the configured access key
pub async fn access_key_middleware(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    query: Option<Query<KeyQuery>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer_token = bearer.as_ref().map(|b| b.token());
    let query_key = query.as_ref().and_then(|q| q.key.as_deref());

    check_access(
        ctx.config.server.access_key.as_deref(),
        bearer_token,
        query_key,
    )?;

    Ok(next.run(request).await)
}
