//! Direct streaming with HTTP range requests.
//!
//! Resolves the token to a file under the media root, resolves the `Range`
//! header against the size of the opened file, and streams the selected bytes
//! in bounded chunks via `ReaderStream`.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use vidserve_common::Error;
use vidserve_media::{resolve_range, RangeOutcome};

use crate::server::{blocking, error::AppError, AppContext};

/// Read size for streamed bodies.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// GET /stream/:id
pub async fn stream_media(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let index = ctx.index.clone();
    let (resolved, file) = blocking(move || {
        let resolved = index.resolve(&id)?;
        let file = resolved.open()?;
        Ok((resolved, file))
    })
    .await?;
    let file = File::from_std(file);

    // A Range header that is present but not valid text still counts as a
    // malformed range rather than no range at all.
    let range_header = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    let file_size = file.metadata().await.map_err(Error::from)?.len();

    let outcome = resolve_range(range_header, file_size);
    tracing::debug!(
        path = %resolved.entry.path,
        range = ?range_header,
        outcome = ?outcome,
        "Streaming media"
    );

    Ok(respond(outcome, file, &resolved.entry.mime).await?)
}

/// Build the response for a resolved range over an open file.
///
/// - `FullFile`: 200 with the whole file
/// - `Partial`: 206 with exactly `[start, end]`
/// - `Unsatisfiable`: 416 with `Content-Range: bytes */<size>` and no body
pub async fn respond(
    outcome: RangeOutcome,
    mut file: File,
    content_type: &str,
) -> Result<Response, Error> {
    match outcome {
        RangeOutcome::FullFile { file_size } => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (header::CONTENT_LENGTH, file_size.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            // Bytes appended after the size was taken are not sent.
            chunked_body(file.take(file_size)),
        )
            .into_response()),
        RangeOutcome::Partial(window) => {
            file.seek(SeekFrom::Start(window.start)).await?;
            let length = window.chunk_size();

            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_RANGE, window.content_range()),
                    (header::CONTENT_LENGTH, length.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                // Take limits reads to exactly `length` bytes.
                chunked_body(file.take(length)),
            )
                .into_response())
        }
        RangeOutcome::Unsatisfiable { file_size } => Ok((
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, format!("bytes */{file_size}"))],
            Body::empty(),
        )
            .into_response()),
    }
}

/// Stream a reader in `STREAM_CHUNK_SIZE` reads.
///
/// A read error ends the body early, which aborts the response; headers are
/// already sent by then so it is only logged. Dropping the body (client
/// disconnect) drops the reader and closes the file.
fn chunked_body<R>(reader: R) -> Body
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, STREAM_CHUNK_SIZE).inspect_err(|e| {
        tracing::warn!("Media stream aborted by read error: {e}");
    });
    Body::from_stream(stream)
}
