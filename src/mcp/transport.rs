// src/mcp/transport.rs
//
// Newline-delimited JSON-RPC over a byte stream. stdout is reserved for
// protocol frames; every diagnostic goes through tracing (stderr).

use crate::mcp::{
    handler::McpServer,
    protocol::{error_codes, Request, Response},
};
use serde_json::{json, Value};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Retries for a write that fails with a transient error before giving up.
    pub write_retry_limit: u32,
    /// Backoff unit; the n-th retry waits `n * retry_backoff`.
    pub retry_backoff: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            write_retry_limit: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    pub frames_read: usize,
    pub frames_skipped: usize,
    pub responses_written: usize,
    pub handshake_complete: bool,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to read from input: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

/// A fatal transport fault, with what had been served up to that point.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ServeError {
    #[source]
    pub source: TransportError,
    pub summary: ServeSummary,
}

enum Frame {
    Request(Request),
    Invalid { id: Value, reason: String },
    Undecodable(String),
}

fn decode_frame(line: &str) -> Frame {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return Frame::Undecodable(format!("invalid JSON: {}", e)),
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    match serde_json::from_value::<Request>(value) {
        Ok(request) => Frame::Request(request),
        Err(e) if !id.is_null() => Frame::Invalid {
            id,
            reason: e.to_string(),
        },
        Err(e) => Frame::Undecodable(format!("invalid request without id: {}", e)),
    }
}

fn encode_frame(response: &Response) -> String {
    let body = serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to encode response: {}", e);
        json!({
            "jsonrpc": "2.0",
            "id": response.id,
            "error": {
                "code": error_codes::INTERNAL_ERROR,
                "message": format!("Failed to encode response: {}", e),
            },
        })
        .to_string()
    });
    format!("{}\n", body)
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

async fn write_frame<W>(writer: &mut W, frame: &[u8], options: &TransportOptions) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    let mut retries = 0;
    while written < frame.len() {
        match writer.write(&frame[written..]).await {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "output stream closed",
                ))
            }
            Ok(n) => written += n,
            Err(e) if is_transient(&e) && retries < options.write_retry_limit => {
                retries += 1;
                warn!("Transient write failure (retry {}): {}", retries, e);
                tokio::time::sleep(options.retry_backoff * retries).await;
            }
            Err(e) => return Err(e),
        }
    }

    loop {
        match writer.flush().await {
            Ok(()) => return Ok(()),
            Err(e) if is_transient(&e) && retries < options.write_retry_limit => {
                retries += 1;
                warn!("Transient flush failure (retry {}): {}", retries, e);
                tokio::time::sleep(options.retry_backoff * retries).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Serves requests read from `reader` until end of input, one at a time.
///
/// Returns `Err` only when the stream itself fails; decode, validation and
/// handler failures are all answered (or skipped) without leaving the loop.
pub async fn serve<R, W>(
    server: &McpServer,
    mut reader: R,
    mut writer: W,
    options: &TransportOptions,
) -> Result<ServeSummary, ServeError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ServeSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).await.map_err(|e| {
            error!("Failed to read from input: {}", e);
            ServeError {
                source: TransportError::Read(e),
                summary,
            }
        })?;
        if read == 0 {
            info!("EOF received, shutting down MCP server");
            return Ok(summary);
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("Skipping frame that is not valid UTF-8: {}", e);
                summary.frames_skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        summary.frames_read += 1;
        debug!("Received: {}", line);

        let mut completes_handshake = false;
        let response = match decode_frame(line) {
            Frame::Request(request) => {
                let is_initialize = request.method == "initialize";
                let response = server.handle_mcp_request(request).await;
                completes_handshake =
                    is_initialize && response.as_ref().is_some_and(|r| !r.is_error());
                response
            }
            Frame::Invalid { id, reason } => {
                warn!("Invalid request {}: {}", id, reason);
                Some(Response::error(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", reason),
                ))
            }
            Frame::Undecodable(reason) => {
                warn!("Skipping undecodable frame: {}", reason);
                summary.frames_skipped += 1;
                None
            }
        };

        if let Some(response) = response {
            let frame = encode_frame(&response);
            debug!("Sending: {}", frame.trim_end());
            write_frame(&mut writer, frame.as_bytes(), options)
                .await
                .map_err(|e| {
                    error!("Failed to write response: {}", e);
                    ServeError {
                        source: TransportError::Write(e),
                        summary,
                    }
                })?;
            summary.responses_written += 1;
            if completes_handshake {
                summary.handshake_complete = true;
            }
        }
    }
}

/// Runs [`serve`] over the process's stdin and stdout.
pub async fn run_stdio(
    server: &McpServer,
    options: &TransportOptions,
) -> Result<ServeSummary, ServeError> {
    info!("🚀 Starting MCP server on stdin/stdout...");
    serve(
        server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        options,
    )
    .await
}
