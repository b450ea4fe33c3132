//! Request execution: network I/O, response validation, and file
//! downloads.
//!
//! A [`Session`] owns the HTTP transport and nothing else. It does not own
//! descriptors; a signed request is passed in per call, and any number of
//! executions may be in flight concurrently. Typed decoding follows the
//! shape the originating descriptor declared, and every failure maps to
//! exactly one [`Error`](crate::Error) variant.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::{Rng as _, distr::Alphanumeric};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt as _;
use tracing::debug;

use crate::error::{Error, Result};
use crate::oauth::SignedRequest;
use crate::request::ResponseShape;

/// Executes signed requests against the API.
///
/// Cheap to share: one `reqwest::Client` underneath, supporting concurrent
/// connections. Every call is bound by the configured timeout.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    timeout: Duration,
}

impl Session {
    /// Creates a session whose executions time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// The per-execution timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes a signed request and decodes the response into the shape
    /// declared by the originating descriptor.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] for network-level failures (never retried),
    /// [`Error::MalformedResponse`] for a success status with an
    /// undecodable body, [`Error::ShapeMismatch`] when the body decodes to
    /// the wrong top-level shape, and the mapped API/authorization/server
    /// error for anything the server reports.
    pub async fn execute<S: ResponseShape>(&self, request: SignedRequest) -> Result<S::Output> {
        let response = self.send(request).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();

        if let Some(error) = error_for_response(status, body.as_ref()) {
            return Err(error);
        }
        let body = body.ok_or(Error::MalformedResponse { status })?;
        S::decode(body)
    }

    /// Executes a signed request and streams the response body to
    /// `destination`. Typically used for attachments or raw message
    /// content.
    ///
    /// The body is written to a hidden temporary file next to the
    /// destination and atomically renamed into place on full success.
    /// `progress` is invoked at each chunk boundary with the chunk size,
    /// total bytes read so far, and the expected total (`None` when the
    /// server sends no Content-Length). Fails with
    /// [`Error::DestinationExists`] before any network call when a file is
    /// already present at `destination`. On any failure, including
    /// cancellation by dropping the future, the temporary file is removed
    /// and no file appears at the destination.
    pub async fn download_to_file<F>(
        &self,
        request: SignedRequest,
        destination: &Path,
        mut progress: F,
    ) -> Result<()>
    where
        F: FnMut(u64, u64, Option<u64>),
    {
        if fs::try_exists(destination).await? {
            return Err(Error::DestinationExists(destination.to_path_buf()));
        }

        let mut response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            let body: Option<Value> = serde_json::from_slice(&bytes).ok();
            return Err(error_for_response(status, body.as_ref())
                .unwrap_or(Error::MalformedResponse { status }));
        }
        let expected = response.content_length();

        let temp = TempGuard::new(destination);
        let mut file = fs::File::create(temp.path()).await?;
        let mut total: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
            progress(chunk.len() as u64, total, expected);
        }
        file.flush().await?;
        drop(file);

        fs::rename(temp.path(), destination).await?;
        temp.defuse();
        debug!(destination = %destination.display(), bytes = total, "download complete");
        Ok(())
    }

    async fn send(&self, request: SignedRequest) -> Result<reqwest::Response> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(self.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        Ok(builder.send().await?)
    }
}

/// Maps a `(status, parsed body)` pair to a typed error, or `None` when the
/// response is a plain success.
///
/// Pure: no I/O, testable against literal fixtures. The server reports
/// error details as an object with `"type": "error"` and the message under
/// `"value"`; that message is carried verbatim when present, and the error
/// object is honored even alongside a success status.
pub fn error_for_response(status: StatusCode, body: Option<&Value>) -> Option<Error> {
    let message = body
        .and_then(|b| b.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if status.is_success() {
        let is_error_body = body
            .and_then(|b| b.get("type"))
            .and_then(Value::as_str)
            .is_some_and(|t| t == "error");
        return is_error_body.then(|| Error::Api {
            status,
            message: message.unwrap_or_else(|| generic_message(status)),
        });
    }

    let message = message.unwrap_or_else(|| generic_message(status));
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authorization { status, message },
        s if s.is_server_error() => Error::Server { status },
        _ => Error::Api { status, message },
    })
}

fn generic_message(status: StatusCode) -> String {
    format!("HTTP {status}")
}

/// Removes the temporary download file unless the download completed and
/// the file was renamed away.
struct TempGuard {
    path: PathBuf,
    armed: bool,
}

impl TempGuard {
    fn new(destination: &Path) -> Self {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        Self {
            path: destination.with_file_name(format!(".{name}.{suffix}.part")),
            armed: true,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn defuse(mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
