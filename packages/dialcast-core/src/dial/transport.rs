//! HTTP transport abstraction for device and lounge calls.
//!
//! All network I/O in the crate goes through the [`DialTransport`] trait so
//! session logic can be tested against scripted responses. The production
//! implementation is [`ReqwestTransport`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures raised by the transport layer itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying HTTP client failure (connect, TLS, protocol).
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete within the allotted deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure reported without a client error value.
    #[error("connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// Whether this failure was a deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(err) => err.is_timeout(),
            Self::Connection(_) => false,
        }
    }
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// A completed HTTP exchange as seen by the codec layer.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers rendered as `name: value\r\n` lines.
    ///
    /// Kept as a flat block so header extraction uses the same textual scan
    /// as the rest of the codec. Header names arrive lowercased.
    pub header_block: String,
    /// Response body, lossily decoded as UTF-8 and capped by the transport.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal HTTP surface needed by the session engine and coordinator.
///
/// Implementations must apply `timeout` to the whole exchange and surface an
/// expired deadline as [`TransportError::Timeout`] (or an error whose
/// `is_timeout` is true). Non-2xx statuses are NOT transport errors; they are
/// returned in the [`HttpResponse`] for the caller to interpret.
#[async_trait]
pub trait DialTransport: Send + Sync {
    /// Performs a GET with the given extra headers.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> TransportResult<HttpResponse>;

    /// Performs a POST with the given extra headers and body.
    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
        timeout: Duration,
    ) -> TransportResult<HttpResponse>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Production Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// [`DialTransport`] backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestTransport {
    /// Creates a transport with the given response body cap.
    #[must_use]
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_body_bytes,
        }
    }

    /// Creates a transport reusing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> TransportResult<HttpResponse> {
        let response = request.timeout(timeout).send().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Http(err)
            }
        })?;

        let status = response.status().as_u16();

        let mut header_block = String::new();
        for (name, value) in response.headers() {
            header_block.push_str(name.as_str());
            header_block.push_str(": ");
            header_block.push_str(value.to_str().unwrap_or(""));
            header_block.push_str("\r\n");
        }

        // Read the body in chunks so oversized responses are truncated at the
        // cap instead of buffered whole.
        let mut body_bytes: Vec<u8> = Vec::new();
        let mut response = response;
        while let Some(chunk) = response.chunk().await? {
            let remaining = self.max_body_bytes.saturating_sub(body_bytes.len());
            if remaining == 0 {
                break;
            }
            let take = remaining.min(chunk.len());
            body_bytes.extend_from_slice(&chunk[..take]);
            if take < chunk.len() {
                break;
            }
        }

        Ok(HttpResponse {
            status,
            header_block,
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
        })
    }
}

#[async_trait]
impl DialTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> TransportResult<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(request, timeout).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
        timeout: Duration,
    ) -> TransportResult<HttpResponse> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(request.body(body), timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_the_2xx_range() {
        let mut response = HttpResponse {
            status: 200,
            ..HttpResponse::default()
        };
        assert!(response.is_success());
        response.status = 201;
        assert!(response.is_success());
        response.status = 299;
        assert!(response.is_success());
        response.status = 404;
        assert!(!response.is_success());
        response.status = 199;
        assert!(!response.is_success());
    }

    #[test]
    fn timeout_variant_is_timeout() {
        assert!(TransportError::Timeout(Duration::from_secs(5)).is_timeout());
        assert!(!TransportError::Connection("refused".into()).is_timeout());
    }
}
