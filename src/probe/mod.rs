//! HTTP probe client
//!
//! This module performs the single HTTP exchanges the scanner needs:
//! - Building a reqwest client with the user agent and the fixed timeout
//! - GET requests for bucket listings and object downloads
//! - HEAD requests to test object readability without transferring bodies
//! - Classification of transport failures
//!
//! There are no retries. A transport error is returned once and the caller
//! decides what to log.

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    Get,
    Head,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Head => f.write_str("HEAD"),
        }
    }
}

/// Raw outcome of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body (always empty for HEAD)
    pub body: Vec<u8>,
}

impl ProbeResponse {
    /// Returns true for HTTP 200, the only status that proves readability
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level failures
///
/// Provider error documents are not transport errors; they arrive as a
/// normal [`ProbeResponse`] and are classified later.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

impl ProbeError {
    /// Classifies a reqwest error the same way for every call site
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Connect {
                url,
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            Self::Body {
                url,
                message: err.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: err.to_string(),
            }
        }
    }
}

/// A GET response whose body is read chunk by chunk
#[async_trait]
pub trait ProbeStream: Send {
    fn status(&self) -> u16;

    /// Returns the next body chunk, or `None` once the body is complete
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ProbeError>;
}

/// Performs one HTTP exchange against a fully built URL
///
/// Implementations must be safe to share between workers.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn fetch(&self, url: &str, method: ProbeMethod) -> Result<ProbeResponse, ProbeError>;

    /// Starts a GET without reading the body
    ///
    /// Used for downloads so large objects never sit in memory. The default
    /// buffers through [`fetch`](Self::fetch).
    async fn fetch_stream(&self, url: &str) -> Result<Box<dyn ProbeStream>, ProbeError> {
        let response = self.fetch(url, ProbeMethod::Get).await?;
        Ok(Box::new(BufferedStream {
            status: response.status,
            body: Some(response.body),
        }))
    }
}

/// Whole body already in memory, handed out as a single chunk
struct BufferedStream {
    status: u16,
    body: Option<Vec<u8>>,
}

#[async_trait]
impl ProbeStream for BufferedStream {
    fn status(&self) -> u16 {
        self.status
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ProbeError> {
        Ok(self.body.take().filter(|body| !body.is_empty()))
    }
}

/// Body of a live reqwest response
struct HttpStream {
    url: String,
    response: reqwest::Response,
}

#[async_trait]
impl ProbeStream for HttpStream {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ProbeError> {
        let chunk = self
            .response
            .chunk()
            .await
            .map_err(|e| ProbeError::from_reqwest(&self.url, e))?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

/// Builds the HTTP client used for probing
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Whole-request timeout (connect, send and body read)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`ProbeClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    client: Client,
}

impl HttpProbeClient {
    /// Creates a probe client with its own connection pool
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout)?,
        })
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn fetch(&self, url: &str, method: ProbeMethod) -> Result<ProbeResponse, ProbeError> {
        let request = match method {
            ProbeMethod::Get => self.client.request(Method::GET, url),
            ProbeMethod::Head => self.client.request(Method::HEAD, url),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        tracing::trace!(%url, %method, status, "probe response");

        if method == ProbeMethod::Head {
            return Ok(ProbeResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        Ok(ProbeResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn fetch_stream(&self, url: &str) -> Result<Box<dyn ProbeStream>, ProbeError> {
        let response = self
            .client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        tracing::trace!(%url, status = response.status().as_u16(), "download response");

        Ok(Box::new(HttpStream {
            url: url.to_string(),
            response,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> HttpProbeClient {
        HttpProbeClient::new("bucket-finder-test/1.0", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("TestAgent/1.0", DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ProbeMethod::Get.to_string(), "GET");
        assert_eq!(ProbeMethod::Head.to_string(), "HEAD");
    }

    #[tokio::test]
    async fn test_fetch_get_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error/>"))
            .mount(&server)
            .await;

        let response = test_client()
            .fetch(&format!("{}/acme", server.uri()), ProbeMethod::Get)
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(response.body, b"<Error/>".to_vec());
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_head_has_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/acme/file.txt"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let response = test_client()
            .fetch(&format!("{}/acme/file.txt", server.uri()), ProbeMethod::Head)
            .await
            .unwrap();

        assert!(response.is_ok());
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_stream_reads_whole_body() {
        let server = MockServer::start().await;
        let body = "x".repeat(256 * 1024);
        Mock::given(method("GET"))
            .and(path("/acme/big.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;

        let mut stream = test_client()
            .fetch_stream(&format!("{}/acme/big.bin", server.uri()))
            .await
            .unwrap();
        assert_eq!(stream.status(), 200);

        let mut received = Vec::new();
        while let Some(chunk) = stream.next_chunk().await.unwrap() {
            received.extend_from_slice(&chunk);
        }
        assert_eq!(received, body.into_bytes());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = HttpProbeClient::new("bucket-finder-test/1.0", Duration::from_millis(200)).unwrap();
        let result = client
            .fetch(&format!("{}/slow", server.uri()), ProbeMethod::Get)
            .await;

        assert!(matches!(result, Err(ProbeError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_fetch_connect_error() {
        // Nothing listens on port 9 of localhost in the test environment
        let result = test_client()
            .fetch("http://127.0.0.1:9/acme", ProbeMethod::Get)
            .await;

        assert!(matches!(
            result,
            Err(ProbeError::Connect { .. }) | Err(ProbeError::Request { .. })
        ));
    }
}
