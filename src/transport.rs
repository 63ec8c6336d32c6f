//! HTTP transport for the Rekono CLI client.
//!
//! The transport performs one logical request: it sends the request, applies
//! the connection-pool retry policy for transient status codes, and retries
//! exactly once when the exchange fails below the HTTP layer. It knows nothing
//! about authentication, pagination or output.

use crate::endpoint::Endpoint;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::Display;
use thiserror::Error;
use tracing::{debug, trace, warn};
use url::Url;

/// HTTP verbs understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Methods the connection pool may replay after a transient status code.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::Post)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single outbound request, fully composed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: Endpoint,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    /// JSON text sent as the request body, or as form fields with an upload.
    pub body: Option<String>,
    /// File sent as the `file` part of a multipart body.
    pub upload: Option<PathBuf>,
}

impl RequestSpec {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            upload: None,
        }
    }
}

/// The outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub method: Method,
    /// Path and query string of the request that produced this response.
    pub path_url: String,
}

impl ResponseEnvelope {
    /// Value of the first header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body as JSON, `None` when it is empty or malformed.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to initialize the HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid request URL {0}")]
    InvalidUrl(String),
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("cannot read upload file {}: {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Anything able to perform a [`RequestSpec`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseEnvelope, TransportError>;
}

/// Status-driven retry policy applied by the connection pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Upper bound on attempts for one request, the first one included.
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 0.1,
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// A policy that never replays a request on its status code.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff before the `retry`-th retry (1-based): nothing before the first
    /// one, then `backoff_factor * 2^(retry - 1)` capped at `backoff_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let seconds = self.backoff_factor * 2f64.powi(retry.min(64) as i32 - 1);
        Duration::from_secs_f64(seconds.clamp(0.0, self.backoff_max.as_secs_f64()))
    }

    /// Delay before replaying a request that got `status` after `attempts`
    /// attempts, or `None` when the response must be returned as-is.
    pub fn next_delay(
        &self,
        method: Method,
        status: u16,
        attempts: u32,
        retry_after: Option<&str>,
    ) -> Option<Duration> {
        if attempts >= self.max_attempts
            || !method.is_idempotent()
            || !self.status_forcelist.contains(&status)
        {
            return None;
        }

        if status == 429 || status == 503 {
            if let Some(seconds) = retry_after.and_then(|value| value.trim().parse::<u64>().ok()) {
                return Some(Duration::from_secs(seconds).min(self.backoff_max));
            }
        }

        Some(self.backoff(attempts))
    }
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpTransport {
    pub fn new(base_url: Url, tls_verify: bool) -> Result<Self, TransportError> {
        Self::with_retry_policy(base_url, tls_verify, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        base_url: Url,
        tls_verify: bool,
        retry: RetryPolicy,
    ) -> Result<Self, TransportError> {
        if !tls_verify {
            debug!("TLS certificate verification disabled");
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("rekono-cli/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!tls_verify)
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    fn url_for(&self, request: &RequestSpec) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(request.endpoint.as_str())
            .map_err(|_| TransportError::InvalidUrl(request.endpoint.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Send the request, replaying it while the retry policy asks for it.
    async fn send_with_status_retries(
        &self,
        request: &RequestSpec,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<ResponseEnvelope, TransportError> {
        let mut attempts = 0;
        loop {
            let envelope = self.send_once(request, url, headers).await?;
            attempts += 1;

            match self.retry.next_delay(
                request.method,
                envelope.status,
                attempts,
                envelope.header("retry-after"),
            ) {
                Some(delay) => {
                    debug!(
                        "{} {} returned {}, retrying in {:?} (attempt {} of {})",
                        request.method,
                        envelope.path_url,
                        envelope.status,
                        delay,
                        attempts + 1,
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Ok(envelope),
            }
        }
    }

    async fn send_once(
        &self,
        request: &RequestSpec,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<ResponseEnvelope, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), url.clone())
            .headers(headers.clone());

        builder = match (&request.upload, &request.body) {
            (Some(path), body) => builder.multipart(multipart_form(path, body.as_deref()).await?),
            (None, Some(body)) => builder.body(body.clone()),
            (None, None) => builder,
        };

        trace!("{} {}", request.method, url);
        let connection_error = |source| TransportError::Connection {
            url: url.to_string(),
            source,
        };
        let response = builder.send().await.map_err(connection_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(connection_error)?.to_vec();

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
            method: request.method,
            path_url: path_url(url),
        })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url_for(request)?;
        let headers = header_map(&request.headers)?;

        match self.send_with_status_retries(request, &url, &headers).await {
            Err(TransportError::Connection {
                url: failed_url,
                source,
            }) => {
                warn!("Request to {} failed ({}), retrying once", failed_url, source);
                self.send_with_status_retries(request, &url, &headers).await
            }
            result => result,
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn path_url(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Build the multipart body for an upload.
///
/// The file is read here, right before sending, and released as soon as its
/// content is in memory. Top-level fields of a JSON object body travel as
/// text parts next to the file.
async fn multipart_form(path: &Path, body: Option<&str>) -> Result<Form, TransportError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| TransportError::Upload {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt") => mime::TEXT_PLAIN,
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    let part = Part::bytes(content)
        .file_name(file_name)
        .mime_str(content_type.as_ref())
        .map_err(TransportError::Build)?;

    let mut form = Form::new();
    match body.map(serde_json::from_str::<serde_json::Value>) {
        Some(Ok(serde_json::Value::Object(fields))) => {
            for (name, value) in fields {
                form = match value {
                    serde_json::Value::Null => form,
                    serde_json::Value::String(text) => form.text(name, text),
                    other => form.text(name, other.to_string()),
                };
            }
        }
        Some(_) => warn!("Upload body is not a JSON object, only the file is sent"),
        None => {}
    }

    Ok(form.part("file", part))
}
