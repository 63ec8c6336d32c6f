use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// Base URL used when neither `--url` nor the environment provide one.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";
pub const ENV_REKONO_URL: &str = "REKONO_URL";
pub const ENV_REKONO_TOKEN: &str = "REKONO_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid Rekono URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("missing value for property {name:?}")]
    MissingRequiredPropertyValue { name: String },
}

/// Everything the API client needs for one invocation.
///
/// Built once from the command line and environment, then handed to the
/// client which never changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub auth_token: String,
    /// Extra request headers, keyed by lowercase header name.
    pub extra_headers: BTreeMap<String, String>,
    pub tls_verify: bool,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    extra_headers: BTreeMap<String, String>,
    no_verify: bool,
}

impl ClientConfigBuilder {
    pub fn base_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn auth_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Add a header, replacing any earlier one with the same name.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        self.extra_headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn headers(&mut self, headers: BTreeMap<String, String>) -> &mut Self {
        for (name, value) in headers {
            self.header(&name, &value);
        }
        self
    }

    pub fn no_verify(&mut self, no_verify: bool) -> &mut Self {
        self.no_verify = no_verify;
        self
    }

    pub fn build(&self) -> Result<ClientConfig, ConfigurationError> {
        let base_url = match &self.base_url {
            Some(url) => normalize_base_url(url)?,
            None => normalize_base_url(DEFAULT_URL)?,
        };
        let auth_token = self.auth_token.clone().ok_or_else(|| {
            ConfigurationError::MissingRequiredPropertyValue {
                name: "auth_token".to_string(),
            }
        })?;

        debug!("Using Rekono at {}", base_url);
        Ok(ClientConfig {
            base_url,
            auth_token,
            extra_headers: self.extra_headers.clone(),
            tls_verify: !self.no_verify,
        })
    }
}

/// Reduce a user supplied URL to `scheme://host[:port]`.
///
/// Input without a scheme is taken as HTTPS. Paths, queries and fragments are
/// dropped because every request path is absolute.
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigurationError> {
    let raw = raw.trim();
    let invalid = |reason: &str| ConfigurationError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = match Url::parse(raw) {
        Ok(url) if url.has_host() => url,
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw)).map_err(|e| invalid(&e.to_string()))?
        }
        Err(e) => return Err(invalid(&e.to_string())),
    };

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(invalid("missing host")),
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    let origin = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };
    Url::parse(&origin).map_err(|e| invalid(&e.to_string()))
}

/// Parse `key=value` items into a map.
///
/// Items are split on the first `=` and both sides trimmed. Items without
/// `=` carry no value and are skipped.
pub fn parse_key_value_params<S: AsRef<str>>(items: &[S]) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for item in items {
        let item = item.as_ref();
        match item.split_once('=') {
            Some((key, value)) => {
                params.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => warn!("Ignoring {:?}, expected key=value", item),
        }
    }
    params
}
