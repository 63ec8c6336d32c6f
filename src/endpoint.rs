//! Canonical API endpoint paths.
//!
//! Every request the client issues targets a path of the form
//! `/api/<resource>/`. [`Endpoint`] can only be built through
//! [`Endpoint::resolve`], so holding one means the path is in that form.

use std::fmt;
use thiserror::Error;
use url::Url;

/// Prefix shared by every API path.
pub const API_PREFIX: &str = "/api/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint '{0}' does not name an API resource")]
    Empty(String),
}

/// A validated API path starting with `/api/` and ending with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Resolve a raw path fragment into its canonical form.
    ///
    /// Inputs outside the prefix get a single leading slash stripped and the
    /// prefix prepended; a trailing slash is appended when missing. Resolving
    /// an already canonical path returns it unchanged.
    pub fn resolve(raw: &str) -> Result<Self, EndpointError> {
        let mut path = if raw.starts_with(API_PREFIX) {
            raw.to_string()
        } else {
            format!("{}{}", API_PREFIX, raw.strip_prefix('/').unwrap_or(raw))
        };
        if !path.ends_with('/') {
            path.push('/');
        }

        // at least one character between the prefix and the trailing slash
        if path.len() < API_PREFIX.len() + 2 {
            return Err(EndpointError::Empty(raw.to_string()));
        }

        Ok(Endpoint(path))
    }

    /// Resolve an endpoint typed by a user.
    ///
    /// Only the path component is kept: a full URL is reduced to its path and
    /// any query string or fragment is dropped before resolution.
    pub fn from_user_input(input: &str) -> Result<Self, EndpointError> {
        let path = match Url::parse(input) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ => input
                .split(|c: char| c == '?' || c == '#')
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        Self::resolve(&path)
    }

    /// Path of a single item in this collection.
    pub fn item(&self, id: &str) -> Result<Self, EndpointError> {
        Self::resolve(&format!("{}{}", self.0, id.trim_matches('/')))
    }

    /// Path of a sub-resource action on a single item.
    pub fn action(&self, id: &str, action: &str) -> Result<Self, EndpointError> {
        Self::resolve(&format!(
            "{}{}/{}",
            self.0,
            id.trim_matches('/'),
            action.trim_matches('/')
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
