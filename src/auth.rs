//! API token acquisition.
//!
//! The client only ever sees a token string. Where it comes from (the
//! environment, an interactive prompt, a test fixture) is decided by the
//! [`CredentialProvider`] the caller injects.

use crate::configuration::ENV_REKONO_TOKEN;
use inquire::{Password, PasswordDisplayMode};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API token prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
    #[error("API token is empty")]
    Empty,
}

/// Source of the API token used in the `Authorization` header.
pub trait CredentialProvider {
    fn token(&self) -> Result<String, CredentialError>;
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Result<String, CredentialError> {
        non_empty(self.0.clone())
    }
}

/// Asks for the token on the terminal without echoing it.
#[derive(Debug, Default, Clone)]
pub struct PromptCredentialProvider;

impl CredentialProvider for PromptCredentialProvider {
    fn token(&self) -> Result<String, CredentialError> {
        let token = Password::new("API token:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?;
        non_empty(token)
    }
}

/// Reads `REKONO_TOKEN`, falling back to another provider when it is unset.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider<P = PromptCredentialProvider> {
    fallback: P,
}

impl<P: CredentialProvider> EnvCredentialProvider<P> {
    pub fn with_fallback(fallback: P) -> Self {
        Self { fallback }
    }
}

impl<P: CredentialProvider> CredentialProvider for EnvCredentialProvider<P> {
    fn token(&self) -> Result<String, CredentialError> {
        match std::env::var(ENV_REKONO_TOKEN) {
            Ok(token) if !token.trim().is_empty() => {
                debug!("Using API token from {}", ENV_REKONO_TOKEN);
                Ok(token.trim().to_string())
            }
            _ => self.fallback.token(),
        }
    }
}

fn non_empty(token: String) -> Result<String, CredentialError> {
    let token = token.trim();
    if token.is_empty() {
        Err(CredentialError::Empty)
    } else {
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken(" abc ".into()).token().unwrap(), "abc");
        assert!(matches!(
            StaticToken(String::new()).token(),
            Err(CredentialError::Empty)
        ));
    }

    #[test]
    fn test_env_provider_falls_back() {
        if std::env::var(ENV_REKONO_TOKEN).is_err() {
            let provider = EnvCredentialProvider::with_fallback(StaticToken("fallback".into()));
            assert_eq!(provider.token().unwrap(), "fallback");
        }
    }
}
