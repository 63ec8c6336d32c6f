use thiserror::Error;

use crate::{
    actions::ActionError, auth::CredentialError, client::ClientError,
    commands::registry::DispatchError, configuration::ConfigurationError,
    endpoint::EndpointError, exit_codes::RekonoExitCode, format::FormattingError,
    transport::ResponseEnvelope,
};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown command group, unsupported verb or missing argument
    #[error("{0}")]
    Usage(#[from] DispatchError),
    /// Malformed local input detected before any request
    #[error("{0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{0}")]
    Credentials(#[from] CredentialError),
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("{0}")]
    Endpoint(#[from] EndpointError),
    #[error("{0}")]
    Formatting(#[from] FormattingError),
}

impl From<ActionError> for CliError {
    fn from(error: ActionError) -> Self {
        match error {
            ActionError::Dispatch(error) => CliError::Usage(error),
            ActionError::Endpoint(error) => CliError::Endpoint(error),
            other => CliError::InvalidInput(other.to_string()),
        }
    }
}

impl CliError {
    /// Get the appropriate exit code for this error
    ///
    /// Only command line usage problems map to `UsageError`; everything else,
    /// including rejected credentials, is a plain `Failure`.
    pub fn exit_code(&self) -> RekonoExitCode {
        match self {
            CliError::Usage(_) => RekonoExitCode::UsageError,
            _ => RekonoExitCode::Failure,
        }
    }

    /// The response behind an authentication or authorization failure.
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            CliError::Client(error) => error.response(),
            _ => None,
        }
    }
}
