//! Execution context for one CLI invocation.
//!
//! Collects the connection options of a leaf command, asks the injected
//! credential provider for the token and builds the API client.

use crate::{
    auth::CredentialProvider,
    client::ApiClient,
    commands::params::{PARAMETER_HEADER, PARAMETER_NO_VERIFY, PARAMETER_URL},
    configuration::{
        normalize_base_url, parse_key_value_params, ClientConfig, ClientConfigBuilder, DEFAULT_URL,
    },
    error::CliError,
};
use clap::ArgMatches;

/// Resources a command needs to talk to the API.
pub struct ExecutionContext {
    pub api: ApiClient,
}

impl ExecutionContext {
    /// Create a new execution context from command-line arguments.
    ///
    /// The token is requested last, so connection options are validated
    /// before the user is prompted.
    pub fn from_args(
        sub_matches: &ArgMatches,
        credentials: &impl CredentialProvider,
    ) -> Result<Self, CliError> {
        let mut builder = config_from_args(sub_matches)?;
        let config = builder.auth_token(credentials.token()?).build()?;
        let api = ApiClient::new(config)?;
        Ok(ExecutionContext { api })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

fn config_from_args(sub_matches: &ArgMatches) -> Result<ClientConfigBuilder, CliError> {
    let url = sub_matches
        .try_get_one::<String>(PARAMETER_URL)
        .ok()
        .flatten()
        .map(String::as_str)
        .unwrap_or(DEFAULT_URL);
    normalize_base_url(url)?;
    let headers: Vec<String> = sub_matches
        .try_get_many::<String>(PARAMETER_HEADER)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let no_verify = sub_matches
        .try_get_one::<bool>(PARAMETER_NO_VERIFY)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false);

    let mut builder = ClientConfig::builder();
    builder
        .base_url(url)
        .headers(parse_key_value_params(headers.as_slice()))
        .no_verify(no_verify);
    Ok(builder)
}
