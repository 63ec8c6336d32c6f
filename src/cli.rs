use clap::ArgMatches;
use rekono_cli::actions::{perform, plan, OutputOptions};
use rekono_cli::auth::CredentialProvider;
use rekono_cli::commands::registry::{resolve, DispatchError};
use rekono_cli::context::ExecutionContext;
use rekono_cli::error::CliError;
use rekono_cli::format::{display_responses, save_output};
use std::io;
use tracing::debug;

fn subcommand(matches: &ArgMatches) -> Result<(&str, &ArgMatches), CliError> {
    matches
        .subcommand()
        .ok_or_else(|| DispatchError::MissingArgument("subcommand".to_string()).into())
}

/// Run the command selected by `matches`.
///
/// The request is planned first, so malformed input fails before the token
/// is requested or anything is sent.
pub async fn execute_command(
    matches: &ArgMatches,
    credentials: &impl CredentialProvider,
) -> Result<(), CliError> {
    let (entity, group) = subcommand(matches)?;
    let (verb, sub_matches) = subcommand(group)?;
    let (spec, handler) = resolve(entity, verb)?;
    debug!("Running {} {} with {:?}", entity, verb, handler);

    let request = plan(spec, handler, verb, sub_matches)?;
    let output = OutputOptions::from_args(sub_matches);

    let context = ExecutionContext::from_args(sub_matches, credentials)?;
    let responses = perform(context.api(), &request).await?;

    display_responses(&responses, output.mode, &mut io::stdout().lock())?;
    if let Some(path) = &output.json {
        save_output(&responses, path)?;
        debug!("Saved output to {}", path.display());
    }
    Ok(())
}
