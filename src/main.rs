use clap::ArgMatches;
use color_print::ceprintln;
use rekono_cli::auth::EnvCredentialProvider;
use rekono_cli::commands::create_cli_commands;
use rekono_cli::commands::params::PARAMETER_VERBOSE;
use rekono_cli::error::CliError;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::execute_command;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let matches = create_cli_commands();

    // Initialize the logging subsystem
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&matches))
        .with_writer(std::io::stderr)
        .init();

    let credentials: EnvCredentialProvider = EnvCredentialProvider::default();
    if let Err(e) = execute_command(&matches, &credentials).await {
        report(&e);
        ::std::process::exit(e.exit_code().code());
    }
}

/// `RUST_LOG` wins, `--verbose` enables debug output for this crate.
fn log_filter(matches: &ArgMatches) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let verbose = matches
            .try_get_one::<bool>(PARAMETER_VERBOSE)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
        if verbose {
            EnvFilter::new(format!("{}=debug,warn", env!("CARGO_CRATE_NAME")))
        } else {
            EnvFilter::new("warn")
        }
    })
}

fn report(error: &CliError) {
    ceprintln!("<r>ERROR:</r> {}", error);
    if let Some(response) = error.response() {
        eprintln!(
            "{} {} {}",
            response.method, response.path_url, response.status
        );
        eprintln!("{}", response.text());
    }
}
