//! Shared command parameters for all CLI commands.
//!
//! Parameter names and the argument builders used by every leaf command live
//! here, so that the command tree and the code reading matches agree on ids.

use crate::configuration::{DEFAULT_URL, ENV_REKONO_URL};
use clap::{Arg, ArgAction, ArgGroup};
use std::path::PathBuf;

// Connection parameters
pub const PARAMETER_URL: &str = "url";
pub const PARAMETER_HEADER: &str = "header";
pub const PARAMETER_NO_VERIFY: &str = "no-verify";

// Request parameters
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_ENDPOINT: &str = "endpoint";
pub const PARAMETER_PARAMETER: &str = "parameter";
pub const PARAMETER_BODY: &str = "body";
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_ALL_PAGES: &str = "all-pages";

// Output parameters
pub const PARAMETER_SHOW_HEADERS: &str = "show-headers";
pub const PARAMETER_STATUS_CODE: &str = "status-code";
pub const PARAMETER_QUIET: &str = "quiet";
pub const PARAMETER_JSON: &str = "json";
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_HELP: &str = "help";

pub const GROUP_DISPLAY: &str = "display";

/// Base URL of the Rekono deployment.
pub fn url_parameter() -> Arg {
    Arg::new(PARAMETER_URL)
        .short('u')
        .long(PARAMETER_URL)
        .num_args(1)
        .env(ENV_REKONO_URL)
        .default_value(DEFAULT_URL)
        .help("Base URL to the Rekono backend")
}

/// Extra request header, repeatable. `-h` is taken by this parameter, help
/// is only reachable through `--help` on leaf commands.
pub fn header_parameter() -> Arg {
    Arg::new(PARAMETER_HEADER)
        .short('h')
        .long(PARAMETER_HEADER)
        .action(ArgAction::Append)
        .value_name("KEY=VALUE")
        .help("HTTP header to send in format \"<key>=<value>\"")
}

pub fn no_verify_parameter() -> Arg {
    Arg::new(PARAMETER_NO_VERIFY)
        .long(PARAMETER_NO_VERIFY)
        .action(ArgAction::SetTrue)
        .help("Disable TLS verification")
}

pub fn help_parameter() -> Arg {
    Arg::new(PARAMETER_HELP)
        .long(PARAMETER_HELP)
        .action(ArgAction::Help)
        .help("Print help")
}

pub fn id_parameter(required: bool) -> Arg {
    let help = if required {
        "Entity ID"
    } else {
        "Entity ID, all entities are retrieved when omitted"
    };
    Arg::new(PARAMETER_ID)
        .required(required)
        .num_args(1)
        .value_parser(clap::value_parser!(u64))
        .help(help)
}

pub fn endpoint_parameter() -> Arg {
    Arg::new(PARAMETER_ENDPOINT)
        .required(true)
        .num_args(1)
        .help("API endpoint to call, for example projects or /api/projects/1/")
}

/// Query parameter, repeatable.
pub fn parameter_parameter() -> Arg {
    Arg::new(PARAMETER_PARAMETER)
        .short('p')
        .long(PARAMETER_PARAMETER)
        .action(ArgAction::Append)
        .value_name("KEY=VALUE")
        .help("HTTP parameter to send in format \"<key>=<value>\"")
}

pub fn body_parameter() -> Arg {
    Arg::new(PARAMETER_BODY)
        .short('b')
        .long(PARAMETER_BODY)
        .num_args(1)
        .help("HTTP body to send in JSON")
}

pub fn file_parameter() -> Arg {
    Arg::new(PARAMETER_FILE)
        .short('f')
        .long(PARAMETER_FILE)
        .num_args(1)
        .value_parser(existing_file)
        .help("File to upload")
}

pub fn all_pages_parameter() -> Arg {
    Arg::new(PARAMETER_ALL_PAGES)
        .short('a')
        .long(PARAMETER_ALL_PAGES)
        .action(ArgAction::SetTrue)
        .help("Perform pagination over all pages")
}

pub fn show_headers_parameter() -> Arg {
    Arg::new(PARAMETER_SHOW_HEADERS)
        .short('s')
        .long(PARAMETER_SHOW_HEADERS)
        .action(ArgAction::SetTrue)
        .help("Show response headers")
}

pub fn status_code_parameter() -> Arg {
    Arg::new(PARAMETER_STATUS_CODE)
        .long(PARAMETER_STATUS_CODE)
        .action(ArgAction::SetTrue)
        .help("Only show response status code")
}

pub fn quiet_parameter() -> Arg {
    Arg::new(PARAMETER_QUIET)
        .long(PARAMETER_QUIET)
        .action(ArgAction::SetTrue)
        .help("Don't show anything from response")
}

/// The display flags exclude each other.
pub fn display_group() -> ArgGroup {
    ArgGroup::new(GROUP_DISPLAY)
        .args([PARAMETER_SHOW_HEADERS, PARAMETER_STATUS_CODE, PARAMETER_QUIET])
        .multiple(false)
        .required(false)
}

pub fn json_parameter() -> Arg {
    Arg::new(PARAMETER_JSON)
        .short('j')
        .long(PARAMETER_JSON)
        .num_args(1)
        .value_name("PATH")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Save response data in JSON file")
}

pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

/// Value parser accepting only paths to existing files.
pub fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file '{}' does not exist", value))
    }
}
