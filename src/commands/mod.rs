//! CLI command definitions and argument parsing.
//!
//! The command tree is generated from the entity registry: one group per
//! [`registry::CommandSpec`] and one leaf per supported verb. Leaf arguments
//! depend on the handler behind the verb, so the same options always mean
//! the same thing whatever the entity.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub mod api;
pub mod catalog;
pub mod findings;
pub mod params;
pub mod processes;
pub mod profile;
pub mod projects;
pub mod registry;
pub mod targets;
pub mod tasks;
pub mod users;
pub mod wordlists;

use crate::transport::Method;
use params::{
    all_pages_parameter, body_parameter, display_group, endpoint_parameter, existing_file,
    file_parameter, header_parameter, help_parameter, id_parameter, json_parameter,
    no_verify_parameter, parameter_parameter, quiet_parameter, show_headers_parameter,
    status_code_parameter, url_parameter, verbose_parameter,
};
use registry::{registry, CommandSpec, Handler, OptionKind, OptionSpec};

/// Build the complete command tree.
pub fn cli_command() -> Command {
    let command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_parameter());

    registry()
        .iter()
        .fold(command, |command, spec| command.subcommand(entity_command(spec)))
}

/// Parse the process arguments, exiting with a usage error when they are invalid.
pub fn create_cli_commands() -> ArgMatches {
    cli_command().get_matches()
}

fn entity_command(spec: &'static CommandSpec) -> Command {
    let command = Command::new(spec.entity)
        .about(spec.about)
        .subcommand_required(true)
        .arg_required_else_help(true);

    spec.verbs.iter().fold(command, |command, verb| {
        // verbs without a handler are rejected when dispatching
        let leaf = match spec.handler(verb) {
            Ok(handler) => verb_command(spec, *verb, handler),
            Err(_) => Command::new(*verb),
        };
        command.subcommand(leaf)
    })
}

fn verb_command(spec: &'static CommandSpec, verb: &'static str, handler: Handler) -> Command {
    let mut command = Command::new(verb)
        .disable_help_flag(true)
        .arg(help_parameter());
    if let Some(help) = spec.help_for(verb) {
        command = command.about(help);
    }

    let command = match handler {
        Handler::GetEntity => command.arg(id_parameter(false)).arg(json_parameter()),
        Handler::PostEntity => spec
            .options
            .iter()
            .fold(command, |command, option| command.arg(option_arg(option)))
            .arg(json_parameter()),
        Handler::PutEntity => spec
            .options
            .iter()
            .filter(|option| option.kind != OptionKind::File)
            .fold(command.arg(id_parameter(true)), |command, option| {
                command.arg(option_arg(option))
            })
            .arg(json_parameter()),
        Handler::DeleteEntity | Handler::ExtraAction => command.arg(id_parameter(true)),
        Handler::Request(method) => request_args(command, method),
        Handler::Route(route) => {
            let command = if route.takes_id {
                command.arg(id_parameter(true))
            } else {
                command
            };
            let command = route
                .options
                .iter()
                .fold(command, |command, option| command.arg(option_arg(option)));
            if route.save_output {
                command.arg(json_parameter())
            } else {
                command
            }
        }
    };

    display_args(connection_args(command))
}

fn request_args(command: Command, method: Method) -> Command {
    let command = command.arg(endpoint_parameter());
    match method {
        Method::Get => command
            .arg(parameter_parameter())
            .arg(all_pages_parameter())
            .arg(json_parameter()),
        Method::Post => command
            .arg(body_parameter())
            .arg(file_parameter())
            .arg(json_parameter()),
        Method::Put => command.arg(body_parameter()).arg(json_parameter()),
        Method::Delete => command,
    }
}

fn connection_args(command: Command) -> Command {
    command
        .arg(url_parameter())
        .arg(header_parameter())
        .arg(no_verify_parameter())
}

fn display_args(command: Command) -> Command {
    command
        .arg(show_headers_parameter())
        .arg(status_code_parameter())
        .arg(quiet_parameter())
        .group(display_group())
}

/// Command line argument of an entity option. The option field is the arg id.
fn option_arg(option: &OptionSpec) -> Arg {
    let mut arg = Arg::new(option.field)
        .long(option.long)
        .help(option.help)
        .required(option.required);
    if let Some(short) = option.short {
        arg = arg.short(short);
    }
    if let Some(default) = option.default {
        arg = arg.default_value(default);
    }

    match option.kind {
        OptionKind::Text => arg.num_args(1),
        OptionKind::Integer => arg.num_args(1).value_parser(clap::value_parser!(i64)),
        OptionKind::Choice(choices) => arg
            .num_args(1)
            .value_parser(PossibleValuesParser::new(choices.iter().copied())),
        OptionKind::IntegerList => arg
            .action(ArgAction::Append)
            .value_parser(clap::value_parser!(i64)),
        OptionKind::TextList => arg.action(ArgAction::Append),
        OptionKind::File => arg.num_args(1).value_parser(existing_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tree_is_consistent() {
        cli_command().debug_assert();
    }

    #[test]
    fn test_every_entity_is_a_subcommand() {
        let command = cli_command();
        for spec in registry() {
            let group = command
                .find_subcommand(spec.entity)
                .unwrap_or_else(|| panic!("missing {}", spec.entity));
            for verb in spec.verbs {
                assert!(group.find_subcommand(verb).is_some(), "{} {}", spec.entity, verb);
            }
        }
    }

    #[test]
    fn test_parse_entity_options() {
        let matches = cli_command()
            .try_get_matches_from([
                "rekono-cli", "tasks", "create", "-t", "3", "--tool", "7", "-w", "1", "-w", "2",
            ])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (verb, leaf) = group.subcommand().unwrap();
        assert_eq!(verb, "create");
        assert_eq!(leaf.get_one::<i64>("target_id"), Some(&3));
        assert_eq!(leaf.get_one::<i64>("tool_id"), Some(&7));
        assert_eq!(
            leaf.get_many::<i64>("wordlists").unwrap().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            leaf.get_one::<String>("intensity_rank").map(String::as_str),
            Some("Normal")
        );
    }

    #[test]
    fn test_invalid_choice_is_rejected() {
        let result = cli_command().try_get_matches_from([
            "rekono-cli", "users", "role", "1", "--role", "Owner",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_flags_exclude_each_other() {
        let result = cli_command().try_get_matches_from([
            "rekono-cli", "projects", "get", "--quiet", "--status-code",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_h_is_header_on_leaves() {
        let matches = cli_command()
            .try_get_matches_from(["rekono-cli", "api", "get", "projects", "-h", "x-trace=1"])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, leaf) = group.subcommand().unwrap();
        assert_eq!(
            leaf.get_many::<String>(params::PARAMETER_HEADER)
                .unwrap()
                .cloned()
                .collect::<Vec<_>>(),
            vec!["x-trace=1".to_string()]
        );
    }

    #[test]
    fn test_update_does_not_take_files() {
        let command = cli_command();
        let update = command
            .find_subcommand("wordlists")
            .and_then(|group| group.find_subcommand("update"))
            .unwrap();
        assert!(update.get_arguments().all(|arg| arg.get_id() != "file"));
    }
}
