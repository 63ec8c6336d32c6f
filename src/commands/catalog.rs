//! Read-only catalog entities provided by the backend.

use super::registry::{CommandSpec, Handler};

const GET_ONLY: &[(&str, Handler)] = &[("get", Handler::GetEntity)];

pub const CONFIGURATIONS: CommandSpec = CommandSpec {
    entity: "configurations",
    about: "Show tool configurations",
    verbs: &["get"],
    handlers: GET_ONLY,
    default_handler: None,
    help: &[("get", "Get all configurations or one if ID is provided")],
    options: &[],
};

pub const EXECUTIONS: CommandSpec = CommandSpec {
    entity: "executions",
    about: "Show tool executions",
    verbs: &["get"],
    handlers: GET_ONLY,
    default_handler: None,
    help: &[("get", "Get all executions or one if ID is provided")],
    options: &[],
};

pub const TOOLS: CommandSpec = CommandSpec {
    entity: "tools",
    about: "Show available tools",
    verbs: &["get"],
    handlers: GET_ONLY,
    default_handler: None,
    help: &[("get", "Get all tools or one if ID is provided")],
    options: &[],
};
