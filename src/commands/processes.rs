//! Processes and the steps they are made of.

use super::registry::{CommandSpec, OptionKind, OptionSpec, ENTITY_HANDLERS};

const CRUD: &[&str] = &["get", "create", "update", "delete"];

/// Free-form tags attached to processes and projects.
pub const TAGS: OptionSpec = OptionSpec::new("tags", "tag", "Related tags")
    .short('t')
    .kind(OptionKind::TextList);

pub const PROCESSES: CommandSpec = CommandSpec {
    entity: "processes",
    about: "Manage processes",
    verbs: CRUD,
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all processes or one if ID is provided"),
        ("create", "Create process"),
        ("update", "Update process"),
        ("delete", "Delete process"),
    ],
    options: &[
        OptionSpec::new("name", "name", "Process name").short('n').required(),
        OptionSpec::new("description", "description", "Process description")
            .short('d')
            .required(),
        TAGS,
    ],
};

pub const STEPS: CommandSpec = CommandSpec {
    entity: "steps",
    about: "Manage process steps",
    verbs: CRUD,
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all steps or one if ID is provided"),
        ("create", "Create step"),
        ("update", "Update step"),
        ("delete", "Delete step"),
    ],
    options: &[
        OptionSpec::new("process", "process", "Process ID")
            .short('p')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("tool_id", "tool", "Tool ID")
            .short('t')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("configuration_id", "configuration", "Configuration ID")
            .short('c')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("priority", "priority", "Step priority within process")
            .kind(OptionKind::Integer)
            .default_value("1"),
    ],
};
