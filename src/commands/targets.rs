//! Targets, their ports and the authentications used against them.

use super::registry::{CommandSpec, OptionKind, OptionSpec, ENTITY_HANDLERS};
use crate::model::AuthenticationType;
use strum::VariantNames;

pub const TARGETS: CommandSpec = CommandSpec {
    entity: "targets",
    about: "Manage targets",
    verbs: &["get", "create", "delete"],
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all targets or one if ID is provided"),
        ("create", "Create target"),
        ("delete", "Delete target"),
    ],
    options: &[
        OptionSpec::new("project", "project", "Project ID")
            .short('p')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("target", "target", "Target address")
            .short('t')
            .required(),
        OptionSpec::new(
            "defectdojo_engagement_id",
            "dd-engagement",
            "Engagement ID in Defect-Dojo",
        )
        .short('d')
        .kind(OptionKind::Integer),
    ],
};

pub const TARGET_PORTS: CommandSpec = CommandSpec {
    entity: "target-ports",
    about: "Manage target ports",
    verbs: &["get", "create", "delete"],
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all target ports or one if ID is provided"),
        ("create", "Create target port"),
        ("delete", "Delete target port"),
    ],
    options: &[
        OptionSpec::new("target", "target", "Target ID")
            .short('t')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("port", "port", "Port number")
            .short('p')
            .kind(OptionKind::Integer)
            .required(),
    ],
};

pub const AUTHENTICATIONS: CommandSpec = CommandSpec {
    entity: "authentications",
    about: "Manage target authentications",
    verbs: &["get", "create", "update", "delete"],
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all authentications or one if ID is provided"),
        ("create", "Create authentication"),
        ("update", "Update authentication"),
        ("delete", "Delete authentication"),
    ],
    options: &[
        OptionSpec::new("target_port", "target-port", "Related target port ID")
            .short('p')
            .kind(OptionKind::Integer)
            .required(),
        OptionSpec::new("name", "name", "Authentication name")
            .short('n')
            .required(),
        OptionSpec::new("credential", "credential", "Authentication secret value")
            .short('c')
            .required(),
        OptionSpec::new("type", "type", "Authentication type")
            .short('t')
            .kind(OptionKind::Choice(AuthenticationType::VARIANTS))
            .default_value("Basic"),
    ],
};
