//! Findings discovered by tool executions.
//!
//! Every finding type shares the same verbs: `disable` deletes the finding,
//! `enable` is a sub-resource action. OSINT findings can also be turned into
//! targets.

use super::registry::{CommandSpec, Handler};

const FINDING_VERBS: &[&str] = &["get", "enable", "disable"];

const FINDING_HANDLERS: &[(&str, Handler)] = &[
    ("get", Handler::GetEntity),
    ("disable", Handler::DeleteEntity),
];

const FINDING_HELP: &[(&str, &str)] = &[
    ("get", "Get all findings or one if ID is provided"),
    ("enable", "Enable finding"),
    ("disable", "Disable finding"),
];

const fn finding(entity: &'static str, about: &'static str) -> CommandSpec {
    CommandSpec {
        entity,
        about,
        verbs: FINDING_VERBS,
        handlers: FINDING_HANDLERS,
        default_handler: Some(Handler::ExtraAction),
        help: FINDING_HELP,
        options: &[],
    }
}

pub const OSINT: CommandSpec = CommandSpec {
    entity: "osint",
    about: "Manage OSINT findings",
    verbs: &["get", "enable", "disable", "target"],
    handlers: FINDING_HANDLERS,
    default_handler: Some(Handler::ExtraAction),
    help: &[
        ("get", "Get all findings or one if ID is provided"),
        ("enable", "Enable finding"),
        ("disable", "Disable finding"),
        ("target", "Create target from OSINT data"),
    ],
    options: &[],
};

pub const FINDINGS: &[CommandSpec] = &[
    finding("credentials", "Manage credentials"),
    finding("exploits", "Manage exploits"),
    finding("hosts", "Manage hosts"),
    OSINT,
    finding("paths", "Manage paths"),
    finding("ports", "Manage ports"),
    finding("technologies", "Manage technologies"),
    finding("vulnerabilities", "Manage vulnerabilities"),
];
