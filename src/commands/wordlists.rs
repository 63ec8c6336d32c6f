//! Wordlists used by tools. Creating one uploads the wordlist file.

use super::registry::{CommandSpec, OptionKind, OptionSpec, ENTITY_HANDLERS};
use crate::model::WordlistType;
use strum::VariantNames;

pub const WORDLISTS: CommandSpec = CommandSpec {
    entity: "wordlists",
    about: "Manage wordlists",
    verbs: &["get", "create", "update", "delete"],
    handlers: ENTITY_HANDLERS,
    default_handler: None,
    help: &[
        ("get", "Get all wordlists or one if ID is provided"),
        ("create", "Create wordlist"),
        ("update", "Update wordlist"),
        ("delete", "Delete wordlist"),
    ],
    options: &[
        OptionSpec::new("name", "name", "Wordlist name")
            .short('n')
            .required(),
        OptionSpec::new("type", "type", "Wordlist type")
            .short('t')
            .kind(OptionKind::Choice(WordlistType::VARIANTS))
            .default_value("Endpoint"),
        OptionSpec::new("file", "file", "Wordlist file")
            .short('f')
            .kind(OptionKind::File)
            .required(),
    ],
};
