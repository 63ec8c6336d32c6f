//! Declarative description of the entity commands.
//!
//! Each entity is one [`CommandSpec`]: the verbs it supports, the generic
//! handler behind every verb and the options its create/update payload is
//! made of. The command tree and the request planning are both derived from
//! these tables, no entity carries code of its own.

use crate::transport::Method;
use std::sync::OnceLock;
use thiserror::Error;

use super::{api, catalog, findings, processes, profile, projects, targets, tasks, users, wordlists};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    UnknownEntity(String),
    #[error("'{verb}' is not a supported command for {entity}")]
    UnknownVerb { entity: String, verb: String },
    #[error("missing required argument: {0}")]
    MissingArgument(String),
}

/// Value type of an entity option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Integer,
    Choice(&'static [&'static str]),
    /// Repeatable integer, sent as a list.
    IntegerList,
    /// Repeatable text, sent as a list.
    TextList,
    /// File uploaded with a create request, never part of the JSON body.
    File,
}

/// One command line option mapped onto a field of the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub field: &'static str,
    pub long: &'static str,
    pub short: Option<char>,
    pub help: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    pub default: Option<&'static str>,
    /// Leave the field out of the body instead of sending `null`.
    pub omit_if_absent: bool,
}

impl OptionSpec {
    pub const fn new(field: &'static str, long: &'static str, help: &'static str) -> Self {
        Self {
            field,
            long,
            short: None,
            help,
            kind: OptionKind::Text,
            required: false,
            default: None,
            omit_if_absent: false,
        }
    }

    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub const fn kind(mut self, kind: OptionKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn omit_if_absent(mut self) -> Self {
        self.omit_if_absent = true;
        self
    }
}

/// Fixed request bound to a verb.
///
/// `{id}` in the path is the positional id, `{<field>}` the value of the
/// option with that field. Options not used in the path form the JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub takes_id: bool,
    pub options: &'static [OptionSpec],
    pub save_output: bool,
}

impl Route {
    pub fn uses_placeholder(&self, name: &str) -> bool {
        self.path.contains(&format!("{{{}}}", name))
    }
}

/// Generic request builders a verb can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// GET one entity by id, or every entity with pagination.
    GetEntity,
    /// POST the entity options as a new entity.
    PostEntity,
    /// PUT the entity options onto an existing entity.
    PutEntity,
    DeleteEntity,
    /// POST without body to `/api/<entity>/<id>/<verb>/`.
    ExtraAction,
    /// Raw request against a user supplied endpoint.
    Request(Method),
    Route(&'static Route),
}

/// Metadata of one entity command group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command name, also the REST collection name.
    pub entity: &'static str,
    pub about: &'static str,
    pub verbs: &'static [&'static str],
    pub handlers: &'static [(&'static str, Handler)],
    /// Handler for supported verbs without an explicit mapping.
    pub default_handler: Option<Handler>,
    pub help: &'static [(&'static str, &'static str)],
    /// Options of the create and update payloads.
    pub options: &'static [OptionSpec],
}

/// The verb mapping shared by the CRUD entities.
pub const ENTITY_HANDLERS: &[(&str, Handler)] = &[
    ("get", Handler::GetEntity),
    ("create", Handler::PostEntity),
    ("update", Handler::PutEntity),
    ("delete", Handler::DeleteEntity),
];

impl CommandSpec {
    /// Handler of `verb`, failing when the verb is not supported.
    pub fn handler(&self, verb: &str) -> Result<Handler, DispatchError> {
        let unknown = || DispatchError::UnknownVerb {
            entity: self.entity.to_string(),
            verb: verb.to_string(),
        };
        if !self.verbs.iter().any(|supported| *supported == verb) {
            return Err(unknown());
        }
        self.handlers
            .iter()
            .find(|(name, _)| *name == verb)
            .map(|(_, handler)| *handler)
            .or(self.default_handler)
            .ok_or_else(unknown)
    }

    pub fn help_for(&self, verb: &str) -> Option<&'static str> {
        self.help
            .iter()
            .find(|(name, _)| *name == verb)
            .map(|(_, help)| *help)
    }
}

/// Every command group, in the order they are listed in the help.
pub fn registry() -> &'static [CommandSpec] {
    static REGISTRY: OnceLock<Vec<CommandSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut specs = vec![api::API];
        specs.extend_from_slice(&[
            targets::AUTHENTICATIONS,
            catalog::CONFIGURATIONS,
            catalog::EXECUTIONS,
            processes::PROCESSES,
            profile::PROFILE,
            projects::PROJECTS,
            profile::SETTINGS,
            processes::STEPS,
            targets::TARGET_PORTS,
            targets::TARGETS,
            tasks::TASKS,
            catalog::TOOLS,
            users::USERS,
            wordlists::WORDLISTS,
        ]);
        specs.extend_from_slice(findings::FINDINGS);
        specs
    })
}

/// Look up the command group `entity` and the handler of its `verb`.
pub fn resolve(entity: &str, verb: &str) -> Result<(&'static CommandSpec, Handler), DispatchError> {
    let spec = registry()
        .iter()
        .find(|spec| spec.entity == entity)
        .ok_or_else(|| DispatchError::UnknownEntity(entity.to_string()))?;
    Ok((spec, spec.handler(verb)?))
}
