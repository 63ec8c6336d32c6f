//! Projects and their members.

use super::processes::TAGS;
use super::registry::{CommandSpec, Handler, OptionKind, OptionSpec, Route};
use crate::transport::Method;

const MEMBER: &[OptionSpec] = &[OptionSpec::new("user", "user", "User ID")
    .kind(OptionKind::Integer)
    .required()];

pub const ADD_MEMBER: Route = Route {
    method: Method::Post,
    path: "projects/{id}/members",
    takes_id: true,
    options: MEMBER,
    save_output: false,
};

pub const REMOVE_MEMBER: Route = Route {
    method: Method::Delete,
    path: "projects/{id}/members/{user}",
    takes_id: true,
    options: MEMBER,
    save_output: false,
};

pub const PROJECTS: CommandSpec = CommandSpec {
    entity: "projects",
    about: "Manage projects",
    verbs: &["get", "create", "update", "delete", "add-member", "remove-member"],
    handlers: &[
        ("get", Handler::GetEntity),
        ("create", Handler::PostEntity),
        ("update", Handler::PutEntity),
        ("delete", Handler::DeleteEntity),
        ("add-member", Handler::Route(&ADD_MEMBER)),
        ("remove-member", Handler::Route(&REMOVE_MEMBER)),
    ],
    default_handler: None,
    help: &[
        ("get", "Get all projects or one if ID is provided"),
        ("create", "Create project"),
        ("update", "Update project"),
        ("delete", "Delete project"),
        ("add-member", "Add member to project"),
        ("remove-member", "Remove member from project"),
    ],
    options: &[
        OptionSpec::new("name", "name", "Project name").short('n').required(),
        OptionSpec::new("description", "description", "Project description")
            .short('d')
            .required(),
        TAGS,
    ],
};
