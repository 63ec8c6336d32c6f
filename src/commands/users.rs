//! User administration.

use super::registry::{CommandSpec, Handler, OptionKind, OptionSpec, Route};
use crate::model::UserRole;
use crate::transport::Method;
use strum::VariantNames;

const ROLE: OptionSpec = OptionSpec::new("role", "role", "User role")
    .short('r')
    .kind(OptionKind::Choice(UserRole::VARIANTS))
    .default_value("Reader");

pub const UPDATE_ROLE: Route = Route {
    method: Method::Put,
    path: "users/{id}/role",
    takes_id: true,
    options: &[ROLE],
    save_output: true,
};

pub const INVITE: Route = Route {
    method: Method::Post,
    path: "users/invite",
    takes_id: false,
    options: &[
        OptionSpec::new("email", "email", "User email")
            .short('e')
            .required(),
        ROLE,
    ],
    save_output: true,
};

pub const USERS: CommandSpec = CommandSpec {
    entity: "users",
    about: "Manage users",
    verbs: &["get", "delete", "enable", "role", "invite"],
    handlers: &[
        ("get", Handler::GetEntity),
        ("delete", Handler::DeleteEntity),
        ("role", Handler::Route(&UPDATE_ROLE)),
        ("invite", Handler::Route(&INVITE)),
    ],
    default_handler: Some(Handler::ExtraAction),
    help: &[
        ("get", "Get all users or one if ID is provided"),
        ("delete", "Delete user"),
        ("enable", "Enable user"),
        ("role", "Update user role"),
        ("invite", "Invite new user"),
    ],
    options: &[],
};
