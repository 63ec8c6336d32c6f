//! The current user profile and the system settings.

use super::registry::{CommandSpec, Handler, OptionSpec, Route};
use crate::transport::Method;

pub const GET_PROFILE: Route = Route {
    method: Method::Get,
    path: "profile",
    takes_id: false,
    options: &[],
    save_output: true,
};

pub const LINK_TELEGRAM: Route = Route {
    method: Method::Post,
    path: "profile/telegram-token",
    takes_id: false,
    options: &[OptionSpec::new("otp", "token", "Token provided by Telegram bot")
        .short('t')
        .required()],
    save_output: false,
};

pub const GET_SETTINGS: Route = Route {
    method: Method::Get,
    path: "system/1",
    takes_id: false,
    options: &[],
    save_output: true,
};

pub const PROFILE: CommandSpec = CommandSpec {
    entity: "profile",
    about: "Manage user profile",
    verbs: &["get", "telegram"],
    handlers: &[
        ("get", Handler::Route(&GET_PROFILE)),
        ("telegram", Handler::Route(&LINK_TELEGRAM)),
    ],
    default_handler: None,
    help: &[
        ("get", "Get current user profile"),
        ("telegram", "Link Telegram bot to current user"),
    ],
    options: &[],
};

pub const SETTINGS: CommandSpec = CommandSpec {
    entity: "settings",
    about: "Get system settings",
    verbs: &["get"],
    handlers: &[("get", Handler::Route(&GET_SETTINGS))],
    default_handler: None,
    help: &[("get", "Get system settings")],
    options: &[],
};
