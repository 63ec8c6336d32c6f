//! Raw requests against any API endpoint.

use super::registry::{CommandSpec, Handler};
use crate::transport::Method;

pub const API: CommandSpec = CommandSpec {
    entity: "api",
    about: "Send raw requests to the Rekono API",
    verbs: &["get", "post", "put", "delete"],
    handlers: &[
        ("get", Handler::Request(Method::Get)),
        ("post", Handler::Request(Method::Post)),
        ("put", Handler::Request(Method::Put)),
        ("delete", Handler::Request(Method::Delete)),
    ],
    default_handler: None,
    help: &[
        ("get", "GET request to the Rekono API"),
        ("post", "POST request to the Rekono API"),
        ("put", "PUT request to the Rekono API"),
        ("delete", "DELETE request to the Rekono API"),
    ],
    options: &[],
};
