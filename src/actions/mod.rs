//! Request planning and execution for the generic handlers.
//!
//! A command is first turned into a [`RequestPlan`] without touching the
//! network or the credentials, so invalid input is reported before any
//! request is attempted. [`perform`] then sends the planned request.

use crate::client::{ApiClient, ClientError};
use crate::commands::params::{
    PARAMETER_ALL_PAGES, PARAMETER_BODY, PARAMETER_ENDPOINT, PARAMETER_FILE, PARAMETER_ID,
    PARAMETER_JSON, PARAMETER_PARAMETER, PARAMETER_QUIET, PARAMETER_SHOW_HEADERS,
    PARAMETER_STATUS_CODE,
};
use crate::commands::registry::{CommandSpec, DispatchError, Handler, OptionKind, OptionSpec, Route};
use crate::configuration::parse_key_value_params;
use crate::endpoint::{Endpoint, EndpointError};
use crate::format::DisplayMode;
use crate::transport::{Method, ResponseEnvelope, Transport};
use clap::ArgMatches;
use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// One logical operation: a single request, or a paginated GET.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub endpoint: Endpoint,
    pub params: BTreeMap<String, String>,
    pub body: Option<String>,
    pub upload: Option<PathBuf>,
    pub paginate: bool,
}

impl RequestPlan {
    fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            params: BTreeMap::new(),
            body: None,
            upload: None,
            paginate: false,
        }
    }
}

/// How the responses of a command are shown and saved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub mode: DisplayMode,
    pub json: Option<PathBuf>,
}

impl OutputOptions {
    pub fn from_args(matches: &ArgMatches) -> Self {
        let mode = if flag(matches, PARAMETER_SHOW_HEADERS) {
            DisplayMode::Headers
        } else if flag(matches, PARAMETER_STATUS_CODE) {
            DisplayMode::StatusCode
        } else if flag(matches, PARAMETER_QUIET) {
            DisplayMode::Quiet
        } else {
            DisplayMode::Body
        };
        Self {
            mode,
            json: lookup::<PathBuf>(matches, PARAMETER_JSON).cloned(),
        }
    }
}

/// Turn the arguments of `<entity> <verb>` into the request to send.
pub fn plan(
    spec: &CommandSpec,
    handler: Handler,
    verb: &str,
    matches: &ArgMatches,
) -> Result<RequestPlan, ActionError> {
    let collection = Endpoint::resolve(spec.entity)?;
    let plan = match handler {
        Handler::GetEntity => match entity_id(matches) {
            Some(id) => RequestPlan::new(Method::Get, collection.item(&id)?),
            None => RequestPlan {
                paginate: true,
                ..RequestPlan::new(Method::Get, collection)
            },
        },
        Handler::PostEntity => {
            let options = spec.options.iter().filter(|option| option.kind != OptionKind::File);
            let mut plan = RequestPlan::new(Method::Post, collection);
            plan.body = Some(to_body(payload(options, matches))?);
            plan.upload = spec
                .options
                .iter()
                .filter(|option| option.kind == OptionKind::File)
                .find_map(|option| lookup::<PathBuf>(matches, option.field))
                .cloned();
            plan
        }
        Handler::PutEntity => {
            let id = required_id(matches)?;
            let options = spec.options.iter().filter(|option| option.kind != OptionKind::File);
            let mut plan = RequestPlan::new(Method::Put, collection.item(&id)?);
            plan.body = Some(to_body(payload(options, matches))?);
            plan
        }
        Handler::DeleteEntity => {
            RequestPlan::new(Method::Delete, collection.item(&required_id(matches)?)?)
        }
        Handler::ExtraAction => {
            RequestPlan::new(Method::Post, collection.action(&required_id(matches)?, verb)?)
        }
        Handler::Request(method) => raw_request(method, matches)?,
        Handler::Route(route) => route_request(route, matches)?,
    };
    debug!(
        "Planned {} {} for {} {}",
        plan.method, plan.endpoint, spec.entity, verb
    );
    Ok(plan)
}

/// Send a planned request. Only GET produces more than one response.
pub async fn perform<T: Transport>(
    client: &ApiClient<T>,
    plan: &RequestPlan,
) -> Result<Vec<ResponseEnvelope>, ClientError> {
    let body = plan.body.as_deref();
    match plan.method {
        Method::Get => client.get(&plan.endpoint, &plan.params, plan.paginate).await,
        Method::Post => Ok(vec![
            client.post(&plan.endpoint, body, plan.upload.as_deref()).await?,
        ]),
        Method::Put => Ok(vec![client.put(&plan.endpoint, body).await?]),
        Method::Delete => Ok(vec![client.delete(&plan.endpoint).await?]),
    }
}

fn raw_request(method: Method, matches: &ArgMatches) -> Result<RequestPlan, ActionError> {
    let endpoint = lookup::<String>(matches, PARAMETER_ENDPOINT)
        .ok_or_else(|| DispatchError::MissingArgument(PARAMETER_ENDPOINT.to_string()))?;
    let mut plan = RequestPlan::new(method, Endpoint::from_user_input(endpoint)?);
    let params = many::<String>(matches, PARAMETER_PARAMETER);
    plan.params = parse_key_value_params(params.as_slice());
    plan.paginate = flag(matches, PARAMETER_ALL_PAGES);
    plan.body = lookup::<String>(matches, PARAMETER_BODY)
        .map(String::as_str)
        .map(validate_body)
        .transpose()?;
    plan.upload = lookup::<PathBuf>(matches, PARAMETER_FILE).cloned();
    Ok(plan)
}

fn route_request(route: &Route, matches: &ArgMatches) -> Result<RequestPlan, ActionError> {
    let mut path = route.path.to_string();
    if route.takes_id {
        path = path.replace("{id}", &required_id(matches)?);
    }

    let mut body_options = Vec::new();
    for option in route.options {
        if route.uses_placeholder(option.field) {
            let value = option_value(option, matches)
                .ok_or_else(|| DispatchError::MissingArgument(option.long.to_string()))?;
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            path = path.replace(&format!("{{{}}}", option.field), &text);
        } else {
            body_options.push(option);
        }
    }

    let mut plan = RequestPlan::new(route.method, Endpoint::resolve(&path)?);
    if !body_options.is_empty() {
        plan.body = Some(to_body(payload(body_options.into_iter(), matches))?);
    }
    Ok(plan)
}

/// Check that a user supplied body is JSON. The text is sent as typed.
pub fn validate_body(body: &str) -> Result<String, ActionError> {
    serde_json::from_str::<IgnoredAny>(body).map_err(ActionError::InvalidBody)?;
    Ok(body.to_string())
}

/// JSON object built from entity options, in declaration order.
///
/// Absent options are sent as `null`, or as an empty list for repeatable
/// ones, unless they are marked to be left out.
pub fn payload<'a>(
    options: impl Iterator<Item = &'a OptionSpec>,
    matches: &ArgMatches,
) -> Map<String, Value> {
    let mut body = Map::new();
    for option in options {
        match option_value(option, matches) {
            Some(value) => {
                body.insert(option.field.to_string(), value);
            }
            None if option.omit_if_absent => {}
            None => {
                let empty = match option.kind {
                    OptionKind::IntegerList | OptionKind::TextList => Value::Array(Vec::new()),
                    _ => Value::Null,
                };
                body.insert(option.field.to_string(), empty);
            }
        }
    }
    body
}

fn option_value(option: &OptionSpec, matches: &ArgMatches) -> Option<Value> {
    match option.kind {
        OptionKind::Text | OptionKind::Choice(_) => {
            lookup::<String>(matches, option.field).map(|value| Value::String(value.clone()))
        }
        OptionKind::Integer => lookup::<i64>(matches, option.field).map(|value| Value::from(*value)),
        OptionKind::IntegerList => {
            let values = many::<i64>(matches, option.field);
            (!values.is_empty()).then(|| values.into_iter().map(Value::from).collect())
        }
        OptionKind::TextList => {
            let values = many::<String>(matches, option.field);
            (!values.is_empty()).then(|| values.into_iter().map(Value::from).collect())
        }
        OptionKind::File => None,
    }
}

fn to_body(body: Map<String, Value>) -> Result<String, ActionError> {
    serde_json::to_string(&Value::Object(body)).map_err(ActionError::Serialization)
}

fn entity_id(matches: &ArgMatches) -> Option<String> {
    lookup::<u64>(matches, PARAMETER_ID).map(u64::to_string)
}

fn required_id(matches: &ArgMatches) -> Result<String, DispatchError> {
    entity_id(matches).ok_or_else(|| DispatchError::MissingArgument(PARAMETER_ID.to_string()))
}

// Leaves define different argument sets, a missing id simply reads as absent.
fn lookup<'a, T: Any + Clone + Send + Sync + 'static>(
    matches: &'a ArgMatches,
    id: &str,
) -> Option<&'a T> {
    matches.try_get_one::<T>(id).ok().flatten()
}

fn many<T: Any + Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Vec<T> {
    matches
        .try_get_many::<T>(id)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    lookup::<bool>(matches, id).copied().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{config, MockTransport};
    use crate::commands::cli_command;
    use crate::commands::registry::resolve;
    use serde_json::json;

    fn plan_for(args: &[&str]) -> Result<RequestPlan, ActionError> {
        let argv = std::iter::once("rekono-cli").chain(args.iter().copied());
        let matches = cli_command().try_get_matches_from(argv).unwrap();
        let (entity, group) = matches.subcommand().unwrap();
        let (verb, leaf) = group.subcommand().unwrap();
        let (spec, handler) = resolve(entity, verb)?;
        plan(spec, handler, verb, leaf)
    }

    fn body(plan: &RequestPlan) -> Value {
        serde_json::from_str(plan.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_get_entity_by_id() {
        let plan = plan_for(&["projects", "get", "1"]).unwrap();
        assert_eq!(plan.method, Method::Get);
        assert_eq!(plan.endpoint.as_str(), "/api/projects/1/");
        assert!(!plan.paginate);
    }

    #[test]
    fn test_get_entity_list_paginates() {
        let plan = plan_for(&["vulnerabilities", "get"]).unwrap();
        assert_eq!(plan.endpoint.as_str(), "/api/vulnerabilities/");
        assert!(plan.paginate);
        assert!(plan.body.is_none());
    }

    #[test]
    fn test_post_entity_body() {
        let plan = plan_for(&[
            "projects", "create", "-n", "rekono", "-d", "test", "-t", "a", "-t", "b",
        ])
        .unwrap();
        assert_eq!(plan.method, Method::Post);
        assert_eq!(plan.endpoint.as_str(), "/api/projects/");
        assert_eq!(
            body(&plan),
            json!({"name": "rekono", "description": "test", "tags": ["a", "b"]})
        );
        assert_eq!(
            plan.body.as_deref(),
            Some(r#"{"name":"rekono","description":"test","tags":["a","b"]}"#)
        );
    }

    #[test]
    fn test_absent_options() {
        let plan = plan_for(&["tasks", "create", "-t", "3", "-p", "5"]).unwrap();
        assert_eq!(
            body(&plan),
            json!({
                "target_id": 3,
                "process_id": 5,
                "intensity_rank": "Normal",
                "scheduled_at": null,
                "scheduled_in": null,
                "scheduled_time_unit": null,
                "repeat_in": null,
                "repeat_time_unit": null,
                "wordlists": []
            })
        );
    }

    #[test]
    fn test_put_entity() {
        let plan = plan_for(&["steps", "update", "4", "-p", "1", "-t", "2", "-c", "3"]).unwrap();
        assert_eq!(plan.method, Method::Put);
        assert_eq!(plan.endpoint.as_str(), "/api/steps/4/");
        assert_eq!(
            body(&plan),
            json!({"process": 1, "tool_id": 2, "configuration_id": 3, "priority": 1})
        );
    }

    #[test]
    fn test_create_with_file_uploads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let plan = plan_for(&["wordlists", "create", "-n", "words", "-f", path]).unwrap();
        assert_eq!(plan.upload.as_deref(), Some(file.path()));
        assert_eq!(body(&plan), json!({"name": "words", "type": "Endpoint"}));
    }

    #[test]
    fn test_delete_and_extra_actions() {
        let plan = plan_for(&["tasks", "cancel", "9"]).unwrap();
        assert_eq!(plan.method, Method::Delete);
        assert_eq!(plan.endpoint.as_str(), "/api/tasks/9/");

        let plan = plan_for(&["tasks", "repeat", "9"]).unwrap();
        assert_eq!(plan.method, Method::Post);
        assert_eq!(plan.endpoint.as_str(), "/api/tasks/9/repeat/");
        assert!(plan.body.is_none());

        let plan = plan_for(&["hosts", "enable", "2"]).unwrap();
        assert_eq!(plan.endpoint.as_str(), "/api/hosts/2/enable/");
    }

    #[test]
    fn test_routes() {
        let plan = plan_for(&["projects", "add-member", "1", "--user", "7"]).unwrap();
        assert_eq!(plan.method, Method::Post);
        assert_eq!(plan.endpoint.as_str(), "/api/projects/1/members/");
        assert_eq!(body(&plan), json!({"user": 7}));

        let plan = plan_for(&["projects", "remove-member", "1", "--user", "7"]).unwrap();
        assert_eq!(plan.method, Method::Delete);
        assert_eq!(plan.endpoint.as_str(), "/api/projects/1/members/7/");
        assert!(plan.body.is_none());

        let plan = plan_for(&["settings", "get"]).unwrap();
        assert_eq!(plan.endpoint.as_str(), "/api/system/1/");

        let plan = plan_for(&["profile", "telegram", "-t", "123456"]).unwrap();
        assert_eq!(plan.endpoint.as_str(), "/api/profile/telegram-token/");
        assert_eq!(body(&plan), json!({"otp": "123456"}));

        let plan = plan_for(&["users", "invite", "-e", "a@b.c"]).unwrap();
        assert_eq!(body(&plan), json!({"email": "a@b.c", "role": "Reader"}));
    }

    #[test]
    fn test_raw_request() {
        let plan = plan_for(&[
            "api", "get", "https://rekono.local/api/targets?x=1", "-p", "project=1", "-a",
        ])
        .unwrap();
        assert_eq!(plan.endpoint.as_str(), "/api/targets/");
        assert_eq!(plan.params.get("project").map(String::as_str), Some("1"));
        assert!(plan.paginate);

        let plan = plan_for(&["api", "post", "projects", "-b", r#"{ "a" : 1 }"#]).unwrap();
        assert_eq!(plan.body.as_deref(), Some(r#"{ "a" : 1 }"#));
        assert!(plan.upload.is_none());
    }

    #[test]
    fn test_raw_body_is_sent_verbatim() {
        let raw = r#"{"n":123456789012345678901234567890,"f":1.10,"e":1e2,"k":1,"k":2}"#;
        assert_eq!(validate_body(raw).unwrap(), raw);

        let plan = plan_for(&["api", "put", "projects/1", "-b", raw]).unwrap();
        assert_eq!(plan.method, Method::Put);
        assert_eq!(plan.body.as_deref(), Some(raw));
    }

    #[test]
    fn test_invalid_body_is_rejected() {
        let result = plan_for(&["api", "post", "projects", "-b", "not json"]);
        assert!(matches!(result, Err(ActionError::InvalidBody(_))));
    }

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let result = plan_for(&["api", "get", "/api/"]);
        assert!(matches!(result, Err(ActionError::Endpoint(_))));
    }

    #[test]
    fn test_output_options() {
        let matches = cli_command()
            .try_get_matches_from(["rekono-cli", "projects", "get", "-s", "-j", "out.json"])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, leaf) = group.subcommand().unwrap();
        let output = OutputOptions::from_args(leaf);
        assert_eq!(output.mode, DisplayMode::Headers);
        assert_eq!(output.json, Some(PathBuf::from("out.json")));

        let matches = cli_command()
            .try_get_matches_from(["rekono-cli", "tasks", "cancel", "1", "--quiet"])
            .unwrap();
        let (_, group) = matches.subcommand().unwrap();
        let (_, leaf) = group.subcommand().unwrap();
        assert_eq!(OutputOptions::from_args(leaf).mode, DisplayMode::Quiet);
        assert_eq!(OutputOptions::from_args(leaf).json, None);
    }

    #[tokio::test]
    async fn test_perform_sends_planned_request() {
        let transport = MockTransport::new(vec![(201, r#"{"id":1}"#)]);
        let client = ApiClient::with_transport(config(), transport);
        let plan = plan_for(&["projects", "create", "-n", "p", "-d", "d"]).unwrap();

        let responses = perform(&client, &plan).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status, 201);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].endpoint.as_str(), "/api/projects/");
        assert_eq!(requests[0].body, plan.body);
    }
}
