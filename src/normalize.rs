//! Flattening of API responses into one JSON value.

use crate::transport::ResponseEnvelope;
use serde_json::Value;

/// Produce the JSON value shown to the user for a set of responses.
///
/// Undecodable bodies are skipped and DRF `results` envelopes unwrapped.
/// A single response holding one object yields that object; lists and objects
/// from several responses are collected, in order, into one list. Bare
/// scalars carry no entity and are dropped.
pub fn normalize(responses: &[ResponseEnvelope]) -> Value {
    let mut items = Vec::new();
    for response in responses {
        let Some(mut value) = response.json() else {
            continue;
        };
        if let Some(results) = value.as_object_mut().and_then(|object| object.remove("results")) {
            value = results;
        }
        match value {
            Value::Array(elements) => items.extend(elements),
            Value::Object(object) if responses.len() == 1 => return Value::Object(object),
            Value::Object(object) => items.push(Value::Object(object)),
            _ => {}
        }
    }
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;
    use serde_json::json;

    fn envelope(body: &str) -> ResponseEnvelope {
        ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
            method: Method::Get,
            path_url: "/api/projects/".into(),
        }
    }

    #[test]
    fn test_single_object_is_returned_as_is() {
        let body = r#"{"id":1,"name":"rekono","description":"test"}"#;
        assert_eq!(
            normalize(&[envelope(body)]),
            json!({"id": 1, "name": "rekono", "description": "test"})
        );
    }

    #[test]
    fn test_multiple_objects_are_listed_in_order() {
        let responses = [
            envelope(r#"{"id":1}"#),
            envelope(r#"{"id":2}"#),
            envelope(r#"{"id":3}"#),
        ];
        assert_eq!(
            normalize(&responses),
            json!([{"id": 1}, {"id": 2}, {"id": 3}])
        );
    }

    #[test]
    fn test_results_envelopes_are_unwrapped() {
        let single = [envelope(r#"{"count":2,"results":[{"id":1},{"id":2}]}"#)];
        assert_eq!(normalize(&single), json!([{"id": 1}, {"id": 2}]));

        let pages = [
            envelope(r#"{"count":3,"results":[{"id":1},{"id":2}]}"#),
            envelope(r#"{"count":3,"results":[{"id":3}]}"#),
        ];
        assert_eq!(normalize(&pages), json!([{"id": 1}, {"id": 2}, {"id": 3}]));
    }

    #[test]
    fn test_undecodable_bodies_are_skipped() {
        assert_eq!(normalize(&[envelope("")]), json!([]));
        assert_eq!(normalize(&[]), json!([]));

        let responses = [envelope("<html>"), envelope(r#"{"id":5}"#)];
        assert_eq!(normalize(&responses), json!([{"id": 5}]));
    }

    #[test]
    fn test_scalar_bodies_are_dropped() {
        assert_eq!(normalize(&[envelope("\"ok\"")]), json!([]));
        assert_eq!(normalize(&[envelope("null"), envelope("[1]")]), json!([1]));
    }
}
