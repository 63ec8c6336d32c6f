//! Authenticated client for the Rekono API.
//!
//! Every verb goes through [`ApiClient`], which composes the request headers
//! from the immutable [`ClientConfig`], follows paginated collections and
//! turns 401/403 answers into errors. Any other status is handed back to the
//! caller untouched.

use crate::configuration::ClientConfig;
use crate::endpoint::Endpoint;
use crate::transport::{
    HttpTransport, Method, RequestSpec, ResponseEnvelope, Transport, TransportError,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

/// Number of items requested per page.
pub const PAGE_SIZE: u64 = 100;

/// Count assumed before the first page reports the real one, large enough
/// to always fetch the first page.
const UNKNOWN_COUNT: u64 = PAGE_SIZE + 1;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("authentication failed, the API token is invalid or has expired")]
    Authentication(Box<ResponseEnvelope>),
    #[error("not authorized to perform this operation")]
    Authorization(Box<ResponseEnvelope>),
}

impl ClientError {
    /// The response that triggered an authentication or authorization error.
    pub fn response(&self) -> Option<&ResponseEnvelope> {
        match self {
            ClientError::Authentication(response) | ClientError::Authorization(response) => {
                Some(response)
            }
            ClientError::Transport(_) => None,
        }
    }
}

/// How the body of a request is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    Json,
    /// Multipart upload, the transport sets the content type with its boundary.
    Multipart,
}

/// Headers for a single request.
///
/// Starts from the configured extra headers, then sets the token and the
/// content type. The result is fresh for every call, so an upload never
/// leaves its content type behind for the next request.
pub fn compose_headers(config: &ClientConfig, mode: ContentMode) -> BTreeMap<String, String> {
    let mut headers = config.extra_headers.clone();
    headers.insert(
        AUTHORIZATION.as_str().to_string(),
        format!("Token {}", config.auth_token),
    );
    match mode {
        ContentMode::Json => {
            headers.insert(
                CONTENT_TYPE.as_str().to_string(),
                mime::APPLICATION_JSON.to_string(),
            );
        }
        ContentMode::Multipart => {
            headers.remove(CONTENT_TYPE.as_str());
        }
    }
    headers
}

/// Progress of a paginated GET.
#[derive(Debug)]
pub struct PageState {
    page: u64,
    total_count: Option<u64>,
    responses: Vec<ResponseEnvelope>,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

impl PageState {
    pub fn new() -> Self {
        Self {
            page: 1,
            total_count: None,
            responses: Vec::new(),
        }
    }

    /// Page to fetch next.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Largest `count` reported so far.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Record the response for the current page and tell whether another
    /// page follows. A body without a numeric `count` ends the loop.
    pub fn record(&mut self, response: ResponseEnvelope) -> bool {
        let count = response
            .json()
            .and_then(|body| body.get("count").and_then(serde_json::Value::as_u64));
        self.responses.push(response);

        let Some(count) = count else {
            debug!("Page {} carries no count, stopping", self.page);
            return false;
        };
        let total = self.total_count.map_or(count, |seen| seen.max(count));
        self.total_count = Some(total);

        if self.page * PAGE_SIZE < total {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn into_responses(self) -> Vec<ResponseEnvelope> {
        self.responses
    }

    fn query(&self, params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut query = params.clone();
        query.insert("page".to_string(), self.page.to_string());
        query.insert("size".to_string(), PAGE_SIZE.to_string());
        query
    }
}

/// Client bound to one Rekono deployment and one token.
#[derive(Debug)]
pub struct ApiClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.base_url.clone(), config.tls_verify)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET a resource.
    ///
    /// Without pagination exactly one request is sent and the result holds
    /// one response. With pagination `page` and `size` are injected, replacing
    /// caller values, and pages are fetched in order until the reported
    /// `count` is covered.
    pub async fn get(
        &self,
        endpoint: &Endpoint,
        params: &BTreeMap<String, String>,
        paginate: bool,
    ) -> Result<Vec<ResponseEnvelope>, ClientError> {
        if !paginate {
            let mut request = self.request(Method::Get, endpoint, ContentMode::Json);
            request.query = params.clone();
            return Ok(vec![self.send(request).await?]);
        }

        let mut state = PageState::new();
        loop {
            debug!(
                "Fetching page {} of {} (count {})",
                state.page(),
                endpoint,
                state.total_count().unwrap_or(UNKNOWN_COUNT)
            );
            let mut request = self.request(Method::Get, endpoint, ContentMode::Json);
            request.query = state.query(params);
            let response = self.send(request).await?;
            if !state.record(response) {
                break;
            }
        }
        Ok(state.into_responses())
    }

    /// POST a JSON body, or a multipart upload when a file is given.
    pub async fn post(
        &self,
        endpoint: &Endpoint,
        body: Option<&str>,
        upload: Option<&Path>,
    ) -> Result<ResponseEnvelope, ClientError> {
        let mode = match upload {
            Some(_) => ContentMode::Multipart,
            None => ContentMode::Json,
        };
        let mut request = self.request(Method::Post, endpoint, mode);
        request.body = body.map(str::to_string);
        request.upload = upload.map(Path::to_path_buf);
        self.send(request).await
    }

    pub async fn put(
        &self,
        endpoint: &Endpoint,
        body: Option<&str>,
    ) -> Result<ResponseEnvelope, ClientError> {
        let mut request = self.request(Method::Put, endpoint, ContentMode::Json);
        request.body = body.map(str::to_string);
        self.send(request).await
    }

    pub async fn delete(&self, endpoint: &Endpoint) -> Result<ResponseEnvelope, ClientError> {
        let request = self.request(Method::Delete, endpoint, ContentMode::Json);
        self.send(request).await
    }

    fn request(&self, method: Method, endpoint: &Endpoint, mode: ContentMode) -> RequestSpec {
        let mut request = RequestSpec::new(method, endpoint.clone());
        request.headers = compose_headers(&self.config, mode);
        request
    }

    async fn send(&self, request: RequestSpec) -> Result<ResponseEnvelope, ClientError> {
        let response = self.transport.execute(&request).await?;
        match response.status {
            401 => {
                error!("{} {} was rejected: invalid token", request.method, request.endpoint);
                Err(ClientError::Authentication(Box::new(response)))
            }
            403 => {
                error!("{} {} was rejected: forbidden", request.method, request.endpoint);
                Err(ClientError::Authorization(Box::new(response)))
            }
            _ => Ok(response),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use url::Url;

    /// Transport answering from a queue and recording what it was asked.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        responses: Mutex<VecDeque<ResponseEnvelope>>,
        requests: Mutex<Vec<RequestSpec>>,
    }

    impl MockTransport {
        pub(crate) fn new(responses: Vec<(u16, &str)>) -> Self {
            let responses = responses
                .into_iter()
                .map(|(status, body)| envelope(status, body))
                .collect();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> Vec<RequestSpec> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        async fn execute(&self, request: &RequestSpec) -> Result<ResponseEnvelope, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");
            response.method = request.method;
            response.path_url = request.endpoint.to_string();
            Ok(response)
        }
    }

    pub(crate) fn envelope(status: u16, body: &str) -> ResponseEnvelope {
        ResponseEnvelope {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
            method: Method::Get,
            path_url: String::new(),
        }
    }

    pub(crate) fn config() -> ClientConfig {
        ClientConfig {
            base_url: Url::parse("http://127.0.0.1:8000").unwrap(),
            auth_token: "secret".into(),
            extra_headers: BTreeMap::new(),
            tls_verify: true,
        }
    }

    fn client(responses: Vec<(u16, &str)>) -> ApiClient<MockTransport> {
        ApiClient::with_transport(config(), MockTransport::new(responses))
    }

    fn endpoint(path: &str) -> Endpoint {
        Endpoint::resolve(path).unwrap()
    }

    fn page_body(count: u64) -> String {
        format!(r#"{{"count":{},"results":[{{"id":1}}]}}"#, count)
    }

    #[test]
    fn test_compose_headers_json() {
        let mut config = config();
        config
            .extra_headers
            .insert("content-type".into(), "text/plain".into());
        config
            .extra_headers
            .insert("authorization".into(), "Bearer other".into());
        config.extra_headers.insert("x-trace".into(), "1".into());

        let headers = compose_headers(&config, ContentMode::Json);
        assert_eq!(headers["authorization"], "Token secret");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-trace"], "1");
    }

    #[test]
    fn test_compose_headers_multipart_drops_content_type() {
        let mut config = config();
        config
            .extra_headers
            .insert("content-type".into(), "text/plain".into());

        let headers = compose_headers(&config, ContentMode::Multipart);
        assert_eq!(headers["authorization"], "Token secret");
        assert!(!headers.contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_get_without_pagination_sends_one_request() {
        let client = client(vec![(200, r#"{"count":500,"results":[]}"#)]);
        let params = BTreeMap::from([("search".to_string(), "x".to_string())]);

        let responses = client.get(&endpoint("projects"), &params, false).await.unwrap();
        assert_eq!(responses.len(), 1);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, params);
    }

    #[tokio::test]
    async fn test_pagination_overrides_page_parameters() {
        let body = page_body(250);
        let client = client(vec![(200, body.as_str()); 3]);
        let params = BTreeMap::from([
            ("page".to_string(), "7".to_string()),
            ("size".to_string(), "5".to_string()),
            ("target".to_string(), "3".to_string()),
        ]);

        let responses = client.get(&endpoint("hosts"), &params, true).await.unwrap();
        assert_eq!(responses.len(), 3);

        let requests = client.transport().requests();
        for (index, request) in requests.iter().enumerate() {
            assert_eq!(request.query["page"], (index + 1).to_string());
            assert_eq!(request.query["size"], "100");
            assert_eq!(request.query["target"], "3");
        }
    }

    #[tokio::test]
    async fn test_pagination_fetches_ceil_count_pages() {
        for (count, expected) in [(0, 1), (1, 1), (99, 1), (100, 1), (101, 2), (200, 2), (201, 3), (1000, 10)] {
            let body = page_body(count);
            let responses = vec![(200, body.as_str()); expected];
            let client = client(responses);

            let pages = client.get(&endpoint("tasks"), &BTreeMap::new(), true).await.unwrap();
            assert_eq!(pages.len(), expected, "count {}", count);
            assert_eq!(client.transport().requests().len(), expected);
        }
    }

    #[tokio::test]
    async fn test_pagination_stops_without_count() {
        for body in [r#"[{"id":1}]"#, r#"{"id":1}"#, "not json", ""] {
            let client = client(vec![(200, body)]);
            let pages = client.get(&endpoint("tools"), &BTreeMap::new(), true).await.unwrap();
            assert_eq!(pages.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_pagination_count_never_decreases() {
        let first = page_body(250);
        let second = page_body(10);
        let third = page_body(10);
        let client = client(vec![
            (200, first.as_str()),
            (200, second.as_str()),
            (200, third.as_str()),
        ]);

        let pages = client.get(&endpoint("ports"), &BTreeMap::new(), true).await.unwrap();
        assert_eq!(pages.len(), 3);
    }

    #[tokio::test]
    async fn test_unauthorized_is_an_authentication_error() {
        let client = client(vec![(401, r#"{"detail":"Invalid token."}"#)]);

        let error = client.get(&endpoint("projects"), &BTreeMap::new(), true).await.unwrap_err();
        assert!(matches!(error, ClientError::Authentication(_)));
        assert_eq!(error.response().unwrap().status, 401);
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_forbidden_is_an_authorization_error() {
        let client = client(vec![(403, r#"{"detail":"Forbidden"}"#)]);

        let error = client.delete(&endpoint("users/2")).await.unwrap_err();
        assert!(matches!(error, ClientError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_other_statuses_are_returned() {
        for status in [200, 201, 204, 400, 404, 409, 500, 503] {
            let client = client(vec![(status, "{}")]);
            let response = client.put(&endpoint("projects/1"), Some("{}")).await.unwrap();
            assert_eq!(response.status, status);
        }
    }

    #[tokio::test]
    async fn test_upload_headers_do_not_leak() {
        let client = client(vec![(201, "{}"), (200, "{}")]);
        let upload = Path::new("/tmp/wordlist.txt");

        client
            .post(&endpoint("wordlists"), Some(r#"{"name":"w"}"#), Some(upload))
            .await
            .unwrap();
        client
            .put(&endpoint("wordlists/1"), Some(r#"{"name":"w"}"#))
            .await
            .unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].upload.as_deref(), Some(upload));
        assert!(!requests[0].headers.contains_key("content-type"));
        assert_eq!(requests[0].headers["authorization"], "Token secret");
        assert_eq!(requests[1].headers["content-type"], "application/json");
        assert_eq!(requests[1].method, Method::Put);
    }

    #[tokio::test]
    async fn test_delete_has_no_body() {
        let client = client(vec![(204, "")]);
        let response = client.delete(&endpoint("projects/1")).await.unwrap();
        assert_eq!(response.status, 204);

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[0].endpoint.as_str(), "/api/projects/1/");
    }
}
