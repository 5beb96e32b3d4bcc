//! Typed API client: endpoint in, decoded model or classified error out.
//!
//! # Design
//! `ApiClient` splits every call into `build_request` (endpoint to
//! `HttpRequest`), transport execution, and `parse_response` (`HttpResponse`
//! to `E::Response`). Building and parsing never touch the network, so both
//! are tested directly; `request` simply chains the three steps.
//!
//! Classification order in `parse_response`: non-2xx is a transport error
//! regardless of body; a 2xx body that is not a JSON object is
//! `UnexpectedResponse`; a JSON object that does not fit the model is the
//! specific `DecodeError`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::decode::JsonDecodable;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Shared, cheaply cloneable client for the GitHub REST API.
pub struct ApiClient<T> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ApiClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn build_request<E: Endpoint>(&self, endpoint: &E) -> Result<HttpRequest, ApiError> {
        let config = &self.inner.config;
        let segments = endpoint.path_segments();
        let invalid = || ApiError::InvalidEndpoint(segments.join("/"));
        if segments
            .iter()
            .any(|segment| matches!(&**segment, "" | "." | ".."))
        {
            return Err(invalid());
        }

        let mut url = config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments.iter().map(|segment| &**segment));

        let params = endpoint.parameters();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        Ok(HttpRequest {
            method: endpoint.method(),
            url: url.into(),
            headers: vec![
                ("Accept".to_string(), config.accept.clone()),
                ("User-Agent".to_string(), config.user_agent.clone()),
            ],
        })
    }

    pub fn parse_response<E: Endpoint>(
        &self,
        response: HttpResponse,
    ) -> Result<E::Response, ApiError> {
        check_status(&response)?;
        decode_body(&response.body)
    }

    /// Send `endpoint` and decode its response. No retries, no caching.
    pub async fn request<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response, ApiError> {
        let request = self.build_request(endpoint)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.inner.transport.execute(request).await?;
        debug!(status = response.status, bytes = response.body.len(), "received response");

        self.parse_response::<E>(response)
    }
}

/// Map non-success status codes to a `TransportError`.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::status(
        response.status,
        extract_reason(&response.body),
    ))
}

/// Human-readable reason from an error body: the JSON `message` field when
/// present, otherwise the trimmed body text.
fn extract_reason(body: &str) -> Option<String> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = object.get("message") {
            return Some(message.clone());
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a response body whose top level must be a JSON object.
pub fn decode_body<T: JsonDecodable>(body: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(T::from_json(&object)?),
        _ => Err(ApiError::UnexpectedResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{GetUser, RepositorySort, SearchRepositories, SortOrder};
    use crate::error::{DecodeError, TransportErrorKind};
    use crate::http::HttpMethod;
    use crate::transport::scripted::ScriptedTransport;
    use serde_json::json;

    fn client() -> ApiClient<ScriptedTransport> {
        ApiClient::with_transport(ClientConfig::default(), ScriptedTransport::default())
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn user_json() -> serde_json::Value {
        json!({
            "login": "octocat",
            "id": 583231,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "gravatar_id": "",
            "url": "https://api.github.com/users/octocat",
            "received_events_url": "https://api.github.com/users/octocat/received_events",
            "type": "User"
        })
    }

    #[test]
    fn build_search_request() {
        let req = client()
            .build_request(&SearchRepositories::new("hatena blog").page(2))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://api.github.com/search/repositories?q=hatena+blog&page=2"
        );
        assert_eq!(req.header("accept"), Some("application/vnd.github.v3+json"));
        assert!(req.header("user-agent").is_some());
    }

    #[test]
    fn build_request_keeps_base_path() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:9000/api/v3")
            .unwrap();
        let client = ApiClient::with_transport(config, ScriptedTransport::default());
        let endpoint = SearchRepositories::new("q")
            .sort(RepositorySort::Stars, SortOrder::Desc)
            .per_page(10);
        let req = client.build_request(&endpoint).unwrap();
        assert_eq!(
            req.url,
            "http://127.0.0.1:9000/api/v3/search/repositories?q=q&page=1&sort=stars&order=desc&per_page=10"
        );
    }

    #[test]
    fn build_request_without_parameters_has_no_query() {
        let req = client().build_request(&GetUser::new("octocat")).unwrap();
        assert_eq!(req.url, "https://api.github.com/users/octocat");
    }

    #[test]
    fn build_request_encodes_reserved_characters_in_segments() {
        let cases = [
            ("a?b=1", "https://api.github.com/users/a%3Fb=1"),
            ("a#b", "https://api.github.com/users/a%23b"),
            ("a b", "https://api.github.com/users/a%20b"),
            ("100%", "https://api.github.com/users/100%25"),
            (
                "../search/repositories",
                "https://api.github.com/users/..%2Fsearch%2Frepositories",
            ),
        ];
        for (login, expected) in cases {
            let req = client().build_request(&GetUser::new(login)).unwrap();
            assert_eq!(req.url, expected, "login {login:?}");

            let url = url::Url::parse(&req.url).unwrap();
            assert!(url.query().is_none(), "login {login:?}");
            assert!(url.fragment().is_none(), "login {login:?}");
            assert_eq!(url.path_segments().unwrap().count(), 2, "login {login:?}");
        }
    }

    #[test]
    fn build_request_rejects_dot_and_empty_segments() {
        for login in ["", ".", ".."] {
            let err = client().build_request(&GetUser::new(login)).unwrap_err();
            assert_eq!(
                err,
                ApiError::InvalidEndpoint(format!("users/{login}")),
                "login {login:?}"
            );
        }
    }

    #[test]
    fn parse_non_2xx_with_message() {
        let err = client()
            .parse_response::<SearchRepositories>(response(
                422,
                r#"{"message":"Validation Failed","errors":[]}"#,
            ))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Transport(TransportError::status(
                422,
                Some("Validation Failed".to_string())
            ))
        );
    }

    #[test]
    fn parse_non_2xx_plain_text_and_empty() {
        let err = client()
            .parse_response::<GetUser>(response(503, "  upstream down \n"))
            .unwrap_err();
        let ApiError::Transport(transport) = err else {
            panic!("expected transport error");
        };
        assert_eq!(transport.kind, TransportErrorKind::Status(503));
        assert_eq!(transport.reason.as_deref(), Some("upstream down"));

        let err = client()
            .parse_response::<GetUser>(response(404, ""))
            .unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportError::status(404, None)));
    }

    #[test]
    fn parse_non_2xx_with_valid_model_is_still_transport() {
        let err = client()
            .parse_response::<GetUser>(response(500, &user_json().to_string()))
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn parse_non_object_body() {
        for body in ["[]", "\"text\"", "not json", "", "null"] {
            let err = client()
                .parse_response::<GetUser>(response(200, body))
                .unwrap_err();
            assert_eq!(err, ApiError::UnexpectedResponse, "body {body:?}");
        }
    }

    #[test]
    fn parse_decode_error_is_specific() {
        let err = client()
            .parse_response::<SearchRepositories>(response(
                200,
                r#"{"total_count":1,"incomplete_results":false}"#,
            ))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Decode(DecodeError::MissingRequiredKey("items".to_string()))
        );
        assert!(err.is_decode());
    }

    #[test]
    fn parse_user() {
        let user = client()
            .parse_response::<GetUser>(response(200, &user_json().to_string()))
            .unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.kind, "User");
    }

    #[tokio::test]
    async fn request_round_trip() {
        let client = client();
        client.transport().push_body(
            200,
            json!({"total_count": 0, "incomplete_results": false, "items": []}).to_string(),
        );

        let result = client
            .request(&SearchRepositories::new("nothing"))
            .await
            .unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.items.is_empty());

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].url.ends_with("search/repositories?q=nothing&page=1"));
    }

    #[tokio::test]
    async fn request_network_failure() {
        let client = client();
        client
            .transport()
            .push(Err(TransportError::network("connection refused")));

        let err = client.request(&GetUser::new("octocat")).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Transport(TransportError::network("connection refused"))
        );
    }

    #[tokio::test]
    async fn clones_share_transport() {
        let client = client();
        let other = client.clone();
        other.transport().push_body(200, user_json().to_string());

        let user = client.request(&GetUser::new("octocat")).await.unwrap();
        assert_eq!(user.id, 583231);
        assert_eq!(other.transport().requests().len(), 1);
    }
}
