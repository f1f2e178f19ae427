//! The call primitive every remote request goes through.

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{ClientError, ClientResult};
use crate::utils::http_helpers::api_error;

/// An outgoing call, described independently of the HTTP client so that it
/// can be re-issued after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the service base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Authenticated calls carry the session's bearer token and are repaired
    /// on 401; public ones bypass the session entirely.
    pub requires_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        ApiRequest::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Marks the call as not needing credentials.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

/// Status and raw body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Fails with `ClientError::Api` unless the status is 2xx.
    pub fn error_for_status(self) -> ClientResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(api_error(self.status, &self.body))
        }
    }

    /// Checks the status, then decodes the body.
    pub fn json<T: DeserializeOwned>(self) -> ClientResult<T> {
        let response = self.error_for_status()?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Sends one request with the given bearer token (if any).
///
/// Implementations return every HTTP status as an `ApiResponse`; only
/// transport failures become errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> ClientResult<ApiResponse>;
}

/// `reqwest`-backed transport rooted at a service base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Http)?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> ClientResult<ApiResponse> {
        let url = self.url(&request.path);
        debug!(
            method = %request.method,
            url = %url,
            with_credentials = bearer.is_some(),
            "Dispatching request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(http::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, url = %url, status = %status, "Response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_send_attaches_bearer_and_body() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/todos")
            .match_header("authorization", "Bearer abc")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({"title": "Write tests"})))
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&ServiceConfig::new(format!("{}/", server.url()))).unwrap();
        let request = ApiRequest::post("/todos")
            .json(&serde_json::json!({"title": "Write tests"}))
            .unwrap();

        let response = transport.send(&request, Some("abc")).await.unwrap();
        m.assert_async().await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, r#"{"id": 1}"#);
    }

    #[tokio::test]
    async fn test_send_without_bearer_omits_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/auth/confirm")
            .match_header("authorization", Matcher::Missing)
            .match_query(Matcher::UrlEncoded("token".into(), "a b&c".into()))
            .with_status(200)
            .with_body(r#"{"message": "ok"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&ServiceConfig::new(server.url())).unwrap();
        let request = ApiRequest::get("/auth/confirm").query("token", "a b&c").public();

        let response = transport.send(&request, None).await.unwrap();
        m.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_statuses_are_responses_not_errors() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/todos/9")
            .with_status(404)
            .with_body(r#"{"message": "Todo not found"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&ServiceConfig::new(server.url())).unwrap();
        let response = transport
            .send(&ApiRequest::get("/todos/9"), Some("abc"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        match response.error_for_status() {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Todo not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
