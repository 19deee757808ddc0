//! Transport-neutral request and response values.

use std::fmt;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use murmur_core::error::InvalidInputError;
use murmur_core::{AccessToken, Result, Route};

/// An outgoing API call, relative to the configured base URL.
///
/// Requests are cheap to clone; the dispatcher keeps the original around so
/// it can be re-issued once after a credential renewal.
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    route: Route,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, route: Route) -> Self {
        Self {
            method,
            route,
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(route: Route) -> Self {
        Self::new(Method::GET, route)
    }

    pub fn post(route: Route) -> Self {
        Self::new(Method::POST, route)
    }

    pub fn patch(route: Route) -> Self {
        Self::new(Method::PATCH, route)
    }

    pub fn delete(route: Route) -> Self {
        Self::new(Method::DELETE, route)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters.
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns true if an `Authorization` header is attached.
    pub fn is_authorized(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// A copy of this request carrying `token` as its bearer credential, or
    /// no `Authorization` header at all when `token` is `None`.
    pub fn with_credential(&self, token: Option<&AccessToken>) -> Result<Self> {
        let mut request = self.clone();
        request.headers.remove(AUTHORIZATION);

        if let Some(token) = token {
            let mut value =
                HeaderValue::from_str(&token.bearer()).map_err(|_| InvalidInputError::Other {
                    message: "access token contains characters not allowed in a header"
                        .to_string(),
                })?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }

        Ok(request)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("route", &self.route)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("authorized", &self.is_authorized())
            .finish()
    }
}

/// A received response: status and raw body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for the status that signals an expired or invalid
    /// credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            InvalidInputError::Body {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// The `message` field of a JSON error body, if present.
    ///
    /// Validation failures carry a list of messages; they are joined.
    pub fn message(&self) -> Option<String> {
        let body: Value = serde_json::from_slice(&self.body).ok()?;
        match body.get("message")? {
            Value::String(message) => Some(message.clone()),
            Value::Array(messages) => {
                let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
                (!joined.is_empty()).then(|| joined.join("; "))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_credential_replaces_authorization() {
        let request = ApiRequest::get(Route::from_static("/posts"));
        let first = request
            .with_credential(Some(&AccessToken::new("one")))
            .unwrap();
        let second = first
            .with_credential(Some(&AccessToken::new("two")))
            .unwrap();

        assert_eq!(second.headers()[AUTHORIZATION], "Bearer two");
        assert!(!request.is_authorized());

        let bare = second.with_credential(None).unwrap();
        assert!(!bare.is_authorized());
    }

    #[test]
    fn debug_hides_body_and_credential() {
        let request = ApiRequest::post(Route::from_static("/auth/login"))
            .json(&serde_json::json!({ "password": "hunter2" }))
            .unwrap()
            .with_credential(Some(&AccessToken::new("secret-token")))
            .unwrap();

        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("authorized: true"));
    }

    #[test]
    fn message_reads_string_or_list() {
        let single = ApiResponse::new(404, r#"{"message":"Post not found"}"#);
        assert_eq!(single.message().as_deref(), Some("Post not found"));

        let list = ApiResponse::new(400, r#"{"message":["title is empty","body is empty"]}"#);
        assert_eq!(
            list.message().as_deref(),
            Some("title is empty; body is empty")
        );

        let opaque = ApiResponse::new(502, "<html>bad gateway</html>");
        assert!(opaque.message().is_none());
    }

    #[test]
    fn status_classification() {
        assert!(ApiResponse::new(204, Vec::new()).is_success());
        assert!(ApiResponse::new(401, Vec::new()).is_unauthorized());
        assert!(!ApiResponse::new(403, Vec::new()).is_unauthorized());
    }
}
