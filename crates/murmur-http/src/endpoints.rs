//! Endpoint routes and response envelopes.

use serde::Deserialize;
use serde_json::Value;

use murmur_core::{Page, PageMeta, User};

// ============================================================================
// Routes
// ============================================================================

/// Create an account.
pub const REGISTER: &str = "/auth/register";

/// Exchange credentials for an access token.
pub const LOGIN: &str = "/auth/login";

/// End the server-side session.
pub const LOGOUT: &str = "/auth/logout";

/// Renew the access token from the refresh cookie.
pub const REFRESH: &str = "/auth/refresh";

/// The logged-in user's profile.
pub const MY_PROFILE: &str = "/users/my-profile";

/// Post listing and single posts (`/posts/{id}`).
pub const POSTS: &str = "/posts";

/// The logged-in user's feed and likes (`/feed/{id}/like`).
pub const FEED: &str = "/feed";

/// Path segment appended to a feed item to toggle a like.
pub const LIKE: &str = "like";

// ============================================================================
// Envelopes
// ============================================================================

/// The `{statusCode, message, data}` wrapper most endpoints answer with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(alias = "status")]
    pub status_code: Option<u16>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// The wrapper of list endpoints: `{message, data: {meta, docs}}`.
#[derive(Debug, Deserialize)]
pub struct PaginatedEnvelope<T> {
    pub message: Option<String>,
    pub data: PaginatedData<T>,
}

#[derive(Debug, Deserialize)]
pub struct PaginatedData<T> {
    pub meta: PageMeta,
    pub docs: Vec<T>,
}

impl<T> PaginatedEnvelope<T> {
    pub fn into_page(self) -> Page<T> {
        Page::from_meta(&self.data.meta, self.data.docs)
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// The logged-in user, when the server includes it.
    pub user: Option<User>,
    pub message: Option<String>,
}

impl LoginOutput {
    pub(crate) fn from_body(body: &Value) -> Self {
        let user = ["/data/user", "/user"]
            .iter()
            .find_map(|pointer| body.pointer(pointer))
            .and_then(|user| serde_json::from_value(user.clone()).ok());

        Self {
            user,
            message: message(body),
        }
    }
}

/// The access token of a login or renewal response.
///
/// Both `{data: {accessToken}}` and a top-level `{accessToken}` are
/// accepted; the nested form wins when both are present and non-empty.
pub fn extract_access_token(body: &Value) -> Option<String> {
    ["/data/accessToken", "/accessToken"]
        .iter()
        .find_map(|pointer| {
            body.pointer(pointer)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
        })
        .map(str::to_string)
}

pub(crate) fn message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::Post;
    use serde_json::json;

    #[test]
    fn access_token_prefers_nested_form() {
        let nested = json!({ "data": { "accessToken": "inner" }, "accessToken": "outer" });
        assert_eq!(extract_access_token(&nested).as_deref(), Some("inner"));

        let flat = json!({ "message": "ok", "accessToken": "flat" });
        assert_eq!(extract_access_token(&flat).as_deref(), Some("flat"));

        assert!(extract_access_token(&json!({ "accessToken": "" })).is_none());

        let empty_nested = json!({ "data": { "accessToken": "" }, "accessToken": "flat" });
        assert_eq!(extract_access_token(&empty_nested).as_deref(), Some("flat"));
        assert!(extract_access_token(&json!({ "message": "ok" })).is_none());
    }

    #[test]
    fn paginated_envelope_becomes_page() {
        let body = json!({
            "message": "Posts fetched",
            "data": {
                "meta": {
                    "total": 3,
                    "page": 1,
                    "limit": 2,
                    "totalPages": 2,
                    "hasNextPage": true,
                    "hasPreviousPage": false
                },
                "docs": [
                    {
                        "id": "p1",
                        "title": "First",
                        "body": "Hello",
                        "likeCount": 2,
                        "images": [],
                        "tags": ["intro"],
                        "creator": { "id": "u1", "name": "Ada" },
                        "createdAt": "2024-03-01T10:00:00.000Z",
                        "updatedAt": "2024-03-01T10:00:00.000Z"
                    }
                ]
            }
        });

        let envelope: PaginatedEnvelope<Post> = serde_json::from_value(body).unwrap();
        let page = envelope.into_page();
        assert_eq!(page.page, 1);
        assert!(page.has_more);
        assert_eq!(page.items[0].id, "p1");
    }

    #[test]
    fn envelope_accepts_status_alias() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({ "status": 200, "message": "Liked" })).unwrap();
        assert_eq!(envelope.status_code, Some(200));
        assert_eq!(envelope.message.as_deref(), Some("Liked"));
        assert!(envelope.data.is_none());
    }
}
