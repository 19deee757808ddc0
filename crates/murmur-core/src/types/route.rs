//! API route type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated API route path, relative to the API base URL.
///
/// Routes always start with `/` and never carry a query string; query
/// parameters travel separately on the request.
///
/// # Example
///
/// ```
/// use murmur_core::Route;
///
/// let posts = Route::new("/posts").unwrap();
/// let single = posts.join("65f1c0ffee").unwrap();
/// assert_eq!(single.as_str(), "/posts/65f1c0ffee");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

impl Route {
    /// Create a new route from a path, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or contains a query,
    /// fragment or whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Create a route from a literal path.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route; meant for compile-time literals
    /// such as the endpoint table.
    pub fn from_static(path: &'static str) -> Self {
        match Self::validate(path) {
            Ok(()) => Self(path.to_string()),
            Err(e) => panic!("invalid static route: {}", e),
        }
    }

    /// Returns the route path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a single path segment, e.g. a resource id.
    pub fn join(&self, segment: &str) -> Result<Self, Error> {
        if segment.is_empty() {
            return Err(InvalidInputError::Route {
                value: segment.to_string(),
                reason: "path segment cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(c) = segment
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_' && *c != '.')
        {
            return Err(InvalidInputError::Route {
                value: segment.to_string(),
                reason: format!("path segment contains invalid character '{}'", c),
            }
            .into());
        }

        if segment.chars().all(|c| c == '.') {
            return Err(InvalidInputError::Route {
                value: segment.to_string(),
                reason: "path segment cannot be only dots".to_string(),
            }
            .into());
        }

        Ok(Self(format!("{}/{}", self.0.trim_end_matches('/'), segment)))
    }

    /// Returns true if `other` occurs anywhere in this route.
    pub fn contains(&self, other: &Route) -> bool {
        self.0.contains(other.as_str())
    }

    fn validate(s: &str) -> Result<(), Error> {
        if !s.starts_with('/') {
            return Err(InvalidInputError::Route {
                value: s.to_string(),
                reason: "must start with '/'".to_string(),
            }
            .into());
        }

        for c in s.chars() {
            if c == '?' || c == '#' || c.is_whitespace() {
                return Err(InvalidInputError::Route {
                    value: s.to_string(),
                    reason: format!("contains invalid character '{}'", c),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Route {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_routes() {
        assert!(Route::new("/").is_ok());
        assert!(Route::new("/auth/login").is_ok());
        assert!(Route::new("/users/my-profile").is_ok());
    }

    #[test]
    fn invalid_routes() {
        assert!(Route::new("auth/login").is_err());
        assert!(Route::new("/posts?page=1").is_err());
        assert!(Route::new("/posts#top").is_err());
        assert!(Route::new("/my posts").is_err());
    }

    #[test]
    fn join_builds_nested_routes() {
        let feed = Route::new("/feed").unwrap();
        let like = feed.join("abc123").unwrap().join("like").unwrap();
        assert_eq!(like.as_str(), "/feed/abc123/like");
    }

    #[test]
    fn join_rejects_traversal_characters() {
        let posts = Route::new("/posts").unwrap();
        assert!(posts.join("").is_err());
        assert!(posts.join("a/b").is_err());
        assert!(posts.join("a?b=c").is_err());
        assert!(posts.join(".").is_err());
        assert!(posts.join("..").is_err());
        assert!(posts.join("...").is_err());
        assert_eq!(posts.join("v1.2").unwrap().as_str(), "/posts/v1.2");
    }

    #[test]
    fn contains_is_substring_match() {
        let refresh = Route::new("/auth/refresh").unwrap();
        let prefixed = Route::new("/api/auth/refresh").unwrap();
        assert!(prefixed.contains(&refresh));
        assert!(!refresh.contains(&prefixed));
    }
}
