//! Client configuration.

use std::time::Duration;

use murmur_core::feed::DEFAULT_PAGE_LIMIT;
use murmur_core::{ApiUrl, Route};

use crate::endpoints;

/// How a request route is compared against the exempt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteMatch {
    /// The request route must equal an exempt route.
    #[default]
    Exact,
    /// The request route only has to contain an exempt route.
    Substring,
}

/// Routes whose 401 responses are surfaced as-is instead of triggering a
/// credential renewal.
#[derive(Debug, Clone)]
pub struct ExemptRoutes {
    routes: Vec<Route>,
    matching: RouteMatch,
}

impl ExemptRoutes {
    pub fn new(routes: impl IntoIterator<Item = Route>, matching: RouteMatch) -> Self {
        Self {
            routes: routes.into_iter().collect(),
            matching,
        }
    }

    /// Login, registration and renewal, matched exactly.
    pub fn defaults() -> Self {
        Self::new(
            [
                Route::from_static(endpoints::LOGIN),
                Route::from_static(endpoints::REGISTER),
                Route::from_static(endpoints::REFRESH),
            ],
            RouteMatch::Exact,
        )
    }

    pub fn with_matching(mut self, matching: RouteMatch) -> Self {
        self.matching = matching;
        self
    }

    pub fn insert(&mut self, route: Route) {
        if !self.routes.contains(&route) {
            self.routes.push(route);
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn matching(&self) -> RouteMatch {
        self.matching
    }

    /// Returns true if `route` is exempt from renewal.
    pub fn is_exempt(&self, route: &Route) -> bool {
        match self.matching {
            RouteMatch::Exact => self.routes.iter().any(|exempt| exempt == route),
            RouteMatch::Substring => self.routes.iter().any(|exempt| route.contains(exempt)),
        }
    }
}

impl Default for ExemptRoutes {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Settings shared by the transport, dispatcher and session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route is resolved against.
    pub base_url: ApiUrl,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Routes excluded from credential renewal.
    pub exempt: ExemptRoutes,
    /// Whether a 401 on a request sent without any credential starts a
    /// renewal. Off by default: there is nothing to renew.
    pub renew_unauthenticated: bool,
    /// Page size used when none is given.
    pub page_limit: u32,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            user_agent: concat!("murmur/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(30)),
            exempt: ExemptRoutes::defaults(),
            renew_unauthenticated: false,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_exempt_routes(mut self, exempt: ExemptRoutes) -> Self {
        self.exempt = exempt;
        self
    }

    pub fn with_route_matching(mut self, matching: RouteMatch) -> Self {
        self.exempt = self.exempt.with_matching(matching);
        self
    }

    pub fn renew_unauthenticated(mut self, enabled: bool) -> Self {
        self.renew_unauthenticated = enabled;
        self
    }

    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exemptions_match_exactly() {
        let exempt = ExemptRoutes::defaults();
        assert!(exempt.is_exempt(&Route::from_static("/auth/login")));
        assert!(exempt.is_exempt(&Route::from_static("/auth/refresh")));
        assert!(!exempt.is_exempt(&Route::from_static("/auth/logout")));
        assert!(!exempt.is_exempt(&Route::from_static("/v2/auth/login")));
    }

    #[test]
    fn substring_matching_accepts_prefixed_routes() {
        let exempt = ExemptRoutes::defaults().with_matching(RouteMatch::Substring);
        assert!(exempt.is_exempt(&Route::from_static("/v2/auth/login")));
        assert!(exempt.is_exempt(&Route::from_static("/auth/refresh-token")));
        assert!(!exempt.is_exempt(&Route::from_static("/posts")));
    }

    #[test]
    fn insert_ignores_duplicates() {
        let mut exempt = ExemptRoutes::defaults();
        exempt.insert(Route::from_static("/auth/login"));
        exempt.insert(Route::from_static("/auth/forgot-password"));
        assert_eq!(exempt.routes().len(), 4);
    }

    #[test]
    fn page_limit_is_at_least_one() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:3000").unwrap())
            .with_page_limit(0);
        assert_eq!(config.page_limit, 1);
    }
}
