//! Core API addressing types.
//!
//! These types enforce their invariants at construction time, so a request
//! can never be built against a malformed base URL or route.

mod api_url;
mod route;

pub use api_url::ApiUrl;
pub use route::Route;
