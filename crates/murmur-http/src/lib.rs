//! murmur-http - Authenticated HTTP access to the murmur content API.
//!
//! Requests go through a [`Dispatcher`] that attaches the stored bearer
//! credential and, when a protected request comes back 401, renews the
//! credential once through the [`RefreshCoordinator`] and re-sends the
//! request. Concurrent failures share a single renewal call.
//!
//! [`Session`] layers the typed endpoints (login, profile, posts, feed) on
//! top.

mod config;
mod dispatcher;
pub mod endpoints;
mod posts;
mod refresh;
mod request;
mod session;
mod transport;

pub use config::{ClientConfig, ExemptRoutes, RouteMatch};
pub use dispatcher::{Dispatcher, RequestAttempt};
pub use endpoints::LoginOutput;
pub use posts::{PostListing, PostSource};
pub use refresh::{HttpRenewer, RefreshCoordinator, RenewalOutcome, Renewer};
pub use request::{ApiRequest, ApiResponse};
pub use session::Session;
pub use transport::{HttpTransport, Transport};
