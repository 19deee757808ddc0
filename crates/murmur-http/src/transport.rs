//! HTTP transport.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, instrument, trace};

use murmur_core::error::TransportError;
use murmur_core::{ApiUrl, Result, Route};

use crate::config::ClientConfig;
use crate::request::{ApiRequest, ApiResponse};

/// Sends one request and returns whatever the server answered.
///
/// A transport reports every received response as `Ok`, whatever its
/// status; only failures to get a response at all are errors. Status
/// handling belongs to the dispatcher.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn map_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

/// [`Transport`] over reqwest with a cookie jar.
///
/// The renewal endpoint authenticates with an HTTP-only refresh cookie set
/// at login; the jar keeps it for the lifetime of the client and can be
/// exported for persistence between processes.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
    cookies: Arc<Jar>,
}

impl HttpTransport {
    /// Build a transport for the configured base URL.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let cookies = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(map_reqwest)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cookies,
        })
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// The `Cookie` header the jar would send to `route`, if any.
    pub fn cookie_header(&self, route: &Route) -> Option<String> {
        let url = reqwest::Url::parse(&self.base_url.endpoint_url(route)).ok()?;
        let header = self.cookies.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Seed the jar from a header previously returned by
    /// [`cookie_header`](Self::cookie_header) for the same route.
    pub fn restore_cookies(&self, header: &str, route: &Route) {
        let Ok(url) = reqwest::Url::parse(&self.base_url.endpoint_url(route)) else {
            return;
        };

        for cookie in header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.cookies.add_cookie_str(cookie, &url);
        }
        debug!(%route, "Restored cookies");
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = %request.method(), route = %request.route()))]
    async fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.base_url.endpoint_url(request.route());
        trace!(query = ?request.query_params(), "sending request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest)?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
