//! Authenticated request dispatch.
//!
//! Every request passes through two hooks. Before sending, the current
//! credential from the store is attached. After receiving, a 401 on a
//! non-exempt route that has not been retried yet triggers a renewal through
//! the [`RefreshCoordinator`] and one re-send with the renewed credential.
//! Everything else passes through unchanged.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use murmur_core::error::{AuthError, ProtocolError, TransportError};
use murmur_core::{AccessToken, CredentialStore, Result, Route};

use crate::config::{ClientConfig, ExemptRoutes};
use crate::refresh::RefreshCoordinator;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// One request on its way through the dispatcher.
///
/// The retry counter only ever goes from 0 to 1, so a request is re-sent at
/// most once.
#[derive(Debug)]
pub struct RequestAttempt {
    request: ApiRequest,
    credential: Option<AccessToken>,
    retries: u8,
}

impl RequestAttempt {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            credential: None,
            retries: 0,
        }
    }

    /// The request as the caller built it, without a credential.
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// The credential attached on the most recent send.
    pub fn credential(&self) -> Option<&AccessToken> {
        self.credential.as_ref()
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub fn can_retry(&self) -> bool {
        self.retries == 0
    }

    fn mark_retried(&mut self) {
        self.retries = 1;
    }

    /// The request to put on the wire with `credential` attached.
    fn prepare(&mut self, credential: Option<AccessToken>) -> Result<ApiRequest> {
        let outgoing = self.request.with_credential(credential.as_ref())?;
        self.credential = credential;
        Ok(outgoing)
    }
}

/// Sends requests with credential attachment and transparent renewal.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    exempt: ExemptRoutes,
    renew_unauthenticated: bool,
}

impl Dispatcher {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
            exempt: config.exempt.clone(),
            renew_unauthenticated: config.renew_unauthenticated,
        }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn exempt_routes(&self) -> &ExemptRoutes {
        &self.exempt
    }

    /// Send a request and return the raw response.
    ///
    /// Non-success statuses are returned as responses, not errors, except
    /// when a renewal was needed and failed. A 401 from the single retry is
    /// returned as-is.
    #[instrument(skip_all, fields(method = %request.method(), route = %request.route()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = RequestAttempt::new(request);
        let outgoing = attempt.prepare(self.store.get())?;
        let received = self.transport.send(&outgoing).await;
        self.after_receive(attempt, received).await
    }

    async fn after_receive(
        &self,
        mut attempt: RequestAttempt,
        received: std::result::Result<ApiResponse, TransportError>,
    ) -> Result<ApiResponse> {
        let response = received?;
        if !self.should_renew(&attempt, &response) {
            return Ok(response);
        }

        attempt.mark_retried();
        debug!("Credential rejected; renewing before retry");

        // Renewal and re-send run together in their own task, so the request
        // still reaches the server if this caller is dropped mid-flight.
        let dispatcher = self.clone();
        let retry = tokio::spawn(async move { dispatcher.renew_and_resend(attempt).await });

        match retry.await {
            Ok(outcome) => outcome,
            Err(join) => Err(TransportError::Http {
                message: format!("retry task failed: {}", join),
            }
            .into()),
        }
    }

    async fn renew_and_resend(&self, mut attempt: RequestAttempt) -> Result<ApiResponse> {
        let renewed = self.coordinator.renew(attempt.credential()).await?;
        let outgoing = attempt.prepare(Some(renewed))?;
        let response = self.transport.send(&outgoing).await?;
        debug!(status = response.status(), "Retried with renewed credential");
        Ok(response)
    }

    fn should_renew(&self, attempt: &RequestAttempt, response: &ApiResponse) -> bool {
        response.is_unauthorized()
            && attempt.can_retry()
            && !self.exempt.is_exempt(attempt.request().route())
            && (attempt.credential().is_some() || self.renew_unauthenticated)
    }

    /// Send a request and decode a successful JSON body.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let route = request.route().clone();
        let response = self.send(request).await?;
        self.check(&route, response)?.json()
    }

    /// Send a request whose successful body is irrelevant.
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<()> {
        let route = request.route().clone();
        let response = self.send(request).await?;
        self.check(&route, response).map(|_| ())
    }

    /// Turn a non-success response into the matching error.
    fn check(&self, route: &Route, response: ApiResponse) -> Result<ApiResponse> {
        if response.is_success() {
            return Ok(response);
        }

        if response.is_unauthorized() {
            if self.exempt.is_exempt(route) {
                return Err(AuthError::Rejected {
                    route: route.to_string(),
                    message: response.message(),
                }
                .into());
            }
            return Err(AuthError::CredentialExpired.into());
        }

        Err(ProtocolError::new(response.status(), response.message()).into())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("exempt", &self.exempt)
            .field("renew_unauthenticated", &self.renew_unauthenticated)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
