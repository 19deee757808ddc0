//! Single-flight credential renewal.
//!
//! However many requests fail with an expired credential at the same time,
//! exactly one renewal call is made; every caller that asked while it was
//! running receives a copy of the same outcome. The renewal runs in its own
//! task, so it completes and updates the credential store even if every
//! caller that was waiting on it has been dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use murmur_core::error::RenewalFailure;
use murmur_core::{AccessToken, CredentialStore, Result, Route};

use crate::endpoints::extract_access_token;
use crate::request::ApiRequest;
use crate::transport::Transport;

/// What every waiter on one renewal receives.
pub type RenewalOutcome = std::result::Result<AccessToken, RenewalFailure>;

/// Performs the actual renewal call.
#[async_trait]
pub trait Renewer: Send + Sync + 'static {
    /// Obtain a fresh credential. `current` is the credential that was
    /// rejected, if any.
    async fn renew(&self, current: Option<AccessToken>) -> RenewalOutcome;
}

/// Renews by calling the refresh endpoint through a [`Transport`].
///
/// The endpoint authenticates with the refresh cookie carried by the
/// transport; the rejected credential is attached as well.
pub struct HttpRenewer {
    transport: Arc<dyn Transport>,
    route: Route,
}

impl HttpRenewer {
    pub fn new(transport: Arc<dyn Transport>, route: Route) -> Self {
        Self { transport, route }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }
}

#[async_trait]
impl Renewer for HttpRenewer {
    #[instrument(skip_all, fields(route = %self.route))]
    async fn renew(&self, current: Option<AccessToken>) -> RenewalOutcome {
        let request = ApiRequest::get(self.route.clone())
            .with_credential(current.as_ref())
            .map_err(|e| RenewalFailure::Transport {
                message: e.to_string(),
            })?;

        let response =
            self.transport
                .send(&request)
                .await
                .map_err(|e| RenewalFailure::Transport {
                    message: e.to_string(),
                })?;

        if !response.is_success() {
            return Err(RenewalFailure::Rejected {
                status: response.status(),
                message: response.message(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|_| RenewalFailure::MissingCredential)?;

        extract_access_token(&body)
            .map(AccessToken::new)
            .ok_or(RenewalFailure::MissingCredential)
    }
}

enum RefreshState {
    Idle { last: Option<Settled> },
    InFlight {
        from: Option<AccessToken>,
        waiters: Vec<PendingWaiter>,
    },
}

/// The most recent renewal and the credential it replaced.
struct Settled {
    from: Option<AccessToken>,
    outcome: RenewalOutcome,
}

impl Settled {
    /// A successful outcome only stands while the store still holds the
    /// credential it produced; after a logout it must not be handed out.
    fn still_current(&self, current: Option<&AccessToken>) -> bool {
        match &self.outcome {
            Ok(token) => current == Some(token),
            Err(_) => true,
        }
    }
}

struct PendingWaiter(oneshot::Sender<RenewalOutcome>);

impl PendingWaiter {
    fn new() -> (Self, oneshot::Receiver<RenewalOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    fn resolve(self, outcome: &RenewalOutcome) {
        // The receiver is gone if the caller was cancelled; nothing to do.
        let _ = self.0.send(outcome.clone());
    }
}

enum Joined {
    Ready(RenewalOutcome),
    Waiting(oneshot::Receiver<RenewalOutcome>),
}

/// Serializes credential renewals.
///
/// The state lock is only ever held for short, synchronous sections and
/// never across an await.
pub struct RefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    renewer: Arc<dyn Renewer>,
    state: Mutex<RefreshState>,
    renewals: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn CredentialStore>, renewer: Arc<dyn Renewer>) -> Arc<Self> {
        Arc::new(Self {
            store,
            renewer,
            state: Mutex::new(RefreshState::Idle { last: None }),
            renewals: AtomicU64::new(0),
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Returns true while a renewal call is outstanding.
    pub fn is_renewing(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::InFlight { .. })
    }

    /// Forget the last settled renewal. Called when the session ends so a
    /// late request cannot pick up a credential from before the logout.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        if let RefreshState::Idle { last } = &mut *state {
            *last = None;
        }
    }

    /// Number of renewal calls started so far.
    pub fn renewal_count(&self) -> u64 {
        self.renewals.load(Ordering::Relaxed)
    }

    /// Obtain a credential newer than `stale`.
    ///
    /// Joins the renewal in flight if there is one, otherwise starts one.
    /// When the store already holds a credential other than `stale`,
    /// another caller has renewed in the meantime and that credential is
    /// returned without a call. Likewise a renewal that already settled
    /// from the same `stale` credential is not repeated; its outcome is
    /// returned again.
    ///
    /// On success the store holds the new credential before any caller is
    /// resumed; on failure the store has been cleared.
    #[instrument(skip_all, fields(stale = stale.is_some()))]
    pub async fn renew(self: &Arc<Self>, stale: Option<&AccessToken>) -> Result<AccessToken> {
        let receiver = match self.join_or_start(stale) {
            Joined::Ready(outcome) => return outcome.map_err(Into::into),
            Joined::Waiting(receiver) => receiver,
        };

        match receiver.await {
            Ok(outcome) => outcome.map_err(Into::into),
            Err(_) => Err(RenewalFailure::Abandoned.into()),
        }
    }

    fn join_or_start(self: &Arc<Self>, stale: Option<&AccessToken>) -> Joined {
        let mut state = self.lock_state();

        match &mut *state {
            RefreshState::InFlight { waiters, .. } => {
                let (waiter, receiver) = PendingWaiter::new();
                waiters.push(waiter);
                debug!(waiters = waiters.len(), "Joined renewal in flight");
                Joined::Waiting(receiver)
            }
            RefreshState::Idle { last } => {
                let current = self.store.get();
                if let Some(current) = &current
                    && Some(current) != stale
                {
                    debug!("Credential already renewed");
                    return Joined::Ready(Ok(current.clone()));
                }

                if let Some(settled) = last
                    && stale.is_some()
                    && settled.from.as_ref() == stale
                    && settled.still_current(current.as_ref())
                {
                    debug!("Renewal from this credential already settled");
                    return Joined::Ready(settled.outcome.clone());
                }

                let (waiter, receiver) = PendingWaiter::new();
                *state = RefreshState::InFlight {
                    from: stale.cloned(),
                    waiters: vec![waiter],
                };

                info!("Starting credential renewal");
                let coordinator = Arc::clone(self);
                let from = stale.cloned();
                tokio::spawn(async move { coordinator.run_renewal(from).await });

                Joined::Waiting(receiver)
            }
        }
    }

    async fn run_renewal(self: Arc<Self>, from: Option<AccessToken>) {
        self.renewals.fetch_add(1, Ordering::Relaxed);
        let guard = InFlightGuard {
            coordinator: &self,
            settled: false,
        };

        let outcome = self.renewer.renew(from.clone()).await;
        let waiters = guard.settle(from, &outcome);

        match &outcome {
            Ok(_) => info!(waiters = waiters.len(), "Credential renewed"),
            Err(failure) => {
                warn!(error = %failure, waiters = waiters.len(), "Credential renewal failed; session cleared")
            }
        }

        for waiter in waiters {
            waiter.resolve(&outcome);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the coordinator to idle if the renewal task unwinds or is
/// dropped before settling; waiters then observe
/// [`RenewalFailure::Abandoned`].
struct InFlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl InFlightGuard<'_> {
    /// Update the store and leave the in-flight state, returning the
    /// waiters to resume. Both happen under the state lock so a caller
    /// arriving afterwards already sees the new credential.
    ///
    /// The store write runs under the std lock and on the runtime thread.
    /// A file-backed store blocks on `flock` and a small write here, so
    /// `set` and `clear` must stay short.
    fn settle(mut self, from: Option<AccessToken>, outcome: &RenewalOutcome) -> Vec<PendingWaiter> {
        self.settled = true;
        let mut state = self.coordinator.lock_state();

        match outcome {
            Ok(token) => self.coordinator.store.set(token.clone()),
            Err(_) => self.coordinator.store.clear(),
        }

        let previous = std::mem::replace(
            &mut *state,
            RefreshState::Idle {
                last: Some(Settled {
                    from,
                    outcome: outcome.clone(),
                }),
            },
        );

        match previous {
            RefreshState::InFlight { waiters, .. } => waiters,
            RefreshState::Idle { .. } => Vec::new(),
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("Renewal ended without an outcome");
        let mut state = self.coordinator.lock_state();
        *state = RefreshState::Idle { last: None };
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("renewing", &self.is_renewing())
            .field("renewals", &self.renewal_count())
            .finish()
    }
}
