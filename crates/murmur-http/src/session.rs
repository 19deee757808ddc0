//! Typed API session.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use murmur_core::error::InvalidInputError;
use murmur_core::{
    AccessToken, CredentialStore, Credentials, FeedLoader, Page, PageRequest, Post, Registration,
    Result, Route, User,
};

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::endpoints::{self, ApiEnvelope, LoginOutput, PaginatedEnvelope, extract_access_token};
use crate::posts::{PostListing, PostSource};
use crate::refresh::{HttpRenewer, RefreshCoordinator};
use crate::request::ApiRequest;
use crate::transport::{HttpTransport, Transport};

/// A client session against the content API.
///
/// Cloning is cheap; clones share the credential store, the renewal
/// coordinator and the transport, so renewals are single-flight across all
/// of them.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    http: Option<HttpTransport>,
    dispatcher: Dispatcher,
}

impl Session {
    /// Create a session over HTTP.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = HttpTransport::new(&config)?;
        let transport: Arc<dyn Transport> = Arc::new(http.clone());
        Ok(Self::build(config, store, transport, Some(http)))
    }

    /// Create a session over a custom transport.
    ///
    /// Cookie export is unavailable; the transport manages its own.
    pub fn with_transport(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::build(config, store, transport, None)
    }

    fn build(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        http: Option<HttpTransport>,
    ) -> Self {
        let renewer = Arc::new(HttpRenewer::new(
            Arc::clone(&transport),
            Route::from_static(endpoints::REFRESH),
        ));
        let coordinator = RefreshCoordinator::new(Arc::clone(&store), renewer);
        let dispatcher = Dispatcher::new(&config, transport, Arc::clone(&store), coordinator);

        Self {
            inner: Arc::new(SessionInner {
                config,
                store,
                http,
                dispatcher,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Returns true if a credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.is_present()
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Log in and store the issued credential.
    #[instrument(skip_all, fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutput> {
        info!("Logging in");
        let request = ApiRequest::post(Route::from_static(endpoints::LOGIN)).json(credentials)?;
        let body: Value = self.inner.dispatcher.execute(request).await?;

        let token = extract_access_token(&body).ok_or_else(|| InvalidInputError::Body {
            message: "login response carried no access token".to_string(),
        })?;
        self.inner.store.set(AccessToken::new(token));

        debug!("Login successful");
        Ok(LoginOutput::from_body(&body))
    }

    /// Create an account. Does not log in.
    #[instrument(skip_all, fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<Option<String>> {
        info!("Registering account");
        let request =
            ApiRequest::post(Route::from_static(endpoints::REGISTER)).json(registration)?;
        let envelope: ApiEnvelope<Value> = self.inner.dispatcher.execute(request).await?;
        Ok(envelope.message)
    }

    /// End the server-side session, then drop the local credential.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.inner
            .dispatcher
            .execute_empty(ApiRequest::get(Route::from_static(endpoints::LOGOUT)))
            .await?;
        self.forget();
        Ok(())
    }

    /// Drop the local credential without contacting the server.
    pub fn forget(&self) {
        self.inner.store.clear();
        self.inner.dispatcher.coordinator().reset();
    }

    /// Renew the credential now, joining any renewal already running.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let current = self.inner.store.get();
        self.inner
            .dispatcher
            .coordinator()
            .renew(current.as_ref())
            .await
    }

    /// The logged-in user's profile.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let envelope: ApiEnvelope<User> = self
            .inner
            .dispatcher
            .execute(ApiRequest::get(Route::from_static(endpoints::MY_PROFILE)))
            .await?;

        envelope.data.ok_or_else(|| {
            InvalidInputError::Body {
                message: "profile response carried no user".to_string(),
            }
            .into()
        })
    }

    // ------------------------------------------------------------------
    // Posts and feed
    // ------------------------------------------------------------------

    /// Fetch one page of a listing.
    #[instrument(skip(self), fields(page = request.page, limit = request.limit))]
    pub async fn fetch_page(&self, listing: PostListing, request: &PageRequest) -> Result<Page<Post>> {
        let api_request = ApiRequest::get(listing.route()).query_pairs(request.query_pairs());
        let envelope: PaginatedEnvelope<Post> = self.inner.dispatcher.execute(api_request).await?;
        let page = envelope.into_page();
        debug!(items = page.len(), has_more = page.has_more, "Fetched page");
        Ok(page)
    }

    /// One page of all posts.
    pub async fn list_posts(&self, request: &PageRequest) -> Result<Page<Post>> {
        self.fetch_page(PostListing::Posts, request).await
    }

    /// One page of the logged-in user's feed.
    pub async fn feed_page(&self, request: &PageRequest) -> Result<Page<Post>> {
        self.fetch_page(PostListing::Feed, request).await
    }

    /// A single post.
    #[instrument(skip(self))]
    pub async fn get_post(&self, id: &str) -> Result<Post> {
        let route = Route::from_static(endpoints::POSTS).join(id)?;
        let envelope: ApiEnvelope<Post> = self.inner.dispatcher.execute(ApiRequest::get(route)).await?;

        envelope.data.ok_or_else(|| {
            InvalidInputError::Body {
                message: "post response carried no post".to_string(),
            }
            .into()
        })
    }

    /// Delete one of the logged-in user's posts.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> Result<()> {
        info!("Deleting post");
        let route = Route::from_static(endpoints::POSTS).join(id)?;
        self.inner
            .dispatcher
            .execute_empty(ApiRequest::delete(route))
            .await
    }

    /// Like a post, or remove the like if already present. Returns the
    /// server's message.
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, id: &str) -> Result<Option<String>> {
        let route = Route::from_static(endpoints::FEED)
            .join(id)?
            .join(endpoints::LIKE)?;
        let envelope: ApiEnvelope<Value> = self
            .inner
            .dispatcher
            .execute(ApiRequest::patch(route))
            .await?;
        Ok(envelope.message)
    }

    /// A page source over a listing, for use with [`FeedLoader`] or
    /// [`paginate`](murmur_core::feed::paginate).
    pub fn post_source(&self, listing: PostListing) -> PostSource {
        PostSource::new(self.clone(), listing)
    }

    /// A feed loader over a listing, starting from page 1.
    pub fn feed_loader(
        &self,
        listing: PostListing,
        search: Option<String>,
    ) -> FeedLoader<Post, PostSource> {
        let request = PageRequest::first(self.inner.config.page_limit).with_search(search);
        FeedLoader::new(self.post_source(listing), request)
    }

    // ------------------------------------------------------------------
    // Cookies
    // ------------------------------------------------------------------

    /// The refresh cookie, serialized for persistence.
    pub fn cookie_header(&self) -> Option<String> {
        self.inner
            .http
            .as_ref()?
            .cookie_header(&Route::from_static(endpoints::REFRESH))
    }

    /// Restore a refresh cookie saved by [`cookie_header`](Self::cookie_header).
    pub fn restore_cookies(&self, header: &str) {
        if let Some(http) = &self.inner.http {
            http.restore_cookies(header, &Route::from_static(endpoints::REFRESH));
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.inner.config.base_url)
            .field("authenticated", &self.is_authenticated())
            .field("credential", &"[REDACTED]")
            .finish()
    }
}
