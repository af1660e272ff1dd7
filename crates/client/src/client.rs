//! The `DirectoryClient` facade.

use std::sync::Arc;

use crate::{
    auth::AuthService,
    config::ClientConfig,
    error::Result,
    http::Http,
    notify::Notifier,
    qualities::QualityService,
    session::SessionStore,
    users::UserService,
};

/// High-level client bundling the authenticated pipeline and the typed
/// services over it.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use roster_client::{ClientConfig, DirectoryClient, MemorySessionStore, TracingNotifier};
///
/// let config = ClientConfig::builder()
///     .with_base_url("http://localhost:4000/api/")
///     .build()?;
/// let client = DirectoryClient::new(
///     config,
///     Arc::new(MemorySessionStore::new()),
///     Arc::new(TracingNotifier),
/// )?;
/// let users = client.users().fetch_all().await?;
/// ```
pub struct DirectoryClient {
    http: Arc<Http>,
    users: UserService,
    qualities: QualityService,
    session: Arc<dyn SessionStore>,
}

impl DirectoryClient {
    /// Creates a client with injected session storage and notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let http = Arc::new(Http::new(config, session.clone(), notifier)?);
        Ok(Self {
            users: UserService::new(http.clone()),
            qualities: QualityService::new(http.clone()),
            http,
            session,
        })
    }

    /// Token-issuing auth endpoints.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        self.http.auth()
    }

    /// User entity endpoints.
    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Quality reference endpoints.
    #[must_use]
    pub fn qualities(&self) -> &QualityService {
        &self.qualities
    }

    /// The injected session store.
    #[must_use]
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The underlying authenticated pipeline.
    #[must_use]
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}
