//! Wiring of the pipeline, session store and navigation guard.
//!
//! The three components know each other only through explicit interfaces:
//! the pipeline gets an unauthorized hook rather than an import of the store
//! or router, and the guard reads the store through its public operations.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::router::{Chrome, LOGIN_PATH, NavigationGuard, Navigator};
use crate::session::SessionStore;
use crate::storage::StoragePort;

/// An assembled Mailcove client.
pub struct App {
    pub client: ApiClient,
    pub session: SessionStore,
    pub guard: NavigationGuard,
}

impl App {
    /// Build the pipeline, store and guard over one shared storage port and
    /// register the 401 hook chain: the pipeline clears the persisted keys,
    /// the store drops its in-memory state, and the navigator is sent to the
    /// login view.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn StoragePort>,
        navigator: Arc<dyn Navigator>,
        chrome: Option<Arc<dyn Chrome>>,
    ) -> Self {
        let client = ApiClient::new(config, storage.clone());
        let session = SessionStore::new(client.clone(), storage);
        let guard = NavigationGuard::new(session.clone(), chrome);

        client.set_unauthorized_hook({
            let session = session.clone();
            Box::new(move || {
                session.handle_unauthorized();
                navigator.replace(LOGIN_PATH);
            })
        });

        Self {
            client,
            session,
            guard,
        }
    }

    /// Run the one-time startup restore.
    pub async fn start(&self) {
        self.session.restore().await;
    }
}
