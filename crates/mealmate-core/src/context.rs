//! The process-wide set of components, built once in a fixed order:
//! token store, gateway, session manager, notification center, plan store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use mealmate_api::models::User;
use mealmate_api::{GatewayConfig, GatewayError, HttpGateway, RemoteService, TokenStore};

use crate::notify::NotificationCenter;
use crate::session::{SessionManager, SessionState};
use crate::store::PlanStore;

#[derive(Clone)]
pub struct AppContext {
    pub tokens: TokenStore,
    pub remote: Arc<dyn RemoteService>,
    pub session: SessionManager,
    pub notifications: NotificationCenter,
    pub store: PlanStore,
}

impl AppContext {
    /// Wire everything up against the HTTP gateway.
    pub fn new(
        config: GatewayConfig,
        tokens: TokenStore,
        notification_ttl: Duration,
    ) -> Result<Self> {
        debug!(base_url = %config.base_url, "building app context");
        let gateway = HttpGateway::new(config, tokens.clone())?;
        Ok(Self::with_remote(Arc::new(gateway), tokens, notification_ttl))
    }

    /// Wire everything up against any remote service implementation.
    pub fn with_remote(
        remote: Arc<dyn RemoteService>,
        tokens: TokenStore,
        notification_ttl: Duration,
    ) -> Self {
        let session = SessionManager::new(remote.clone(), tokens.clone());
        let notifications = NotificationCenter::with_ttl(notification_ttl);
        let store = PlanStore::new(remote.clone(), session.clone(), notifications.clone());
        Self {
            tokens,
            remote,
            session,
            notifications,
            store,
        }
    }

    /// Resolve the session from any persisted token.
    pub async fn start(&self) -> SessionState {
        self.session.restore().await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        self.session.login(email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        self.session.register(email, password).await
    }

    pub fn logout(&self) {
        self.session.logout();
        self.store.clear();
        self.notifications.info("Logged out successfully");
    }

    /// Keep the store in step with the session: a full reload of both
    /// collections on every sign-in, and a clear when the user changes or
    /// signs out.
    ///
    /// Sign-ins are counted rather than compared by user, so logging out and
    /// back in while a reload is running still loads again.
    ///
    /// The watcher stops when the returned handle is dropped.
    pub fn spawn_auto_reload(&self) -> AutoReload {
        let mut updates = self.session.subscribe();
        let session = self.session.clone();
        let store = self.store.clone();

        let task = tokio::spawn(async move {
            let mut current: Option<i64> = None;
            let mut loaded_sign_in = 0;
            loop {
                let (next, sign_in) = {
                    let state = updates.borrow_and_update();
                    (state.user().map(|u| u.id), session.sign_ins())
                };
                if current.is_some() && next != current {
                    store.clear();
                }
                current = next;
                if let Some(user_id) = next {
                    if sign_in != loaded_sign_in {
                        loaded_sign_in = sign_in;
                        info!(user_id, sign_in, "signed in, loading plan and grocery list");
                        let _ = store.reload_all().await;
                    }
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
        });
        AutoReload { task }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("tokens", &self.tokens)
            .field("session", &self.session)
            .field("notifications", &self.notifications)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Handle to the auto-reload watcher. Aborts it on drop.
#[derive(Debug)]
pub struct AutoReload {
    task: JoinHandle<()>,
}

impl Drop for AutoReload {
    fn drop(&mut self) {
        self.task.abort();
    }
}
