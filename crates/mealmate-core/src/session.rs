//! Authenticated identity lifecycle.
//!
//! ```text
//!            restore: profile ok          login / register ok
//! Unknown ──────────────────────> Authenticated <────────────── Anonymous
//!    │                                  │                          ^
//!    └── restore: no token / failure ───┼──────────────────────────┤
//!                                       └─ logout / session expired┘
//! ```
//!
//! The identity is only ever present while the token store holds a token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{info, warn};

use mealmate_api::models::User;
use mealmate_api::{GatewayError, RemoteService, TokenStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup, before [`SessionManager::restore`] has finished.
    Unknown,
    Authenticated(User),
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Owns the session state and is the only writer of the bearer token besides
/// the gateway's discard on rejection.
#[derive(Clone)]
pub struct SessionManager {
    remote: Arc<dyn RemoteService>,
    tokens: TokenStore,
    state: Arc<watch::Sender<SessionState>>,
    sign_ins: Arc<AtomicU64>,
}

impl SessionManager {
    pub fn new(remote: Arc<dyn RemoteService>, tokens: TokenStore) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            remote,
            tokens,
            state: Arc::new(state),
            sign_ins: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state, demoted to `Anonymous` first if the token has vanished
    /// since the identity was established.
    pub fn state(&self) -> SessionState {
        if self.state.borrow().is_authenticated() && !self.tokens.is_present() {
            info!("token no longer held, session is anonymous");
            self.set(SessionState::Anonymous);
        }
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// How many times the session has become authenticated.
    ///
    /// Bumped in the same update that publishes the new state, so it is
    /// consistent with a state borrowed from [`subscribe`](Self::subscribe)
    /// for as long as that borrow is held.
    pub fn sign_ins(&self) -> u64 {
        self.sign_ins.load(Ordering::SeqCst)
    }

    /// Resolve the startup state from a previously persisted token.
    pub async fn restore(&self) -> SessionState {
        if !self.tokens.is_present() {
            self.set(SessionState::Anonymous);
            return SessionState::Anonymous;
        }

        match self.remote.get_profile().await {
            Ok(user) => {
                info!(user_id = user.id, email = %user.email, "session restored");
                self.set(SessionState::Authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "could not restore session, discarding token");
                self.tokens.clear();
                self.set(SessionState::Anonymous);
            }
        }
        self.state()
    }

    /// Sign in. On failure the state is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let user = self.remote.login(email, password).await?;
        info!(user_id = user.id, email = %user.email, "logged in");
        self.set(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, GatewayError> {
        let created = self.remote.register(email, password).await?;
        info!(user_id = created.id, email = %created.email, "registered");
        self.login(email, password).await
    }

    /// Forget the token and the identity. Never fails.
    pub fn logout(&self) {
        self.tokens.clear();
        self.set(SessionState::Anonymous);
        info!("logged out");
    }

    /// React to the remote service rejecting the token.
    pub fn handle_session_expired(&self) {
        if self.tokens.clear() || self.state.borrow().is_authenticated() {
            warn!("session expired");
        }
        self.set(SessionState::Anonymous);
    }

    /// Route a gateway failure: expiry demotes the session.
    pub fn observe(&self, error: &GatewayError) {
        if *error == GatewayError::SessionExpired {
            self.handle_session_expired();
        }
    }

    fn set(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if next.is_authenticated() {
                self.sign_ins.fetch_add(1, Ordering::SeqCst);
            }
            *current = next;
            true
        });
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
