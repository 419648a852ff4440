use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use krus_api::RemoteApi;
use krus_core::model::{
    AuthResponse, LoginCredentials, RegisterCredentials, UpdateProfileInput, User,
};

use crate::error::StoreError;

/// Error from the platform token storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("token storage error: {0}")]
pub struct TokenStoreError(pub String);

/// Pass-through to the platform's secure token storage.
///
/// The session never inspects the token; it only persists and restores it.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<String>, TokenStoreError>> + Send;

    fn save(&self, token: &str) -> impl Future<Output = Result<(), TokenStoreError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), TokenStoreError>> + Send;
}

/// Authentication lifecycle of the app session.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// A persisted token is being restored.
    Loading,
    Unauthenticated,
    Authenticated { user: User, token: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// The owned session object.
///
/// There is no ambient global auth state; whoever needs the session holds
/// a reference to this. Observers subscribe to state transitions through a
/// watch channel and always see a consistent `AuthState`.
pub struct Session<A, T> {
    api: Arc<A>,
    tokens: Arc<T>,
    state: watch::Sender<AuthState>,
}

impl<A: RemoteApi, T: TokenStore> Session<A, T> {
    /// A fresh session starts in `Loading` until [`Session::initialize`]
    /// has restored or discarded the persisted token.
    pub fn new(api: Arc<A>, tokens: Arc<T>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self { api, tokens, state }
    }

    /// Restore the persisted token, if any, and resolve the current user.
    ///
    /// Best-effort: any failure clears the stored token and leaves the
    /// session unauthenticated rather than propagating, so app startup
    /// never wedges on a stale credential.
    pub async fn initialize(&self) -> AuthState {
        let token = match self.tokens.load().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.state.send_replace(AuthState::Unauthenticated);
                return self.current();
            }
            Err(e) => {
                tracing::warn!("failed to load persisted token: {e}");
                self.state.send_replace(AuthState::Unauthenticated);
                return self.current();
            }
        };

        match self.api.current_user(&token).await {
            Ok(user) => {
                tracing::info!("session restored for {}", user.id);
                self.state
                    .send_replace(AuthState::Authenticated { user, token });
            }
            Err(e) => {
                tracing::warn!("persisted token rejected, clearing: {e}");
                if let Err(clear_err) = self.tokens.clear().await {
                    tracing::warn!("failed to clear rejected token: {clear_err}");
                }
                self.state.send_replace(AuthState::Unauthenticated);
            }
        }
        self.current()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let AuthResponse { user, token } = self.api.login(&credentials).await?;
        self.tokens.save(&token).await?;
        self.state.send_replace(AuthState::Authenticated {
            user: user.clone(),
            token,
        });
        Ok(user)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, StoreError> {
        let credentials = RegisterCredentials {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let AuthResponse { user, token } = self.api.register(&credentials).await?;
        self.tokens.save(&token).await?;
        self.state.send_replace(AuthState::Authenticated {
            user: user.clone(),
            token,
        });
        Ok(user)
    }

    /// End the session. The in-memory state is cleared even if the token
    /// store fails; the error is still reported.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let cleared = self.tokens.clear().await;
        self.state.send_replace(AuthState::Unauthenticated);
        cleared.map_err(Into::into)
    }

    /// Update the profile on the authority, then the cached user.
    pub async fn update_profile(&self, input: &UpdateProfileInput) -> Result<User, StoreError> {
        let (_, token) = self.authenticated()?;
        let user = self.api.update_profile(&token, input).await?;
        self.state.send_if_modified(|state| {
            if let AuthState::Authenticated { user: current, .. } = state {
                *current = user.clone();
                true
            } else {
                false
            }
        });
        Ok(user)
    }

    /// Viewer identity and token, for stores that act on the user's behalf.
    pub fn authenticated(&self) -> Result<(User, String), StoreError> {
        match &*self.state.borrow() {
            AuthState::Authenticated { user, token } => Ok((user.clone(), token.clone())),
            _ => Err(StoreError::NotAuthenticated),
        }
    }

    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl<A: RemoteApi, T: TokenStore> Session<A, T> {
    /// A session already in the authenticated state, for store tests.
    pub fn authenticated_for_testing(api: Arc<A>, tokens: Arc<T>, user: User, token: &str) -> Self {
        let (state, _) = watch::channel(AuthState::Authenticated {
            user,
            token: token.to_string(),
        });
        Self { api, tokens, state }
    }
}

/// In-memory token store for tests and local development.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MemoryTokenStore {
    token: std::sync::RwLock<Option<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: std::sync::RwLock::new(Some(token.to_string())),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.token.read().unwrap().clone())
    }

    async fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap() = None;
        Ok(())
    }
}
