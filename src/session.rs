//! Auth-session manager: current user, sign-in URL, sign-in/out, startup restore.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthSession` owns everything mutable about authentication: the user
//! snapshot, the default `Authorization` header and the persisted token.
//! Consumers read it directly or subscribe to snapshots through a `watch`
//! channel.
//!
//! DESIGN
//! ======
//! Every mutation takes `&mut self`, so the callback-code path and the
//! stored-token path of [`AuthSession::restore`] are sequenced rather than
//! racing: a callback code wins and the stored token is never fetched.
//!
//! ERROR HANDLING
//! ==============
//! Failures are returned, logged and leave the session in a consistent state:
//! the status reverts and the header is only kept while a user is present.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::sync::watch;

use crate::api::{bearer, ApiClient, ApiError};
use crate::location::Location;
use crate::oauth::{parse_callback, sign_in_url};
use crate::storage::{StorageError, TokenStore, TOKEN_KEY};
use crate::types::{AuthSnapshot, AuthStatus, User};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What [`AuthSession::restore`] ended up doing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A callback code was found and exchanged.
    SignedIn(User),
    /// A stored token was found and its profile fetched.
    Restored(User),
    /// Nothing to restore; no network call was made.
    Anonymous,
}

impl RestoreOutcome {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) | Self::Restored(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

pub struct AuthSession<A, S> {
    api: A,
    store: S,
    authorization: Option<String>,
    state: watch::Sender<AuthSnapshot>,
}

impl<A: ApiClient, S: TokenStore> AuthSession<A, S> {
    /// Create an anonymous session. The sign-in URL is computed once here.
    #[must_use]
    pub fn new(api: A, store: S, github_client_id: &str) -> Self {
        let snapshot = AuthSnapshot {
            status: AuthStatus::Anonymous,
            user: None,
            sign_in_url: sign_in_url(github_client_id),
        };
        let (state, _) = watch::channel(snapshot);
        Self { api, store, authorization: None, state }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn sign_in_url(&self) -> String {
        self.state.borrow().sign_in_url.clone()
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.state.borrow().status
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// The default `Authorization` header value, e.g. `Bearer <token>`.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Receive a fresh snapshot on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Exchange an OAuth `code` for a token and user.
    ///
    /// On success the token is persisted, then set as the default header, then
    /// the user is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the exchange fails and
    /// [`SessionError::Storage`] if the token cannot be persisted. The previous
    /// user, if any, is kept.
    pub async fn sign_in(&mut self, code: &str) -> Result<User, SessionError> {
        self.set_status(AuthStatus::Authenticating);

        let response = match self.api.authenticate(code).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "oauth code exchange failed");
                self.settle_status();
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.set(TOKEN_KEY, &response.token) {
            tracing::error!(error = %e, "failed to persist session token");
            self.settle_status();
            return Err(e.into());
        }
        self.authorization = Some(bearer(&response.token));
        self.set_user(Some(response.user.clone()));

        tracing::info!(login = %response.user.login, "signed in");
        Ok(response.user)
    }

    /// Clear the user, the persisted token and the default header.
    ///
    /// Signing out while anonymous is a no-op apart from the storage delete.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the persisted token cannot be
    /// removed. In-memory state is cleared regardless.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        let was_signed_in = self.user().is_some();
        self.authorization = None;
        self.set_user(None);
        self.store.remove(TOKEN_KEY)?;
        if was_signed_in {
            tracing::info!("signed out");
        }
        Ok(())
    }

    /// Startup restore: callback code first, then stored token.
    ///
    /// If `location` carries `?code=`, the location is replaced with the
    /// stripped URL and the code is exchanged. Otherwise a stored token is
    /// attached as the default header and the profile is fetched.
    ///
    /// # Errors
    ///
    /// Returns the exchange or profile-fetch error. A profile fetch rejected
    /// with 401/403 also deletes the stored token; a failure to delete it is
    /// logged and the API error is still returned.
    pub async fn restore<L: Location>(&mut self, location: &mut L) -> Result<RestoreOutcome, SessionError> {
        if let Some(callback) = parse_callback(&location.href()) {
            location.replace(&callback.stripped_url);
            tracing::debug!(url = %callback.stripped_url, "oauth callback code detected");
            let user = self.sign_in(&callback.code).await?;
            return Ok(RestoreOutcome::SignedIn(user));
        }

        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(RestoreOutcome::Anonymous);
        };
        let user = self.restore_token(&token).await?;
        Ok(RestoreOutcome::Restored(user))
    }

    async fn restore_token(&mut self, token: &str) -> Result<User, SessionError> {
        let authorization = bearer(token);
        self.authorization = Some(authorization.clone());
        self.set_status(AuthStatus::Authenticating);

        match self.api.profile(&authorization).await {
            Ok(user) => {
                tracing::info!(login = %user.login, "session restored");
                self.set_user(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed");
                self.authorization = None;
                self.set_user(None);
                if e.is_unauthorized() {
                    if let Err(remove_err) = self.store.remove(TOKEN_KEY) {
                        tracing::error!(error = %remove_err, "failed to remove rejected session token");
                    }
                }
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // STATE HELPERS
    // =========================================================================

    fn set_status(&self, status: AuthStatus) {
        self.state.send_if_modified(|snap| {
            if snap.status == status {
                return false;
            }
            snap.status = status;
            true
        });
    }

    /// Status implied by whether a user is present.
    fn settle_status(&self) {
        let status = if self.user().is_some() { AuthStatus::Authenticated } else { AuthStatus::Anonymous };
        self.set_status(status);
    }

    fn set_user(&self, user: Option<User>) {
        self.state.send_if_modified(|snap| {
            let status = if user.is_some() { AuthStatus::Authenticated } else { AuthStatus::Anonymous };
            if snap.user == user && snap.status == status {
                return false;
            }
            snap.user = user;
            snap.status = status;
            true
        });
    }
}
