//! Account service.
//!
//! Logs users in against the backend and keeps the resulting session.

use secrecy::SecretString;
use tracing::{error, info, instrument, warn};

use super::{LOGIN_FAILED, REGISTER_FAILED, settle};
use crate::api::{ApiClient, ApiResponse, LoginResponse, RegisterRequest};
use crate::session::{SessionStore, UserSession};
use crate::storage::{KeyValueStorage, StorageError};

/// Login, registration and logout.
pub struct AccountService<'a, S> {
    api: &'a ApiClient,
    sessions: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStorage> AccountService<'a, S> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, sessions: &'a SessionStore<S>) -> Self {
        Self { api, sessions }
    }

    /// Log in and persist the session on success.
    ///
    /// The returned response carries the backend's message on rejection and
    /// [`LOGIN_FAILED`] when the backend cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "login request failed");
                return ApiResponse::failure(LOGIN_FAILED);
            }
        };

        let (mut user, token) = match response {
            LoginResponse {
                success: true,
                user: Some(user),
                token,
                ..
            } => (user, token),
            LoginResponse { message, .. } => {
                return ApiResponse::failure(
                    message.unwrap_or_else(|| "Invalid credentials".to_string()),
                );
            }
        };

        if let Some(token) = token {
            user.token = Some(SecretString::from(token));
        }

        if let Err(e) = self.sessions.save(&user) {
            error!(error = %e, "failed to persist session");
            return ApiResponse::failure(format!("Could not save session: {e}"));
        }

        info!(user = %user.email, "logged in");
        ApiResponse::ok(format!("Welcome back, {}!", user.name))
    }

    /// Register a new account. Does not log in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> ApiResponse {
        let mut response = settle(self.api.register(request).await, REGISTER_FAILED);
        if response.success && response.message.is_none() {
            response.message = Some("Registration successful! You can now login.".to_string());
        }
        response
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be removed.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.sessions.logout()?;
        info!("logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserSession> {
        self.sessions.current()
    }
}
