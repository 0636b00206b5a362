//! Logged-in user session.
//!
//! The session is the user record returned by the backend on login plus the
//! bearer token, persisted under the `user` storage key. Its presence (with
//! a token) gates authenticated backend calls. It holds no password.

use farmers_market_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::storage::{KeyValueStorage, StorageError, keys};

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Document-store identifier some backends send instead of `id`.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Bearer token for authenticated backend calls.
    #[serde(default, with = "token_serde", skip_serializing_if = "Option::is_none")]
    pub token: Option<SecretString>,
    /// Any further fields the backend returned for the user.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSession {
    /// The user's identifier, preferring `id` over `_id`.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.id.as_ref().or(self.object_id.as_ref())
    }

    /// Whether this session carries a usable token.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

/// Persisted user session over a [`KeyValueStorage`].
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The stored session, if any. Unreadable sessions count as logged out.
    #[must_use]
    pub fn current(&self) -> Option<UserSession> {
        let raw = match self.storage.get(keys::USER) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| warn!(error = %e, "stored session is malformed"))
            .ok()
    }

    /// Persist `user` as the current session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written.
    pub fn save(&self, user: &UserSession) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.storage.set(keys::USER, &json)
    }

    /// Forget the current session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored session cannot be removed.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::USER)
    }

    /// True only when a session with a non-empty token is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current().is_some_and(|user| user.has_token())
    }

    /// The bearer token of the current session.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.current()
            .filter(UserSession::has_token)
            .and_then(|user| user.token)
    }
}

mod token_serde {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        token: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match token {
            Some(token) => serializer.serialize_some(token.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}
