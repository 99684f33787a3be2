//! Read-only view of the stored user list and login session.
//!
//! Account management lives elsewhere; the settings surface only needs to
//! know who is logged in to label the profile section.

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const USERS_KEY: &str = "maxnote_users";
pub const SESSION_KEY: &str = "maxnote_session";

/// A stored account. Credential material in the record is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub login_at: Option<String>,
}

/// The logged-in user, or `None` when nobody is logged in or the stored
/// records cannot be read.
pub fn current_user<S: KeyValueStore>(store: &S) -> Option<StoredUser> {
    let session: Session = read_json(store, SESSION_KEY)?;
    let users: Vec<StoredUser> = read_json(store, USERS_KEY)?;
    let user = users.into_iter().find(|user| user.id == session.user_id);
    if user.is_none() {
        tracing::warn!("Session refers to unknown user {}", session.user_id);
    }
    user
}

fn read_json<S: KeyValueStore, T: serde::de::DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(error) => {
            tracing::warn!("Failed to read {}: {}", key, error);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!("Ignoring unreadable {}: {}", key, error);
            None
        }
    }
}
