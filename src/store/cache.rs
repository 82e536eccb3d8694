//! Typed view of session identity and platform links over a [`KeyValueStore`].

use super::{keys, KeyValueStore, StoreError};
use crate::models::{Platform, PlatformLink, Session};
use std::sync::Arc;

const LINKED: &str = "true";

fn link_keys(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::Codeforces => (keys::CODEFORCES_HANDLE, keys::CODEFORCES_LINKED),
        Platform::Codechef => (keys::CODECHEF_HANDLE, keys::CODECHEF_LINKED),
    }
}

/// Session and link cache. Cheap to clone; all clones share one store.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // ─── Session ─────────────────────────────────────────────────

    /// The stored session, if a non-empty user id is present.
    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        let user_id = match self.store.get(keys::USER_ID)? {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Ok(None),
        };

        Ok(Some(Session {
            user_id,
            username: self
                .store
                .get(keys::USERNAME)?
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| "User".to_string()),
            email: self.store.get(keys::EMAIL)?.unwrap_or_default(),
            auth_token: self.store.get(keys::TOKEN)?.filter(|t| !t.is_empty()),
        }))
    }

    /// Write every session key in one store call.
    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut entries = vec![
            (keys::USER_ID, session.user_id.as_str()),
            (keys::USERNAME, session.username.as_str()),
            (keys::EMAIL, session.email.as_str()),
        ];
        let remove: &[&str] = match &session.auth_token {
            Some(token) => {
                entries.push((keys::TOKEN, token.as_str()));
                &[]
            }
            None => &[keys::TOKEN],
        };
        self.store.write_many(&entries, remove)
    }

    // ─── Platform links ──────────────────────────────────────────

    /// Cached link for `platform`; linked only if the flag is set and a
    /// handle is present.
    pub fn link(&self, platform: Platform) -> Result<Option<PlatformLink>, StoreError> {
        let (handle_key, linked_key) = link_keys(platform);
        let handle = match self.store.get(handle_key)? {
            Some(h) if !h.trim().is_empty() => h,
            _ => return Ok(None),
        };
        let linked = self.store.get(linked_key)?.as_deref() == Some(LINKED);

        Ok(Some(PlatformLink {
            platform,
            handle,
            linked,
        }))
    }

    pub fn is_linked(&self, platform: Platform) -> Result<bool, StoreError> {
        Ok(self.link(platform)?.is_some_and(|l| l.linked))
    }

    /// Both platforms linked. Always recomputed from the stored entries.
    pub fn is_fully_linked(&self) -> Result<bool, StoreError> {
        for platform in Platform::ALL {
            if !self.is_linked(platform)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn save_link(&self, platform: Platform, handle: &str) -> Result<(), StoreError> {
        let (handle_key, linked_key) = link_keys(platform);
        self.store.set_many(&[(handle_key, handle), (linked_key, LINKED)])
    }

    pub fn remove_link(&self, platform: Platform) -> Result<(), StoreError> {
        let (handle_key, linked_key) = link_keys(platform);
        self.store.remove_many(&[handle_key, linked_key])
    }

    pub fn clear_links(&self) -> Result<(), StoreError> {
        self.store.remove_many(&keys::LINKS)
    }

    /// Remove session identity, every platform link, and local notes in a
    /// single store call.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut all: Vec<&str> = Vec::with_capacity(keys::SESSION.len() + keys::LINKS.len() + 1);
        all.extend_from_slice(&keys::SESSION);
        all.extend_from_slice(&keys::LINKS);
        all.push(keys::NOTES);
        self.store.remove_many(&all)
    }
}
