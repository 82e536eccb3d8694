// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key-value persistence for session and link state.
//!
//! Everything the client remembers between runs goes through a single
//! injected [`KeyValueStore`], so tests can swap in [`MemoryStore`].

pub mod cache;
pub mod file;
pub mod memory;

pub use cache::SessionCache;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Flat string-keyed store with an atomic multi-key removal.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every listed key as one logical action: either all are gone
    /// afterwards or none were removed.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Set `entries` and remove `remove` as one logical action, with the
    /// same all-or-nothing guarantee as [`remove_many`](Self::remove_many).
    fn write_many(&self, entries: &[(&str, &str)], remove: &[&str]) -> Result<(), StoreError>;

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        self.write_many(entries, &[])
    }

    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Storage key names as constants.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_ID: &str = "userId";
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const CODEFORCES_HANDLE: &str = "codeforces_handle";
    pub const CODEFORCES_LINKED: &str = "codeforces_linked";
    pub const CODECHEF_HANDLE: &str = "codechef_handle";
    pub const CODECHEF_LINKED: &str = "codechef_linked";
    /// JSON array of notes
    pub const NOTES: &str = "notes";

    pub const SESSION: [&str; 4] = [TOKEN, USER_ID, USERNAME, EMAIL];
    pub const LINKS: [&str; 4] = [
        CODEFORCES_HANDLE,
        CODEFORCES_LINKED,
        CODECHEF_HANDLE,
        CODECHEF_LINKED,
    ];
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store file: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    Poisoned,
}
