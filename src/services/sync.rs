// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and link-state synchronizer.
//!
//! Reconciles the local cache with the account backend:
//! - On startup, the remote profile is authoritative for which platforms are
//!   linked. If it cannot be read, the link cache is cleared (fail closed)
//!   but the session itself is kept.
//! - Link actions verify the handle, record the link remotely, then cache it.
//! - Clearing the session always clears every platform link with it.
//!
//! Link, unlink and startup reconciliation for a platform are serialized by
//! a per-platform lock, so a slow response can never overwrite state written
//! by a later action on the same platform.
//!
//! Every cache write made after a remote call is tied to the user it was
//! started for. If that session was cleared or replaced while the call was in
//! flight, the write is dropped, so links never outlive their session.

use super::backend::Backend;
use crate::error::{AppError, Result};
use crate::models::{LinkOutcome, Platform, PlatformLink, RemoteUser, Session, SessionState, SyncEvent};
use crate::store::{SessionCache, StoreError};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use validator::Validate;

const EVENT_CAPACITY: usize = 16;

/// Shared per-platform locks.
pub type LinkLocks = Arc<DashMap<Platform, Arc<Mutex<()>>>>;

#[derive(Debug, Validate)]
struct RegisterInput {
    #[validate(length(min = 1, message = "Username is required"))]
    username: String,
    #[validate(email(message = "Enter a valid email address"))]
    email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    password: String,
}

/// Keeps cached session and link state consistent with the account backend.
#[derive(Clone)]
pub struct SessionSync {
    backend: Arc<dyn Backend>,
    cache: SessionCache,
    link_locks: LinkLocks,
    /// Guards read-modify-check sequences on the cache (never held across I/O).
    transition: Arc<std::sync::Mutex<()>>,
    events: broadcast::Sender<SyncEvent>,
}

impl SessionSync {
    pub fn new(backend: Arc<dyn Backend>, cache: SessionCache) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            cache,
            link_locks: Arc::new(DashMap::new()),
            transition: Arc::new(std::sync::Mutex::new(())),
            events,
        }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Receive link/session transitions from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    fn lock_for(&self, platform: Platform) -> Arc<Mutex<()>> {
        self.link_locks
            .entry(platform)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn transition_guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.transition
            .lock()
            .map_err(|_| AppError::Store(StoreError::Poisoned))
    }

    /// Run `write` under the transition guard, but only while `user_id` still
    /// owns the stored session. Returns `None` if the session is gone or
    /// belongs to someone else.
    fn write_for_owner<T>(
        &self,
        user_id: &str,
        write: impl FnOnce(&SessionCache) -> Result<T>,
    ) -> Result<Option<T>> {
        let _t = self.transition_guard()?;
        match self.cache.session()? {
            Some(current) if current.user_id == user_id => write(&self.cache).map(Some),
            _ => Ok(None),
        }
    }

    /// State as currently cached, for when an in-flight result was discarded.
    fn cached_state(&self) -> SessionState {
        match self.cache.session() {
            Ok(Some(session)) => SessionState::Authenticated {
                session,
                fully_linked: self.is_fully_linked(),
            },
            Ok(None) => SessionState::Unauthenticated,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored session");
                SessionState::Unauthenticated
            }
        }
    }

    fn emit(&self, event: SyncEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    // ─── Session queries ─────────────────────────────────────────────────────

    pub fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.cache.session()?)
    }

    /// The current session, or `Unauthorized` if nobody is signed in.
    pub fn require_session(&self) -> Result<Session> {
        self.current_session()?.ok_or(AppError::Unauthorized)
    }

    /// Both platforms linked according to the local cache.
    ///
    /// Recomputed from the stored entries on every call; unreadable state
    /// counts as not linked.
    pub fn is_fully_linked(&self) -> bool {
        self.cache.is_fully_linked().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read link cache");
            false
        })
    }

    pub fn links(&self) -> Result<Vec<PlatformLink>> {
        let mut links = Vec::new();
        for platform in Platform::ALL {
            if let Some(link) = self.cache.link(platform)? {
                links.push(link);
            }
        }
        Ok(links)
    }

    // ─── Startup reconciliation ──────────────────────────────────────────────

    /// Reconcile the local cache with the remote profile.
    ///
    /// Never fails: every error is logged and resolved to a definite state.
    pub async fn initialize_session(&self) -> SessionState {
        let session = match self.cache.session() {
            Ok(Some(session)) => session,
            Ok(None) => {
                // Links never outlive the session they belong to.
                if let Err(e) = self.cache.clear_links() {
                    tracing::warn!(error = %e, "Failed to clear orphaned links");
                }
                tracing::debug!("No stored session");
                return SessionState::Unauthenticated;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored session");
                return SessionState::Unauthenticated;
            }
        };

        // Fixed order; link actions only ever hold one of these.
        let cf_lock = self.lock_for(Platform::Codeforces);
        let cc_lock = self.lock_for(Platform::Codechef);
        let _cf_guard = cf_lock.lock().await;
        let _cc_guard = cc_lock.lock().await;

        let remote = match self
            .backend
            .get_profile(&session.user_id, session.auth_token.as_deref())
            .await
        {
            Ok(resp) if resp.success => resp.data,
            Ok(_) => {
                tracing::warn!(user_id = %session.user_id, "Profile fetch reported failure");
                None
            }
            Err(e) => {
                tracing::error!(user_id = %session.user_id, error = %e, "Failed fetching user profile");
                None
            }
        };

        let applied = match remote {
            Some(user) => match self.apply_remote_links(&session.user_id, &user) {
                Ok(applied) => applied,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to update link cache");
                    self.fail_closed(&session.user_id)
                }
            },
            None => self.fail_closed(&session.user_id),
        };
        let fully_linked = match applied {
            Some(fully_linked) => fully_linked,
            None => {
                tracing::info!(user_id = %session.user_id, "Session changed during initialization");
                return self.cached_state();
            }
        };

        tracing::info!(user_id = %session.user_id, fully_linked, "Session initialized");
        SessionState::Authenticated {
            session,
            fully_linked,
        }
    }

    fn apply_remote_links(&self, user_id: &str, user: &RemoteUser) -> Result<Option<bool>> {
        self.write_for_owner(user_id, |cache| {
            for platform in Platform::ALL {
                match user.linked_handle(platform) {
                    Some(handle) => cache.save_link(platform, handle)?,
                    None => cache.remove_link(platform)?,
                }
            }
            Ok(cache.is_fully_linked()?)
        })
    }

    /// Forget every cached link for `user_id`; the session is kept.
    /// Returns `None` if `user_id` no longer owns the session.
    fn fail_closed(&self, user_id: &str) -> Option<bool> {
        match self.write_for_owner(user_id, |cache| Ok(cache.clear_links()?)) {
            Ok(Some(())) => Some(false),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear link cache");
                Some(false)
            }
        }
    }

    // ─── Linking ─────────────────────────────────────────────────────────────

    /// Verify `handle` on `platform`, record the link remotely, then cache it.
    ///
    /// The cache is only written after both remote steps succeed, and only
    /// if `user_id` still owns the stored session at that point. Otherwise
    /// the call fails with `Unauthorized` and nothing is cached.
    pub async fn link_platform(
        &self,
        platform: Platform,
        handle: &str,
        user_id: &str,
    ) -> Result<LinkOutcome> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(AppError::Validation("Please enter a username".to_string()));
        }
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation(
                "User ID not found. Please login again.".to_string(),
            ));
        }

        let lock = self.lock_for(platform);
        let _guard = lock.lock().await;

        if let Err(e) = self.backend.verify_handle(platform, handle).await {
            tracing::warn!(%platform, handle, error = %e, "Handle verification failed");
            return Err(AppError::ProfileNotFound {
                platform,
                handle: handle.to_string(),
                reason: e.to_string(),
            });
        }

        let token = self.cache.session()?.and_then(|s| s.auth_token);
        let result = self
            .backend
            .link_account(platform, user_id, handle, token.as_deref())
            .await?;
        if !result.success {
            let message = result.failure_reason("Failed to link account");
            tracing::warn!(%platform, handle, error = %message, "Link rejected");
            return Err(AppError::LinkRejected { platform, message });
        }

        let became_fully_linked = self
            .write_for_owner(user_id, |cache| {
                let before = cache.is_fully_linked()?;
                cache.save_link(platform, handle)?;
                Ok(!before && cache.is_fully_linked()?)
            })?
            .ok_or_else(|| {
                tracing::warn!(%platform, handle, user_id, "Session ended before link was cached");
                AppError::Unauthorized
            })?;

        tracing::info!(%platform, handle, became_fully_linked, "Account linked");
        if became_fully_linked {
            self.emit(SyncEvent::FullyLinked);
        }

        Ok(LinkOutcome {
            link: PlatformLink {
                platform,
                handle: handle.to_string(),
                linked: true,
            },
            became_fully_linked,
        })
    }

    /// Remove the link remotely, then drop it from the cache.
    pub async fn unlink_platform(&self, platform: Platform) -> Result<()> {
        let session = self.require_session()?;

        let lock = self.lock_for(platform);
        let _guard = lock.lock().await;

        let result = self
            .backend
            .unlink_account(platform, &session.user_id, session.auth_token.as_deref())
            .await?;
        if !result.success {
            return Err(AppError::Backend(
                result.failure_reason("Failed to unlink account"),
            ));
        }

        let removed = self.write_for_owner(&session.user_id, |cache| Ok(cache.remove_link(platform)?))?;
        if removed.is_none() {
            tracing::info!(%platform, user_id = %session.user_id, "Session changed during unlink");
            return Ok(());
        }
        tracing::info!(%platform, user_id = %session.user_id, "Account unlinked");
        self.emit(SyncEvent::Unlinked(platform));
        Ok(())
    }

    /// Ask the backend to re-sync its copy of the platform profile.
    pub async fn refresh_platform(&self, platform: Platform) -> Result<()> {
        let session = self.require_session()?;
        let result = self
            .backend
            .refresh_account(platform, &session.user_id, session.auth_token.as_deref())
            .await?;
        if !result.success {
            return Err(AppError::Backend(
                result.failure_reason("Failed to refresh account"),
            ));
        }
        tracing::info!(%platform, "Platform data refreshed");
        Ok(())
    }

    /// Refresh both platforms concurrently; failures are reported per platform.
    pub async fn refresh_all(&self) -> Vec<(Platform, Result<()>)> {
        let (cf, cc) = tokio::join!(
            self.refresh_platform(Platform::Codeforces),
            self.refresh_platform(Platform::Codechef),
        );
        for (platform, result) in [(Platform::Codeforces, &cf), (Platform::Codechef, &cc)] {
            if let Err(e) = result {
                tracing::warn!(%platform, error = %e, "Refresh failed");
            }
        }
        vec![(Platform::Codeforces, cf), (Platform::Codechef, cc)]
    }

    // ─── Account lifecycle ───────────────────────────────────────────────────

    /// Create an account. Does not sign in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let input = RegisterInput {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        input.validate()?;

        let account = self
            .backend
            .register(&input.username, &input.email, &input.password)
            .await?;
        tracing::info!(user_id = %account.id, "Account registered");
        Ok(())
    }

    /// Sign in and persist the new session.
    ///
    /// Links cached for any previous session are dropped; call
    /// [`initialize_session`](Self::initialize_session) afterwards to load
    /// the new user's links.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let signed_in = self.backend.login(email, password).await?;
        let account = signed_in.account;
        let session = Session {
            user_id: account.id,
            username: if account.username.is_empty() {
                "User".to_string()
            } else {
                account.username
            },
            email: if account.email.is_empty() {
                email.to_string()
            } else {
                account.email
            },
            auth_token: signed_in.token,
        };

        {
            let _t = self.transition_guard()?;
            let previous = self.cache.session()?;
            if previous.is_some_and(|p| p.user_id != session.user_id) {
                self.cache.clear_all()?;
            } else {
                self.cache.clear_links()?;
            }
            self.cache.save_session(&session)?;
        }

        tracing::info!(user_id = %session.user_id, "Signed in");
        Ok(session)
    }

    /// Remove session identity and every platform link as one unit.
    pub fn clear_session(&self) -> Result<()> {
        {
            let _t = self.transition_guard()?;
            self.cache.clear_all()?;
        }
        tracing::info!("Session cleared");
        self.emit(SyncEvent::SessionCleared);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.clear_session()
    }
}
