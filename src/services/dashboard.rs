// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard snapshot: rating summaries for each cached handle.

use super::backend::Backend;
use super::sync::SessionSync;
use crate::error::Result;
use crate::models::{Platform, PlatformProfile, Session};
use serde::Serialize;
use std::sync::Arc;

/// State of one platform card on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlatformSlot {
    NotLinked,
    Loaded(PlatformProfile),
    Failed { handle: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub username: String,
    pub email: String,
    pub codeforces: PlatformSlot,
    pub codechef: PlatformSlot,
}

impl DashboardSnapshot {
    pub fn slot(&self, platform: Platform) -> &PlatformSlot {
        match platform {
            Platform::Codeforces => &self.codeforces,
            Platform::Codechef => &self.codechef,
        }
    }

    pub fn has_any_linked(&self) -> bool {
        Platform::ALL
            .iter()
            .any(|p| !matches!(self.slot(*p), PlatformSlot::NotLinked))
    }
}

#[derive(Clone)]
pub struct DashboardService {
    backend: Arc<dyn Backend>,
    sync: SessionSync,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn Backend>, sync: SessionSync) -> Self {
        Self { backend, sync }
    }

    /// Load both platform cards concurrently. A failing card does not fail the snapshot.
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        let session = self.sync.require_session()?;
        let (codeforces, codechef) = tokio::join!(
            self.load_slot(Platform::Codeforces),
            self.load_slot(Platform::Codechef),
        );
        Ok(build_snapshot(session, codeforces?, codechef?))
    }

    /// Ask the backend to re-sync both platforms, then reload the cards.
    pub async fn refresh_and_reload(&self) -> Result<DashboardSnapshot> {
        self.sync.refresh_all().await;
        self.snapshot().await
    }

    async fn load_slot(&self, platform: Platform) -> Result<PlatformSlot> {
        // Same rule as `is_fully_linked`: a handle without its flag is not a link.
        let link = match self.sync.cache().link(platform)? {
            Some(link) if link.linked => link,
            _ => return Ok(PlatformSlot::NotLinked),
        };

        Ok(match self.backend.verify_handle(platform, &link.handle).await {
            Ok(profile) => PlatformSlot::Loaded(profile),
            Err(e) => {
                tracing::warn!(%platform, handle = %link.handle, error = %e, "Profile fetch failed");
                PlatformSlot::Failed {
                    handle: link.handle,
                    error: e.user_message(),
                }
            }
        })
    }
}

fn build_snapshot(session: Session, codeforces: PlatformSlot, codechef: PlatformSlot) -> DashboardSnapshot {
    DashboardSnapshot {
        username: session.username,
        email: session.email,
        codeforces,
        codechef,
    }
}
