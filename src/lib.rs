// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! cpdash: client for a competitive-programming learning dashboard
//!
//! This crate signs users in, links their Codeforces and CodeChef handles,
//! and keeps the locally cached session and link state in step with the
//! account backend. It also fetches dashboard ratings, hints and progress,
//! and keeps personal study notes.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use config::Config;
use services::{
    Backend, DashboardService, HintService, HttpBackend, NoteBook, ProgressService, SessionSync,
};
use std::sync::Arc;
use store::{FileStore, KeyValueStore, SessionCache};

/// Shared client state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sync: SessionSync,
    pub dashboard: DashboardService,
    pub hints: HintService,
    pub progress: ProgressService,
    pub notes: NoteBook,
}

impl AppState {
    /// Wire every service to one backend and one store.
    pub fn new(config: Config, backend: Arc<dyn Backend>, store: Arc<dyn KeyValueStore>) -> Self {
        let sync = SessionSync::new(backend.clone(), SessionCache::new(store.clone()));
        Self {
            dashboard: DashboardService::new(backend.clone(), sync.clone()),
            hints: HintService::new(backend.clone()),
            progress: ProgressService::new(backend, sync.clone()),
            notes: NoteBook::new(store),
            sync,
            config,
        }
    }

    /// Production wiring: HTTP backends and the on-disk store from `config`.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config)?);
        let store = Arc::new(FileStore::open(&config.store_path)?);
        Ok(Self::new(config, backend, store))
    }
}
