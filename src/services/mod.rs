// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client logic layer.

pub mod backend;
pub mod dashboard;
pub mod hints;
pub mod http;
pub mod notes;
pub mod progress;
pub mod sync;

pub use backend::{Backend, SignedIn};
pub use dashboard::{DashboardService, DashboardSnapshot, PlatformSlot};
pub use hints::HintService;
pub use http::HttpBackend;
pub use notes::NoteBook;
pub use progress::ProgressService;
pub use sync::SessionSync;
