// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod hint;
pub mod note;
pub mod profile;
pub mod progress;
pub mod session;

pub use hint::{parse_hints, ChatMessage, ChatRole, Hint, HintSession, ParsedHints};
pub use note::Note;
pub use profile::{PlatformProfile, ProfileResponse, RemoteUser};
pub use progress::{ProgressPoint, ProgressSeries};
pub use session::{
    LinkOutcome, Platform, PlatformLink, Session, SessionState, SyncEvent,
};
