//! Session identity and platform link models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported competitive-programming platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Codeforces,
    Codechef,
}

impl Platform {
    /// Both platforms, in display order.
    pub const ALL: [Platform; 2] = [Platform::Codeforces, Platform::Codechef];

    /// Lowercase identifier used in URLs and storage keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::Codechef => "codechef",
        }
    }

    /// The platform that must also be linked for the account to be fully linked.
    pub fn other(self) -> Platform {
        match self {
            Platform::Codeforces => Platform::Codechef,
            Platform::Codechef => Platform::Codeforces,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Codeforces => "Codeforces",
            Platform::Codechef => "CodeChef",
        })
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codeforces" | "cf" => Ok(Platform::Codeforces),
            "codechef" | "cc" => Ok(Platform::Codechef),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Signed-in user identity, persisted as scalar string entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Bearer token, when the auth backend issues one
    pub auth_token: Option<String>,
}

/// Cached link state for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLink {
    pub platform: Platform,
    pub handle: String,
    pub linked: bool,
}

/// Result of reconciling local state with the remote profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No stored identity; the caller must send the user to login.
    Unauthenticated,
    Authenticated { session: Session, fully_linked: bool },
}

impl SessionState {
    pub fn is_fully_linked(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated {
                fully_linked: true,
                ..
            }
        )
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Authenticated { session, .. } => Some(session),
        }
    }
}

/// Outcome of a successful link action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub link: PlatformLink,
    /// Set exactly once: when this link completed the pair.
    pub became_fully_linked: bool,
}

/// Notifications broadcast by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Both platforms are now linked (one-shot transition).
    FullyLinked,
    /// A platform link was removed by an unlink action.
    Unlinked(Platform),
    /// Session identity and all links were cleared.
    SessionCleared,
}
