// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use cpdash::error::{AppError, Result};
use cpdash::models::profile::{AccountRecord, ActionResponse, ProfileResponse};
use cpdash::models::progress::ProgressResponse;
use cpdash::models::{ChatMessage, Platform, PlatformProfile};
use cpdash::services::{Backend, SessionSync, SignedIn};
use cpdash::store::{MemoryStore, SessionCache};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the fake answers `GET /profile/:userId`.
#[allow(dead_code)]
#[derive(Clone)]
pub enum ProfileReply {
    Ok(ProfileResponse),
    Unsuccessful,
    NetworkDown,
}

/// Scripted in-memory backend that records every call.
pub struct FakeBackend {
    pub profile: Mutex<ProfileReply>,
    /// Handles that exist, per platform
    pub known_handles: Mutex<Vec<(Platform, String)>>,
    pub link_reply: Mutex<ActionResponse>,
    pub action_reply: Mutex<ActionResponse>,
    pub account: Mutex<Option<AccountRecord>>,
    pub hints_text: Mutex<String>,
    pub progress_body: Mutex<Value>,
    /// Artificial latency for `verify_handle`, keyed by handle
    pub verify_delay: Mutex<HashMap<String, Duration>>,
    /// Artificial latency for `get_profile`
    pub profile_delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            profile: Mutex::new(ProfileReply::Ok(profile(None, None))),
            known_handles: Mutex::new(vec![
                (Platform::Codeforces, "tourist".to_string()),
                (Platform::Codechef, "gennady".to_string()),
            ]),
            link_reply: Mutex::new(success()),
            action_reply: Mutex::new(success()),
            account: Mutex::new(None),
            hints_text: Mutex::new(String::new()),
            progress_body: Mutex::new(json!({ "status": "error" })),
            verify_delay: Mutex::new(HashMap::new()),
            profile_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_profile(&self, reply: ProfileReply) {
        *self.profile.lock().unwrap() = reply;
    }

    pub fn reject_links(&self, error: &str) {
        *self.link_reply.lock().unwrap() = ActionResponse {
            success: false,
            error: Some(error.to_string()),
            message: None,
        };
    }

    pub fn delay_verify(&self, handle: &str, delay: Duration) {
        self.verify_delay
            .lock()
            .unwrap()
            .insert(handle.to_string(), delay);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[allow(dead_code)]
pub fn success() -> ActionResponse {
    ActionResponse {
        success: true,
        error: None,
        message: None,
    }
}

/// Successful profile response with the given linked handles.
#[allow(dead_code)]
pub fn profile(codeforces: Option<&str>, codechef: Option<&str>) -> ProfileResponse {
    serde_json::from_value(json!({
        "success": true,
        "data": {
            "accountsLinked": {
                "hasCodeforces": codeforces.is_some(),
                "hasCodechef": codechef.is_some()
            },
            "codeforces": { "handle": codeforces },
            "codechef": { "handle": codechef }
        }
    }))
    .expect("valid profile json")
}

#[async_trait]
impl Backend for FakeBackend {
    async fn register(&self, username: &str, email: &str, _password: &str) -> Result<AccountRecord> {
        self.record(format!("register {}", email));
        Ok(AccountRecord {
            id: "new-user".to_string(),
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    async fn login(&self, email: &str, _password: &str) -> Result<SignedIn> {
        self.record(format!("login {}", email));
        let account = self
            .account
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;
        Ok(SignedIn {
            account,
            token: Some("token-123".to_string()),
        })
    }

    async fn get_profile(&self, user_id: &str, _token: Option<&str>) -> Result<ProfileResponse> {
        self.record(format!("get_profile {}", user_id));
        let delay = *self.profile_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.profile.lock().unwrap().clone();
        match reply {
            ProfileReply::Ok(resp) => Ok(resp),
            ProfileReply::Unsuccessful => Ok(ProfileResponse::default()),
            ProfileReply::NetworkDown => Err(AppError::Network("connection refused".to_string())),
        }
    }

    async fn verify_handle(&self, platform: Platform, handle: &str) -> Result<PlatformProfile> {
        self.record(format!("verify {} {}", platform.as_str(), handle));
        let delay = self.verify_delay.lock().unwrap().get(handle).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let known = self
            .known_handles
            .lock()
            .unwrap()
            .iter()
            .any(|(p, h)| *p == platform && h == handle);
        if !known {
            return Err(AppError::Backend("User not found".to_string()));
        }
        PlatformProfile::from_json(platform, handle, &json!({ "rating": 2000, "max_rating": 2100 }))
            .map_err(AppError::Backend)
    }

    async fn link_account(
        &self,
        platform: Platform,
        user_id: &str,
        handle: &str,
        _token: Option<&str>,
    ) -> Result<ActionResponse> {
        self.record(format!("link {} {} {}", platform.as_str(), user_id, handle));
        Ok(self.link_reply.lock().unwrap().clone())
    }

    async fn refresh_account(
        &self,
        platform: Platform,
        user_id: &str,
        _token: Option<&str>,
    ) -> Result<ActionResponse> {
        self.record(format!("refresh {} {}", platform.as_str(), user_id));
        Ok(self.action_reply.lock().unwrap().clone())
    }

    async fn unlink_account(
        &self,
        platform: Platform,
        user_id: &str,
        _token: Option<&str>,
    ) -> Result<ActionResponse> {
        self.record(format!("unlink {} {}", platform.as_str(), user_id));
        Ok(self.action_reply.lock().unwrap().clone())
    }

    async fn generate_hints(&self, problem_url: &str) -> Result<String> {
        self.record(format!("hints {}", problem_url));
        Ok(self.hints_text.lock().unwrap().clone())
    }

    async fn chat(&self, message: &str, context: &[ChatMessage]) -> Result<String> {
        self.record(format!("chat {}", message));
        Ok(format!("echo: {} ({} prior)", message, context.len()))
    }

    async fn progress(&self, username: &str, platform: Platform) -> Result<ProgressResponse> {
        self.record(format!("progress {} {}", username, platform.as_str()));
        let body = self.progress_body.lock().unwrap().clone();
        serde_json::from_value(body).map_err(|e| AppError::Backend(e.to_string()))
    }
}

/// Build a synchronizer over a fresh in-memory store seeded with `entries`.
#[allow(dead_code)]
pub fn sync_with(
    backend: Arc<FakeBackend>,
    entries: &[(&str, &str)],
) -> (SessionSync, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
    let sync = SessionSync::new(backend, SessionCache::new(store.clone()));
    (sync, store)
}

/// Stored session for user `u1`.
#[allow(dead_code)]
pub const SIGNED_IN: &[(&str, &str)] = &[
    ("userId", "u1"),
    ("username", "alice"),
    ("email", "alice@example.com"),
];

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}
