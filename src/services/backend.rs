// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contract of the remote backends the client talks to.
//!
//! [`HttpBackend`](super::HttpBackend) is the production implementation;
//! tests substitute scripted fakes.

use crate::error::Result;
use crate::models::profile::{AccountRecord, ActionResponse, ProfileResponse};
use crate::models::progress::ProgressResponse;
use crate::models::{ChatMessage, Platform, PlatformProfile};
use async_trait::async_trait;

/// Account returned by a successful login.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: AccountRecord,
    pub token: Option<String>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /register`. Backend refusals map to `AppError::Auth`.
    async fn register(&self, username: &str, email: &str, password: &str)
        -> Result<AccountRecord>;

    /// `POST /login`. Backend refusals map to `AppError::Auth`.
    async fn login(&self, email: &str, password: &str) -> Result<SignedIn>;

    /// `GET /profile/:userId`: authoritative link status.
    async fn get_profile(&self, user_id: &str, token: Option<&str>) -> Result<ProfileResponse>;

    /// `GET /api/profile/:platform/:handle`: confirms the handle exists.
    async fn verify_handle(&self, platform: Platform, handle: &str) -> Result<PlatformProfile>;

    /// `POST /link-<platform>`. A rejected link is `Ok` with `success == false`.
    async fn link_account(
        &self,
        platform: Platform,
        user_id: &str,
        handle: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse>;

    /// `PUT /refresh-<platform>/:userId`
    async fn refresh_account(
        &self,
        platform: Platform,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse>;

    /// `DELETE /unlink-<platform>/:userId`
    async fn unlink_account(
        &self,
        platform: Platform,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse>;

    /// `POST /generate/hints`: returns the raw generated hint text.
    async fn generate_hints(&self, problem_url: &str) -> Result<String>;

    /// `POST /chat`: returns the assistant reply.
    async fn chat(&self, message: &str, context: &[ChatMessage]) -> Result<String>;

    /// `GET /progress`
    async fn progress(&self, username: &str, platform: Platform) -> Result<ProgressResponse>;
}
