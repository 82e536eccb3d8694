// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! reqwest client for the account and profile/hint backends.
//!
//! Handles:
//! - Register/login against the auth backend
//! - Profile reads and link/refresh/unlink writes
//! - Handle verification, hint generation, chat and progress

use super::backend::{Backend, SignedIn};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::profile::{
    AccountRecord, ActionResponse, AuthResponse, LinkRequest, LoginRequest, ProfileResponse,
    RegisterRequest,
};
use crate::models::progress::ProgressResponse;
use crate::models::{ChatMessage, Platform, PlatformProfile};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use urlencoding::encode;

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    /// Auth/account backend, e.g. `http://localhost:5000/api/users`
    api_url: String,
    /// Profile and hint backend, e.g. `http://localhost:8001`
    api_base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_base_url: config.api_base_url.clone(),
        })
    }

    fn with_token(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Register and login share a response shape; the failure text lives in `message`.
    async fn auth_response(&self, response: reqwest::Response) -> Result<AuthResponse> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let parsed: Option<AuthResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(resp) if status.is_success() && resp.data.is_some() => Ok(resp),
            Some(resp) => Err(AppError::Auth(
                resp.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Something went wrong.".to_string()),
            )),
            None => Err(AppError::Auth(format!("HTTP {}: {}", status, body))),
        }
    }

    /// Parse a `{success, error}` reply, folding non-2xx statuses into `success == false`.
    async fn action_response(&self, response: reqwest::Response) -> Result<ActionResponse> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ActionResponse>(&body) {
            Ok(mut resp) => {
                if !status.is_success() {
                    resp.success = false;
                }
                Ok(resp)
            }
            Err(_) if !status.is_success() => Ok(ActionResponse {
                success: false,
                error: Some(format!("HTTP {}", status)),
                message: None,
            }),
            Err(e) => Err(AppError::Backend(format!("JSON parse error: {}", e))),
        }
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(AppError::Backend(format!("HTTP {}: {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<AccountRecord> {
        let response = self
            .http
            .post(format!("{}/register", self.api_url))
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;

        let resp = self.auth_response(response).await?;
        resp.data
            .ok_or_else(|| AppError::Auth("Registration response had no account".to_string()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<SignedIn> {
        let response = self
            .http
            .post(format!("{}/login", self.api_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let resp = self.auth_response(response).await?;
        let account = resp
            .data
            .ok_or_else(|| AppError::Auth("Login response had no account".to_string()))?;
        Ok(SignedIn {
            account,
            token: resp.token,
        })
    }

    async fn get_profile(&self, user_id: &str, token: Option<&str>) -> Result<ProfileResponse> {
        let url = format!("{}/profile/{}", self.api_url, encode(user_id));
        let response = Self::with_token(self.http.get(&url), token).send().await?;
        self.check_response_json(response).await
    }

    async fn verify_handle(&self, platform: Platform, handle: &str) -> Result<PlatformProfile> {
        let url = format!(
            "{}/api/profile/{}/{}",
            self.api_base_url,
            platform.as_str(),
            encode(handle)
        );
        let response = self.http.get(&url).send().await?;
        let body: Value = self.check_response_json(response).await?;

        PlatformProfile::from_json(platform, handle, &body).map_err(AppError::Backend)
    }

    async fn link_account(
        &self,
        platform: Platform,
        user_id: &str,
        handle: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse> {
        let url = format!("{}/link-{}", self.api_url, platform.as_str());
        let request = self.http.post(&url).json(&LinkRequest { user_id, handle });
        let response = Self::with_token(request, token).send().await?;
        self.action_response(response).await
    }

    async fn refresh_account(
        &self,
        platform: Platform,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse> {
        let url = format!(
            "{}/refresh-{}/{}",
            self.api_url,
            platform.as_str(),
            encode(user_id)
        );
        let response = Self::with_token(self.http.put(&url), token).send().await?;
        self.action_response(response).await
    }

    async fn unlink_account(
        &self,
        platform: Platform,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<ActionResponse> {
        let url = format!(
            "{}/unlink-{}/{}",
            self.api_url,
            platform.as_str(),
            encode(user_id)
        );
        let response = Self::with_token(self.http.delete(&url), token).send().await?;
        self.action_response(response).await
    }

    async fn generate_hints(&self, problem_url: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/generate/hints", self.api_base_url))
            .json(&serde_json::json!({ "problem_url": problem_url }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let msg = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Could not fetch hints");
            tracing::warn!(status = %status, error = msg, "Hint generation failed");
            return Err(AppError::Backend(msg.to_string()));
        }

        body.get("generated_hints")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::Backend("No valid hints found in the response.".to_string()))
    }

    async fn chat(&self, message: &str, context: &[ChatMessage]) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/chat", self.api_base_url))
            .json(&serde_json::json!({ "message": message, "context": context }))
            .send()
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))?;

        Ok(body
            .get("reply")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
            .unwrap_or("No response")
            .to_string())
    }

    async fn progress(&self, username: &str, platform: Platform) -> Result<ProgressResponse> {
        let response = self
            .http
            .get(format!("{}/progress", self.api_base_url))
            .query(&[
                ("username", username),
                ("platform", platform.as_str()),
                ("hints_used", "0"),
            ])
            .send()
            .await?;

        self.check_response_json(response).await
    }
}
