// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

use crate::models::Platform;
use crate::store::StoreError;

/// Application error type shared by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad local input; no network call was attempted.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The handle could not be confirmed on the target platform.
    #[error("{platform} profile not found for handle '{handle}'")]
    ProfileNotFound {
        platform: Platform,
        handle: String,
        reason: String,
    },

    /// The backend refused to record the link.
    #[error("Linking {platform} account was rejected: {message}")]
    LinkRejected { platform: Platform, message: String },

    /// Transport failure or unreachable backend.
    #[error("Network error: {0}")]
    Network(String),

    /// Login or registration refused by the auth backend.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success reply from a backend.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Local store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text suitable for showing next to the form that triggered the error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::ProfileNotFound { .. } => {
                "Failed to connect. Please check your username.".to_string()
            }
            AppError::LinkRejected { message, .. } => message.clone(),
            AppError::Network(_) => {
                "Backend may be unreachable. Please try again.".to_string()
            }
            AppError::Auth(msg) => msg.clone(),
            AppError::Unauthorized => "User ID not found. Please login again.".to_string(),
            AppError::NotFound(msg) => format!("{} not found", msg),
            AppError::Backend(msg) => msg.clone(),
            AppError::Store(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Unexpected client error");
                "Something went wrong.".to_string()
            }
        }
    }

    /// Whether the error came from the transport rather than a backend reply.
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                messages.push(
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                );
            }
        }
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;
