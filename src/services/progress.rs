//! Progress history for the signed-in user.

use super::backend::Backend;
use super::sync::SessionSync;
use crate::error::{AppError, Result};
use crate::models::{Platform, ProgressSeries};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgressService {
    backend: Arc<dyn Backend>,
    sync: SessionSync,
}

impl ProgressService {
    pub fn new(backend: Arc<dyn Backend>, sync: SessionSync) -> Self {
        Self { backend, sync }
    }

    /// Fetch the score history. A non-success status yields an empty series.
    pub async fn progress(&self, platform: Platform) -> Result<ProgressSeries> {
        let session = self.sync.current_session()?.ok_or_else(|| {
            AppError::Validation("Username not found. Please log in again.".to_string())
        })?;

        let resp = self.backend.progress(&session.username, platform).await?;
        if resp.status != "success" {
            tracing::info!(%platform, status = %resp.status, "No progress data");
            return Ok(ProgressSeries::empty(platform.as_str()));
        }
        Ok(ProgressSeries::from(resp))
    }
}
