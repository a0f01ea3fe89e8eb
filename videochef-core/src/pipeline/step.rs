//! Stage step trait and shared helpers.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::ExecutionContext;
use crate::error::{CreationError, ServiceError};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};

/// Metadata about a stage step.
#[derive(Debug, Clone)]
pub struct StepMetadata {
    /// Unique identifier for this step (e.g., "verify", "caption")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// One unit of creation work.
///
/// A step takes the current context and returns the context for the next
/// stage. Steps record their own progress and never swallow errors.
#[async_trait]
pub trait CreationStep: Send + Sync {
    fn metadata(&self) -> StepMetadata;

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError>;
}

/// `(file_uri, mime_type)` from the context, or the precondition error.
pub(crate) fn require_file_info<'a>(
    ctx: &'a ExecutionContext,
    step: &'static str,
) -> Result<(&'a str, &'a str), CreationError> {
    ctx.file_info()
        .ok_or(CreationError::MissingFileInfo { step })
}

/// Record FAILED for `(step, detail)` when `result` is an error, then hand the
/// result back with the error converted.
pub(crate) async fn track_failure<T>(
    progress: &ProgressTracker,
    recipe_id: Uuid,
    step: ProgressStep,
    detail: ProgressDetail,
    result: Result<T, ServiceError>,
) -> Result<T, CreationError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(%recipe_id, ?step, ?detail, error = %e, "step failed");
            progress.failed(recipe_id, step, detail).await;
            Err(e.into())
        }
    }
}
