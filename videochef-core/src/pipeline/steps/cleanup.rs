//! Cleanup step - releases the staged video file.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::services::VerifyService;

/// Best-effort release of the file staged by the verify step.
///
/// Safe to call with no context or a context that never got file info; in
/// both cases nothing is released. Failures are logged, never returned.
pub struct CleanupStep {
    verify: Arc<dyn VerifyService>,
}

impl CleanupStep {
    /// Step name constant.
    pub const NAME: &'static str = "cleanup";

    pub fn new(verify: Arc<dyn VerifyService>) -> Self {
        Self { verify }
    }

    pub async fn cleanup(&self, ctx: Option<&ExecutionContext>) {
        let Some(ctx) = ctx else {
            return;
        };
        let Some(file_uri) = ctx.file_uri() else {
            tracing::debug!(recipe_id = %ctx.recipe_id(), "no staged file to clean up");
            return;
        };

        match self.verify.cleanup(file_uri).await {
            Ok(()) => tracing::debug!(recipe_id = %ctx.recipe_id(), file_uri, "staged file released"),
            Err(e) => tracing::warn!(
                recipe_id = %ctx.recipe_id(),
                file_uri,
                error = %e,
                "Failed to release staged file"
            ),
        }
    }
}
