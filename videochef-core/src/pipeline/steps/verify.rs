//! Verify step - stages the source video for extraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::track_failure;
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::VerifyService;

/// Step that verifies the video and attaches the staged file to the context.
///
/// Progress is reported under the CAPTION phase: clients see verification and
/// caption extraction as a single "preparing" phase.
pub struct VerifyStep {
    verify: Arc<dyn VerifyService>,
    progress: ProgressTracker,
}

impl VerifyStep {
    /// Step name constant.
    pub const NAME: &'static str = "verify";

    pub fn new(verify: Arc<dyn VerifyService>, progress: ProgressTracker) -> Self {
        Self { verify, progress }
    }
}

#[async_trait]
impl CreationStep for VerifyStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Verify the video and stage it for extraction",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        let recipe_id = ctx.recipe_id();
        self.progress
            .start(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;

        let file = track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Caption,
            ProgressDetail::Caption,
            self.verify.verify(ctx.video_id()).await,
        )
        .await?;

        tracing::info!(%recipe_id, file_uri = %file.file_uri, "video verified");
        self.progress
            .success(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;

        Ok(Arc::new(ctx.with_file_info(file.file_uri, file.mime_type)))
    }
}
