//! Briefing step - generates the short recipe briefing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::{require_file_info, track_failure};
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::BriefingService;

pub struct BriefingStep {
    briefings: Arc<dyn BriefingService>,
    progress: ProgressTracker,
}

impl BriefingStep {
    /// Step name constant.
    pub const NAME: &'static str = "briefing";

    pub fn new(briefings: Arc<dyn BriefingService>, progress: ProgressTracker) -> Self {
        Self {
            briefings,
            progress,
        }
    }
}

#[async_trait]
impl CreationStep for BriefingStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Generate recipe briefing",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        // The briefing is generated from the video id, but only once the
        // video has been verified.
        require_file_info(&ctx, Self::NAME)?;
        let recipe_id = ctx.recipe_id();

        self.progress
            .start(recipe_id, ProgressStep::Briefing, ProgressDetail::Briefing)
            .await;

        track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Briefing,
            ProgressDetail::Briefing,
            self.briefings.create(ctx.video_id(), recipe_id).await,
        )
        .await?;

        self.progress
            .success(recipe_id, ProgressStep::Briefing, ProgressDetail::Briefing)
            .await;

        Ok(ctx)
    }
}
