//! Instruction step - extracts the ordered cooking steps.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::{require_file_info, track_failure};
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::StepService;

pub struct InstructionStep {
    steps: Arc<dyn StepService>,
    progress: ProgressTracker,
}

impl InstructionStep {
    /// Step name constant.
    pub const NAME: &'static str = "instruction";

    pub fn new(steps: Arc<dyn StepService>, progress: ProgressTracker) -> Self {
        Self { steps, progress }
    }
}

#[async_trait]
impl CreationStep for InstructionStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Extract cooking steps",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        let (file_uri, mime_type) = require_file_info(&ctx, Self::NAME)?;
        let recipe_id = ctx.recipe_id();

        self.progress
            .start(recipe_id, ProgressStep::Step, ProgressDetail::Step)
            .await;

        let steps = track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Step,
            ProgressDetail::Step,
            self.steps.create(recipe_id, file_uri, mime_type).await,
        )
        .await?;

        tracing::info!(%recipe_id, steps = steps.len(), "cooking steps stored");
        self.progress
            .success(recipe_id, ProgressStep::Step, ProgressDetail::Step)
            .await;

        Ok(ctx)
    }
}
