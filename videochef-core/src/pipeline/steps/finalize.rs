//! Finalize step - marks the recipe as created.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::{require_file_info, track_failure};
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::RecipeInfoService;

pub struct FinalizeStep {
    recipes: Arc<dyn RecipeInfoService>,
    progress: ProgressTracker,
}

impl FinalizeStep {
    /// Step name constant.
    pub const NAME: &'static str = "finalize";

    pub fn new(recipes: Arc<dyn RecipeInfoService>, progress: ProgressTracker) -> Self {
        Self { recipes, progress }
    }
}

#[async_trait]
impl CreationStep for FinalizeStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Mark recipe as successfully created",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        require_file_info(&ctx, Self::NAME)?;
        let recipe_id = ctx.recipe_id();

        self.progress
            .start(recipe_id, ProgressStep::Finished, ProgressDetail::Finished)
            .await;

        track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Finished,
            ProgressDetail::Finished,
            self.recipes.success(recipe_id).await,
        )
        .await?;

        self.progress
            .success(recipe_id, ProgressStep::Finished, ProgressDetail::Finished)
            .await;

        Ok(ctx)
    }
}
