//! Detail step - extracts description, ingredients, tags and timing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::{require_file_info, track_failure};
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::{DetailMetaService, DetailService, IngredientService, TagService};

/// Step that extracts the recipe detail bundle and stores its three parts.
///
/// Ingredients, tags and detail meta are stored one after another, each with
/// its own success entry, so a client can see partial completion.
pub struct DetailStep {
    details: Arc<dyn DetailService>,
    ingredients: Arc<dyn IngredientService>,
    tags: Arc<dyn TagService>,
    detail_meta: Arc<dyn DetailMetaService>,
    progress: ProgressTracker,
}

impl DetailStep {
    /// Step name constant.
    pub const NAME: &'static str = "detail";

    pub fn new(
        details: Arc<dyn DetailService>,
        ingredients: Arc<dyn IngredientService>,
        tags: Arc<dyn TagService>,
        detail_meta: Arc<dyn DetailMetaService>,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            details,
            ingredients,
            tags,
            detail_meta,
            progress,
        }
    }
}

#[async_trait]
impl CreationStep for DetailStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Extract ingredients, tags and recipe metadata",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        let (file_uri, mime_type) = require_file_info(&ctx, Self::NAME)?;
        let recipe_id = ctx.recipe_id();

        self.progress
            .start(recipe_id, ProgressStep::Detail, ProgressDetail::Detail)
            .await;

        let detail = track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::Detail,
            self.details
                .get_recipe_details(ctx.video_id(), file_uri, mime_type, ctx.video_title())
                .await,
        )
        .await?;

        track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::Ingredient,
            self.ingredients.create(recipe_id, &detail.ingredients).await,
        )
        .await?;
        self.progress
            .success(recipe_id, ProgressStep::Detail, ProgressDetail::Ingredient)
            .await;

        track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::Tag,
            self.tags.create(recipe_id, &detail.tags).await,
        )
        .await?;
        self.progress
            .success(recipe_id, ProgressStep::Detail, ProgressDetail::Tag)
            .await;

        let title = detail.title_or(ctx.video_title());
        track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Detail,
            ProgressDetail::DetailMeta,
            self.detail_meta
                .create(
                    recipe_id,
                    detail.cook_time,
                    detail.servings,
                    &detail.description,
                    &title,
                )
                .await,
        )
        .await?;
        self.progress
            .success(recipe_id, ProgressStep::Detail, ProgressDetail::DetailMeta)
            .await;

        tracing::info!(
            %recipe_id,
            ingredients = detail.ingredients.len(),
            tags = detail.tags.len(),
            title = %title,
            "recipe detail stored"
        );
        Ok(ctx)
    }
}
