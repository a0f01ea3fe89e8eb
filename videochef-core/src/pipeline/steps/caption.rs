//! Caption step - extracts and stores the video's captions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::step::{require_file_info, track_failure};
use crate::pipeline::{CreationStep, StepMetadata};
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::CaptionService;

pub struct CaptionStep {
    captions: Arc<dyn CaptionService>,
    progress: ProgressTracker,
}

impl CaptionStep {
    /// Step name constant.
    pub const NAME: &'static str = "caption";

    pub fn new(captions: Arc<dyn CaptionService>, progress: ProgressTracker) -> Self {
        Self { captions, progress }
    }
}

#[async_trait]
impl CreationStep for CaptionStep {
    fn metadata(&self) -> StepMetadata {
        StepMetadata {
            name: Self::NAME,
            description: "Extract captions from the staged video",
        }
    }

    async fn run(
        &self,
        ctx: Arc<ExecutionContext>,
    ) -> Result<Arc<ExecutionContext>, CreationError> {
        let (file_uri, mime_type) = require_file_info(&ctx, Self::NAME)?;
        let recipe_id = ctx.recipe_id();

        self.progress
            .start(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;

        let extracted = async {
            let caption_id = self.captions.create(recipe_id, file_uri, mime_type).await?;
            self.captions.get(caption_id).await
        }
        .await;
        let caption = track_failure(
            &self.progress,
            recipe_id,
            ProgressStep::Caption,
            ProgressDetail::Caption,
            extracted,
        )
        .await?;

        tracing::info!(
            %recipe_id,
            lang = %caption.lang_code,
            segments = caption.segments.len(),
            "captions extracted"
        );
        self.progress
            .success(recipe_id, ProgressStep::Caption, ProgressDetail::Caption)
            .await;

        Ok(Arc::new(ctx.with_caption(caption)))
    }
}
