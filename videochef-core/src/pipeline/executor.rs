//! The recipe creation pipeline.
//!
//! Fixed order: verify -> caption -> {detail, instruction, briefing} ->
//! finalize. The staged video file is released after every run, whether it
//! succeeded or not.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::context::ExecutionContext;
use crate::error::CreationError;
use crate::pipeline::parallel::{ParallelStepGroup, WorkerPool};
use crate::pipeline::steps::{
    BriefingStep, CaptionStep, CleanupStep, DetailStep, FinalizeStep, InstructionStep, VerifyStep,
};
use crate::pipeline::CreationStep;
use crate::progress::{ProgressDetail, ProgressStep, ProgressTracker};
use crate::services::Collaborators;

/// The steps a pipeline runs, in stage order.
pub struct PipelineSteps {
    pub verify: Arc<dyn CreationStep>,
    pub caption: Arc<dyn CreationStep>,
    pub parallel: Vec<Arc<dyn CreationStep>>,
    pub finalize: Arc<dyn CreationStep>,
    pub cleanup: CleanupStep,
}

impl PipelineSteps {
    /// The standard step set backed by `services`.
    pub fn standard(services: &Collaborators, progress: &ProgressTracker) -> Self {
        Self {
            verify: Arc::new(VerifyStep::new(services.verify.clone(), progress.clone())),
            caption: Arc::new(CaptionStep::new(services.caption.clone(), progress.clone())),
            parallel: vec![
                Arc::new(DetailStep::new(
                    services.detail.clone(),
                    services.ingredient.clone(),
                    services.tag.clone(),
                    services.detail_meta.clone(),
                    progress.clone(),
                )),
                Arc::new(InstructionStep::new(
                    services.step.clone(),
                    progress.clone(),
                )),
                Arc::new(BriefingStep::new(
                    services.briefing.clone(),
                    progress.clone(),
                )),
            ],
            finalize: Arc::new(FinalizeStep::new(
                services.recipe_info.clone(),
                progress.clone(),
            )),
            cleanup: CleanupStep::new(services.verify.clone()),
        }
    }
}

/// Drives one recipe through every creation stage.
pub struct CreationPipeline {
    verify: Arc<dyn CreationStep>,
    caption: Arc<dyn CreationStep>,
    parallel: ParallelStepGroup,
    finalize: Arc<dyn CreationStep>,
    cleanup: CleanupStep,
    progress: ProgressTracker,
}

impl CreationPipeline {
    /// Standard pipeline backed by `services`.
    pub fn new(services: &Collaborators, progress: ProgressTracker, pool: WorkerPool) -> Self {
        let steps = PipelineSteps::standard(services, &progress);
        Self::from_steps(steps, progress, pool)
    }

    pub fn from_steps(steps: PipelineSteps, progress: ProgressTracker, pool: WorkerPool) -> Self {
        Self {
            verify: steps.verify,
            caption: steps.caption,
            parallel: ParallelStepGroup::new(steps.parallel, pool),
            finalize: steps.finalize,
            cleanup: steps.cleanup,
            progress,
        }
    }

    /// Run every stage for `initial`.
    ///
    /// The first step error stops the run and is returned unchanged; the
    /// failing step has already recorded its FAILED entry. Cleanup runs
    /// before this returns on every path.
    pub async fn run(&self, initial: ExecutionContext) -> Result<(), CreationError> {
        let recipe_id = initial.recipe_id();
        let span = info_span!(
            "recipe_creation",
            %recipe_id,
            video_id = %initial.video_id()
        );

        async move {
            self.progress
                .start(recipe_id, ProgressStep::Ready, ProgressDetail::Ready)
                .await;

            let mut current = Arc::new(initial);
            let result = self.run_stages(&mut current).await;

            self.cleanup.cleanup(Some(&current)).await;

            match &result {
                Ok(()) => tracing::info!("recipe creation finished"),
                Err(e) => tracing::warn!(error = %e, "recipe creation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Run the stages, keeping `current` at the latest context so cleanup
    /// sees whatever file info was attached before a failure.
    async fn run_stages(&self, current: &mut Arc<ExecutionContext>) -> Result<(), CreationError> {
        *current = run_step(self.verify.as_ref(), Arc::clone(current)).await?;
        *current = run_step(self.caption.as_ref(), Arc::clone(current)).await?;
        *current = self.parallel.run(Arc::clone(current)).await?;
        run_step(self.finalize.as_ref(), Arc::clone(current)).await?;
        Ok(())
    }
}

async fn run_step(
    step: &dyn CreationStep,
    ctx: Arc<ExecutionContext>,
) -> Result<Arc<ExecutionContext>, CreationError> {
    let name = step.metadata().name;
    let span = info_span!("creation_step", step = name, recipe_id = %ctx.recipe_id());
    step.run(ctx).instrument(span).await
}
