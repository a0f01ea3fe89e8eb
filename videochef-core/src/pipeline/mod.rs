//! Recipe creation pipeline.
//!
//! - Steps implement [`CreationStep`]: they take the current
//!   [`ExecutionContext`](crate::context::ExecutionContext) and return the
//!   context for the next stage
//! - [`ParallelStepGroup`] runs independent steps on a shared [`WorkerPool`]
//! - [`CreationPipeline`] wires the steps into their fixed order and always
//!   runs cleanup

mod executor;
mod parallel;
mod step;
pub mod steps;

pub use executor::{CreationPipeline, PipelineSteps};
pub use parallel::{ParallelStepGroup, WorkerPool};
pub use step::{CreationStep, StepMetadata};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::steps::{
        BriefingStep, CaptionStep, CleanupStep, DetailStep, FinalizeStep, InstructionStep,
        VerifyStep,
    };
    use super::ParallelStepGroup;

    #[test]
    fn step_names_are_unique() {
        let names = [
            VerifyStep::NAME,
            CaptionStep::NAME,
            DetailStep::NAME,
            InstructionStep::NAME,
            BriefingStep::NAME,
            FinalizeStep::NAME,
            CleanupStep::NAME,
            ParallelStepGroup::NAME,
        ];

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(
            names.len(),
            unique.len(),
            "Duplicate step names detected! Names: {:?}",
            names
        );
    }
}
