pub mod context;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod progress;
pub mod services;
pub mod types;
pub mod video;

pub use context::ExecutionContext;
pub use error::{ConfigError, CreationError, ServiceError, VideoUrlError};
pub use extraction::{ExtractionClient, ExtractionConfig};
pub use pipeline::{CreationPipeline, CreationStep, ParallelStepGroup, WorkerPool};
pub use progress::{
    CreationState, InMemoryProgressStore, ProgressDetail, ProgressEntry, ProgressStatus,
    ProgressStep, ProgressStore, ProgressTracker,
};
pub use services::Collaborators;
pub use types::{
    CaptionSegment, Ingredient, RecipeCaption, RecipeDetail, RecipeStep, VideoFile,
};
pub use video::VideoRef;
