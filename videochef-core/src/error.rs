use thiserror::Error;

/// Failure reported by an external collaborator (extraction service or store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Video verification failed: {0}")]
    VerifyFailed(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a recipe creation run.
#[derive(Error, Debug)]
pub enum CreationError {
    /// A step that needs the verified file ran before verification.
    #[error("Recipe creation failed: {step} requires file info but the context has none")]
    MissingFileInfo { step: &'static str },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Step {step} did not complete: {message}")]
    StepPanicked { step: &'static str, message: String },
}

impl CreationError {
    /// The collaborator error behind this failure, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            CreationError::Service(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VideoUrlError {
    #[error("Invalid URL: {0}")]
    Invalid(String),

    #[error("Video host not supported: {0}")]
    UnsupportedHost(String),

    #[error("No video id in URL")]
    MissingVideoId,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}
