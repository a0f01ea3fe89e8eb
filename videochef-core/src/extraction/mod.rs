//! Client for the external video extraction service.
//!
//! One service stages videos and runs every extractor (captions, details,
//! steps, briefings). This module speaks its JSON API; the server combines it
//! with storage to implement the pipeline collaborators.

mod client;
mod config;

pub use client::{ExtractedBriefings, ExtractedCaption, ExtractionClient};
pub use config::{ExtractionConfig, DEFAULT_EXTRACTION_TIMEOUT_SECS, DEFAULT_VERIFY_TIMEOUT_SECS};
