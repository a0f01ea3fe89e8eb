//! HTTP client for the extraction service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::config::ExtractionConfig;
use crate::error::ServiceError;
use crate::services::VerifyService;
use crate::types::{CaptionSegment, Ingredient, RecipeDetail, RecipeStep, VideoFile};

/// Caption as returned by the extractor, before it is stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedCaption {
    pub lang_code: String,
    #[serde(rename = "captions")]
    pub segments: Vec<CaptionSegment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedBriefings {
    pub briefings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    video_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CleanupRequest<'a> {
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct FileRequest<'a> {
    file_uri: &'a str,
    mime_type: &'a str,
}

#[derive(Debug, Serialize)]
struct DetailRequest<'a> {
    video_id: &'a str,
    file_uri: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_title: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BriefingRequest<'a> {
    video_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(default)]
    description: String,
    #[serde(default)]
    ingredients: Vec<Ingredient>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    servings: u32,
    #[serde(default)]
    cook_time: u32,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepsResponse {
    steps: Vec<ExtractedStep>,
}

#[derive(Debug, Deserialize)]
struct ExtractedStep {
    subtitle: String,
    #[serde(default)]
    start: f64,
    #[serde(default)]
    details: Vec<String>,
}

/// Which failure variant a non-success response maps to.
#[derive(Debug, Clone, Copy)]
enum Failure {
    Verify,
    Extraction,
    Generation,
}

impl Failure {
    fn error(self, message: String) -> ServiceError {
        match self {
            Failure::Verify => ServiceError::VerifyFailed(message),
            Failure::Extraction => ServiceError::ExtractionFailed(message),
            Failure::Generation => ServiceError::GenerationFailed(message),
        }
    }
}

/// Client for the extraction service's JSON API.
///
/// Each call carries its own timeout: verify and cleanup are quick, the
/// extractors may run for minutes.
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    http: reqwest::Client,
    config: ExtractionConfig,
}

impl ExtractionClient {
    pub fn new(config: ExtractionConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("videochef/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, ServiceError> {
        let config =
            ExtractionConfig::from_env().map_err(|e| ServiceError::Config(e.to_string()))?;
        Self::new(config)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub async fn extract_caption(
        &self,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<ExtractedCaption, ServiceError> {
        self.post_json(
            "/captions",
            &FileRequest {
                file_uri,
                mime_type,
            },
            self.config.extraction_timeout,
            Failure::Extraction,
        )
        .await
    }

    pub async fn extract_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        video_title: Option<&str>,
    ) -> Result<RecipeDetail, ServiceError> {
        let response: DetailResponse = self
            .post_json(
                "/details",
                &DetailRequest {
                    video_id,
                    file_uri,
                    mime_type,
                    video_title,
                },
                self.config.extraction_timeout,
                Failure::Extraction,
            )
            .await?;

        Ok(RecipeDetail {
            description: response.description,
            ingredients: response.ingredients,
            tags: response.tags,
            servings: response.servings,
            cook_time: response.cook_time,
            title: response.title,
        })
    }

    /// Cooking steps in video order, numbered from 1.
    pub async fn extract_steps(
        &self,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<Vec<RecipeStep>, ServiceError> {
        let response: StepsResponse = self
            .post_json(
                "/steps",
                &FileRequest {
                    file_uri,
                    mime_type,
                },
                self.config.extraction_timeout,
                Failure::Extraction,
            )
            .await?;

        Ok(response
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| RecipeStep {
                step_order: i as u32 + 1,
                subtitle: step.subtitle,
                details: step.details,
                start: step.start,
            })
            .collect())
    }

    pub async fn generate_briefings(
        &self,
        video_id: &str,
    ) -> Result<ExtractedBriefings, ServiceError> {
        self.post_json(
            "/briefings",
            &BriefingRequest { video_id },
            self.config.extraction_timeout,
            Failure::Generation,
        )
        .await
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
        failure: Failure,
    ) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(path, body, timeout).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(path, status = %status, "extraction service returned error");
            return Err(failure.error(format!("{} returned {}: {}", path, status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| failure.error(format!("Invalid response from {}: {}", path, e)))
    }

    async fn send<B>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<reqwest::Response, ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!(url = %url, "calling extraction service");
        self.http
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))
    }
}

#[async_trait]
impl VerifyService for ExtractionClient {
    async fn verify(&self, video_id: &str) -> Result<VideoFile, ServiceError> {
        self.post_json(
            "/verify",
            &VerifyRequest { video_id },
            self.config.verify_timeout,
            Failure::Verify,
        )
        .await
    }

    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError> {
        let response = self
            .send(
                "/cleanup",
                &CleanupRequest { file_uri },
                self.config.verify_timeout,
            )
            .await?;

        let status = response.status();
        // NOT_FOUND: already gone.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(ServiceError::Request(format!("/cleanup returned {}", status)))
        }
    }
}
