use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    /// YouTube video URL (watch, youtu.be, shorts, embed or live)
    pub video_url: String,
    /// Video title, used when extraction finds none
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub recipe_id: Uuid,
    /// False when an existing recipe for the same video was returned
    pub created: bool,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 202, description = "Recipe creation accepted", body = CreateRecipeResponse),
        (status = 400, description = "Invalid or unsupported video URL", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(creator): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    match creator.submit(&request.video_url, request.title.as_deref()) {
        Ok(submission) => (
            StatusCode::ACCEPTED,
            Json(CreateRecipeResponse {
                recipe_id: submission.recipe_id,
                created: submission.created,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::debug!(video_url = %request.video_url, error = %e, "rejected video url");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
