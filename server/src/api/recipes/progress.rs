use crate::api::ErrorResponse;
use crate::store::RecipeStatus;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use videochef_core::{CreationState, ProgressDetail, ProgressEntry, ProgressStatus, ProgressStep};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressItem {
    #[schema(value_type = String, example = "CAPTION")]
    pub step: ProgressStep,
    #[schema(value_type = String, example = "CAPTION")]
    pub detail: ProgressDetail,
    #[schema(value_type = String, example = "SUCCESS")]
    pub status: ProgressStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ProgressEntry> for ProgressItem {
    fn from(entry: ProgressEntry) -> Self {
        Self {
            step: entry.step,
            detail: entry.detail,
            status: entry.status,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeProgressResponse {
    pub recipe_id: Uuid,
    pub recipe_status: RecipeStatus,
    /// Summary of the trail: in_progress, finished or failed
    #[schema(value_type = String, example = "in_progress")]
    pub state: CreationState,
    /// Progress entries in the order they were recorded
    pub progress: Vec<ProgressItem>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/progress",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Creation progress", body = RecipeProgressResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Progress could not be read", body = ErrorResponse)
    )
)]
pub async fn get_progress(
    State(creator): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(record) = creator.store().get(recipe_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response();
    };

    let trail = match creator.progress().trail(recipe_id).await {
        Ok(trail) => trail,
        Err(e) => {
            tracing::error!(%recipe_id, error = %e, "Failed to read progress");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to read progress".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(RecipeProgressResponse {
            recipe_id,
            recipe_status: record.status,
            state: CreationState::from_entries(&trail),
            progress: trail.into_iter().map(ProgressItem::from).collect(),
        }),
    )
        .into_response()
}
