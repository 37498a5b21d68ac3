use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::database::{DatabaseManager, GameRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::collection::GameEnvelope;
use super::utils::GameInput;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

/// Unparseable ids cannot name a stored game
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found("Game not found"))
}

/// GET /api/games/:id
pub async fn get(Path(id): Path<String>) -> ApiResult<GameEnvelope> {
    let id = parse_id(&id)?;
    let repo = GameRepository::new(DatabaseManager::pool().await?);
    let game = repo.find_404(id).await?;
    Ok(ApiResponse::success(GameEnvelope { game }))
}

/// PUT /api/games/:id - Update a game; both rosters are replaced wholesale
pub async fn put(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> ApiResult<GameEnvelope> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let changes = input.into_changes()?;

    let repo = GameRepository::new(DatabaseManager::pool().await?);
    let game = repo.update(id, &changes).await?;

    tracing::info!("Game {} updated by {}", game.id, user.email);
    Ok(ApiResponse::success(GameEnvelope { game }))
}

/// DELETE /api/games/:id
pub async fn delete(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let repo = GameRepository::new(DatabaseManager::pool().await?);
    repo.delete(id).await?;

    tracing::info!("Game {} deleted by {}", id, user.email);
    Ok(ApiResponse::success(Deleted { message: "Game deleted" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_id("64b7f0c2e4b0a1a2b3c4d5e6").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert!(parse_id("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
    }
}
