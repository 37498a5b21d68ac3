use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::Serialize;

use crate::database::models::Game;
use crate::database::{DatabaseManager, GameRepository};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::utils::GameInput;

#[derive(Debug, Serialize)]
pub struct GameList {
    pub games: Vec<Game>,
}

#[derive(Debug, Serialize)]
pub struct GameEnvelope {
    pub game: Game,
}

/// GET /api/games - All games, newest first
pub async fn list() -> ApiResult<GameList> {
    let repo = GameRepository::new(DatabaseManager::pool().await?);
    let games = repo.list().await?;
    Ok(ApiResponse::success(GameList { games }))
}

/// POST /api/games - Create a game
///
/// Rosters may arrive as bare names, `{name, image}` objects or bare
/// embedded images; they are stored as `{name, image}` objects.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> ApiResult<GameEnvelope> {
    let Json(input) = payload?;
    let new_game = input.into_new_game(user.user_id)?;

    let repo = GameRepository::new(DatabaseManager::pool().await?);
    let game = repo.insert(&new_game).await?;

    tracing::info!(
        "Game {} created by {} ({} friends, {} enemies)",
        game.id,
        user.email,
        game.friends.len(),
        game.enemies.len()
    );
    Ok(ApiResponse::created(GameEnvelope { game }))
}
