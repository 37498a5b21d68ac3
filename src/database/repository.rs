use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Game, GameChanges, GameRow, NewGame, NewUser, User};

const GAME_COLUMNS: &str = "id, title, start_date, start_time, duration_in_minutes, price, \
     friend_description, enemy_description, show_friend_images, show_enemy_images, \
     friends, enemies, created_by, created_at, updated_at";

pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All games, newest first
    pub async fn list(&self) -> Result<Vec<Game>, DatabaseError> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, GameRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Game::from).collect())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Game>, DatabaseError> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1");
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Game::from))
    }

    pub async fn find_404(&self, id: Uuid) -> Result<Game, DatabaseError> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Game not found".to_string()))
    }

    pub async fn insert(&self, game: &NewGame) -> Result<Game, DatabaseError> {
        let sql = format!(
            "INSERT INTO games (id, title, start_date, start_time, duration_in_minutes, price, \
                 friend_description, enemy_description, show_friend_images, show_enemy_images, \
                 friends, enemies, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {GAME_COLUMNS}"
        );

        let result = sqlx::query_as::<_, GameRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&game.title)
            .bind(&game.start_date)
            .bind(&game.start_time)
            .bind(game.duration_in_minutes)
            .bind(game.price)
            .bind(&game.friend_description)
            .bind(&game.enemy_description)
            .bind(game.show_friend_images)
            .bind(game.show_enemy_images)
            .bind(Json(&game.friends))
            .bind(Json(&game.enemies))
            .bind(game.created_by)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(Game::from(row)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(DatabaseError::UnknownUser(game.created_by))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Apply `changes`; rosters are overwritten, absent scalars are kept
    pub async fn update(&self, id: Uuid, changes: &GameChanges) -> Result<Game, DatabaseError> {
        let sql = format!(
            "UPDATE games SET \
                 title = COALESCE($2, title), \
                 start_date = COALESCE($3, start_date), \
                 start_time = COALESCE($4, start_time), \
                 duration_in_minutes = COALESCE($5, duration_in_minutes), \
                 price = COALESCE($6, price), \
                 friend_description = COALESCE($7, friend_description), \
                 enemy_description = COALESCE($8, enemy_description), \
                 show_friend_images = COALESCE($9, show_friend_images), \
                 show_enemy_images = COALESCE($10, show_enemy_images), \
                 friends = $11, \
                 enemies = $12, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {GAME_COLUMNS}"
        );

        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.start_date)
            .bind(&changes.start_time)
            .bind(changes.duration_in_minutes)
            .bind(changes.price)
            .bind(&changes.friend_description)
            .bind(&changes.enemy_description)
            .bind(changes.show_friend_images)
            .bind(changes.show_enemy_images)
            .bind(Json(&changes.friends))
            .bind(Json(&changes.enemies))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Game::from)
            .ok_or_else(|| DatabaseError::NotFound("Game not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Game not found".to_string()));
        }
        Ok(())
    }
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive lookup; emails are stored lowercase
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, is_active, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn insert(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let email = user.email.trim().to_lowercase();
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, password_hash, role, is_active, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user.name.trim())
        .bind(&email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::Duplicate(format!("User with email '{}' already exists", email)))
            }
            Err(other) => Err(other.into()),
        }
    }
}
