use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::roster::{self, CharacterRecord, Side};

/// Row as stored. Rosters stay raw JSON because older rows use other shapes.
#[derive(Debug, Clone, FromRow)]
pub struct GameRow {
    pub id: Uuid,
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub duration_in_minutes: i32,
    pub price: f64,
    pub friend_description: String,
    pub enemy_description: String,
    pub show_friend_images: bool,
    pub show_enemy_images: bool,
    pub friends: Value,
    pub enemies: Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Game as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub duration_in_minutes: i32,
    pub price: f64,
    pub friend_description: String,
    pub enemy_description: String,
    pub show_friend_images: bool,
    pub show_enemy_images: bool,
    pub friends: Vec<CharacterRecord>,
    pub enemies: Vec<CharacterRecord>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Self {
            friends: roster::normalize(Some(&row.friends), Side::Friend),
            enemies: roster::normalize(Some(&row.enemies), Side::Enemy),
            id: row.id,
            title: row.title,
            start_date: row.start_date,
            start_time: row.start_time,
            duration_in_minutes: row.duration_in_minutes,
            price: row.price,
            friend_description: row.friend_description,
            enemy_description: row.enemy_description,
            show_friend_images: row.show_friend_images,
            show_enemy_images: row.show_enemy_images,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Validated game ready for insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub duration_in_minutes: i32,
    pub price: f64,
    pub friend_description: String,
    pub enemy_description: String,
    pub show_friend_images: bool,
    pub show_enemy_images: bool,
    pub friends: Vec<CharacterRecord>,
    pub enemies: Vec<CharacterRecord>,
    pub created_by: Uuid,
}

/// Validated update. `None` scalars keep the stored value; rosters are
/// always replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameChanges {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub duration_in_minutes: Option<i32>,
    pub price: Option<f64>,
    pub friend_description: Option<String>,
    pub enemy_description: Option<String>,
    pub show_friend_images: Option<bool>,
    pub show_enemy_images: Option<bool>,
    pub friends: Vec<CharacterRecord>,
    pub enemies: Vec<CharacterRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(friends: Value, enemies: Value) -> GameRow {
        let now = Utc::now();
        GameRow {
            id: Uuid::new_v4(),
            title: "Night Watch".to_string(),
            start_date: "2025-06-01".to_string(),
            start_time: "20:00".to_string(),
            duration_in_minutes: 90,
            price: 12.5,
            friend_description: String::new(),
            enemy_description: String::new(),
            show_friend_images: true,
            show_enemy_images: false,
            friends,
            enemies,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn loads_legacy_string_rosters() {
        let game = Game::from(row(json!(["Alice", "Bob"]), json!(["data:image/png;base64,AA"])));
        assert_eq!(
            game.friends,
            vec![CharacterRecord::new("Alice", ""), CharacterRecord::new("Bob", "")]
        );
        assert_eq!(
            game.enemies,
            vec![CharacterRecord::new("Enemy 1", "data:image/png;base64,AA")]
        );
    }

    #[test]
    fn loads_object_rosters_and_tolerates_null() {
        let game = Game::from(row(json!([{ "name": "Alice", "image": "https://cdn/a.png" }]), Value::Null));
        assert_eq!(game.friends, vec![CharacterRecord::new("Alice", "https://cdn/a.png")]);
        assert!(game.enemies.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let game = Game::from(row(json!([]), json!([])));
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["durationInMinutes"], 90);
        assert_eq!(value["showEnemyImages"], false);
        assert!(value.get("start_date").is_none());
    }
}
