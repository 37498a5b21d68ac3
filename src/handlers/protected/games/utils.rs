use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{GameChanges, NewGame};
use crate::error::{ApiError, FieldErrors};
use crate::roster::{self, CharacterRecord, Side};

/// Raw game body. Fields stay loosely typed so each bad field can be
/// reported by name instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub start_date: Option<Value>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub duration_in_minutes: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub friend_description: Option<Value>,
    #[serde(default)]
    pub enemy_description: Option<Value>,
    #[serde(default)]
    pub show_friend_images: Option<Value>,
    #[serde(default)]
    pub show_enemy_images: Option<Value>,
    #[serde(default)]
    pub friends: Option<Value>,
    #[serde(default)]
    pub enemies: Option<Value>,
}

impl GameInput {
    /// Validate a create body. All scheduling fields are required.
    pub fn into_new_game(self, created_by: Uuid) -> Result<NewGame, ApiError> {
        let mut fields = FieldReader::default();

        let title = fields.text("title", self.title.as_ref(), true);
        let start_date = fields.text("startDate", self.start_date.as_ref(), true);
        let start_time = fields.text("startTime", self.start_time.as_ref(), true);
        let duration = fields.duration("durationInMinutes", self.duration_in_minutes.as_ref(), true);
        let price = fields.price("price", self.price.as_ref(), true);
        let friend_description = fields.description("friendDescription", self.friend_description.as_ref());
        let enemy_description = fields.description("enemyDescription", self.enemy_description.as_ref());
        let show_friend_images = fields.flag("showFriendImages", self.show_friend_images.as_ref());
        let show_enemy_images = fields.flag("showEnemyImages", self.show_enemy_images.as_ref());
        fields.finish()?;

        let (friends, enemies) = normalize_rosters(self.friends.as_ref(), self.enemies.as_ref())?;

        match (title, start_date, start_time, duration, price) {
            (Some(title), Some(start_date), Some(start_time), Some(duration_in_minutes), Some(price)) => {
                Ok(NewGame {
                    title,
                    start_date,
                    start_time,
                    duration_in_minutes,
                    price,
                    friend_description: friend_description.unwrap_or_default(),
                    enemy_description: enemy_description.unwrap_or_default(),
                    show_friend_images: show_friend_images.unwrap_or(true),
                    show_enemy_images: show_enemy_images.unwrap_or(true),
                    friends,
                    enemies,
                    created_by,
                })
            }
            // finish() already reported every missing field
            _ => Err(ApiError::validation_error("Invalid game data", None)),
        }
    }

    /// Validate an update body. Scalars are optional; rosters are always
    /// replaced, with a missing roster meaning an empty one.
    pub fn into_changes(self) -> Result<GameChanges, ApiError> {
        let mut fields = FieldReader::default();

        let changes = GameChanges {
            title: fields.text("title", self.title.as_ref(), false),
            start_date: fields.text("startDate", self.start_date.as_ref(), false),
            start_time: fields.text("startTime", self.start_time.as_ref(), false),
            duration_in_minutes: fields.duration("durationInMinutes", self.duration_in_minutes.as_ref(), false),
            price: fields.price("price", self.price.as_ref(), false),
            friend_description: fields.description("friendDescription", self.friend_description.as_ref()),
            enemy_description: fields.description("enemyDescription", self.enemy_description.as_ref()),
            show_friend_images: fields.flag("showFriendImages", self.show_friend_images.as_ref()),
            show_enemy_images: fields.flag("showEnemyImages", self.show_enemy_images.as_ref()),
            ..GameChanges::default()
        };
        fields.finish()?;

        let (friends, enemies) = normalize_rosters(self.friends.as_ref(), self.enemies.as_ref())?;
        Ok(GameChanges { friends, enemies, ..changes })
    }
}

/// Normalize both rosters and reject the request if any record is unnamed.
pub fn normalize_rosters(
    friends: Option<&Value>,
    enemies: Option<&Value>,
) -> Result<(Vec<CharacterRecord>, Vec<CharacterRecord>), ApiError> {
    let friends = normalize_side(friends, Side::Friend)?;
    let enemies = normalize_side(enemies, Side::Enemy)?;
    Ok((friends, enemies))
}

fn normalize_side(raw: Option<&Value>, side: Side) -> Result<Vec<CharacterRecord>, ApiError> {
    let records = roster::normalize(raw, side);

    if !roster::is_well_formed(&records) {
        tracing::error!("Normalized {} roster contains an unnamed record", side.field());
        return Err(ApiError::validation_error(
            format!("Invalid {} data structure", side.label().to_lowercase()),
            None,
        ));
    }

    let submitted = raw.and_then(Value::as_array).map_or(0, Vec::len);
    if submitted > records.len() {
        tracing::debug!(
            "Dropped {} unrecognized {} entries",
            submitted - records.len(),
            side.field()
        );
    }

    Ok(records)
}

/// Collects per-field errors while reading a body
#[derive(Default)]
struct FieldReader {
    errors: FieldErrors,
}

impl FieldReader {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    fn missing<T>(&mut self, field: &str, required: bool) -> Option<T> {
        if required {
            self.fail(field, "This field is required");
        }
        None
    }

    /// Trimmed, non-empty text
    fn text(&mut self, field: &str, value: Option<&Value>, required: bool) -> Option<String> {
        match value {
            None => self.missing(field, required),
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::String(_)) => {
                self.fail(field, "Must not be empty");
                None
            }
            Some(_) => {
                self.fail(field, "Must be a string");
                None
            }
        }
    }

    /// Optional free text; defaults are applied by the caller
    fn description(&mut self, field: &str, value: Option<&Value>) -> Option<String> {
        match value {
            None => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                self.fail(field, "Must be a string");
                None
            }
        }
    }

    fn flag(&mut self, field: &str, value: Option<&Value>) -> Option<bool> {
        match value {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.fail(field, "Must be a boolean");
                None
            }
        }
    }

    /// Whole minutes, greater than zero. Numeric strings are accepted.
    fn duration(&mut self, field: &str, value: Option<&Value>, required: bool) -> Option<i32> {
        let Some(value) = value else {
            return self.missing(field, required);
        };

        let minutes = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        match minutes.and_then(|m| i32::try_from(m).ok()) {
            Some(m) if m > 0 => Some(m),
            _ => {
                self.fail(field, "Must be a positive whole number of minutes");
                None
            }
        }
    }

    /// Non-negative amount. Numeric strings are accepted.
    fn price(&mut self, field: &str, value: Option<&Value>, required: bool) -> Option<f64> {
        let Some(value) = value else {
            return self.missing(field, required);
        };

        let amount = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match amount {
            Some(p) if p.is_finite() && p >= 0.0 => Some(p),
            _ => {
                self.fail(field, "Must be a non-negative number");
                None
            }
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid game data", Some(self.errors)))
        }
    }
}
