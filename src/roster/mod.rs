//! Roster normalization for a game's `friends` and `enemies` fields.
//!
//! Clients have sent rosters in three shapes over time: bare name strings,
//! `{name, image}` objects, and bare embedded-image strings. Stored rows carry
//! all three as well. [`normalize`] accepts every shape and produces the one
//! canonical [`CharacterRecord`] list the rest of the service works with.
//! Elements that fit none of the shapes are dropped rather than failing the
//! whole request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix that marks a string as an inline image payload instead of a name.
pub const EMBEDDED_IMAGE_MARKER: &str = "data:image";

/// Which roster a list belongs to. Decides the placeholder name given to
/// unnamed image entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Friend,
    Enemy,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Friend => "Friend",
            Side::Enemy => "Enemy",
        }
    }

    /// Name of the game field holding this roster.
    pub fn field(self) -> &'static str {
        match self {
            Side::Friend => "friends",
            Side::Enemy => "enemies",
        }
    }

    /// Placeholder for the unnamed entry at 0-based `position`.
    pub fn placeholder_name(self, position: usize) -> String {
        format!("{} {}", self.label(), position + 1)
    }
}

/// One participant slot in a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    #[serde(default)]
    pub image: String,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }
}

/// Shape of a single raw roster element.
#[derive(Debug, PartialEq, Eq)]
enum Entry<'a> {
    Named { name: &'a str, image: &'a str },
    PlainName(&'a str),
    EmbeddedImage(&'a str),
    Unrecognized,
}

impl<'a> Entry<'a> {
    fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => match map.get("name").and_then(Value::as_str) {
                Some(name) if !name.is_empty() && !is_embedded_image(name) => Entry::Named {
                    name,
                    image: map.get("image").and_then(Value::as_str).unwrap_or(""),
                },
                _ => Entry::Unrecognized,
            },
            Value::String(text) if is_embedded_image(text) => Entry::EmbeddedImage(text),
            Value::String(text) if !text.is_empty() => Entry::PlainName(text),
            _ => Entry::Unrecognized,
        }
    }

    fn into_record(self, position: usize, side: Side) -> Option<CharacterRecord> {
        match self {
            Entry::Named { name, image } => Some(CharacterRecord::new(name, image)),
            Entry::PlainName(name) => Some(CharacterRecord::new(name, "")),
            Entry::EmbeddedImage(blob) => {
                Some(CharacterRecord::new(side.placeholder_name(position), blob))
            }
            Entry::Unrecognized => None,
        }
    }
}

pub fn is_embedded_image(text: &str) -> bool {
    text.starts_with(EMBEDDED_IMAGE_MARKER)
}

/// Normalize a raw roster value from a request body or a stored row.
///
/// Anything that is not an array yields an empty roster. Surviving elements
/// keep their input order; placeholder numbers follow the element's position
/// in the input, dropped elements included.
pub fn normalize(raw: Option<&Value>, side: Side) -> Vec<CharacterRecord> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| Entry::classify(item).into_record(position, side))
        .collect()
}

/// True when every record carries a non-empty name.
pub fn is_well_formed(records: &[CharacterRecord]) -> bool {
    records.iter().all(|record| !record.name.is_empty())
}
