//! Domain models for the movie catalog.
//!
//! Movies reference four kinds of named properties: actors and categories
//! through junction tables, series and studio through nullable foreign keys.
//! Property names are unique within their kind.

use serde::{Deserialize, Serialize};

/// The four property tables a movie can reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PropertyKind {
    Actor,
    Category,
    Series,
    Studio,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 4] = [
        PropertyKind::Actor,
        PropertyKind::Category,
        PropertyKind::Series,
        PropertyKind::Studio,
    ];

    /// Capitalized label used in user facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Actor => "Actor",
            PropertyKind::Category => "Category",
            PropertyKind::Series => "Series",
            PropertyKind::Studio => "Studio",
        }
    }

    /// Name of the backing table. The link directory under the library root
    /// uses the same name.
    pub fn table(&self) -> &'static str {
        match self {
            PropertyKind::Actor => "actors",
            PropertyKind::Category => "categories",
            PropertyKind::Series => "series",
            PropertyKind::Studio => "studios",
        }
    }

    /// Series and studios carry a derived sort name with a unique constraint,
    /// actors and categories do not.
    pub fn has_sort_name(&self) -> bool {
        matches!(self, PropertyKind::Series | PropertyKind::Studio)
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named property row (actor, category, series or studio).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: usize,
    pub name: String,
}

/// Lightweight movie listing entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MovieFile {
    pub id: usize,
    pub filename: String,
}

/// A movie with all of its properties resolved.
///
/// `actors` and `categories` are ordered by name. `sort_name` and `processed`
/// are bookkeeping columns that never leave the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: usize,
    pub filename: String,
    pub name: Option<String>,
    pub actors: Vec<Property>,
    pub categories: Vec<Property>,
    pub series: Option<Property>,
    pub series_number: Option<i64>,
    pub studio: Option<Property>,
    #[serde(skip)]
    pub sort_name: Option<String>,
    #[serde(skip)]
    pub processed: bool,
}

impl MovieDetails {
    /// Name for messages, empty when the movie has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Replacement values for a movie's editable fields. Fields left `None`
/// are cleared, not kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieUpdate {
    pub name: Option<String>,
    pub series_id: Option<usize>,
    pub series_number: Option<i64>,
    pub studio_id: Option<usize>,
}

/// A movie row to insert, with the property ids to attach.
#[derive(Clone, Debug, Default)]
pub struct NewMovie {
    pub filename: String,
    pub name: Option<String>,
    pub studio_id: Option<usize>,
    pub series_id: Option<usize>,
    pub series_number: Option<i64>,
    pub actor_ids: Vec<usize>,
    pub category_ids: Vec<usize>,
    pub processed: bool,
}
