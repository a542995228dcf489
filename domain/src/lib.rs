use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize}; // For document and query shapes

// --- Author ---

/// Identifies and names the writer of a document.
///
/// The id is opaque to the repository: no uniqueness or referential
/// integrity is enforced here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// --- Document ---

/// The primary stored record.
///
/// Every field is optional at construction time; the repository back-fills
/// `id` and `created` on first save and guarantees both are present on any
/// stored document. An empty-string id counts as absent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Document {
    /// True when the document carries no usable identity yet.
    pub fn has_no_id(&self) -> bool {
        match &self.id {
            Some(id) => id.is_empty(),
            None => true,
        }
    }
}

// --- SearchRequest ---

/// A query descriptor: five independently optional criteria combined with
/// logical AND. A criterion that is `None` (or an empty list) matches every
/// document.
///
/// Within a list criterion the match is OR: any one prefix / substring /
/// author id satisfies it. The timestamp bounds are inclusive on both ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_contents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_to: Option<DateTime<Utc>>,
}

impl SearchRequest {
    /// The identity filter: matches every stored document.
    pub fn any() -> Self {
        Self::default()
    }
}
