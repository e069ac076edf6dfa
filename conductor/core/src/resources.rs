//! Resource Suggestions
//!
//! Videos, articles and books the backend ranks for the latest exchange.
//! The list is per request and never persisted; a new submission clears it.

use serde::{Deserialize, Serialize};

/// Kind of external resource
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ResourceKind {
    /// Short video
    Video,
    /// Web article (also the fallback for unknown kinds)
    #[default]
    Article,
    /// Book
    Book,
}

impl From<String> for ResourceKind {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            "book" => Self::Book,
            _ => Self::Article,
        }
    }
}

impl ResourceKind {
    /// Short label for list rendering
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Book => "book",
        }
    }
}

/// One suggested resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOption {
    /// Identifier, unique within one response batch
    pub id: String,
    /// Resource kind
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    /// Display title
    pub title: String,
    /// Link
    pub url: String,
    /// Rough length, e.g. "2m"
    #[serde(default, deserialize_with = "crate::api::empty_as_none")]
    pub duration: Option<String>,
    /// Why it may help
    #[serde(default, deserialize_with = "crate::api::empty_as_none")]
    pub why: Option<String>,
    /// Publisher
    #[serde(default, deserialize_with = "crate::api::empty_as_none")]
    pub source: Option<String>,
}

/// Resource list shown next to the insight panel
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePanel {
    /// Ordered suggestions
    pub options: Vec<ResourceOption>,
    /// Backend recommends talking to a clinician
    pub needs_clinician: bool,
    /// Crisis-support link supplied by the backend
    pub crisis_link: Option<String>,
    /// A fetch is in flight
    pub loading: bool,
}

impl ResourcePanel {
    /// Empty panel with a fetch in flight
    #[must_use]
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Ids currently shown (sent as `exclude_ids` when asking for more)
    #[must_use]
    pub fn shown_ids(&self) -> Vec<String> {
        self.options.iter().map(|o| o.id.clone()).collect()
    }

    /// Whether nothing is shown
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
