//! Insight Snapshot
//!
//! The most recently computed mood/strategy/safety picture for a session.
//! Exactly one snapshot is live per session; a successful exchange replaces it
//! wholesale, a failed one only clears the `analyzing` flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mood categories in fixed negative → positive order
///
/// The index of a category in [`Mood::ORDERED`] is its position on the gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Anger, hostility, aversion
    Anger,
    /// Fear, panic, overwhelm
    Distress,
    /// Low, down, tearful
    Sadness,
    /// No strong affect
    Neutral,
    /// Hopeful, pleasantly surprised
    Optimism,
    /// Happy, content
    Joy,
}

impl Mood {
    /// All categories, in gauge order
    pub const ORDERED: [Mood; 6] = [
        Mood::Anger,
        Mood::Distress,
        Mood::Sadness,
        Mood::Neutral,
        Mood::Optimism,
        Mood::Joy,
    ];

    /// Parse a backend mood label (case-insensitive, surrounding whitespace ignored)
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ORDERED
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(label))
    }

    /// Position in the gauge ordering (0-based)
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Anger => 0,
            Self::Distress => 1,
            Self::Sadness => 2,
            Self::Neutral => 3,
            Self::Optimism => 4,
            Self::Joy => 5,
        }
    }

    /// Wire label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anger => "anger",
            Self::Distress => "distress",
            Self::Sadness => "sadness",
            Self::Neutral => "neutral",
            Self::Optimism => "optimism",
            Self::Joy => "joy",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safety level reported by the backend
///
/// Unrecognised labels deserialize as [`SafetyLevel::Watch`] so a new level
/// from the server never reads as "safe".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SafetyLevel {
    /// No risk indicators
    #[default]
    Safe,
    /// Elevated, keep an eye on it
    Watch,
    /// Risk of self-harm
    CrisisSelf,
    /// Risk of harm to others
    CrisisOthers,
}

impl SafetyLevel {
    /// Whether this level calls for crisis support
    #[must_use]
    pub fn is_crisis(self) -> bool {
        matches!(self, Self::CrisisSelf | Self::CrisisOthers)
    }

    /// Crisis hint sent with suggestion requests
    #[must_use]
    pub fn crisis(self) -> Crisis {
        match self {
            Self::CrisisSelf => Crisis::SelfHarm,
            Self::CrisisOthers => Crisis::OtherHarm,
            Self::Safe | Self::Watch => Crisis::None,
        }
    }

    /// Badge label for surfaces
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Watch => "Watch",
            Self::CrisisSelf => "Crisis (self)",
            Self::CrisisOthers => "Crisis (others)",
        }
    }
}

impl From<String> for SafetyLevel {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "safe" | "" => Self::Safe,
            "crisis_self" => Self::CrisisSelf,
            "crisis_others" => Self::CrisisOthers,
            _ => Self::Watch,
        }
    }
}

/// Crisis hint for the suggestion endpoints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crisis {
    /// No crisis detected
    #[default]
    None,
    /// Self-harm risk
    SelfHarm,
    /// Risk to others
    OtherHarm,
}

/// Safety assessment
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Safety {
    /// Assessed level
    #[serde(default)]
    pub level: SafetyLevel,
    /// Short explanation (may be empty)
    #[serde(default, deserialize_with = "crate::api::null_as_empty")]
    pub reason: String,
}

/// Provenance for a suggested strategy
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySource {
    /// Canonical source page
    #[serde(default, deserialize_with = "crate::api::null_as_empty")]
    pub url: String,
    /// Publisher, e.g. "NHS"
    #[serde(default, deserialize_with = "crate::api::null_as_empty")]
    pub name: String,
}

impl StrategySource {
    /// A source with neither name nor url carries no information
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.trim().is_empty() && self.name.trim().is_empty()
    }
}

/// Latest insight for a session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightSnapshot {
    /// Mood label as reported (may be outside the six categories)
    pub mood: Option<String>,
    /// Classifier confidence in [0, 1]
    pub mood_confidence: Option<f32>,
    /// Suggested micro-step
    pub strategy: Option<String>,
    /// Why the strategy was suggested
    pub strategy_why: Option<String>,
    /// Where the strategy comes from
    pub strategy_source: Option<StrategySource>,
    /// Safety assessment
    pub safety: Safety,
    /// Whether a new exchange is being analysed
    pub analyzing: bool,
}

impl InsightSnapshot {
    /// The mood as a gauge category, if it is one
    #[must_use]
    pub fn mood_category(&self) -> Option<Mood> {
        self.mood.as_deref().and_then(Mood::from_label)
    }

    /// Whether the surface should show the crisis-support link
    #[must_use]
    pub fn needs_crisis_support(&self) -> bool {
        self.safety.level.is_crisis()
    }
}
