//! Wire types for the companion API

use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::insight::{Crisis, Safety, StrategySource};
use crate::messages::MessageRole;
use crate::resources::ResourceOption;

/// Body of `POST /chat`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// What the user wrote
    pub user_text: String,
    /// Stable identity (the backend falls back to "anon" when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Create a request for a user
    pub fn new(user_text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            user_id: Some(user_id.into()),
        }
    }
}

/// Reply of `POST /chat`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Mood label
    pub mood: String,
    /// Suggested micro-step
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub strategy: String,
    /// Supportive reply shown in the chat log
    pub encouragement: String,
    /// Backend flagged a crisis
    #[serde(default)]
    pub crisis_detected: bool,
    /// Safety assessment
    #[serde(default)]
    pub safety: Option<Safety>,
    /// Rationale for the strategy
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub strategy_why: Option<String>,
    /// Provenance for the strategy
    #[serde(default)]
    pub strategy_source: Option<StrategySource>,
    /// A concrete micro-step was offered this turn
    #[serde(default)]
    pub advice_given: bool,
    /// Classifier confidence in [0, 1]
    #[serde(default)]
    pub mood_confidence: Option<f32>,
}

impl ChatReply {
    /// Check the reply carries at least an encouragement and a mood
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Malformed`] naming the missing field.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.encouragement.trim().is_empty() {
            return Err(ApiError::Malformed("reply has no encouragement".to_string()));
        }
        if self.mood.trim().is_empty() {
            return Err(ApiError::Malformed("reply has no mood".to_string()));
        }
        Ok(())
    }
}

/// One prior turn sent as suggestion context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// Author of the turn
    pub role: MessageRole,
    /// Turn text
    pub content: String,
}

/// Body of `POST /suggest/resources`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Text of the exchange the resources are for
    pub user_text: String,
    /// Resolved mood label
    pub mood: String,
    /// Crisis hint derived from the safety level
    pub crisis: Crisis,
    /// Recent turns, oldest first
    pub history: Vec<HistoryTurn>,
    /// Resource ids the user has already seen
    pub exclude_ids: Vec<String>,
}

/// Reply of `POST /suggest/resources`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReply {
    /// Ranked suggestions
    #[serde(default)]
    pub options: Vec<ResourceOption>,
    /// Backend recommends a clinician
    #[serde(default)]
    pub needs_clinician: bool,
    /// Crisis-support link
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub crisis_link: Option<String>,
}

/// Body of `POST /suggest/strategy`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequest {
    /// Text of the exchange the strategy is for
    pub user_text: String,
    /// Resolved mood label
    pub mood: String,
    /// Crisis hint derived from the safety level
    pub crisis: Crisis,
    /// Recent turns, oldest first
    pub history: Vec<HistoryTurn>,
}

/// Reply of `POST /suggest/strategy`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReply {
    /// Suggested micro-step
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub strategy: String,
}

/// Signed-in user as returned by `GET /auth/me`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// OAuth subject
    #[serde(default)]
    pub sub: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,
}

impl UserProfile {
    /// An empty object means "not signed in"
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.sub.is_none() && self.email.is_none()
    }

    /// Name to greet the user with
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.email.as_deref().and_then(|e| e.split('@').next()))
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::SafetyLevel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chat_reply_minimal() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"mood":"sadness","strategy":"Try a 60s breath","encouragement":"You're not alone.","crisis_detected":false}"#,
        )
        .unwrap();
        assert_eq!(reply.mood, "sadness");
        assert!(reply.safety.is_none());
        assert!(reply.mood_confidence.is_none());
        assert!(reply.validate().is_ok());
    }

    #[test]
    fn test_chat_reply_full() {
        let reply: ChatReply = serde_json::from_str(
            r#"{
                "mood":"distress",
                "strategy":"Box breathing",
                "encouragement":"That sounds hard.",
                "crisis_detected":true,
                "safety":{"level":"crisis_self","reason":"self-harm language"},
                "strategy_why":"",
                "strategy_source":{"name":"NHS","url":"https://www.nhs.uk"},
                "advice_given":true,
                "mood_confidence":0.82
            }"#,
        )
        .unwrap();
        assert_eq!(reply.safety.unwrap().level, SafetyLevel::CrisisSelf);
        assert_eq!(reply.strategy_why, None);
        assert_eq!(reply.strategy_source.unwrap().name, "NHS");
        assert_eq!(reply.mood_confidence, Some(0.82));
    }

    #[test]
    fn test_chat_reply_missing_encouragement_is_rejected() {
        let parsed = serde_json::from_str::<ChatReply>(r#"{"mood":"joy"}"#);
        assert!(parsed.is_err());

        let reply: ChatReply =
            serde_json::from_str(r#"{"mood":"joy","encouragement":"   "}"#).unwrap();
        assert!(matches!(reply.validate(), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_resource_request_wire_shape() {
        let request = ResourceRequest {
            user_text: "can't sleep".into(),
            mood: "distress".into(),
            crisis: Crisis::None,
            history: vec![HistoryTurn {
                role: MessageRole::User,
                content: "can't sleep".into(),
            }],
            exclude_ids: vec!["yt-1".into()],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "user_text": "can't sleep",
                "mood": "distress",
                "crisis": "none",
                "history": [{"role": "user", "content": "can't sleep"}],
                "exclude_ids": ["yt-1"]
            })
        );
    }

    #[test]
    fn test_resource_reply_defaults() {
        let reply: ResourceReply = serde_json::from_str("{}").unwrap();
        assert!(reply.options.is_empty());
        assert!(!reply.needs_clinician);
        assert!(reply.crisis_link.is_none());
    }

    #[test]
    fn test_user_profile_anonymous() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.is_anonymous());

        let profile: UserProfile =
            serde_json::from_str(r#"{"sub":"1","email":"sam@example.com"}"#).unwrap();
        assert!(!profile.is_anonymous());
        assert_eq!(profile.display_name(), Some("sam"));
    }

    #[test]
    fn test_chat_request_omits_missing_user_id() {
        let request = ChatRequest {
            user_text: "hi".into(),
            user_id: None,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"user_text":"hi"}"#
        );
    }
}
