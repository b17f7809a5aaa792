//! Guardrail verdicts and outcomes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Refusal surfaced when the topical guardrail vetoes a request.
pub const TOPICAL_REFUSAL: &str = "Topical guardrail triggered";

/// Refusal surfaced when the moderation guardrail flags generated content.
pub const MODERATION_REFUSAL: &str = "Moderation guardrail flagged";

/// Label returned by the topical classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicLabel {
    Allowed,
    NotAllowed,
}

impl TopicLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::NotAllowed => "not_allowed",
        }
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicLabel {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allowed" => Ok(Self::Allowed),
            "not_allowed" => Ok(Self::NotAllowed),
            other => Err(LlmError::ParseError(format!(
                "unknown topic label '{other}'"
            ))),
        }
    }
}

/// Score on the moderation rubric (nominally 1..=5).
///
/// Parsing accepts any integer; range is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModerationScore(pub i64);

impl ModerationScore {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub const fn value(&self) -> i64 {
        self.0
    }

    pub const fn in_rubric_range(&self) -> bool {
        self.0 >= Self::MIN && self.0 <= Self::MAX
    }
}

impl FromStr for ModerationScore {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| {
            LlmError::ParseError(format!("moderation score '{}' is not an integer: {e}", s.trim()))
        })
    }
}

impl fmt::Display for ModerationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decision returned by a single guardrail check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailVerdict {
    Pass,
    Veto { refusal: String },
}

impl GuardrailVerdict {
    pub fn veto(refusal: impl Into<String>) -> Self {
        Self::Veto {
            refusal: refusal.into(),
        }
    }

    pub const fn is_veto(&self) -> bool {
        matches!(self, Self::Veto { .. })
    }
}

/// Final outcome of a guarded chat call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardedResponse {
    /// Generated text that passed every guardrail.
    Generated { content: String },
    /// A guardrail vetoed; `message` is its canned refusal.
    Refused { guardrail: String, message: String },
}

impl GuardedResponse {
    pub fn generated(content: impl Into<String>) -> Self {
        Self::Generated {
            content: content.into(),
        }
    }

    pub fn refused(guardrail: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refused {
            guardrail: guardrail.into(),
            message: message.into(),
        }
    }

    /// The string surfaced to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { content } => content,
            Self::Refused { message, .. } => message,
        }
    }

    pub const fn is_refused(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }

    /// Name of the vetoing guardrail, if refused.
    pub fn refused_by(&self) -> Option<&str> {
        match self {
            Self::Refused { guardrail, .. } => Some(guardrail),
            Self::Generated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_label_parses_case_insensitively() {
        assert_eq!(" Not_Allowed\n".parse::<TopicLabel>().unwrap(), TopicLabel::NotAllowed);
        assert_eq!("allowed".parse::<TopicLabel>().unwrap(), TopicLabel::Allowed);
        assert!("maybe".parse::<TopicLabel>().is_err());
    }

    #[test]
    fn moderation_score_parses_without_range_check() {
        assert_eq!("3".parse::<ModerationScore>().unwrap(), ModerationScore(3));
        let wild = " 9 ".parse::<ModerationScore>().unwrap();
        assert_eq!(wild.value(), 9);
        assert!(!wild.in_rubric_range());
    }

    #[test]
    fn moderation_score_rejects_non_integer() {
        let err = "3/5".parse::<ModerationScore>().unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn verdict_veto_carries_refusal() {
        let veto = GuardrailVerdict::veto(TOPICAL_REFUSAL);
        assert!(veto.is_veto());
        assert_eq!(
            veto,
            GuardrailVerdict::Veto {
                refusal: TOPICAL_REFUSAL.to_string()
            }
        );
        assert!(!GuardrailVerdict::Pass.is_veto());
    }

    #[test]
    fn guarded_response_text() {
        let refused = GuardedResponse::refused("topical", TOPICAL_REFUSAL);
        assert_eq!(refused.text(), TOPICAL_REFUSAL);
        assert_eq!(refused.refused_by(), Some("topical"));

        let ok = GuardedResponse::generated("Labradors are friendly.");
        assert!(!ok.is_refused());
        assert_eq!(ok.text(), "Labradors are friendly.");
    }
}
