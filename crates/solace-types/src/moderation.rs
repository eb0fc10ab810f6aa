use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, CommunityPost};

/// Label assigned to submitted text by the safety check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationCategory {
    UrgentRisk,
    HarmfulInstruction,
    SupportNeeded,
    Safe,
}

impl ModerationCategory {
    /// Unknown labels map to `Safe`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "urgent_risk" => Self::UrgentRisk,
            "harmful_instruction" => Self::HarmfulInstruction,
            "support_needed" => Self::SupportNeeded,
            _ => Self::Safe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UrgentRisk => "urgent_risk",
            Self::HarmfulInstruction => "harmful_instruction",
            Self::SupportNeeded => "support_needed",
            Self::Safe => "safe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub category: ModerationCategory,
    pub reason: String,
}

/// Stored alongside every published post or comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRecord {
    pub category: ModerationCategory,
    pub reason: String,
    pub checked_at: DateTime<Utc>,
    pub confirmed_by_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisResource {
    pub name: String,
    pub contact: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommunityItem {
    Post(CommunityPost),
    Comment(Comment),
}

/// Result of submitting a post or comment through moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Published {
        item: CommunityItem,
    },
    /// Held until the author explicitly confirms ("post anyway").
    NeedsConfirmation {
        submission_id: Uuid,
        message: String,
        reason: String,
    },
    /// Crisis content: never stored, the client shows the resource modal.
    Blocked {
        reason: String,
        crisis_resources: Vec<CrisisResource>,
    },
    Rejected {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_are_safe() {
        assert_eq!(ModerationCategory::from_label("spam"), ModerationCategory::Safe);
        assert_eq!(ModerationCategory::from_label(""), ModerationCategory::Safe);
        assert_eq!(
            ModerationCategory::from_label(" URGENT_RISK "),
            ModerationCategory::UrgentRisk
        );
    }

    #[test]
    fn outcome_is_tagged_by_status() {
        let outcome = SubmissionOutcome::Rejected {
            message: "nope".into(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["message"], "nope");
    }
}
