//! Safety screening for community posts and comments.

use std::str::FromStr;

use solace_ai::{TextModel, parse, prompts};
use solace_types::moderation::{CrisisResource, ModerationCategory, ModerationVerdict};
use tracing::warn;

/// Reason recorded when the classifier could not be consulted.
pub const CHECK_FAILED_REASON: &str = "AI check failed";

pub const HARMFUL_CONTENT_MESSAGE: &str =
    "This can't be shared because it may put other members at risk. Please review our community guidelines.";

pub const FALLBACK_SUPPORT_MESSAGE: &str = "It sounds like you're carrying a lot right now, and it takes courage \
     to put it into words. You're not alone in this. If you can, consider reaching out to someone you trust.";

/// What happens when the classifier errors or returns something unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Treat the submission as safe and publish it.
    Open,
    /// Refuse the submission until the classifier is reachable again.
    Closed,
}

impl FromStr for FailMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown moderation fail mode '{other}' (expected open or closed)")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModerationPolicy {
    pub fail_mode: FailMode,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            fail_mode: FailMode::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    Verdict(ModerationVerdict),
    /// Classifier failed and the policy is fail-closed.
    Unavailable,
}

/// Classify `content`. `context` is the parent post when screening a comment.
pub async fn screen(
    model: &dyn TextModel,
    policy: ModerationPolicy,
    content: &str,
    context: Option<&str>,
) -> Screening {
    let prompt = prompts::classification(content, context);
    let result = match model.generate(&prompt).await {
        Ok(raw) => parse::classification(&raw),
        Err(e) => Err(e),
    };

    match result {
        Ok(verdict) => Screening::Verdict(verdict),
        Err(e) => match policy.fail_mode {
            FailMode::Open => {
                warn!(error = %e, "moderation check failed, publishing as safe");
                Screening::Verdict(ModerationVerdict {
                    category: ModerationCategory::Safe,
                    reason: CHECK_FAILED_REASON.to_string(),
                })
            }
            FailMode::Closed => {
                warn!(error = %e, "moderation check failed, refusing submission");
                Screening::Unavailable
            }
        },
    }
}

/// Empathetic note for `support_needed` submissions; falls back to a fixed
/// message if the model is unavailable.
pub async fn support_message(model: &dyn TextModel, content: &str) -> String {
    match model.generate(&prompts::support_message(content)).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => FALLBACK_SUPPORT_MESSAGE.to_string(),
        Err(e) => {
            warn!(error = %e, "support message generation failed, using fallback");
            FALLBACK_SUPPORT_MESSAGE.to_string()
        }
    }
}

/// Hotlines shown in the crisis modal.
pub fn crisis_resources() -> Vec<CrisisResource> {
    [
        ("Emergency services", "Call your local emergency number", "Worldwide"),
        ("988 Suicide & Crisis Lifeline", "Call or text 988", "United States"),
        ("Crisis Text Line", "Text HOME to 741741", "United States & Canada"),
        ("Samaritans", "Call 116 123", "United Kingdom & Ireland"),
        ("Tele MANAS", "Call 14416", "India"),
        ("Find a Helpline", "https://findahelpline.com", "International directory"),
    ]
    .into_iter()
    .map(|(name, contact, region)| CrisisResource {
        name: name.to_string(),
        contact: contact.to_string(),
        region: region.to_string(),
    })
    .collect()
}
