//! Parsers for the model's JSON-shaped replies.

use serde::Deserialize;
use solace_types::models::{DEFAULT_RECOMMENDATIONS, RECOMMENDATION_COUNT};
use solace_types::moderation::{ModerationCategory, ModerationVerdict};

use crate::error::AiError;

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentReading {
    pub score: u8,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryUpdate {
    pub summary: String,
    /// Always exactly [`RECOMMENDATION_COUNT`] items.
    pub recommendations: Vec<String>,
}

/// Strip Markdown code fences and surrounding prose, leaving the outermost
/// JSON object if there is one.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[derive(Deserialize)]
struct RawVerdict {
    category: String,
    #[serde(default)]
    reason: String,
}

/// Unknown categories become `Safe`; malformed JSON is an error so the
/// caller can apply its failure policy.
pub fn classification(raw: &str) -> Result<ModerationVerdict, AiError> {
    let parsed: RawVerdict = serde_json::from_str(extract_json(raw))
        .map_err(|e| AiError::Parse(format!("classification: {e}")))?;

    Ok(ModerationVerdict {
        category: ModerationCategory::from_label(&parsed.category),
        reason: parsed.reason,
    })
}

#[derive(Deserialize)]
struct RawSentiment {
    score: f64,
    analysis: Option<String>,
}

/// Accepts `{"score": n, "analysis": ...}` or a bare leading number.
/// Scores are rounded and clamped to 1..=10.
pub fn sentiment(raw: &str) -> Result<SentimentReading, AiError> {
    if let Ok(parsed) = serde_json::from_str::<RawSentiment>(extract_json(raw)) {
        return Ok(SentimentReading {
            score: clamp_score(parsed.score),
            analysis: parsed.analysis.filter(|a| !a.trim().is_empty()),
        });
    }

    let number: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let score: f64 = number
        .parse()
        .map_err(|_| AiError::Parse(format!("sentiment score from {raw:?}")))?;

    Ok(SentimentReading {
        score: clamp_score(score),
        analysis: None,
    })
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(1.0, 10.0) as u8
}

#[derive(Deserialize)]
struct RawSummary {
    summary: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// The list is cut or padded with defaults to a fixed size.
pub fn summary_update(raw: &str) -> Result<SummaryUpdate, AiError> {
    let parsed: RawSummary = serde_json::from_str(extract_json(raw))
        .map_err(|e| AiError::Parse(format!("summary: {e}")))?;

    if parsed.summary.trim().is_empty() {
        return Err(AiError::Parse("summary was empty".into()));
    }

    let mut recommendations: Vec<String> = parsed
        .recommendations
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .take(RECOMMENDATION_COUNT)
        .collect();

    for default in DEFAULT_RECOMMENDATIONS {
        if recommendations.len() == RECOMMENDATION_COUNT {
            break;
        }
        if !recommendations.iter().any(|r| r == default) {
            recommendations.push(default.to_string());
        }
    }

    Ok(SummaryUpdate {
        summary: parsed.summary.trim().to_string(),
        recommendations,
    })
}
