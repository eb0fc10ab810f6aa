use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of recommendations kept per user after each summary refresh.
pub const RECOMMENDATION_COUNT: usize = 5;

/// Shown when a user has no generated recommendations yet, or the refresh
/// returned fewer than [`RECOMMENDATION_COUNT`] items.
pub const DEFAULT_RECOMMENDATIONS: [&str; RECOMMENDATION_COUNT] = [
    "Take a ten-minute walk outside and notice five things you can see.",
    "Write down three small things that went well today.",
    "Try a four-seven-eight breathing exercise before bed.",
    "Reach out to a friend or family member you trust.",
    "Set a gentle, achievable goal for tomorrow morning.",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: Option<u16>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    /// Rich-text body as produced by the editor (HTML).
    pub content: String,
    pub mood_score: Option<u8>,
    pub ai_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-annotated image embedded in a diary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub diary_entry_id: Option<Uuid>,
    pub entry_date: NaiveDate,
    pub image_url: String,
    pub context: String,
    pub mood: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Welcome,
    FirstEntry,
    WeekOfEntries,
    MonthOfEntries,
    SevenDayStreak,
}

impl BadgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::FirstEntry => "first_entry",
            Self::WeekOfEntries => "week_of_entries",
            Self::MonthOfEntries => "month_of_entries",
            Self::SevenDayStreak => "seven_day_streak",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "welcome" => Some(Self::Welcome),
            "first_entry" => Some(Self::FirstEntry),
            "week_of_entries" => Some(Self::WeekOfEntries),
            "month_of_entries" => Some(Self::MonthOfEntries),
            "seven_day_streak" => Some(Self::SevenDayStreak),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome aboard",
            Self::FirstEntry => "First words",
            Self::WeekOfEntries => "Seven pages",
            Self::MonthOfEntries => "Thirty pages",
            Self::SevenDayStreak => "One week streak",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Welcome => "Completed onboarding and set up a profile.",
            Self::FirstEntry => "Wrote the first diary entry.",
            Self::WeekOfEntries => "Wrote seven diary entries.",
            Self::MonthOfEntries => "Wrote thirty diary entries.",
            Self::SevenDayStreak => "Journaled seven days in a row.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub badge: BadgeKind,
    pub title: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: Uuid,
    /// `None` for anonymous posts.
    pub author_name: Option<String>,
    pub is_own: bool,
    pub content: String,
    pub tags: Vec<String>,
    pub reaction_count: u32,
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: Option<String>,
    pub is_own: bool,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_message: String,
    pub ai_response: String,
    pub created_at: DateTime<Utc>,
}

/// What the assistant is told about the user before answering a chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    pub display_name: Option<String>,
    pub recent_moods: Vec<u8>,
    pub summary: Option<String>,
}
