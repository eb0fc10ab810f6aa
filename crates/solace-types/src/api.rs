use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Achievement, DiaryEntry, Memory, Profile};

// -- JWT Claims --

/// JWT claims issued by `/auth/*` and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Profile --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub display_name: String,
    pub age: Option<u16>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub age: Option<u16>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub profile: Profile,
    pub new_achievements: Vec<Achievement>,
}

// -- Diary --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveDiaryRequest {
    pub content: String,
}

/// A diary page as the editor sees it. Future dates are read-only.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiaryPageResponse {
    pub date: NaiveDate,
    pub editable: bool,
    pub notice: Option<String>,
    pub entry: Option<DiaryEntry>,
    pub memories: Vec<Memory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveDiaryResponse {
    pub entry: DiaryEntry,
    pub removed_images: Vec<String>,
    pub linked_memories: usize,
    pub new_achievements: Vec<Achievement>,
    /// Best-effort steps that failed after the entry itself was stored.
    pub warnings: Vec<String>,
}

// -- Media & memories --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadMediaResponse {
    pub id: Uuid,
    pub url: String,
    pub size: u64,
    /// Always true: every inserted image asks the user for its context once.
    pub memory_prompt: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMemoryRequest {
    pub image_url: String,
    pub entry_date: NaiveDate,
    pub context: String,
    pub mood: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMediaResponse {
    pub removed_memories: usize,
}

// -- Community --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleReactionResponse {
    pub added: bool,
    pub reaction_count: u32,
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    pub reply: String,
}

// -- Insights --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodPoint {
    pub date: NaiveDate,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodDistribution {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Declining,
    Steady,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodAnalyticsResponse {
    pub days: u32,
    pub series: Vec<MoodPoint>,
    pub average: Option<f64>,
    pub min: Option<u8>,
    pub max: Option<u8>,
    pub trend: MoodTrend,
    pub distribution: MoodDistribution,
    /// True when the user has no scored entries and sample data is shown.
    pub fallback: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodCalendarResponse {
    pub month: String,
    pub days: Vec<MoodPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
    pub summary: Option<String>,
    pub fallback: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub display_name: Option<String>,
    pub entry_count: u32,
    pub current_streak: u32,
    pub average_mood_7d: Option<f64>,
    pub latest_mood: Option<MoodPoint>,
    pub recent_achievements: Vec<Achievement>,
    pub recommendations: Vec<String>,
    /// True when the user has no entries yet or default recommendations are shown.
    pub fallback: bool,
}
