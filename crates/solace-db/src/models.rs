/// Database row types. these map directly to SQLite rows.
/// Distinct from solace-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct ProfileRow {
    pub user_id: String,
    pub display_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial profile edit; `None` leaves the column untouched.
#[derive(Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub avatar: Option<String>,
}

pub struct DiaryEntryRow {
    pub id: String,
    pub user_id: String,
    pub entry_date: String,
    pub content: String,
    pub mood_score: Option<i64>,
    pub ai_analysis: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of saving a diary page.
pub struct SavedEntry {
    pub entry: DiaryEntryRow,
    /// HTML stored before this save, if the page already existed.
    pub previous_content: Option<String>,
}

pub struct MemoryRow {
    pub id: String,
    pub user_id: String,
    pub diary_entry_id: Option<String>,
    pub entry_date: String,
    pub image_url: String,
    pub context: String,
    pub mood: String,
    pub created_at: String,
}

pub struct MediaRow {
    pub id: String,
    pub user_id: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: String,
}

pub struct AchievementRow {
    pub id: String,
    pub user_id: String,
    pub badge: String,
    pub title: String,
    pub description: String,
    pub earned_at: String,
}

pub struct PostRow {
    pub id: String,
    pub user_id: Option<String>,
    pub author_name: Option<String>,
    pub content: String,
    /// JSON array of tag strings.
    pub tags: String,
    pub reaction_count: i64,
    pub comment_count: i64,
    /// JSON moderation record.
    pub moderation: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub user_id: Option<String>,
    pub author_name: Option<String>,
    pub content: String,
    pub parent_comment_id: Option<String>,
    pub moderation: String,
    pub created_at: String,
}

pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub context: String,
    pub created_at: String,
}

pub struct SummaryRow {
    pub user_id: String,
    pub summary: String,
    /// JSON array of recommendation strings.
    pub recommendations: String,
    pub updated_at: String,
}
