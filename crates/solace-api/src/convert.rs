//! Row-to-model conversions. Corrupt stored values are logged and replaced
//! with defaults rather than failing the whole listing.

use chrono::{DateTime, NaiveDate, Utc};
use solace_db::models::{
    AchievementRow, CommentRow, ConversationRow, DiaryEntryRow, MemoryRow, PostRow, ProfileRow,
};
use solace_types::models::{
    Achievement, BadgeKind, Comment, CommunityPost, Conversation, DiaryEntry, Memory, Profile,
};
use tracing::warn;
use uuid::Uuid;

pub(crate) fn timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn uuid(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}

pub(crate) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|e| {
        warn!("Corrupt date '{}': {}", raw, e);
        NaiveDate::default()
    })
}

pub(crate) fn mood(score: Option<i64>) -> Option<u8> {
    score.and_then(|s| u8::try_from(s).ok())
}

pub(crate) fn profile(row: ProfileRow) -> Profile {
    Profile {
        user_id: uuid(&row.user_id),
        display_name: row.display_name,
        age: row.age.and_then(|a| u16::try_from(a).ok()),
        gender: row.gender,
        date_of_birth: row.date_of_birth.as_deref().map(date),
        avatar: row.avatar,
        created_at: timestamp(&row.created_at),
        updated_at: timestamp(&row.updated_at),
    }
}

pub(crate) fn diary_entry(row: DiaryEntryRow) -> DiaryEntry {
    DiaryEntry {
        id: uuid(&row.id),
        entry_date: date(&row.entry_date),
        content: row.content,
        mood_score: mood(row.mood_score),
        ai_analysis: row.ai_analysis,
        created_at: timestamp(&row.created_at),
        updated_at: timestamp(&row.updated_at),
    }
}

pub(crate) fn memory(row: MemoryRow) -> Memory {
    Memory {
        id: uuid(&row.id),
        diary_entry_id: row.diary_entry_id.as_deref().map(uuid),
        entry_date: date(&row.entry_date),
        image_url: row.image_url,
        context: row.context,
        mood: row.mood,
        created_at: timestamp(&row.created_at),
    }
}

pub(crate) fn achievement(row: AchievementRow) -> Achievement {
    let badge = BadgeKind::parse(&row.badge).unwrap_or_else(|| {
        warn!("Unknown badge '{}' on achievement '{}'", row.badge, row.id);
        BadgeKind::Welcome
    });
    Achievement {
        id: uuid(&row.id),
        badge,
        title: row.title,
        description: row.description,
        earned_at: timestamp(&row.earned_at),
    }
}

pub(crate) fn post(row: PostRow, viewer: Uuid) -> CommunityPost {
    let tags: Vec<String> = serde_json::from_str(&row.tags).unwrap_or_else(|e| {
        warn!("Corrupt tags on post '{}': {}", row.id, e);
        Vec::new()
    });
    CommunityPost {
        is_own: row.user_id.as_deref() == Some(viewer.to_string().as_str()),
        id: uuid(&row.id),
        author_name: row.author_name,
        content: row.content,
        tags,
        reaction_count: row.reaction_count.max(0) as u32,
        comment_count: row.comment_count.max(0) as u32,
        created_at: timestamp(&row.created_at),
    }
}

pub(crate) fn comment(row: CommentRow, viewer: Uuid) -> Comment {
    Comment {
        is_own: row.user_id.as_deref() == Some(viewer.to_string().as_str()),
        id: uuid(&row.id),
        post_id: uuid(&row.post_id),
        author_name: row.author_name,
        content: row.content,
        parent_comment_id: row.parent_comment_id.as_deref().map(uuid),
        created_at: timestamp(&row.created_at),
    }
}

pub(crate) fn conversation(row: ConversationRow) -> Conversation {
    Conversation {
        id: uuid(&row.id),
        user_message: row.user_message,
        ai_response: row.ai_response,
        created_at: timestamp(&row.created_at),
    }
}
