//! Submissions held back by moderation until their author confirms.
//!
//! Nothing here touches the database: a held post or comment only exists in
//! memory and is dropped on discard, on expiry, or on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use solace_types::moderation::ModerationVerdict;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub author_name: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CommentDraft {
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum Draft {
    Post(PostDraft),
    Comment(CommentDraft),
}

impl Draft {
    pub fn content(&self) -> &str {
        match self {
            Self::Post(p) => &p.content,
            Self::Comment(c) => &c.content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub user_id: Uuid,
    pub draft: Draft,
    pub verdict: ModerationVerdict,
    created: Instant,
}

#[derive(Clone)]
pub struct PendingSubmissions {
    inner: Arc<RwLock<HashMap<Uuid, PendingSubmission>>>,
    ttl: Duration,
}

impl PendingSubmissions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn hold(&self, user_id: Uuid, draft: Draft, verdict: ModerationVerdict) -> Uuid {
        let id = Uuid::new_v4();
        let pending = PendingSubmission {
            user_id,
            draft,
            verdict,
            created: Instant::now(),
        };
        self.inner.write().await.insert(id, pending);
        id
    }

    /// Remove and return the submission if it belongs to `user_id` and has
    /// not expired. Someone else's submission is left in place.
    pub async fn take(&self, id: Uuid, user_id: Uuid) -> Option<PendingSubmission> {
        let mut map = self.inner.write().await;
        let (owned, expired) = match map.get(&id) {
            Some(p) => (p.user_id == user_id, p.created.elapsed() > self.ttl),
            None => return None,
        };
        if !owned {
            return None;
        }
        let taken = map.remove(&id);
        if expired { None } else { taken }
    }

    pub async fn discard(&self, id: Uuid, user_id: Uuid) -> bool {
        self.take(id, user_id).await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired submissions. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, p| p.created.elapsed() <= self.ttl);
        before - map.len()
    }

    /// Background task that prunes expired submissions on an interval.
    pub async fn run_sweeper(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let swept = self.sweep_expired().await;
            if swept > 0 {
                info!("Sweeper: dropped {} expired pending submissions", swept);
            }
        }
    }
}
