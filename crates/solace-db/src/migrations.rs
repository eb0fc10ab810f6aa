use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE profiles (
                user_id         TEXT PRIMARY KEY REFERENCES users(id),
                display_name    TEXT NOT NULL,
                age             INTEGER,
                gender          TEXT,
                date_of_birth   TEXT,
                avatar          TEXT,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE diary_entries (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                entry_date  TEXT NOT NULL,
                content     TEXT NOT NULL,
                mood_score  INTEGER,
                ai_analysis TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, entry_date)
            );

            CREATE TABLE media (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                content_type    TEXT NOT NULL,
                size            INTEGER NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE memories (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                diary_entry_id  TEXT REFERENCES diary_entries(id),
                entry_date      TEXT NOT NULL,
                image_url       TEXT NOT NULL,
                context         TEXT NOT NULL,
                mood            TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_memories_user_date ON memories(user_id, entry_date);
            CREATE INDEX idx_memories_image ON memories(user_id, image_url);

            CREATE TABLE achievements (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                badge       TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                earned_at   TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, badge)
            );

            CREATE TABLE community_posts (
                id              TEXT PRIMARY KEY,
                user_id         TEXT REFERENCES users(id),
                author_name     TEXT,
                content         TEXT NOT NULL,
                tags            TEXT NOT NULL DEFAULT '[]',
                reaction_count  INTEGER NOT NULL DEFAULT 0,
                comment_count   INTEGER NOT NULL DEFAULT 0,
                moderation      TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_posts_created ON community_posts(created_at);

            CREATE TABLE comments (
                id                  TEXT PRIMARY KEY,
                post_id             TEXT NOT NULL REFERENCES community_posts(id),
                user_id             TEXT REFERENCES users(id),
                author_name         TEXT,
                content             TEXT NOT NULL,
                parent_comment_id   TEXT REFERENCES comments(id),
                moderation          TEXT NOT NULL,
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_comments_post ON comments(post_id, created_at);

            CREATE TABLE post_reactions (
                post_id     TEXT NOT NULL REFERENCES community_posts(id),
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (post_id, user_id)
            );

            CREATE TABLE conversations (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id),
                user_message    TEXT NOT NULL,
                ai_response     TEXT NOT NULL,
                context         TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_conversations_user ON conversations(user_id, created_at);

            CREATE TABLE user_ai_summaries (
                user_id         TEXT PRIMARY KEY REFERENCES users(id),
                summary         TEXT NOT NULL,
                recommendations TEXT NOT NULL DEFAULT '[]',
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
