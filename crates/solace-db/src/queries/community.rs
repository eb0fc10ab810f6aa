use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::{CommentRow, PostRow};

const POST_COLUMNS: &str =
    "id, user_id, author_name, content, tags, reaction_count, comment_count, moderation, created_at";
const COMMENT_COLUMNS: &str =
    "id, post_id, user_id, author_name, content, parent_comment_id, moderation, created_at";

impl Database {
    // -- Posts --

    pub fn insert_post(
        &self,
        id: &str,
        user_id: Option<&str>,
        author_name: Option<&str>,
        content: &str,
        tags_json: &str,
        moderation_json: &str,
    ) -> Result<PostRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO community_posts (id, user_id, author_name, content, tags, moderation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, author_name, content, tags_json, moderation_json],
            )?;
            query_post(conn, id)?.ok_or_else(|| anyhow::anyhow!("post vanished after insert: {}", id))
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Newest first, optionally only posts carrying `tag`.
    pub fn list_posts(&self, limit: u32, tag: Option<&str>) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM community_posts p
                 WHERE ?1 IS NULL OR EXISTS (SELECT 1 FROM json_each(p.tags) WHERE value = ?1)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![tag, limit], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    /// Insert a comment and bump the parent post's counter in one transaction.
    pub fn insert_comment(
        &self,
        id: &str,
        post_id: &str,
        user_id: Option<&str>,
        author_name: Option<&str>,
        content: &str,
        parent_comment_id: Option<&str>,
        moderation_json: &str,
    ) -> Result<CommentRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO comments (id, post_id, user_id, author_name, content, parent_comment_id, moderation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, post_id, user_id, author_name, content, parent_comment_id, moderation_json],
            )?;
            tx.execute(
                "UPDATE community_posts SET comment_count = comment_count + 1 WHERE id = ?1",
                [post_id],
            )?;
            let row = query_comment(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("comment vanished after insert: {}", id))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    /// Oldest first so threads read top to bottom.
    pub fn list_comments(&self, post_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reactions --

    /// Toggle the user's reaction on a post: removes if present, adds if not.
    /// Returns (added, new reaction_count).
    pub fn toggle_post_reaction(&self, post_id: &str, user_id: &str) -> Result<(bool, i64)> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let removed = tx.execute(
                "DELETE FROM post_reactions WHERE post_id = ?1 AND user_id = ?2",
                [post_id, user_id],
            )?;
            let added = removed == 0;

            if added {
                tx.execute(
                    "INSERT INTO post_reactions (post_id, user_id) VALUES (?1, ?2)",
                    [post_id, user_id],
                )?;
                tx.execute(
                    "UPDATE community_posts SET reaction_count = reaction_count + 1 WHERE id = ?1",
                    [post_id],
                )?;
            } else {
                tx.execute(
                    "UPDATE community_posts SET reaction_count = MAX(reaction_count - 1, 0) WHERE id = ?1",
                    [post_id],
                )?;
            }

            let count: i64 = tx.query_row(
                "SELECT reaction_count FROM community_posts WHERE id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok((added, count))
        })
    }
}

fn query_post(conn: &Connection, id: &str) -> Result<Option<PostRow>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM community_posts WHERE id = ?1");
    conn.query_row(&sql, [id], map_post).optional()
}

fn query_comment(conn: &Connection, id: &str) -> Result<Option<CommentRow>> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
    conn.query_row(&sql, [id], map_comment).optional()
}

fn map_post(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        author_name: row.get(2)?,
        content: row.get(3)?,
        tags: row.get(4)?,
        reaction_count: row.get(5)?,
        comment_count: row.get(6)?,
        moderation: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        author_name: row.get(3)?,
        content: row.get(4)?,
        parent_comment_id: row.get(5)?,
        moderation: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{open_temp, seed_user};

    const MODERATION: &str = r#"{"category":"safe"}"#;

    #[test]
    fn tag_filter_uses_json_tags() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        db.insert_post("p1", Some("u1"), Some("River"), "a", r#"["sleep","anxiety"]"#, MODERATION)
            .unwrap();
        db.insert_post("p2", None, None, "b", r#"["gratitude"]"#, MODERATION).unwrap();

        let sleep = db.list_posts(20, Some("sleep")).unwrap();
        assert_eq!(sleep.len(), 1);
        assert_eq!(sleep[0].id, "p1");

        let all = db.list_posts(20, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "p2", "newest first");
    }

    #[test]
    fn comments_bump_counter_and_thread() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        db.insert_post("p1", Some("u1"), None, "a", "[]", MODERATION).unwrap();

        db.insert_comment("c1", "p1", Some("u1"), None, "first", None, MODERATION).unwrap();
        let reply = db
            .insert_comment("c2", "p1", Some("u1"), None, "reply", Some("c1"), MODERATION)
            .unwrap();
        assert_eq!(reply.parent_comment_id.as_deref(), Some("c1"));

        let post = db.get_post("p1").unwrap().unwrap();
        assert_eq!(post.comment_count, 2);
        let listed = db.list_comments("p1").unwrap();
        assert_eq!(listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["c1", "c2"]);
    }

    #[test]
    fn reaction_toggles() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        seed_user(&db, "u2", "lake");
        db.insert_post("p1", None, None, "a", "[]", MODERATION).unwrap();

        assert_eq!(db.toggle_post_reaction("p1", "u1").unwrap(), (true, 1));
        assert_eq!(db.toggle_post_reaction("p1", "u2").unwrap(), (true, 2));
        assert_eq!(db.toggle_post_reaction("p1", "u1").unwrap(), (false, 1));
    }
}
