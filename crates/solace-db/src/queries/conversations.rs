use anyhow::Result;

use crate::Database;
use crate::models::ConversationRow;

impl Database {
    pub fn insert_conversation(
        &self,
        id: &str,
        user_id: &str,
        user_message: &str,
        ai_response: &str,
        context_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, user_message, ai_response, context)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                [id, user_id, user_message, ai_response, context_json],
            )?;
            Ok(())
        })
    }

    /// The latest `limit` exchanges, newest first.
    pub fn recent_conversations(&self, user_id: &str, limit: u32) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, user_message, ai_response, context, created_at
                 FROM conversations WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], |row| {
                    Ok(ConversationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        user_message: row.get(2)?,
                        ai_response: row.get(3)?,
                        context: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{open_temp, seed_user};

    #[test]
    fn recent_is_newest_first() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        for i in 0..4 {
            db.insert_conversation(&format!("c{i}"), "u1", &format!("q{i}"), "a", "{}").unwrap();
        }

        let recent = db.recent_conversations("u1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_message, "q3");
        assert_eq!(recent[1].user_message, "q2");
    }
}
