use anyhow::Result;

use super::OptionalExt;
use crate::Database;
use crate::models::SummaryRow;

impl Database {
    pub fn get_ai_summary(&self, user_id: &str) -> Result<Option<SummaryRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id, summary, recommendations, updated_at FROM user_ai_summaries WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(SummaryRow {
                        user_id: row.get(0)?,
                        summary: row.get(1)?,
                        recommendations: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn upsert_ai_summary(&self, user_id: &str, summary: &str, recommendations_json: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_ai_summaries (user_id, summary, recommendations) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                    summary = excluded.summary,
                    recommendations = excluded.recommendations,
                    updated_at = datetime('now')",
                [user_id, summary, recommendations_json],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{open_temp, seed_user};

    #[test]
    fn summary_rolls_forward() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        assert!(db.get_ai_summary("u1").unwrap().is_none());

        db.upsert_ai_summary("u1", "rough week", r#"["rest"]"#).unwrap();
        db.upsert_ai_summary("u1", "recovering", r#"["walk"]"#).unwrap();

        let row = db.get_ai_summary("u1").unwrap().unwrap();
        assert_eq!(row.summary, "recovering");
        assert_eq!(row.recommendations, r#"["walk"]"#);
    }
}
