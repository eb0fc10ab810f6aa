use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::AchievementRow;

impl Database {
    /// Insert a badge once per user. Returns the new row, or `None` if the
    /// user already had it.
    pub fn award_achievement(
        &self,
        id: &str,
        user_id: &str,
        badge: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<AchievementRow>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO achievements (id, user_id, badge, title, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                [id, user_id, badge, title, description],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            conn.query_row(
                "SELECT id, user_id, badge, title, description, earned_at FROM achievements WHERE id = ?1",
                [id],
                map_achievement,
            )
            .optional()
        })
    }

    /// Newest first; `limit` of `None` returns all.
    pub fn list_achievements(&self, user_id: &str, limit: Option<u32>) -> Result<Vec<AchievementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, badge, title, description, earned_at FROM achievements
                 WHERE user_id = ?1
                 ORDER BY earned_at DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let limit = limit.map(i64::from).unwrap_or(-1);
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], map_achievement)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_achievement(row: &Row<'_>) -> rusqlite::Result<AchievementRow> {
    Ok(AchievementRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        badge: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        earned_at: row.get(5)?,
    })
}
