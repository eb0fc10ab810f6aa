use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::{DiaryEntryRow, SavedEntry};

const ENTRY_COLUMNS: &str =
    "id, user_id, entry_date, content, mood_score, ai_analysis, created_at, updated_at";

impl Database {
    /// Insert or replace the content of the user's page for `entry_date`.
    /// `id` is only used when the page does not exist yet. A change of
    /// content clears the stored score and analysis.
    pub fn upsert_diary_entry(
        &self,
        id: &str,
        user_id: &str,
        entry_date: &str,
        content: &str,
    ) -> Result<SavedEntry> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let previous_content: Option<String> = tx
                .query_row(
                    "SELECT content FROM diary_entries WHERE user_id = ?1 AND entry_date = ?2",
                    [user_id, entry_date],
                    |row| row.get(0),
                )
                .optional()?;

            tx.execute(
                "INSERT INTO diary_entries (id, user_id, entry_date, content) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, entry_date)
                 DO UPDATE SET
                    mood_score = CASE WHEN content IS excluded.content THEN mood_score END,
                    ai_analysis = CASE WHEN content IS excluded.content THEN ai_analysis END,
                    content = excluded.content,
                    updated_at = datetime('now')",
                rusqlite::params![id, user_id, entry_date, content],
            )?;

            let entry = query_entry_by_date(&tx, user_id, entry_date)?
                .ok_or_else(|| anyhow::anyhow!("diary entry vanished after upsert"))?;
            tx.commit()?;

            Ok(SavedEntry {
                entry,
                previous_content,
            })
        })
    }

    pub fn get_diary_entry(&self, user_id: &str, entry_date: &str) -> Result<Option<DiaryEntryRow>> {
        self.with_conn(|conn| query_entry_by_date(conn, user_id, entry_date))
    }

    /// Entries in `[from, to]` (inclusive, `YYYY-MM-DD`), oldest first.
    pub fn list_diary_entries(
        &self,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<DiaryEntryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM diary_entries
                 WHERE user_id = ?1
                   AND (?2 IS NULL OR entry_date >= ?2)
                   AND (?3 IS NULL OR entry_date <= ?3)
                 ORDER BY entry_date ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, from, to], map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_diary_analysis(
        &self,
        entry_id: &str,
        mood_score: i64,
        ai_analysis: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE diary_entries SET mood_score = ?2, ai_analysis = ?3 WHERE id = ?1",
                rusqlite::params![entry_id, mood_score, ai_analysis],
            )?;
            Ok(())
        })
    }

    /// Whether any of the user's pages other than `except_date` still embeds
    /// `needle` (an image path such as `/media/{id}`).
    pub fn image_on_other_pages(&self, user_id: &str, needle: &str, except_date: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM diary_entries
                 WHERE user_id = ?1 AND entry_date <> ?3 AND instr(content, ?2) > 0)",
                [user_id, needle, except_date],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    pub fn count_diary_entries(&self, user_id: &str) -> Result<u32> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM diary_entries WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count as u32)
        })
    }

    /// All dates the user has written on, newest first.
    pub fn list_entry_dates(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT entry_date FROM diary_entries WHERE user_id = ?1 ORDER BY entry_date DESC",
            )?;
            let dates = stmt
                .query_map([user_id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(dates)
        })
    }

    /// Scored entries in `[from, to]`, oldest first, as `(entry_date, mood_score)`.
    pub fn mood_series(&self, user_id: &str, from: &str, to: &str) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT entry_date, mood_score FROM diary_entries
                 WHERE user_id = ?1 AND mood_score IS NOT NULL
                   AND entry_date >= ?2 AND entry_date <= ?3
                 ORDER BY entry_date ASC",
            )?;
            let series = stmt
                .query_map([user_id, from, to], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(series)
        })
    }
}

fn query_entry_by_date(
    conn: &Connection,
    user_id: &str,
    entry_date: &str,
) -> Result<Option<DiaryEntryRow>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM diary_entries WHERE user_id = ?1 AND entry_date = ?2");
    conn.query_row(&sql, [user_id, entry_date], map_entry).optional()
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<DiaryEntryRow> {
    Ok(DiaryEntryRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        entry_date: row.get(2)?,
        content: row.get(3)?,
        mood_score: row.get(4)?,
        ai_analysis: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{open_temp, seed_user};

    #[test]
    fn upsert_keeps_one_page_per_day() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");

        let first = db.upsert_diary_entry("e1", "u1", "2026-03-01", "<p>hello</p>").unwrap();
        assert!(first.previous_content.is_none());
        assert_eq!(first.entry.id, "e1");

        let second = db.upsert_diary_entry("e2", "u1", "2026-03-01", "<p>again</p>").unwrap();
        assert_eq!(second.previous_content.as_deref(), Some("<p>hello</p>"));
        assert_eq!(second.entry.id, "e1", "existing page keeps its id");
        assert_eq!(second.entry.content, "<p>again</p>");
        assert_eq!(db.count_diary_entries("u1").unwrap(), 1);
    }

    #[test]
    fn changed_content_clears_analysis() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");

        db.upsert_diary_entry("e1", "u1", "2026-03-01", "<p>sunny</p>").unwrap();
        db.set_diary_analysis("e1", 9, Some("bright")).unwrap();

        let same = db.upsert_diary_entry("e2", "u1", "2026-03-01", "<p>sunny</p>").unwrap();
        assert_eq!(same.entry.mood_score, Some(9));

        let changed = db.upsert_diary_entry("e2", "u1", "2026-03-01", "<p>storm</p>").unwrap();
        assert_eq!(changed.entry.mood_score, None);
        assert_eq!(changed.entry.ai_analysis, None);
        assert!(db.mood_series("u1", "2026-03-01", "2026-03-01").unwrap().is_empty());
    }

    #[test]
    fn finds_images_embedded_on_other_days() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        seed_user(&db, "u2", "brook");

        db.upsert_diary_entry("e1", "u1", "2026-03-01", r#"<img src="/media/abc">"#).unwrap();
        db.upsert_diary_entry("e2", "u1", "2026-03-02", r#"<img src="https://x.example/media/abc">"#)
            .unwrap();
        db.upsert_diary_entry("e3", "u2", "2026-03-03", r#"<img src="/media/xyz">"#).unwrap();

        assert!(db.image_on_other_pages("u1", "/media/abc", "2026-03-01").unwrap());
        assert!(!db.image_on_other_pages("u1", "/media/xyz", "2026-03-01").unwrap());
        db.upsert_diary_entry("e2", "u1", "2026-03-02", "<p>gone</p>").unwrap();
        assert!(!db.image_on_other_pages("u1", "/media/abc", "2026-03-01").unwrap());
    }

    #[test]
    fn mood_series_skips_unscored_and_respects_range() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");

        for (id, date) in [("e1", "2026-03-01"), ("e2", "2026-03-02"), ("e3", "2026-03-05")] {
            db.upsert_diary_entry(id, "u1", date, "x").unwrap();
        }
        db.set_diary_analysis("e1", 4, None).unwrap();
        db.set_diary_analysis("e3", 8, Some("brighter")).unwrap();

        let series = db.mood_series("u1", "2026-03-01", "2026-03-04").unwrap();
        assert_eq!(series, vec![("2026-03-01".to_string(), 4)]);

        let all = db.mood_series("u1", "2026-01-01", "2026-12-31").unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn list_filters_by_range() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        for (id, date) in [("e1", "2026-03-01"), ("e2", "2026-03-10"), ("e3", "2026-04-01")] {
            db.upsert_diary_entry(id, "u1", date, "x").unwrap();
        }

        let march = db
            .list_diary_entries("u1", Some("2026-03-01"), Some("2026-03-31"))
            .unwrap();
        assert_eq!(march.len(), 2);
        assert_eq!(db.list_diary_entries("u1", None, None).unwrap().len(), 3);
        assert_eq!(db.list_entry_dates("u1").unwrap()[0], "2026-04-01");
    }
}
