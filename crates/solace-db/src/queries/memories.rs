use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::MemoryRow;

const MEMORY_COLUMNS: &str =
    "id, user_id, diary_entry_id, entry_date, image_url, context, mood, created_at";

impl Database {
    /// Record a memory. If the page for `entry_date` is already saved the
    /// memory is linked to it straight away.
    pub fn insert_memory(
        &self,
        id: &str,
        user_id: &str,
        entry_date: &str,
        image_url: &str,
        context: &str,
        mood: &str,
    ) -> Result<MemoryRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO memories (id, user_id, diary_entry_id, entry_date, image_url, context, mood)
                 VALUES (?1, ?2,
                         (SELECT id FROM diary_entries WHERE user_id = ?2 AND entry_date = ?3),
                         ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, entry_date, image_url, context, mood],
            )?;
            let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1");
            conn.query_row(&sql, [id], map_memory)
                .optional()?
                .ok_or_else(|| anyhow::anyhow!("memory vanished after insert: {}", id))
        })
    }

    /// Newest first.
    pub fn list_memories(&self, user_id: &str) -> Result<Vec<MemoryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1
                 ORDER BY entry_date DESC, created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_memory)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_memories_for_date(&self, user_id: &str, entry_date: &str) -> Result<Vec<MemoryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 AND entry_date = ?2
                 ORDER BY created_at ASC, rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id, entry_date], map_memory)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Link memories captured before the page was first saved.
    pub fn link_memories_to_entry(&self, user_id: &str, entry_date: &str, entry_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let linked = conn.execute(
                "UPDATE memories SET diary_entry_id = ?3
                 WHERE user_id = ?1 AND entry_date = ?2 AND diary_entry_id IS NULL",
                [user_id, entry_date, entry_id],
            )?;
            Ok(linked)
        })
    }

    /// Returns false when no memory with that id belongs to the user.
    pub fn delete_memory(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM memories WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn delete_memories_by_image(&self, user_id: &str, image_url: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM memories WHERE user_id = ?1 AND image_url = ?2",
                [user_id, image_url],
            )?;
            Ok(removed)
        })
    }

    /// Drop the memories of one day that point at `image_url`.
    pub fn delete_memories_by_image_on(&self, user_id: &str, image_url: &str, entry_date: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM memories WHERE user_id = ?1 AND image_url = ?2 AND entry_date = ?3",
                [user_id, image_url, entry_date],
            )?;
            Ok(removed)
        })
    }
}

fn map_memory(row: &Row<'_>) -> rusqlite::Result<MemoryRow> {
    Ok(MemoryRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        diary_entry_id: row.get(2)?,
        entry_date: row.get(3)?,
        image_url: row.get(4)?,
        context: row.get(5)?,
        mood: row.get(6)?,
        created_at: row.get(7)?,
    })
}
