use anyhow::Result;

use super::OptionalExt;
use crate::Database;
use crate::models::MediaRow;

impl Database {
    pub fn insert_media(&self, id: &str, user_id: &str, content_type: &str, size: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO media (id, user_id, content_type, size) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, content_type, size],
            )?;
            Ok(())
        })
    }

    pub fn get_media(&self, id: &str) -> Result<Option<MediaRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, content_type, size, created_at FROM media WHERE id = ?1",
                [id],
                |row| {
                    Ok(MediaRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        content_type: row.get(2)?,
                        size: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn delete_media(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM media WHERE id = ?1 AND user_id = ?2", [id, user_id])?;
            Ok(removed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{open_temp, seed_user};

    #[test]
    fn media_is_owned() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        seed_user(&db, "u2", "lake");
        db.insert_media("img1", "u1", "image/png", 42).unwrap();

        let row = db.get_media("img1").unwrap().unwrap();
        assert_eq!(row.content_type, "image/png");
        assert_eq!(row.size, 42);

        assert!(!db.delete_media("img1", "u2").unwrap());
        assert!(db.delete_media("img1", "u1").unwrap());
        assert!(db.get_media("img1").unwrap().is_none());
    }
}
