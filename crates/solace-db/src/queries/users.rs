use anyhow::Result;
use rusqlite::Connection;

use super::OptionalExt;
use crate::Database;
use crate::models::UserRow;

impl Database {
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    #[cfg(test)]
    pub(crate) fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password, created_at FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::test_support::open_temp;

    #[test]
    fn lookup_by_username_and_id() {
        let (db, _dir) = open_temp();
        db.create_user("u1", "river", "phc").unwrap();

        let by_name = db.get_user_by_username("river").unwrap().unwrap();
        assert_eq!(by_name.id, "u1");
        assert_eq!(by_name.password, "phc");
        assert!(db.get_user_by_id("u1").unwrap().is_some());
        assert!(db.get_user_by_username("lake").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (db, _dir) = open_temp();
        db.create_user("u1", "river", "phc").unwrap();
        assert!(db.create_user("u2", "river", "phc").is_err());
    }
}
