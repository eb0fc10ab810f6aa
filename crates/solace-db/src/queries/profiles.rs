use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::{ProfilePatch, ProfileRow};

const PROFILE_COLUMNS: &str =
    "user_id, display_name, age, gender, date_of_birth, avatar, created_at, updated_at";

impl Database {
    /// Onboarding insert. Fails if the user already has a profile.
    pub fn create_profile(
        &self,
        user_id: &str,
        display_name: &str,
        age: Option<i64>,
        gender: Option<&str>,
        date_of_birth: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<ProfileRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (user_id, display_name, age, gender, date_of_birth, avatar)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![user_id, display_name, age, gender, date_of_birth, avatar],
            )?;
            query_profile(conn, user_id)?
                .ok_or_else(|| anyhow::anyhow!("profile vanished after insert: {}", user_id))
        })
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, user_id))
    }

    /// Apply an explicit edit. Returns `None` when there is no profile.
    pub fn update_profile(&self, user_id: &str, patch: &ProfilePatch) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE profiles SET
                    display_name  = COALESCE(?2, display_name),
                    age           = COALESCE(?3, age),
                    gender        = COALESCE(?4, gender),
                    date_of_birth = COALESCE(?5, date_of_birth),
                    avatar        = COALESCE(?6, avatar),
                    updated_at    = datetime('now')
                 WHERE user_id = ?1",
                rusqlite::params![
                    user_id,
                    patch.display_name,
                    patch.age,
                    patch.gender,
                    patch.date_of_birth,
                    patch.avatar,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_profile(conn, user_id)
        })
    }
}

fn query_profile(conn: &Connection, user_id: &str) -> Result<Option<ProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1");
    conn.query_row(&sql, [user_id], map_profile).optional()
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        date_of_birth: row.get(4)?,
        avatar: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::models::ProfilePatch;
    use crate::test_support::{open_temp, seed_user};

    #[test]
    fn create_then_patch_keeps_untouched_fields() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");

        let created = db
            .create_profile("u1", "River", Some(29), Some("nonbinary"), Some("1996-04-02"), Some("fox"))
            .unwrap();
        assert_eq!(created.display_name, "River");

        let patch = ProfilePatch {
            avatar: Some("owl".into()),
            ..Default::default()
        };
        let updated = db.update_profile("u1", &patch).unwrap().unwrap();
        assert_eq!(updated.avatar.as_deref(), Some("owl"));
        assert_eq!(updated.display_name, "River");
        assert_eq!(updated.age, Some(29));
    }

    #[test]
    fn second_onboarding_fails() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        db.create_profile("u1", "River", None, None, None, None).unwrap();
        assert!(db.create_profile("u1", "Again", None, None, None, None).is_err());
    }

    #[test]
    fn patch_without_profile_is_none() {
        let (db, _dir) = open_temp();
        seed_user(&db, "u1", "river");
        assert!(db.update_profile("u1", &ProfilePatch::default()).unwrap().is_none());
    }
}
