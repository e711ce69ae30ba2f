use super::{id_list, Database, StoreError};
use crate::auth::models::{User, UserProfile};
use crate::models::Summary;
use rusqlite::{params, OptionalExtension};

impl Database {
    /// Insert a user whose password is already hashed. A taken email is a
    /// [`StoreError::UniqueViolation`].
    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (id, name, email, password, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.created_at
            ],
        )?;
        Ok(())
    }

    /// Full user record, password hash included. Only the credential check
    /// reads this.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;
        let user = conn
            .query_row(
                "SELECT id, name, email, password, created_at FROM users WHERE email = ?1",
                [email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        password_hash: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Profile projection. The password column is never selected.
    pub async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let conn = self.conn.lock().await;
        let profile = conn
            .query_row(
                "SELECT id, name, email, created_at FROM users WHERE id = ?1",
                [id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// `{id, name}` projections for the given user ids. Unknown ids are
    /// skipped.
    pub async fn user_summaries(&self, ids: &[String]) -> Result<Vec<Summary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = id_list(ids)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name FROM users
             WHERE id IN (SELECT value FROM json_each(?1))",
        )?;
        let summaries = stmt
            .query_map([ids], |row| {
                Ok(Summary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }
}
