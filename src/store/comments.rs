use super::leads::select_lead;
use super::{id_list, Database, StoreError};
use crate::models::{Comment, Lead};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

impl Database {
    /// Store a comment and rewrite the parent lead's comment list with every
    /// comment stored for it, in insertion order.
    ///
    /// Both writes share one transaction: either the comment is attached to
    /// the lead or nothing is written. `None` when the lead does not exist.
    pub async fn add_comment(
        &self,
        lead_id: &str,
        author: &str,
        comment_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Lead, Comment)>, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let Some(mut lead) = select_lead(&tx, lead_id)? else {
            return Ok(None);
        };

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            lead: lead_id.to_string(),
            author: author.to_string(),
            comment_text: comment_text.to_string(),
            created_at: now,
        };
        tx.execute(
            "INSERT INTO comments (id, lead, author, comment_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id,
                comment.lead,
                comment.author,
                comment.comment_text,
                comment.created_at,
            ],
        )?;

        let ids = {
            let mut stmt =
                tx.prepare_cached("SELECT id FROM comments WHERE lead = ?1 ORDER BY rowid ASC")?;
            let ids = stmt
                .query_map([lead_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };
        tx.execute(
            "UPDATE leads SET comments = ?1, updated_at = ?2 WHERE id = ?3",
            params![serde_json::to_string(&ids)?, now, lead_id],
        )?;
        tx.commit()?;

        lead.comments = ids;
        lead.updated_at = now;
        Ok(Some((lead, comment)))
    }

    /// Comments with the given ids, in no particular order. Unknown ids are
    /// skipped. The list is bound as a single parameter, so its length is
    /// not capped by SQLite's variable limit.
    pub async fn comments_by_ids(&self, ids: &[String]) -> Result<Vec<Comment>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = id_list(ids)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, lead, author, comment_text, created_at FROM comments
             WHERE id IN (SELECT value FROM json_each(?1))",
        )?;
        let comments = stmt
            .query_map([ids], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    lead: row.get(1)?,
                    author: row.get(2)?,
                    comment_text: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}
