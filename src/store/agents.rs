use super::{id_list, Database, StoreError};
use crate::models::{SalesAgent, Summary};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

fn agent_from_row(row: &Row<'_>) -> rusqlite::Result<SalesAgent> {
    Ok(SalesAgent {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Database {
    /// All agents in insertion order.
    pub async fn list_agents(&self) -> Result<Vec<SalesAgent>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, created_at FROM sales_agents ORDER BY rowid ASC",
        )?;
        let agents = stmt
            .query_map([], agent_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(agents)
    }

    /// Insert a new agent. A duplicate email is a
    /// [`StoreError::UniqueViolation`], never an overwrite.
    pub async fn insert_agent(
        &self,
        name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<SalesAgent, StoreError> {
        let agent = SalesAgent {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sales_agents (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![agent.id, agent.name, agent.email, agent.created_at],
        )?;
        Ok(agent)
    }

    /// First agent (by insertion order) with exactly this name.
    pub async fn find_agent_by_name(&self, name: &str) -> Result<Option<SalesAgent>, StoreError> {
        let conn = self.conn.lock().await;
        let agent = conn
            .query_row(
                "SELECT id, name, email, created_at FROM sales_agents
                 WHERE name = ?1 ORDER BY rowid ASC LIMIT 1",
                [name],
                agent_from_row,
            )
            .optional()?;
        Ok(agent)
    }

    /// `{id, name}` projections for the given agent ids. Unknown ids are
    /// skipped.
    pub async fn agent_summaries(&self, ids: &[String]) -> Result<Vec<Summary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = id_list(ids)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name FROM sales_agents
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
