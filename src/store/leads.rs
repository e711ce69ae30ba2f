use super::{json_list, Database, LeadFilter, StoreError};
use crate::models::{Lead, LeadUpdate};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub(super) const LEAD_COLUMNS: &str = "id, name, source, sales_agent, status, tags, \
     time_to_close, priority, closed_at, comments, created_at, updated_at";

pub(super) fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        source: row.get(2)?,
        sales_agent: row.get(3)?,
        status: row.get(4)?,
        tags: json_list(row, 5)?,
        time_to_close: row.get(6)?,
        priority: row.get(7)?,
        closed_at: row.get(8)?,
        comments: json_list(row, 9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub(super) fn select_lead(conn: &Connection, id: &str) -> Result<Option<Lead>, StoreError> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], lead_from_row).optional()?)
}

impl Database {
    /// Persist a freshly built lead.
    pub async fn insert_lead(&self, lead: &Lead) -> Result<(), StoreError> {
        let tags = serde_json::to_string(&lead.tags)?;
        let comments = serde_json::to_string(&lead.comments)?;

        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO leads ({LEAD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                lead.id,
                lead.name,
                lead.source,
                lead.sales_agent,
                lead.status,
                tags,
                lead.time_to_close,
                lead.priority,
                lead.closed_at,
                comments,
                lead.created_at,
                lead.updated_at,
            ],
        )?;
        Ok(())
    }

    pub async fn find_lead(&self, id: &str) -> Result<Option<Lead>, StoreError> {
        let conn = self.conn.lock().await;
        select_lead(&conn, id)
    }

    /// Leads matching every predicate of `filter`, in insertion order.
    pub async fn find_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>, StoreError> {
        let (clause, values) = filter.to_sql();
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads{clause} ORDER BY rowid ASC");

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let leads = stmt
            .query_map(params_from_iter(values.iter()), lead_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    /// Merge `update` into the stored lead. `None` when no lead has this id.
    ///
    /// The comment list is not writable here; it is owned by
    /// [`Database::add_comment`].
    pub async fn update_lead(
        &self,
        id: &str,
        update: LeadUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let Some(mut lead) = select_lead(&tx, id)? else {
            return Ok(None);
        };
        lead.apply(update, now);
        let tags = serde_json::to_string(&lead.tags)?;

        tx.execute(
            "UPDATE leads SET name = ?1, source = ?2, sales_agent = ?3, status = ?4,
                 tags = ?5, time_to_close = ?6, priority = ?7, closed_at = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                lead.name,
                lead.source,
                lead.sales_agent,
                lead.status,
                tags,
                lead.time_to_close,
                lead.priority,
                lead.closed_at,
                lead.updated_at,
                lead.id,
            ],
        )?;
        tx.commit()?;
        Ok(Some(lead))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewLead, STATUS_CLOSED};
    use crate::store::LeadPredicate;

    fn payload(name: &str, status: &str, agent: Option<&str>, tags: &[&str]) -> NewLead {
        NewLead {
            name: name.to_string(),
            source: Some("Website".to_string()),
            sales_agent: agent.map(str::to_string),
            status: status.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            time_to_close: Some(21),
            priority: Some("Medium".to_string()),
        }
    }

    async fn seed(db: &Database, new: NewLead) -> Lead {
        let lead = Lead::new(new, Utc::now());
        db.insert_lead(&lead).await.unwrap();
        lead
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trips_document() {
        let db = Database::in_memory().unwrap();
        let lead = seed(&db, payload("Acme", STATUS_CLOSED, Some("a1"), &["vip"])).await;

        let stored = db.find_lead(&lead.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Acme");
        assert_eq!(stored.tags, vec!["vip"]);
        assert_eq!(stored.sales_agent.as_deref(), Some("a1"));
        assert!(stored.closed_at.is_some());
        assert!(db.find_lead("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_leads_applies_predicates() {
        let db = Database::in_memory().unwrap();
        let a = seed(&db, payload("Acme", "New", Some("a1"), &["vip", "q3"])).await;
        let b = seed(&db, payload("Globex", "New", Some("a2"), &["q3"])).await;
        seed(&db, payload("Initech", "Contacted", Some("a1"), &[])).await;

        let all = db.find_leads(&LeadFilter::new()).await.unwrap();
        assert_eq!(all.len(), 3);

        let new_for_a1 = db
            .find_leads(
                &LeadFilter::new()
                    .with(LeadPredicate::Status("New".to_string()))
                    .with(LeadPredicate::SalesAgentId("a1".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(new_for_a1.iter().map(|l| &l.id).collect::<Vec<_>>(), vec![&a.id]);

        let tagged = db
            .find_leads(&LeadFilter::new().with(LeadPredicate::Tag("q3".to_string())))
            .await
            .unwrap();
        assert_eq!(
            tagged.iter().map(|l| &l.id).collect::<Vec<_>>(),
            vec![&a.id, &b.id]
        );

        let none = db
            .find_leads(&LeadFilter::new().with(LeadPredicate::TimeToClose(99)))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_lead_merges_fields() {
        let db = Database::in_memory().unwrap();
        let lead = seed(&db, payload("Acme", "New", None, &[])).await;

        let update = LeadUpdate {
            status: Some(STATUS_CLOSED.to_string()),
            sales_agent: Some(Some("a9".to_string())),
            ..Default::default()
        };
        let updated = db
            .update_lead(&lead.id, update, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Acme");
        assert_eq!(updated.sales_agent.as_deref(), Some("a9"));
        assert!(updated.closed_at.is_some());

        let stored = db.find_lead(&lead.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_lead() {
        let db = Database::in_memory().unwrap();
        let result = db
            .update_lead("missing", LeadUpdate::default(), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
