//! Relational populator.
//!
//! Expands the id references stored on leads and comments into `{id, name}`
//! projections for the response. Each referenced collection is hit with one
//! batched query whose id list is bound as a single JSON parameter; stored
//! records are never modified.

use crate::models::{Comment, CommentView, Lead, LeadView, Reference, Summary};
use crate::store::{Database, StoreError};
use std::collections::{HashMap, HashSet};

/// How comment authors should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorExpansion {
    /// Leave `author` as the raw user id.
    Ids,
    /// Replace `author` with `{id, name}` when the user exists.
    Summaries,
}

pub struct Populator<'a> {
    db: &'a Database,
}

impl<'a> Populator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn lead(&self, lead: Lead, authors: AuthorExpansion) -> Result<LeadView, StoreError> {
        let mut views = self.leads(vec![lead], authors).await?;
        // One lead in, one view out.
        Ok(views.remove(0))
    }

    pub async fn leads(
        &self,
        leads: Vec<Lead>,
        authors: AuthorExpansion,
    ) -> Result<Vec<LeadView>, StoreError> {
        let agent_ids = distinct(leads.iter().filter_map(|l| l.sales_agent.as_ref()));
        let agents = by_id(self.db.agent_summaries(&agent_ids).await?);

        let comment_ids = distinct(leads.iter().flat_map(|l| l.comments.iter()));
        let stored_comments: HashMap<String, Comment> = self
            .db
            .comments_by_ids(&comment_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let users = match authors {
            AuthorExpansion::Ids => HashMap::new(),
            AuthorExpansion::Summaries => {
                let author_ids = distinct(stored_comments.values().map(|c| &c.author));
                by_id(self.db.user_summaries(&author_ids).await?)
            }
        };

        let views = leads
            .into_iter()
            .map(|lead| {
                let sales_agent = lead
                    .sales_agent
                    .as_ref()
                    .and_then(|id| agents.get(id).cloned());
                // Follow the order stored on the lead, not the comment table.
                let comments = lead
                    .comments
                    .iter()
                    .filter_map(|id| stored_comments.get(id))
                    .map(|c| comment_view(c, &users))
                    .collect();
                LeadView {
                    id: lead.id,
                    name: lead.name,
                    source: lead.source,
                    sales_agent,
                    status: lead.status,
                    tags: lead.tags,
                    time_to_close: lead.time_to_close,
                    priority: lead.priority,
                    closed_at: lead.closed_at,
                    comments,
                    created_at: lead.created_at,
                    updated_at: lead.updated_at,
                }
            })
            .collect();
        Ok(views)
    }
}

fn comment_view(comment: &Comment, users: &HashMap<String, Summary>) -> CommentView {
    let author = match users.get(&comment.author) {
        Some(summary) => Reference::Expanded(summary.clone()),
        None => Reference::Id(comment.author.clone()),
    };
    CommentView {
        id: comment.id.clone(),
        lead: comment.lead.clone(),
        author,
        comment_text: comment.comment_text.clone(),
        created_at: comment.created_at,
    }
}

/// Dedup in first-seen order.
fn distinct<'s>(ids: impl Iterator<Item = &'s String>) -> Vec<String> {
    let mut seen: HashSet<&'s str> = HashSet::new();
    let mut out = Vec::new();
    for id in ids {
        if seen.insert(id.as_str()) {
            out.push(id.clone());
        }
    }
    out
}

fn by_id(summaries: Vec<Summary>) -> HashMap<String, Summary> {
    summaries.into_iter().map(|s| (s.id.clone(), s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;
    use crate::models::NewLead;
    use chrono::Utc;

    fn new_lead(name: &str, agent: Option<&str>) -> Lead {
        Lead::new(
            NewLead {
                name: name.to_string(),
                source: None,
                sales_agent: agent.map(str::to_string),
                status: "New".to_string(),
                tags: Vec::new(),
                time_to_close: None,
                priority: None,
            },
            Utc::now(),
        )
    }

    async fn seed_user(db: &Database, name: &str) -> String {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        db.insert_user(&user).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn test_agent_expanded_and_dangling_agent_is_null() {
        let db = Database::in_memory().unwrap();
        let agent = db
            .insert_agent("Maya", "maya@example.com", Utc::now())
            .await
            .unwrap();

        let assigned = new_lead("Assigned", Some(&agent.id));
        let dangling = new_lead("Dangling", Some("no-such-agent"));
        db.insert_lead(&assigned).await.unwrap();
        db.insert_lead(&dangling).await.unwrap();

        let views = Populator::new(&db)
            .leads(vec![assigned, dangling.clone()], AuthorExpansion::Ids)
            .await
            .unwrap();

        assert_eq!(
            views[0].sales_agent,
            Some(Summary {
                id: agent.id.clone(),
                name: "Maya".to_string()
            })
        );
        assert!(views[1].sales_agent.is_none());

        // The stored reference is left as it was.
        let stored = db.find_lead(&dangling.id).await.unwrap().unwrap();
        assert_eq!(stored.sales_agent.as_deref(), Some("no-such-agent"));
    }

    #[tokio::test]
    async fn test_author_expansion_modes() {
        let db = Database::in_memory().unwrap();
        let user_id = seed_user(&db, "Ada").await;
        let lead = new_lead("Commented", None);
        db.insert_lead(&lead).await.unwrap();

        db.add_comment(&lead.id, &user_id, "first", Utc::now())
            .await
            .unwrap();
        let (lead, _) = db
            .add_comment(&lead.id, "ghost-user", "second", Utc::now())
            .await
            .unwrap()
            .unwrap();

        let populator = Populator::new(&db);

        let raw = populator
            .lead(lead.clone(), AuthorExpansion::Ids)
            .await
            .unwrap();
        assert_eq!(raw.comments.len(), 2);
        assert_eq!(raw.comments[0].author, Reference::Id(user_id.clone()));

        let expanded = populator
            .lead(lead, AuthorExpansion::Summaries)
            .await
            .unwrap();
        assert_eq!(expanded.comments[0].comment_text, "first");
        assert_eq!(
            expanded.comments[0].author,
            Reference::Expanded(Summary {
                id: user_id,
                name: "Ada".to_string()
            })
        );
        // Unknown authors stay as raw ids.
        assert_eq!(
            expanded.comments[1].author,
            Reference::Id("ghost-user".to_string())
        );
    }

    #[tokio::test]
    async fn test_comment_references_beyond_sqlite_variable_limit() {
        let db = Database::in_memory().unwrap();
        let lead = new_lead("Busy", None);
        db.insert_lead(&lead).await.unwrap();
        let (_, real) = db
            .add_comment(&lead.id, "u1", "kept", Utc::now())
            .await
            .unwrap()
            .unwrap();

        // Two leads referencing 34k comment ids between them, one of them real.
        let mut first = new_lead("First", None);
        first.comments = (0..17_000).map(|i| format!("first-{i}")).collect();
        first.comments.push(real.id.clone());
        let mut second = new_lead("Second", None);
        second.comments = (0..17_000).map(|i| format!("second-{i}")).collect();

        let views = Populator::new(&db)
            .leads(vec![first, second], AuthorExpansion::Summaries)
            .await
            .unwrap();
        assert_eq!(views[0].comments.len(), 1);
        assert_eq!(views[0].comments[0].id, real.id);
        assert!(views[1].comments.is_empty());
    }

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let ids = ["b", "a", "b", "c", "a"].map(String::from);
        assert_eq!(distinct(ids.iter()), vec!["b", "a", "c"]);
    }
}
