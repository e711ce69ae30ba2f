//! Lead Filters
//!
//! Query parameters on `GET /leads` are parsed against an explicit
//! allow-list into typed predicates. Anything outside the list is rejected
//! rather than passed through to the store.
//!
//! | key           | predicate                                   |
//! |---------------|---------------------------------------------|
//! | `name`        | exact match                                 |
//! | `status`      | exact match                                 |
//! | `source`      | exact match                                 |
//! | `priority`    | exact match                                 |
//! | `timeToClose` | exact integer match                         |
//! | `tags`        | tag list contains the value                 |
//! | `salesAgent`  | agent *name*, resolved to an id by the caller |

use rusqlite::types::Value;

/// One typed condition on a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadPredicate {
    Name(String),
    Status(String),
    Source(String),
    Priority(String),
    TimeToClose(i64),
    Tag(String),
    SalesAgentId(String),
}

impl LeadPredicate {
    fn to_sql(&self) -> (&'static str, Value) {
        match self {
            Self::Name(v) => ("name = ?", Value::Text(v.clone())),
            Self::Status(v) => ("status = ?", Value::Text(v.clone())),
            Self::Source(v) => ("source = ?", Value::Text(v.clone())),
            Self::Priority(v) => ("priority = ?", Value::Text(v.clone())),
            Self::TimeToClose(v) => ("time_to_close = ?", Value::Integer(*v)),
            Self::Tag(v) => (
                "EXISTS (SELECT 1 FROM json_each(leads.tags) WHERE json_each.value = ?)",
                Value::Text(v.clone()),
            ),
            Self::SalesAgentId(v) => ("sales_agent = ?", Value::Text(v.clone())),
        }
    }
}

/// Conjunction of predicates. An empty filter matches every lead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    predicates: Vec<LeadPredicate>,
}

impl LeadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: LeadPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: LeadPredicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[LeadPredicate] {
        &self.predicates
    }

    /// `WHERE` clause (empty when unfiltered) and its bound values.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        if self.predicates.is_empty() {
            return (String::new(), Vec::new());
        }
        let (clauses, values): (Vec<&str>, Vec<Value>) =
            self.predicates.iter().map(LeadPredicate::to_sql).unzip();
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

/// Parsed `GET /leads` query. The agent name still needs resolving against
/// the store before it can become a [`LeadPredicate::SalesAgentId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub filter: LeadFilter,
    pub sales_agent_name: Option<String>,
}

impl LeadQuery {
    pub fn from_params<I, K, V>(params: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in params {
            let value = value.as_ref().to_string();
            let predicate = match key.as_ref() {
                "name" => LeadPredicate::Name(value),
                "status" => LeadPredicate::Status(value),
                "source" => LeadPredicate::Source(value),
                "priority" => LeadPredicate::Priority(value),
                "tags" => LeadPredicate::Tag(value),
                "timeToClose" => {
                    let days = value.trim().parse::<i64>().map_err(|_| {
                        FilterError::InvalidValue {
                            field: "timeToClose",
                            value: value.clone(),
                        }
                    })?;
                    LeadPredicate::TimeToClose(days)
                }
                "salesAgent" => {
                    query.sales_agent_name = Some(value);
                    continue;
                }
                other => return Err(FilterError::UnsupportedField(other.to_string())),
            };
            query.filter.push(predicate);
        }
        Ok(query)
    }
}

/// Rejected query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    UnsupportedField(String),
    InvalidValue { field: &'static str, value: String },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedField(field) => write!(f, "Unsupported filter field \"{}\"", field),
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid value \"{}\" for filter field \"{}\"", value, field)
            }
        }
    }
}

impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_listed_params_become_predicates() {
        let query = LeadQuery::from_params([
            ("status", "Qualified"),
            ("tags", "enterprise"),
            ("timeToClose", "14"),
        ])
        .unwrap();

        assert_eq!(
            query.filter.predicates(),
            &[
                LeadPredicate::Status("Qualified".to_string()),
                LeadPredicate::Tag("enterprise".to_string()),
                LeadPredicate::TimeToClose(14),
            ]
        );
        assert!(query.sales_agent_name.is_none());
    }

    #[test]
    fn test_sales_agent_is_held_back_for_resolution() {
        let query = LeadQuery::from_params([("salesAgent", "Maya")]).unwrap();
        assert!(query.filter.predicates().is_empty());
        assert_eq!(query.sales_agent_name.as_deref(), Some("Maya"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = LeadQuery::from_params([("password", "x")]).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedField("password".to_string()));
        assert_eq!(err.to_string(), "Unsupported filter field \"password\"");
    }

    #[test]
    fn test_non_integer_time_to_close_rejected() {
        let err = LeadQuery::from_params([("timeToClose", "soon")]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { field: "timeToClose", .. }));
    }

    #[test]
    fn test_sql_rendering() {
        assert_eq!(LeadFilter::new().to_sql(), (String::new(), Vec::new()));

        let (clause, values) = LeadFilter::new()
            .with(LeadPredicate::Status("New".to_string()))
            .with(LeadPredicate::SalesAgentId("a1".to_string()))
            .to_sql();
        assert_eq!(clause, " WHERE status = ? AND sales_agent = ?");
        assert_eq!(
            values,
            vec![Value::Text("New".to_string()), Value::Text("a1".to_string())]
        );
    }
}
