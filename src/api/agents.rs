//! Sales agent endpoints.

use super::{extract::required, ApiError, ApiJson, AppState};
use crate::models::SalesAgent;
use crate::store::StoreError;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /agents
pub async fn list_agents(State(state): State<AppState>) -> Result<Json<Vec<SalesAgent>>, ApiError> {
    let agents = state.db.list_agents().await?;
    if agents.is_empty() {
        return Err(ApiError::NotFound("Agents not found.".to_string()));
    }
    Ok(Json(agents))
}

/// POST /agents
pub async fn create_agent(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateAgentRequest>,
) -> Result<(StatusCode, Json<SalesAgent>), ApiError> {
    let (Some(name), Some(email)) = (required(payload.name), required(payload.email)) else {
        return Err(ApiError::Validation(
            "Invalid input: name and email fields are required".to_string(),
        ));
    };

    let agent = match state.db.insert_agent(&name, &email, Utc::now()).await {
        Ok(agent) => agent,
        Err(StoreError::UniqueViolation(_)) => {
            return Err(ApiError::Conflict(format!(
                "Sales agent with email \"{}\" already exists.",
                email
            )))
        }
        Err(e) => return Err(e.into()),
    };

    info!(agent_id = %agent.id, "sales agent created");
    Ok((StatusCode::CREATED, Json(agent)))
}
