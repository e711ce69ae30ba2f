//! Lead endpoints.
//!
//! Listing leaves comment authors as ids; single-lead responses expand them.

use super::{extract::required, ApiError, ApiJson, AppState};
use crate::models::{Lead, LeadUpdate, LeadView, NewLead};
use crate::populate::{AuthorExpansion, Populator};
use crate::store::{LeadPredicate, LeadQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub comment_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadResponse {
    pub message: String,
    pub saved_lead: LeadView,
}

fn lead_missing(id: &str) -> ApiError {
    ApiError::NotFound(format!("Lead with ID {} not found.", id))
}

/// GET /leads
pub async fn list_leads(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<LeadView>>, ApiError> {
    let LeadQuery {
        mut filter,
        sales_agent_name,
    } = LeadQuery::from_params(params)?;

    if let Some(name) = sales_agent_name {
        let agent = state
            .db
            .find_agent_by_name(&name)
            .await?
            .ok_or_else(|| ApiError::NotFound("Sales agent not found".to_string()))?;
        filter.push(LeadPredicate::SalesAgentId(agent.id));
    }

    debug!(predicates = filter.predicates().len(), "listing leads");
    let leads = state.db.find_leads(&filter).await?;
    if leads.is_empty() {
        return Err(ApiError::NotFound("Leads not found".to_string()));
    }

    let views = Populator::new(&state.db)
        .leads(leads, AuthorExpansion::Ids)
        .await?;
    Ok(Json(views))
}

/// GET /leads/:lead_id
pub async fn get_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<LeadView>, ApiError> {
    let lead = state
        .db
        .find_lead(&lead_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    let view = Populator::new(&state.db)
        .lead(lead, AuthorExpansion::Summaries)
        .await?;
    Ok(Json(view))
}

/// POST /leads
pub async fn create_lead(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewLead>,
) -> Result<(StatusCode, Json<CreateLeadResponse>), ApiError> {
    let lead = Lead::new(payload, Utc::now());
    state.db.insert_lead(&lead).await?;
    info!(lead_id = %lead.id, status = %lead.status, "lead created");

    let saved_lead = Populator::new(&state.db)
        .lead(lead, AuthorExpansion::Ids)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateLeadResponse {
            message: "Lead added successfully".to_string(),
            saved_lead,
        }),
    ))
}

/// POST /leads/:lead_id
pub async fn update_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    ApiJson(update): ApiJson<LeadUpdate>,
) -> Result<Json<LeadView>, ApiError> {
    let lead = state
        .db
        .update_lead(&lead_id, update, Utc::now())
        .await?
        .ok_or_else(|| lead_missing(&lead_id))?;
    info!(lead_id = %lead.id, status = %lead.status, "lead updated");

    let view = Populator::new(&state.db)
        .lead(lead, AuthorExpansion::Summaries)
        .await?;
    Ok(Json(view))
}

/// POST /leads/:lead_id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    ApiJson(payload): ApiJson<AddCommentRequest>,
) -> Result<Json<LeadView>, ApiError> {
    let (Some(author), Some(text)) = (required(payload.author), required(payload.comment_text))
    else {
        return Err(ApiError::Validation(
            "author & commentText fields are required.".to_string(),
        ));
    };

    let (lead, comment) = state
        .db
        .add_comment(&lead_id, &author, &text, Utc::now())
        .await?
        .ok_or_else(|| lead_missing(&lead_id))?;
    info!(lead_id = %lead.id, comment_id = %comment.id, "comment added");

    let view = Populator::new(&state.db)
        .lead(lead, AuthorExpansion::Summaries)
        .await?;
    Ok(Json(view))
}
