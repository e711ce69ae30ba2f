use super::{agents, leads, profile, AppState};
use crate::auth::{api as auth_api, auth_middleware, AuthState, JwtHandler, UserStore};
use crate::middleware::request_logging;
use crate::store::Database;
use anyhow::{Context, Result};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the API router
///
/// Three sub-routers, merged: the public health check, the unauthenticated
/// `/auth` endpoints, and the resource routes behind the JWT gate.
pub fn create_router(db: Database, jwt_handler: Arc<JwtHandler>, bcrypt_cost: u32) -> Router {
    let user_store = Arc::new(UserStore::new(db.clone(), bcrypt_cost));

    let auth_router = Router::new()
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .with_state(AuthState::new(user_store.clone(), jwt_handler.clone()));

    let protected_routes = Router::new()
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/leads/:lead_id", get(leads::get_lead).post(leads::update_lead))
        .route("/leads/:lead_id/comments", post(leads::add_comment))
        .route("/profile", get(profile::get_profile))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware))
        .with_state(AppState { db, user_store });

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_router)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy: a single allowed origin when configured, permissive otherwise.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
