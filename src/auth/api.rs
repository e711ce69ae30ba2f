//! Authentication API Endpoints
//! Mission: Provide registration and login endpoints

use crate::api::{extract::required, ApiError, ApiJson, MessageResponse};
use crate::auth::{
    jwt::JwtHandler,
    models::{Identity, LoginRequest, LoginResponse, RegisterRequest},
    user_store::{Authentication, Registration, UserStore},
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Register endpoint - POST /auth/register
pub async fn register(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        required(payload.name),
        required(payload.email),
        required(payload.password),
    ) else {
        return Err(ApiError::Validation(
            "Invalid input: name, email and password fields are required".to_string(),
        ));
    };

    match state.user_store.register(&name, &email, &password).await? {
        Registration::Created(_) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Account created successfully")),
        )),
        Registration::EmailTaken => Err(ApiError::Conflict(
            "This email is already registered.".to_string(),
        )),
    }
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (required(payload.email), required(payload.password))
    else {
        return Err(ApiError::Validation(
            "Invalid input: email and password fields are required".to_string(),
        ));
    };

    let user = match state.user_store.authenticate(&email, &password).await? {
        Authentication::Verified(user) => user,
        Authentication::UnknownEmail => {
            return Err(ApiError::Validation("Invalid Email".to_string()))
        }
        Authentication::WrongPassword => {
            return Err(ApiError::Validation("Invalid Password".to_string()))
        }
    };

    let issued = state.jwt_handler.issue(&Identity::user(user.id.clone()))?;

    info!(user_id = %user.id, expires_at = %issued.expires_at, "login successful");

    Ok(Json(LoginResponse {
        message: "Logged in successfully".to_string(),
        token: issued.token,
    }))
}
