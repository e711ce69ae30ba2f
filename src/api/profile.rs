use super::{ApiError, AppState};
use crate::auth::models::{Claims, UserProfile};
use axum::{extract::State, Extension, Json};

/// GET /profile - the account behind the verified token
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .user_store
        .profile(&claims.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}
