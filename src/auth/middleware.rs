//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::api::ApiError;
use crate::auth::jwt::JwtHandler;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates JWT tokens
///
/// Verified claims are added to the request extensions; handlers read them
/// with `Extension<Claims>`.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;

    let claims = jwt_handler.verify(token).map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "rejected bearer token");
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The token is the second whitespace-separated segment of the header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let mut segments = value.split_whitespace();
    let scheme = segments.next();
    match (scheme, segments.next()) {
        (_, None) => Err(AuthError::MissingToken),
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::InvalidFormat),
    }
}

/// Auth error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    MissingToken,
    InvalidFormat,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Anything past "no token at all" gets the same message so callers
        // cannot tell a bad signature from an expired token.
        let message = match self {
            AuthError::MissingHeader | AuthError::MissingToken => {
                "userToken is required for authorization"
            }
            AuthError::InvalidFormat | AuthError::InvalidToken => "Invalid or expired userToken",
        };

        ApiError::Unauthorized(message.to_string()).into_response()
    }
}
