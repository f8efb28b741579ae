//! Authentication Middleware
//!
//! Axum middleware for JWT authentication and admin authorization

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::common::AppError;
use crate::security_log;
use crate::server::ServerState;
use crate::server::auth::{CurrentUser, JwtService};

/// Require authentication middleware
///
/// Extracts and validates the JWT token from the Authorization header.
/// If valid, adds the CurrentUser to the request extensions.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Allow OPTIONS requests for CORS preflight (skip auth)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Skip auth for non-API routes (let them return 404 normally)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // Skip auth for public API routes
    if path == "/api/health" {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?,
        None => {
            security_log!(WARN, "auth_missing", uri = ?req.uri());
            return Err(AppError::Unauthorized);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|e| {
                security_log!(WARN, "auth_bad_subject", error = %e, uri = ?req.uri());
                AppError::InvalidToken
            })?;

            tracing::debug!(
                user_id = %user.id,
                role = %user.role,
                "User authenticated successfully"
            );

            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = ?req.uri());

            match e {
                crate::server::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// Require admin role middleware
///
/// Layered onto the admin route family after require_auth has run.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_denied",
            user_id = %user.id,
            role = %user.role
        );
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
