//! `CurrentUser` extractor
//!
//! Every `/api` handler takes a [`CurrentUser`]. The bearer token must be
//! valid and must name the company the caller acts for; everything the
//! handler touches is then scoped by that `company_id`.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let Some(header) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = parts.uri.to_string());
        return Err(AppError::unauthorized());
    };

    JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Expected `Authorization: Bearer <token>`"))
}

fn rejection(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

/// Tokens without a tenant cannot reach company data
fn require_tenant(user: CurrentUser) -> Result<CurrentUser, AppError> {
    if user.company_id <= 0 {
        return Err(AppError::with_message(
            ErrorCode::TenantMismatch,
            "Token is not bound to a company",
        )
        .with_detail("company_id", user.company_id));
    }
    Ok(user)
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = state.get_jwt_service().validate_token(token).map_err(|e| {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = parts.uri.to_string()
            );
            rejection(e)
        })?;

        let user = CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))
            .and_then(require_tenant)?;

        tracing::debug!(user_id = user.id, company_id = user.company_id, "Authenticated");
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = http::Request::builder().uri("/api/attendance");
        if let Some(value) = header {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let err = bearer_token(&parts_with(None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_non_bearer_header_is_invalid_token() {
        let err = bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);

        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_expired_maps_to_token_expired() {
        assert_eq!(rejection(JwtError::ExpiredToken).code, ErrorCode::TokenExpired);
        assert_eq!(rejection(JwtError::InvalidSignature).code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_token_without_company_is_rejected() {
        let user = CurrentUser {
            id: 1,
            company_id: 0,
            role: Role::Admin,
        };
        assert_eq!(require_tenant(user).unwrap_err().code, ErrorCode::TenantMismatch);
    }
}
