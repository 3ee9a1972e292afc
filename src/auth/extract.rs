//! Request extractors for the authenticated user and the caller
//! audience.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::auth::tokens::Claims;
use crate::domain::{Audience, Role};
use crate::error::ApiError;

/// Header distinguishing the trusted admin backend from the public
/// site.
const SERVICE_HEADER: &str = "x-service-id";

/// An authenticated staff user, extracted from the `Authorization`
/// bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified token claims.
    pub claims: Claims,
}

impl AuthUser {
    /// The caller's role, parsed leniently (unknown roles degrade to
    /// the lowest rank).
    #[must_use]
    pub fn role(&self) -> Role {
        Role::parse(&self.claims.role)
    }

    /// Requires at least the given role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] when the caller ranks below it.
    pub fn require(&self, minimum: Role) -> Result<(), ApiError> {
        if self.role() >= minimum {
            Ok(())
        } else {
            Err(ApiError::Forbidden("insufficient role".into()))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("token_not_found".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("token_not_found".into()))?;
        let claims = state.tokens.verify_access(token)?;
        Ok(Self { claims })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Audience {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_admin = parts
            .headers
            .get(SERVICE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "admin");
        Ok(if is_admin {
            Self::AdminService
        } else {
            Self::Public
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(role: &str) -> AuthUser {
        AuthUser {
            claims: Claims {
                id: uuid::Uuid::new_v4(),
                role: role.into(),
                name: "n".into(),
                username: "u".into(),
                phone: "p".into(),
                avatar: None,
                exp: 0,
                iat: 0,
            },
        }
    }

    #[test]
    fn role_gate_honors_the_hierarchy() {
        assert!(auth_user("Admin").require(Role::Manager).is_ok());
        assert!(auth_user("Manager").require(Role::Manager).is_ok());
        assert!(auth_user("Member").require(Role::Manager).is_err());
    }

    #[test]
    fn unknown_role_ranks_lowest() {
        assert!(auth_user("Owner").require(Role::Manager).is_err());
        assert!(auth_user("Owner").require(Role::Member).is_ok());
    }
}
