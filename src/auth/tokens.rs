//! JWT issuance and verification.
//!
//! Access and refresh tokens are signed with separate HS256 secrets and
//! carry the same profile claims, so either side can render the current
//! user without a lookup. Access tokens live 7 days, refresh tokens 14.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::User;
use crate::error::ApiError;

/// Access token lifetime.
const ACCESS_TTL_DAYS: i64 = 7;
/// Refresh token lifetime.
const REFRESH_TTL_DAYS: i64 = 14;

/// Profile claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: Uuid,
    /// Role name as stored.
    pub role: String,
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
    /// Contact phone.
    pub phone: String,
    /// Avatar URL, when set.
    pub avatar: Option<String>,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived cookie token backing the stored session.
    pub refresh_token: String,
}

/// Signs and verifies the two token families.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Builds an issuer from the two configured secrets.
    #[must_use]
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Issues a fresh access/refresh pair for the user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] when signing fails.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
        let now = Utc::now();
        let access_token = encode(
            &Header::default(),
            &claims_for(user, now + Duration::days(ACCESS_TTL_DAYS), now),
            &self.access_encoding,
        )
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
        let refresh_token = encode(
            &Header::default(),
            &claims_for(user, now + Duration::days(REFRESH_TTL_DAYS), now),
            &self.refresh_encoding,
        )
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies an access token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for any invalid or expired
    /// token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        verify(token, &self.access_decoding)
    }

    /// Verifies a refresh token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for any invalid or expired
    /// token.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        verify(token, &self.refresh_decoding)
    }
}

fn claims_for(user: &User, exp: chrono::DateTime<Utc>, iat: chrono::DateTime<Utc>) -> Claims {
    Claims {
        id: user.id,
        role: user.role.clone(),
        name: user.name.clone(),
        username: user.username.clone(),
        phone: user.phone.clone(),
        avatar: user.avatar.clone(),
        exp: exp.timestamp(),
        iat: iat.timestamp(),
    }
}

fn verify(token: &str, key: &DecodingKey) -> Result<Claims, ApiError> {
    decode::<Claims>(token, key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized("token_invalid".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Aliya".into(),
            email: Some("aliya@example.com".into()),
            username: "aliya".into(),
            role: "Manager".into(),
            password_hash: "irrelevant".into(),
            avatar: None,
            phone: "+70000000000".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_access_token_verifies_and_carries_profile() {
        let issuer = TokenIssuer::new("access-secret", "refresh-secret");
        let user = sample_user();
        let pair = issuer.issue_pair(&user).unwrap_or_else(|_| TokenPair {
            access_token: String::new(),
            refresh_token: String::new(),
        });
        let claims = issuer.verify_access(&pair.access_token);
        assert!(claims.as_ref().is_ok_and(|c| c.id == user.id));
        assert!(claims.is_ok_and(|c| c.role == "Manager" && c.username == "aliya"));
    }

    #[test]
    fn token_families_do_not_cross_verify() {
        let issuer = TokenIssuer::new("access-secret", "refresh-secret");
        let user = sample_user();
        let pair = issuer.issue_pair(&user).unwrap_or_else(|_| TokenPair {
            access_token: String::new(),
            refresh_token: String::new(),
        });
        assert!(issuer.verify_access(&pair.refresh_token).is_err());
        assert!(issuer.verify_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = TokenIssuer::new("a", "b");
        assert!(issuer.verify_access("not-a-token").is_err());
    }
}
