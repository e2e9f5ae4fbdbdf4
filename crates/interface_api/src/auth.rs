//! Authentication and authorization
//!
//! Bearer tokens are HS256 JWTs. The subject becomes the actor id stamped on
//! every mutation; the `roles` claim is mapped onto `core_kernel::Role`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Actor, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator id)
    pub sub: String,
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// The actor these claims authenticate; unknown role names are ignored
    pub fn actor(&self) -> Actor {
        let roles = self.roles.iter().filter_map(|r| Role::parse(r)).collect();
        Actor::new(self.sub.clone(), roles)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a signed token for `user_id`
pub fn create_token(
    user_id: &str,
    roles: &[Role],
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(i64::try_from(expiration_secs).unwrap_or(i64::MAX / 1000));

    let claims = Claims {
        sub: user_id.to_string(),
        roles: roles.iter().map(|r| role_name(*r).to_string()).collect(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Finance => "finance",
        Role::System => "system",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_carries_actor() {
        let token = create_token("fin-42", &[Role::Finance], SECRET, 60).unwrap();
        let actor = validate_token(&token, SECRET).unwrap().actor();

        assert_eq!(actor.id, "fin-42");
        assert!(actor.has_role(Role::Finance));
        assert!(!actor.has_role(Role::Admin));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("fin-42", &[Role::Finance], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_unknown_roles_are_dropped() {
        let claims = Claims {
            sub: "x".into(),
            roles: vec!["guest".into(), "admin".into()],
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.actor().roles, vec![Role::Admin]);
    }
}
