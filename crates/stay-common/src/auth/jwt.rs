//! JWT verification
//!
//! Tokens are issued elsewhere; this side only checks the HS256 signature and
//! expiry and turns the claims into an [`Actor`].

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use stay_core::{Actor, ActorRole, Snowflake, TokenError, TokenVerifier};

use crate::config::JwtConfig;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub role: ActorRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject is not a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, TokenError> {
        self.sub
            .parse::<Snowflake>()
            .map_err(|_| TokenError::Invalid(format!("subject is not a user id: {}", self.sub)))
    }
}

/// HS256 token verifier
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    #[must_use]
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.leeway_secs)
    }

    /// Decode and validate a token
    ///
    /// # Errors
    /// Returns an error if the token is malformed, badly signed or expired
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Actor, TokenError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        let claims = self.decode_claims(token)?;
        Ok(Actor {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn token(sub: &str, role: ActorRole, expires_in: Duration, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_user_token() {
        let verifier = JwtVerifier::new(SECRET, 0);
        let raw = token("12345", ActorRole::User, Duration::minutes(15), SECRET);

        let actor = verifier.verify(&raw).unwrap();
        assert_eq!(actor.id, Snowflake::new(12345));
        assert_eq!(actor.role, ActorRole::User);
    }

    #[test]
    fn test_verify_accepts_bearer_prefix() {
        let verifier = JwtVerifier::new(SECRET, 0);
        let raw = token("7", ActorRole::Admin, Duration::minutes(15), SECRET);

        let actor = verifier.verify(&format!("Bearer {raw}")).unwrap();
        assert!(actor.is_admin());
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtVerifier::new(SECRET, 0);
        let raw = token("1", ActorRole::User, Duration::minutes(-10), SECRET);

        assert_eq!(verifier.verify(&raw).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret() {
        let verifier = JwtVerifier::new(SECRET, 0);
        let raw = token("1", ActorRole::User, Duration::minutes(15), "another-secret");

        assert!(matches!(verifier.verify(&raw), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_non_numeric_subject() {
        let verifier = JwtVerifier::new(SECRET, 0);
        let raw = token("alice", ActorRole::User, Duration::minutes(15), SECRET);

        assert!(matches!(verifier.verify(&raw), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_token() {
        let verifier = JwtVerifier::new(SECRET, 0);
        assert!(verifier.verify("not.a.jwt").is_err());
    }
}
