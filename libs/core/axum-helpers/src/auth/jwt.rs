use super::config::JwtConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub username: String,   // Login name (email)
    pub roles: Vec<String>, // One entry per assigned role
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// A signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Stateless HS256 token issuing and verification.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(ttl_secs = config.token_ttl_secs, "JWT auth initialized");
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::seconds(config.token_ttl_secs),
        }
    }

    pub fn create_token(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> eyre::Result<IssuedToken> {
        let now = Utc::now();
        let expiration = now + self.ttl;

        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken { token, expiration })
    }

    /// Check signature and expiry, then decode the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(secret: &str) -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(secret))
    }

    #[test]
    fn test_token_round_trip_keeps_claims() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!");
        let user_id = Uuid::now_v7();

        let issued = auth
            .create_token(user_id, "ada@example.com", &["Admin".to_string()])
            .unwrap();
        let claims = auth.verify_token(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "ada@example.com");
        assert_eq!(claims.roles, vec!["Admin".to_string()]);
        assert_eq!(claims.exp, issued.expiration.timestamp());
    }

    #[test]
    fn test_token_expires_after_thirty_days() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!");
        let issued = auth.create_token(Uuid::now_v7(), "ada@example.com", &[]).unwrap();

        let lifetime = issued.expiration - Utc::now();
        assert!(lifetime > Duration::days(29));
        assert!(lifetime <= Duration::days(30));
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let auth = auth("this-is-a-valid-secret-with-32-chars!");
        let user_id = Uuid::now_v7();

        let first = auth.create_token(user_id, "ada@example.com", &[]).unwrap();
        let second = auth.create_token(user_id, "ada@example.com", &[]).unwrap();

        let first = auth.verify_token(&first.token).unwrap();
        let second = auth.verify_token(&second.token).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = auth("this-is-a-valid-secret-with-32-chars!");
        let verifier = auth("another-secret-that-is-32-chars-long");

        let issued = issuer.create_token(Uuid::now_v7(), "ada@example.com", &[]).unwrap();
        assert!(verifier.verify_token(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuth::new(
            &JwtConfig::new("this-is-a-valid-secret-with-32-chars!").with_token_ttl(-3600),
        );

        let issued = auth.create_token(Uuid::now_v7(), "ada@example.com", &[]).unwrap();
        assert!(auth.verify_token(&issued.token).is_err());
    }
}
