use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::AdminIdentity;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks HS256 session tokens for the admin.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(SESSION_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, identity: &AdminIdentity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Rejects bad signatures, tampered payloads and expired tokens alike.
    pub fn verify(&self, token: &str) -> Result<AdminIdentity, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AppError::InvalidToken
        })?;

        Ok(AdminIdentity {
            id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminIdentity {
        AdminIdentity {
            id: 1,
            username: "admin".to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = SessionIssuer::new("a-long-random-signing-key");
        let token = issuer.issue(&admin()).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), admin());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = SessionIssuer::new("key-one").issue(&admin()).unwrap();
        let err = SessionIssuer::new("key-two").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = SessionIssuer::new("a-long-random-signing-key");
        let token = issuer.issue(&admin()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = SessionIssuer::new("attacker-key")
            .issue(&AdminIdentity {
                id: 1,
                username: "mallory".to_string(),
            })
            .unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();

        assert!(matches!(
            issuer.verify(&parts.join(".")),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = SessionIssuer::with_ttl("a-long-random-signing-key", Duration::hours(-1));
        let token = issuer.issue(&admin()).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = SessionIssuer::new("a-long-random-signing-key");
        assert!(matches!(issuer.verify("not-a-token"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expiry_is_a_day_out() {
        let issuer = SessionIssuer::new("a-long-random-signing-key");
        let token = issuer.issue(&admin()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"a-long-random-signing-key"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_HOURS * 3600);
    }
}
