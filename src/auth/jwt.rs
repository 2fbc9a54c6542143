//! JWT token handling

use crate::auth::models::Identity;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claim names owned by the codec
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Create claims for an identity, valid for `ttl`
    pub fn for_identity(identity: &Identity, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        let mut identity = identity.clone();
        for reserved in RESERVED_CLAIMS {
            identity.extra.remove(reserved);
        }
        Self {
            identity,
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }
}

/// Signs and verifies session tokens with a server secret
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        // Client-supplied claims such as `aud` ride along unchecked
        let mut validation = Validation::default();
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.secret.as_bytes(),
            chrono::Duration::days(config.token_ttl_days),
        )
    }

    /// Sign a token for `identity`. Tokens cannot be revoked; they stay
    /// valid until `exp` whatever happens to the stored user.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.encode(&Claims::for_identity(identity, self.ttl))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| Error::Config(format!("Failed to create token: {}", e)))
    }

    /// Validate signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", chrono::Duration::days(365))
    }

    #[test]
    fn test_issue_and_verify_token() {
        let codec = codec();
        let token = codec.issue(&Identity::new("a@x.com")).expect("Failed to create token");
        let claims = codec.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.email(), "a@x.com");
        assert!(claims.exp > chrono::Utc::now().timestamp());
        assert_eq!(claims.exp - claims.iat, 365 * 24 * 60 * 60);
    }

    #[test]
    fn test_invalid_token() {
        let result = codec().verify("invalid.token.here");
        assert!(matches!(result, Err(Error::InvalidToken(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = TokenCodec::new(b"another-secret", chrono::Duration::days(365));
        let token = other.issue(&Identity::new("a@x.com")).expect("Failed to create token");
        assert!(codec().verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = codec();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            identity: Identity::new("a@x.com"),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = codec.encode(&claims).expect("Failed to create token");
        assert!(matches!(codec.verify(&token), Err(Error::InvalidToken(_))));
    }

    #[test]
    fn test_extra_identity_fields_round_trip() {
        let mut identity = Identity::new("a@x.com");
        identity.extra.insert("name".to_string(), json!("Ann"));
        identity.extra.insert("exp".to_string(), json!(1));

        let codec = codec();
        let claims = codec
            .verify(&codec.issue(&identity).expect("issue"))
            .expect("verify");
        assert_eq!(claims.identity.extra.get("name"), Some(&json!("Ann")));
        assert!(!claims.identity.extra.contains_key("exp"));
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_audience_field_does_not_invalidate_token() {
        let mut identity = Identity::new("a@x.com");
        identity.extra.insert("aud".to_string(), json!("web"));

        let codec = codec();
        let claims = codec
            .verify(&codec.issue(&identity).expect("issue"))
            .expect("token with aud verifies");
        assert_eq!(claims.email(), "a@x.com");
        assert_eq!(claims.identity.extra.get("aud"), Some(&json!("web")));
    }
}
