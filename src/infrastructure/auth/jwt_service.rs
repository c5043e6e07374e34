use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Host token claims: the creating flow mints one per party, and every
/// host-only intent must present it for that party.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostClaims {
    pub party_id: String,
    pub host_name: String,
    pub exp: usize,
    pub iat: usize,
}

/// JWT service for host token management
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_seconds: usize,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            // A party is a single evening; a day of validity is plenty
            expires_in_seconds: 24 * 60 * 60,
        }
    }

    /// Sign a host token for a party
    pub fn sign(&self, party_id: &str, host_name: &str) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = HostClaims {
            party_id: party_id.to_string(),
            host_name: host_name.to_string(),
            exp: now + self.expires_in_seconds,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Sign(e.to_string()))
    }

    /// Verify and decode a host token
    pub fn verify(&self, token: &str) -> Result<HostClaims, JwtError> {
        let validation = Validation::default();
        decode::<HostClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::Invalid,
                _ => JwtError::Verify(e.to_string()),
            })
    }
}

/// JWT error types
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    Sign(String),
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to verify token: {0}")]
    Verify(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let service = JwtService::new("test-secret".to_string());
        let token = service.sign("party-1", "Sam").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.party_id, "party-1");
        assert_eq!(claims.host_name, "Sam");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let service = JwtService::new("secret-a".to_string());
        let other = JwtService::new("secret-b".to_string());
        let token = service.sign("party-1", "Sam").unwrap();

        assert!(other.verify(&token).is_err());
    }
}
