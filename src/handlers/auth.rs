use crate::handlers::directory::CredentialDirectory;
use crate::handlers::error::ApiError;
use crate::models::all_models::{Subject, UserRole};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Structure representing JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: String,
    pub role: UserRole,
    pub iat: usize, // Issued-at timestamp
    pub exp: usize, // Expiration timestamp
}

impl Claims {
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id.clone(),
            role: self.role,
        }
    }
}

/// Signs and verifies tokens with the process-wide secret and algorithm.
pub struct TokenAuthority {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Self {
        TokenAuthority {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generates a token for a subject, valid for `ttl` from now
    pub fn issue(&self, subject: &Subject) -> Result<String, ApiError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &Subject, issued_at: DateTime<Utc>) -> Result<String, ApiError> {
        let expiration = issued_at + self.ttl;
        let claims = Claims {
            id: subject.id.clone(),
            role: subject.role,
            iat: issued_at.timestamp().max(0) as usize,
            exp: expiration.timestamp().max(0) as usize,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validates signature and expiry. Every failure collapses into
    /// `InvalidToken`; the cause is only logged.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        debug!("Rejected expired token")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        debug!("Rejected token with invalid signature")
                    }
                    kind => debug!("Rejected token: {:?}", kind),
                }
                ApiError::InvalidToken
            })
    }
}

/// Login result returned to the client
#[derive(Debug, Serialize)]
pub struct IssuedCredential {
    pub token: String,
    pub user: Subject,
}

/// Resolves the credentials and signs a token for the matching subject.
pub fn issue_credential(
    directory: &dyn CredentialDirectory,
    tokens: &TokenAuthority,
    username: &str,
    password: &str,
) -> Result<IssuedCredential, ApiError> {
    let Some(user) = directory.resolve(username, password) else {
        warn!("Failed login attempt for {:?}", username);
        return Err(ApiError::InvalidCredentials);
    };

    let token = tokens.issue(&user)?;
    info!("Issued token for {} ({})", user.id, user.role);

    Ok(IssuedCredential { token, user })
}
