use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Claims, SessionUser};
use crate::features::users::models::User;

/// Issues and verifies the signed session tokens handed out at sign-in.
///
/// Tokens are stateless HS256 JWTs. There is no refresh flow; expiry
/// forces a new Slack sign-in.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age: Duration,
}

impl TokenService {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            max_age: config.max_age,
        }
    }

    /// Issue a session token for a freshly authenticated user.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.max_age.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Decode and validate a session token into the claimed identity.
    pub fn verify(&self, token: &str) -> Result<SessionUser> {
        let data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired session token".to_string()))?;

        Ok(SessionUser {
            user_id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;

    fn test_service(secret: &str) -> TokenService {
        TokenService::new(&SessionConfig {
            secret: secret.to_string(),
            max_age: Duration::from_secs(3600),
        })
    }

    fn test_user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            icon: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let service = test_service("test-secret");
        let user = test_user(42, UserRole::Admin);

        let token = service.issue(&user).unwrap();
        let session = service.verify(&token).unwrap();

        assert_eq!(session.user_id, 42);
        assert_eq!(session.email, user.email);
        assert_eq!(session.role, UserRole::Admin);
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let token = test_service("secret-a")
            .issue(&test_user(1, UserRole::User))
            .unwrap();

        assert!(test_service("secret-b").verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let secret = "test-secret";
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            email: "user1@example.com".to_string(),
            role: UserRole::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(test_service(secret).verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(test_service("test-secret").verify("not-a-jwt").is_err());
    }
}
