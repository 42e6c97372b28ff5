// src/auth.rs
use crate::core::config_manager::AuthConfig;
use crate::core::database::{Database, ProfileRepository, UserProfile};
use anyhow::{Context, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID (uid)
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Verifies HS256 bearer tokens issued by the identity provider.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET is not configured")?;

        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Authenticated user with their stored profile
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub profile: UserProfile,
}

impl AuthenticatedUser {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Last auth failure of a request, read back by the 401 catcher.
pub struct AuthFailure(pub Option<AuthError>);

fn fail(req: &Request<'_>, status: Status, err: AuthError) -> Outcome<AuthenticatedUser, AuthError> {
    req.local_cache(|| AuthFailure(Some(err)));
    Outcome::Error((status, err))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let verifier = match req.guard::<&State<TokenVerifier>>().await {
            Outcome::Success(verifier) => verifier,
            Outcome::Error((status, _)) => return fail(req, status, AuthError::NotConfigured),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let database = match req.guard::<&State<Database>>().await {
            Outcome::Success(db) => db,
            Outcome::Error((status, _)) => return fail(req, status, AuthError::DatabaseError),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => token.trim(),
                _ => {
                    warn!("Invalid Authorization header format");
                    return fail(req, Status::Unauthorized, AuthError::InvalidToken);
                }
            },
            None => {
                warn!("Missing Authorization header");
                return fail(req, Status::Unauthorized, AuthError::MissingToken);
            }
        };

        let claims = match verifier.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Token verification failed: {}", e);
                return fail(req, Status::Unauthorized, AuthError::TokenVerificationFailed);
            }
        };

        let profile = match ProfileRepository::new(database.pool())
            .record_login(&claims.sub, &claims.email)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                error!("Failed to record login for {}: {:#}", claims.sub, e);
                return fail(req, Status::InternalServerError, AuthError::DatabaseError);
            }
        };

        info!("User {} authenticated", claims.sub);

        Outcome::Success(AuthenticatedUser {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            profile,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    NotConfigured,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::NotConfigured => "Authentication is not configured on this server",
            AuthError::DatabaseError => "Database error occurred",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenVerificationFailed => "TOKEN_VERIFICATION_FAILED",
            AuthError::NotConfigured => "AUTH_NOT_CONFIGURED",
            AuthError::DatabaseError => "DATABASE_ERROR",
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_verifies_signed_token() {
        let config = AuthConfig {
            jwt_secret: Some("s3cret".into()),
            ..AuthConfig::default()
        };
        let verifier = TokenVerifier::from_config(&config).unwrap();
        let t = token(
            "s3cret",
            &serde_json::json!({"sub": "uid-1", "email": "a@example.com", "exp": far_future()}),
        );
        let claims = verifier.verify(&t).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email, "a@example.com");

        let forged = token("other", &serde_json::json!({"sub": "uid-1", "exp": far_future()}));
        assert!(verifier.verify(&forged).is_err());
    }

    #[test]
    fn test_issuer_and_audience_checked_when_configured() {
        let config = AuthConfig {
            jwt_secret: Some("s3cret".into()),
            issuer: Some("https://id.example.com".into()),
            audience: Some("interview-coach".into()),
        };
        let verifier = TokenVerifier::from_config(&config).unwrap();

        let good = token(
            "s3cret",
            &serde_json::json!({"sub": "u", "exp": far_future(), "iss": "https://id.example.com", "aud": "interview-coach"}),
        );
        assert!(verifier.verify(&good).is_ok());

        let wrong_aud = token(
            "s3cret",
            &serde_json::json!({"sub": "u", "exp": far_future(), "iss": "https://id.example.com", "aud": "other"}),
        );
        assert!(verifier.verify(&wrong_aud).is_err());
    }

    #[test]
    fn test_missing_secret_rejected() {
        assert!(TokenVerifier::from_config(&AuthConfig::default()).is_err());
    }
}
