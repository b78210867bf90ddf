use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::{LoginRequest, PublicProfile, RegisterRequest, UserRecord},
    services::Database,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    Extension, RequestPartsExt, TypedHeader,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use validator::Validate;

/// Tokens come from the hosted identity provider; we share its signing
/// secret, so bearer validation is local. The provider itself is only
/// reached by the register/login proxy calls.
#[derive(Clone)]
pub struct AuthService {
    config: Config,
    db: Arc<Database>,
    http_client: Client,
    user_cache: Arc<RwLock<HashMap<String, CachedUser>>>,
}

#[derive(Debug, Clone)]
struct CachedUser {
    user: AuthUser,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub email: Option<String>,
}

/// The authenticated caller, as resolved from the local `user` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderSession {
    access_token: String,
}

impl AuthService {
    pub async fn new(config: &Config, db: Arc<Database>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            db,
            http_client,
            user_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("JWT verification failed: {}", e);
                Err(AppError::Authentication("Invalid token".to_string()))
            }
        }
    }

    /// The token only proves identity; role, name and avatar live in the
    /// local `user` table. A missing row means the account was never
    /// provisioned here.
    pub async fn resolve_user(&self, user_id: &str) -> Result<AuthUser> {
        if let Some(user) = self.get_cached_user(user_id).await {
            debug!("Using cached user data for user: {}", user_id);
            return Ok(user);
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                    SELECT meta::id(id) AS id, name, username, role, profile_pic, bio
                    FROM user WHERE meta::id(id) = $user_id
                "#,
                json!({ "user_id": user_id }),
            )
            .await?;
        let users: Vec<AuthUser> = response.take(0)?;

        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User role not found".to_string()))?;

        self.cache_user(user.clone()).await;
        Ok(user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<PublicProfile> {
        request.validate().map_err(AppError::ValidatorError)?;

        let existing: Option<serde_json::Value> =
            self.db.find_one("user", "username", &request.username).await?;
        if existing.is_some() {
            return Err(AppError::BadRequest(
                "This username is already taken".to_string(),
            ));
        }

        let provider_user = self.provider_signup(&request.email, &request.password).await?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        let record = UserRecord {
            id: provider_user.id,
            username: request.username,
            name: request.name,
            password: password_hash,
            role: "user".to_string(),
            profile_pic: None,
            bio: None,
            created_at: Utc::now(),
        };

        let created: UserRecord = self.db.create("user", record).await?;
        info!("Registered user {} ({})", created.username, created.id);

        Ok(PublicProfile {
            id: created.id,
            name: created.name,
            username: created.username,
            role: created.role,
            profile_pic: created.profile_pic,
            bio: created.bio,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<String> {
        let url = format!(
            "{}/auth/v1/token?grant_type=password",
            self.config.auth_service_url
        );

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.auth_service_token)
            .json(&json!({ "email": request.email, "password": request.password }))
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider unreachable: {}", e);
                AppError::ExternalService("Failed to reach identity provider".to_string())
            })?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST
            || response.status() == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AppError::BadRequest(
                "Your password is incorrect or this email doesn't exist".to_string(),
            ));
        }
        if !response.status().is_success() {
            warn!("Identity provider login failed: {}", response.status());
            return Err(AppError::ExternalService(
                "Identity provider rejected the login".to_string(),
            ));
        }

        let session: ProviderSession = response.json().await.map_err(|e| {
            error!("Failed to parse identity provider response: {}", e);
            AppError::ExternalService("Invalid response from identity provider".to_string())
        })?;

        Ok(session.access_token)
    }

    async fn provider_signup(&self, email: &str, password: &str) -> Result<ProviderUser> {
        let url = format!("{}/auth/v1/signup", self.config.auth_service_url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.auth_service_token)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider unreachable: {}", e);
                AppError::ExternalService("Failed to reach identity provider".to_string())
            })?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST
            || response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            return Err(AppError::BadRequest(
                "User with this email already exists".to_string(),
            ));
        }
        if !response.status().is_success() {
            warn!("Identity provider signup failed: {}", response.status());
            return Err(AppError::BadRequest(
                "Failed to create user. Please try again.".to_string(),
            ));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse identity provider response: {}", e);
            AppError::ExternalService("Invalid response from identity provider".to_string())
        })
    }

    async fn get_cached_user(&self, user_id: &str) -> Option<AuthUser> {
        let cache = self.user_cache.read().await;
        if let Some(cached) = cache.get(user_id) {
            if cached.expires_at > Utc::now() {
                return Some(cached.user.clone());
            }
        }
        None
    }

    async fn cache_user(&self, user: AuthUser) {
        let mut cache = self.user_cache.write().await;
        cache.insert(
            user.id.clone(),
            CachedUser {
                user,
                expires_at: Utc::now() + Duration::minutes(15),
            },
        );
    }

    /// Evicts expired cache entries; driven by a background task.
    pub async fn cleanup_expired_sessions(&self) -> Result<()> {
        let now = Utc::now();

        let mut user_cache = self.user_cache.write().await;
        let before_count = user_cache.len();
        user_cache.retain(|_, cached| cached.expires_at > now);
        debug!(
            "Cleaned {} expired user cache entries",
            before_count - user_cache.len()
        );

        Ok(())
    }
}

// Axum extractor for authentication
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

        let Extension(auth_service): Extension<AuthService> = parts
            .extract::<Extension<AuthService>>()
            .await
            .map_err(|_| {
                AppError::Internal("Auth service not found in request extensions".to_string())
            })?;

        let claims = auth_service.verify_jwt(bearer.token())?;
        auth_service.resolve_user(&claims.sub).await
    }
}

/// Extractor for admin-only routes: authentication plus a role check.
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != "admin" {
            return Err(AppError::Authorization(
                "Forbidden: You do not have admin access".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}
