use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::domain::repositories::User;
use crate::domain::user::{Email, UserRole};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a profile update
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Token plus the account it was issued for
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    create_token(user.id, user.role, &state.config.jwt_secret, state.config.jwt_ttl_hours)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Register a new customer account
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;
    validate_password(&req.password).map_err(ApiError::bad_request)?;

    let full_name = req.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::bad_request("Full name is required"));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to hash password: {}", e)))?;

    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash,
        full_name,
        phone: optional_text(req.phone),
        role: UserRole::Customer,
        is_active: true,
        created_at: Utc::now(),
    };
    state.users.create(user.clone()).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let token = issue_token(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Malformed emails get the same answer as unknown ones
    let email = Email::new(&req.email).map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        ApiError::internal_server_error(format!("Password verification failed: {}", e))
    })?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if let Err(e) = state.users.update_last_login(user.id).await {
        tracing::warn!(error = %e, user_id = %user.id, "Failed to record last login");
    }

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Current account
///
/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(&user)))
}

/// Update name and phone of the current account
///
/// PATCH /api/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(full_name) = req.full_name {
        let full_name = full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(ApiError::bad_request("Full name cannot be empty"));
        }
        user.full_name = full_name;
    }
    if req.phone.is_some() {
        user.phone = optional_text(req.phone);
    }

    state.users.update(&user).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
