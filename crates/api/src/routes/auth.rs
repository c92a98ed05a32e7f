//! Authentication routes for signup and login.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, error::error_response};
use atelier_core::auth::{PasswordError, hash_password, validate_credentials, verify_password};
use atelier_db::{UserRepository, entities::users, repositories::is_unique_violation};
use atelier_shared::{
    AppError,
    auth::{AuthResponse, CredentialsRequest, UserInfo},
};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn email_exists() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": "email_exists",
            "message": "An account with this email already exists"
        })),
    )
        .into_response()
}

/// Issues a token and renders the auth response.
fn token_response(
    state: &AppState,
    status: StatusCode,
    message: &str,
    user: users::Model,
) -> Response {
    match state.jwt_service.issue_token(user.id, &user.email) {
        Ok(token) => (
            status,
            Json(AuthResponse {
                message: message.to_string(),
                token,
                expires_in: state.jwt_service.expires_in(),
                user: UserInfo {
                    id: user.id,
                    email: user.email,
                },
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to issue token");
            error_response(&AppError::Internal(e.to_string()))
        }
    }
}

/// POST /auth/signup - Register a new user.
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Response {
    let email = normalize_email(&payload.email);
    if let Err(e) = validate_credentials(&email, &payload.password) {
        return error_response(&AppError::Validation(e.to_string()));
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&email).await {
        Ok(true) => return email_exists(),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return error_response(&AppError::Database(e.to_string()));
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return error_response(&AppError::Internal(e.to_string()));
        }
    };

    let user = match user_repo.create(&email, &password_hash).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same email.
        Err(e) if is_unique_violation(&e) => return email_exists(),
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return error_response(&AppError::Database(e.to_string()));
        }
    };

    info!(user_id = %user.id, "User signed up");
    token_response(&state, StatusCode::CREATED, "User created successfully", user)
}

/// POST /auth/login - Authenticate a user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Response {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return invalid_credentials();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return error_response(&AppError::Database(e.to_string()));
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(PasswordError::InvalidHash) => {
            error!(user_id = %user.id, "Stored password hash is malformed");
            return error_response(&AppError::Internal("malformed password hash".into()));
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return error_response(&AppError::Internal(e.to_string()));
        }
    }

    info!(user_id = %user.id, "User logged in");
    token_response(&state, StatusCode::OK, "Login successful", user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Artist@Example.COM "), "artist@example.com");
    }
}
