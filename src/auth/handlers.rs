use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, SignupRequest, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::is_unique_violation,
        repo_types::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("signup missing email or password");
        return Err(ApiError::bad_request("Email and password are required"));
    }

    // Hashing is CPU-heavy; keep it off the request threads
    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "hash task failed");
            ApiError::internal("Failed to create user")
        })?
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::internal("Failed to create user")
        })?;

    let user = match User::create(&state.db, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::internal("Failed to create user"));
        }
    };

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("login missing email or password");
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::not_found("User not found"));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::internal("Failed to login"));
        }
    };

    let password = payload.password;
    let stored_hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!(error = %e, "verify task failed");
            ApiError::internal("Failed to login")
        })?
        .map_err(|e| {
            error!(error = %e, "verify_password failed");
            ApiError::internal("Failed to login")
        })?;

    if !ok {
        warn!(user_id = user.id, "login incorrect password");
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal("Failed to login")
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn signup_requires_email_and_password() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                email: "".into(),
                password: "pw1".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_rejects_missing_password() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                email: "a@x.com".into(),
                password: "".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_requires_email_and_password() {
        let state = AppState::fake();
        let err = login(
            State(state),
            Json(LoginRequest {
                email: "a@x.com".into(),
                password: "".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
