//! Authentication route handlers.
//!
//! Login, registration, dashboard access checks and profile edits.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use shopkart_core::{
    AccessResponse, LoginRequest, LoginResponse, RegisterRequest, UpdateDetailsRequest,
    UserResponse,
};

use crate::config::LoginErrorDetail;
use crate::db::Store;
use crate::error::Result;
use crate::middleware::Authorized;
use crate::middleware::auth::{AdminDashboard, EditProfile, UserDashboard};
use crate::services::auth::Registration;
use crate::state::AppState;

/// `POST /api/v1/auth/login`
///
/// A body that is not valid JSON is treated like one without credentials.
#[tracing::instrument(skip_all)]
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    match state
        .auth()
        .login(request.email.as_deref(), request.password.as_deref())
        .await
    {
        Ok(outcome) => {
            tracing::info!(user_id = %outcome.user.id, "login succeeded");
            Ok(Json(LoginResponse {
                success: true,
                message: "Logged in Successfully!".to_string(),
                user: outcome.user.to_public(),
                token: outcome.token,
            }))
        }
        Err(err) => {
            if err.is_login_failure() {
                tracing::warn!(kind = %err, "login failed");
            }
            let err = match state.config().login_errors {
                LoginErrorDetail::Detailed => err,
                LoginErrorDetail::Generic => err.generalized(),
            };
            Err(err.into())
        }
    }
}

/// `POST /api/v1/auth/register`
#[tracing::instrument(skip_all)]
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;

    let user = state
        .auth()
        .register(Registration {
            name: &request.name,
            email: &request.email,
            password: &request.password,
            phone: request.phone.as_deref(),
            address: request.address.as_deref(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            message: "User Registered Successfully!".to_string(),
            user: user.to_public(),
        }),
    ))
}

/// `GET /api/v1/auth/user-auth`
pub async fn user_auth(_: Authorized<UserDashboard>) -> Json<AccessResponse> {
    Json(AccessResponse { ok: true })
}

/// `GET /api/v1/auth/admin-auth`
pub async fn admin_auth(_: Authorized<AdminDashboard>) -> Json<AccessResponse> {
    Json(AccessResponse { ok: true })
}

/// `POST /api/v1/auth/update-details`
///
/// Edits the caller's own profile; the session is the only identity used.
#[tracing::instrument(skip_all)]
pub async fn update_details<S: Store>(
    Authorized { auth, .. }: Authorized<EditProfile>,
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<UpdateDetailsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(request) = payload?;

    let user = state.auth().update_profile(auth.user_id, &request).await?;

    tracing::info!(user_id = %user.id, "profile updated");
    Ok(Json(UserResponse {
        success: true,
        message: "Details updated successfully".to_string(),
        user: user.to_public(),
    }))
}
