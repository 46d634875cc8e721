//! Authentication handlers.

use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::AppState;
use crate::auth::{AccountId, UserDocument};
use crate::web::dto::{
    ApiResponse, SignInRequest, SignUpRequest, ValidatedJson, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::{apply_session_cookie, SessionSecret};

/// POST /api/auth/sign-up - Register and email an OTP.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> Result<Json<ApiResponse<AccountId>>, ApiError> {
    let account = state
        .users
        .create_account(req.full_name.trim(), &req.email)
        .await
        .map_err(ApiError::failed("create account"))?;

    Ok(Json(ApiResponse::new(account)))
}

/// POST /api/auth/sign-in - Email an OTP to an existing user.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> Result<Json<ApiResponse<AccountId>>, ApiError> {
    let account = state
        .users
        .sign_in_user(&req.email)
        .await
        .map_err(ApiError::failed("sign in user"))?;

    Ok(Json(ApiResponse::new(account)))
}

/// POST /api/auth/verify - Exchange the OTP for a session cookie.
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<ApiResponse<VerifyOtpResponse>>), ApiError> {
    let verified = state
        .users
        .verify_secret(&req.account_id, &req.password)
        .await
        .map_err(ApiError::failed("verify OTP"))?;

    let jar = apply_session_cookie(jar, verified.cookie, state.secure_cookies);
    let response = VerifyOtpResponse {
        session_id: verified.session_id,
        redirect_to: "/".to_string(),
    };
    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/sign-out - End the session and go back to sign-in.
///
/// Always redirects, even when the session could not be deleted.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let effect = state.users.sign_out_user(session.as_deref()).await;
    let jar = apply_session_cookie(jar, effect, state.secure_cookies);
    (jar, Redirect::to("/sign-in"))
}

/// GET /api/auth/me - The signed-in user, or null without user document.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
) -> Result<Json<ApiResponse<Option<UserDocument>>>, ApiError> {
    let user = state
        .users
        .get_current_user(session.as_deref())
        .await
        .map_err(ApiError::failed("get current user"))?;

    Ok(Json(ApiResponse::new(user)))
}
