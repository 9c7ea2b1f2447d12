use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{TokenForm, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::verify_password,
    },
    errors::{AppError, AppResult},
    extract::AppForm,
    state::AppState,
};

const BAD_LOGIN: &str = "Incorrect email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(login_for_access_token))
        .route("/refresh_token", post(refresh_access_token))
}

#[instrument(skip(state, form), fields(email = %form.username))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    AppForm(form): AppForm<TokenForm>,
) -> AppResult<Json<TokenResponse>> {
    let Some(user) = state.users.find_by_email(&form.username).await? else {
        warn!("login unknown email");
        return Err(AppError::unauthorized(BAD_LOGIN));
    };

    if !verify_password(&form.password, &user.password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized(BAD_LOGIN));
    }

    let access_token = JwtKeys::from_ref(&state).create_access_token(&user.email)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<TokenResponse>> {
    let access_token = JwtKeys::from_ref(&state).create_access_token(&user.email)?;
    info!("token refreshed");
    Ok(Json(TokenResponse::bearer(access_token)))
}
