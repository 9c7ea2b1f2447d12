use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{Message, Pagination, UserList, UserPublic, UserSchema},
    services,
};
use crate::{
    auth::extractors::CurrentUser,
    errors::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(read_users).post(create_user))
        .route("/users/", get(read_users).post(create_user))
        .route(
            "/users/:id",
            get(read_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserSchema>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    services::validate(&payload)?;
    let user = services::create_user(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn read_users(
    State(state): State<AppState>,
    AppQuery(p): AppQuery<Pagination>,
) -> AppResult<Json<UserList>> {
    let users = services::list_users(state.users.as_ref(), p.offset, p.limit).await?;
    Ok(Json(UserList {
        users: users.into_iter().map(UserPublic::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn read_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserPublic>> {
    let user = services::get_user(state.users.as_ref(), id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, current, payload), fields(user_id = current.id))]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    CurrentUser(current): CurrentUser,
    AppJson(payload): AppJson<UserSchema>,
) -> AppResult<Json<UserPublic>> {
    services::validate(&payload)?;
    let user = services::update_user(state.users.as_ref(), &current, id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    CurrentUser(current): CurrentUser,
) -> AppResult<Json<Message>> {
    services::delete_user(state.users.as_ref(), &current, id).await?;
    Ok(Json(Message {
        message: "User deleted".into(),
    }))
}
