// src/routes/crud_routes.rs
//
// Collection + item endpoints shared by every table without extra write rules.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};

use super::extract::{IdPath, JsonBody};
use crate::{
    error::ApiError,
    models::AppState,
    repo::{Record, Repo},
};

pub fn router<R>() -> Router<AppState>
where
    R: Record + Serialize,
    R::Input: DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/{id}", get(fetch::<R>).put(update::<R>).delete(remove::<R>))
}

pub async fn list<R>(State(state): State<AppState>) -> Result<Json<Vec<R>>, ApiError>
where
    R: Record + Serialize,
{
    let rows = Repo::<R>::new(&state.db).list().await?;
    Ok(Json(rows))
}

pub async fn fetch<R>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<R>, ApiError>
where
    R: Record + Serialize,
{
    let row = Repo::<R>::new(&state.db).get(id).await?;
    Ok(Json(row))
}

pub async fn create<R>(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<R::Input>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: Record + Serialize,
    R::Input: DeserializeOwned,
{
    let row = Repo::<R>::new(&state.db).create(&input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update<R>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(input): JsonBody<R::Input>,
) -> Result<Json<R>, ApiError>
where
    R: Record + Serialize,
    R::Input: DeserializeOwned,
{
    let row = Repo::<R>::new(&state.db).update(id, &input).await?;
    Ok(Json(row))
}

pub async fn remove<R>(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError>
where
    R: Record,
{
    Repo::<R>::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
