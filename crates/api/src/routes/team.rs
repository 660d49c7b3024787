//! Session and team endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use domain::{Actor, NewUser, Percentage, Role, User};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120, message = "User name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub commission_rate: Percentage,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name,
            email: req.email,
            role: req.role,
            commission_rate: req.commission_rate,
        }
    }
}

/// POST /session: mock login; records a LOGIN audit entry.
#[tracing::instrument(skip(state))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Actor>, ApiError> {
    let actor = state.service.login(req.user_id).await?;
    Ok(Json(actor))
}

/// GET /users
#[tracing::instrument(skip(state, _actor))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    _actor: CurrentActor,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.service.list_users().await?))
}

/// POST /users: admin only.
#[tracing::instrument(skip(state, actor, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    req.validate()?;
    let user = state.service.create_user(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /users/{id}: deactivates the user; admin only.
#[tracing::instrument(skip(state, actor))]
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    let user = state.service.deactivate_user(&actor, id).await?;
    Ok(Json(user))
}
