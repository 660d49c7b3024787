//! Request extractors.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use domain::Actor;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-osmech-user";

/// The acting user, resolved from the session header.
///
/// The header is trusted; login is a mock.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<Arc<AppState>> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthenticated(format!("missing {USER_HEADER} header")))?;

        let user_id: UserId = raw
            .parse()
            .map_err(|_| ApiError::Unauthenticated(format!("invalid {USER_HEADER} header")))?;

        let actor = state.service.resolve_actor(user_id).await?;
        Ok(Self(actor))
    }
}
