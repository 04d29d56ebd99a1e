//! Current user API
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/me/location | PUT | 登录 |

use axum::{Json, Router, extract::State, routing::put};
use shared::models::{Location, LocationInput};
use shared::util::now_millis;

use crate::auth::{Access, CurrentUser, authorize};
use crate::core::ServerState;
use crate::utils::validation::validate_payload;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/me/location", put(set_location))
}

/// Replace the caller's location; sellers are re-indexed immediately
pub async fn set_location(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<LocationInput>,
) -> AppResult<Json<ApiResponse<Location>>> {
    authorize(Some(&user), Access::Authenticated)?;
    validate_payload(&payload)?;
    let location = state
        .locations
        .assign_user_location(&user.id, &payload, now_millis())?;
    Ok(ok(location))
}
