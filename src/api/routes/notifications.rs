//! In-app notification inbox.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    routing::{get, patch},
};

use crate::{
    api::{AppState, errors::ApiResult},
    core::notification,
    entities::notification::Model as NotificationModel,
};

/// Routes under `/notifications`.
pub fn router() -> Router {
    Router::new()
        .route("/:id", get(for_user))
        .route("/:id/read", patch(mark_read))
}

/// A user's notifications, newest first.
pub async fn for_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<NotificationModel>>> {
    Ok(Json(
        notification::get_notifications_for_user(&state.db, user_id).await?,
    ))
}

/// Marks one notification read.
pub async fn mark_read(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<NotificationModel>> {
    Ok(Json(notification::mark_as_read(&state.db, id).await?))
}
