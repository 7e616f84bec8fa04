//! Post-delivery reviews.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppState, errors::ApiResult},
    core::review::{self, NewReview},
    entities::review::Model as ReviewModel,
};

/// Routes under `/reviews`.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create))
        .route("/can-review", get(eligibility))
        .route("/user/:user_id", get(for_user))
}

/// Records a review of a delivered order.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<ReviewModel>)> {
    let created = review::create_review(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Reviews received by a user, newest first.
pub async fn for_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<ReviewModel>>> {
    Ok(Json(review::get_reviews_for_user(&state.db, user_id).await?))
}

/// Query string of `GET /reviews/can-review`
#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    /// Order to review
    pub order_id: i64,
    /// Prospective reviewer
    pub reviewer_id: i64,
}

/// Answer of `GET /reviews/can-review`
#[derive(Debug, Serialize)]
pub struct Eligibility {
    /// Whether a review would currently be accepted
    pub can_review: bool,
}

/// Whether a user may still review an order.
pub async fn eligibility(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<EligibilityQuery>,
) -> ApiResult<Json<Eligibility>> {
    let can_review = review::can_review(&state.db, query.order_id, query.reviewer_id).await?;
    Ok(Json(Eligibility { can_review }))
}
