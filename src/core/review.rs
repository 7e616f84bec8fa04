//! Review business logic - Post-delivery ratings and user rating aggregates.

use crate::{
    core::{order as order_service, supplier::average},
    entities::{Order, Review, Supplier, User, Vendor, order, order::OrderStatus, review, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Input for reviewing an order
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Reviewed order, must be delivered
    pub order_id: i64,
    /// Reviewing user, the order's vendor or supplier
    pub reviewer_id: i64,
    /// Overall rating, 1 to 5
    pub rating: i32,
    /// Optional free text
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional quality sub-rating, 1 to 5
    #[serde(default)]
    pub quality_rating: Option<i32>,
    /// Optional delivery sub-rating, 1 to 5
    #[serde(default)]
    pub delivery_rating: Option<i32>,
}

/// User IDs of the order's vendor and supplier.
async fn order_parties<C>(db: &C, order: &order::Model) -> Result<(i64, i64)>
where
    C: ConnectionTrait,
{
    let vendor_user_id = Vendor::find_by_id(order.vendor_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", order.vendor_id))?
        .user_id;
    let supplier_user_id = Supplier::find_by_id(order.supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", order.supplier_id))?
        .user_id;
    Ok((vendor_user_id, supplier_user_id))
}

fn check_rating(field: &str, value: i32) -> Result<()> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(Error::validation(field, "must be between 1 and 5"))
    }
}

/// Records a review and refreshes the reviewee's aggregate rating.
///
/// The reviewee is the other party of the order: a vendor reviews the
/// supplier's user and vice versa.
///
/// # Errors
/// Returns an error if:
/// - A rating is outside 1..=5
/// - The order does not exist or is not delivered
/// - The reviewer is not a party to the order
/// - The reviewer already reviewed this order ([`Error::DuplicateReview`])
/// - A database operation fails
#[instrument(skip(db, input), fields(order_id = input.order_id, reviewer_id = input.reviewer_id))]
pub async fn create_review(db: &DatabaseConnection, input: NewReview) -> Result<review::Model> {
    check_rating("rating", input.rating)?;
    if let Some(quality) = input.quality_rating {
        check_rating("quality_rating", quality)?;
    }
    if let Some(delivery) = input.delivery_rating {
        check_rating("delivery_rating", delivery)?;
    }

    let txn = db.begin().await?;

    let order = Order::find_by_id(input.order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: input.order_id })?;
    if order.status != OrderStatus::Delivered {
        return Err(Error::validation(
            "order_id",
            format!("order is {}, only delivered orders can be reviewed", order.status),
        ));
    }

    let (vendor_user_id, supplier_user_id) = order_parties(&txn, &order).await?;

    let reviewee_id = if input.reviewer_id == vendor_user_id {
        supplier_user_id
    } else if input.reviewer_id == supplier_user_id {
        vendor_user_id
    } else {
        return Err(Error::validation("reviewer_id", "not a party to this order"));
    };

    let existing = Review::find()
        .filter(review::Column::OrderId.eq(order.id))
        .filter(review::Column::ReviewerId.eq(input.reviewer_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateReview {
            order_id: order.id,
            reviewer_id: input.reviewer_id,
        });
    }

    let review = review::ActiveModel {
        order_id: Set(order.id),
        reviewer_id: Set(input.reviewer_id),
        reviewee_id: Set(reviewee_id),
        rating: Set(input.rating),
        comment: Set(input.comment.filter(|c| !c.trim().is_empty())),
        quality_rating: Set(input.quality_rating),
        delivery_rating: Set(input.delivery_rating),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateReview {
            order_id: order.id,
            reviewer_id: input.reviewer_id,
        },
        _ => err.into(),
    })?;

    let ratings: Vec<i32> = Review::find()
        .filter(review::Column::RevieweeId.eq(reviewee_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();
    let rating = average(&ratings);

    User::update_many()
        .col_expr(user::Column::Rating, Expr::value(rating))
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(reviewee_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(review_id = review.id, reviewee_id, rating, "Review recorded");

    Ok(review)
}

/// Reviews received by a user, newest first.
pub async fn get_reviews_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<review::Model>> {
    Review::find()
        .filter(review::Column::RevieweeId.eq(user_id))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether a reviewer may still review an order: the order is delivered,
/// the reviewer is one of its parties and has not reviewed it yet.
pub async fn can_review(db: &DatabaseConnection, order_id: i64, reviewer_id: i64) -> Result<bool> {
    let Some(order) = order_service::get_order_by_id(db, order_id).await? else {
        return Ok(false);
    };
    if order.status != OrderStatus::Delivered {
        return Ok(false);
    }
    let (vendor_user_id, supplier_user_id) = order_parties(db, &order).await?;
    if reviewer_id != vendor_user_id && reviewer_id != supplier_user_id {
        return Ok(false);
    }
    let reviewed = Review::find()
        .filter(review::Column::OrderId.eq(order_id))
        .filter(review::Column::ReviewerId.eq(reviewer_id))
        .one(db)
        .await?
        .is_some();
    Ok(!reviewed)
}
