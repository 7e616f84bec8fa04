//! Order business logic - Placing orders, moving them through their lifecycle,
//! and reading them back with their parties attached.
//!
//! Order placement is one database transaction: every referenced product's
//! stock is decremented with a conditional update (`stock >= quantity`), the
//! order row is inserted and the supplier is notified. Any failure rolls the
//! whole unit back. Status changes are a single conditional update on
//! (`id`, current `status`), so two concurrent transitions from the same state
//! cannot both succeed.

use crate::{
    core::{geo::GeoPoint, notification, order_number, order_status, product, supplier, vendor},
    entities::{
        Order, Product, Supplier, User, Vendor,
        notification::NotificationCategory,
        order::{self, OrderItem, OrderItems, OrderStatus, VoiceNotes},
        product as product_entity, supplier as supplier_entity, user, vendor as vendor_entity,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Largest tolerated gap between a caller's unit price and the current one.
const PRICE_TOLERANCE: f64 = 0.005;

/// One requested line of a new order
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    /// Product to order
    pub product_id: i64,
    /// Quantity in the product's unit
    pub quantity: i32,
    /// Unit price the caller saw; rejected when it no longer matches
    #[serde(default)]
    pub price_per_unit: Option<f64>,
}

/// Input for placing an order
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    /// Ordering vendor
    pub vendor_id: i64,
    /// Fulfilling supplier
    pub supplier_id: i64,
    /// Requested lines, at least one
    pub items: Vec<NewOrderItem>,
    /// Where to deliver
    pub delivery_address: String,
    /// Delivery latitude, together with longitude
    #[serde(default)]
    pub delivery_latitude: Option<f64>,
    /// Delivery longitude, together with latitude
    #[serde(default)]
    pub delivery_longitude: Option<f64>,
    /// Request the 30-minute emergency fast path
    #[serde(default)]
    pub is_emergency: bool,
    /// Free-text instructions
    #[serde(default)]
    pub notes: Option<String>,
    /// References to already-uploaded voice notes
    #[serde(default)]
    pub voice_notes: Vec<String>,
}

/// A vendor profile with its user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorDetails {
    /// Vendor profile
    #[serde(flatten)]
    pub vendor: vendor_entity::Model,
    /// Owning user
    pub user: user::Model,
}

/// A supplier profile with its user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierDetails {
    /// Supplier profile
    #[serde(flatten)]
    pub supplier: supplier_entity::Model,
    /// Owning user
    pub user: user::Model,
}

/// An order joined with both parties, plus its derived SLA state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithDetails {
    /// The order row
    #[serde(flatten)]
    pub order: order::Model,
    /// Ordering vendor
    pub vendor: VendorDetails,
    /// Fulfilling supplier
    pub supplier: SupplierDetails,
    /// Emergency SLA blown as of the time the order was loaded
    pub overdue: bool,
}

/// Prices one requested line against the product it names.
///
/// # Errors
/// Returns a validation error when the product belongs to another supplier,
/// is withdrawn, the quantity is below the product minimum, or the caller's
/// price is stale.
pub fn price_line(
    requested: &NewOrderItem,
    product: &product_entity::Model,
    supplier_id: i64,
) -> Result<OrderItem> {
    if product.supplier_id != supplier_id {
        return Err(Error::validation(
            "items",
            format!(
                "product {} is not sold by supplier {supplier_id}",
                product.id
            ),
        ));
    }
    if !product.is_available {
        return Err(Error::validation(
            "items",
            format!("product {} is not available", product.id),
        ));
    }
    if requested.quantity < product.min_quantity {
        return Err(Error::validation(
            "quantity",
            format!(
                "product {} requires at least {} {}",
                product.id, product.min_quantity, product.unit
            ),
        ));
    }
    if let Some(seen) = requested
        .price_per_unit
        .filter(|seen| (seen - product.price_per_unit).abs() > PRICE_TOLERANCE)
    {
        return Err(Error::validation(
            "price_per_unit",
            format!(
                "price of product {} changed from {seen:.2} to {:.2}",
                product.id, product.price_per_unit
            ),
        ));
    }

    Ok(OrderItem {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity: requested.quantity,
        unit: product.unit.clone(),
        price_per_unit: product.price_per_unit,
        total: f64::from(requested.quantity) * product.price_per_unit,
    })
}

/// Decrements stock only if enough is left; reports the shortfall otherwise.
async fn reserve_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Product::update_many()
        .col_expr(
            product_entity::Column::StockQuantity,
            Expr::col(product_entity::Column::StockQuantity).sub(quantity),
        )
        .filter(product_entity::Column::Id.eq(product_id))
        .filter(product_entity::Column::StockQuantity.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let available = product::get_product_by_id(db, product_id)
            .await?
            .map_or(0, |p| p.stock_quantity);
        return Err(Error::InsufficientStock {
            product_id,
            available,
            requested: quantity,
        });
    }
    Ok(())
}

/// Inserts an order row, surfacing an order number clash as its own error.
pub async fn insert_order<C>(db: &C, order: order::ActiveModel) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let order_number = match &order.order_number {
        ActiveValue::Set(number) | ActiveValue::Unchanged(number) => number.clone(),
        ActiveValue::NotSet => String::new(),
    };

    order.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateOrderNumber { order_number },
        _ => err.into(),
    })
}

/// Places an order.
///
/// Unit prices are snapshotted from the products and the total is computed
/// here; nothing monetary is taken from the caller.
///
/// # Errors
/// Returns an error if:
/// - The item list is empty, a quantity is not positive, the address is
///   blank, or the delivery point is invalid
/// - The vendor, supplier or a product does not exist
/// - A line fails [`price_line`], or the total is below the supplier's
///   minimum order amount
/// - A product has less stock than requested ([`Error::InsufficientStock`])
/// - The generated order number already exists
/// - A database operation fails
#[instrument(skip(db, input), fields(vendor_id = input.vendor_id, supplier_id = input.supplier_id))]
pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> Result<order::Model> {
    if input.items.is_empty() {
        return Err(Error::validation("items", "an order needs at least one item"));
    }
    if let Some(bad) = input.items.iter().find(|item| item.quantity <= 0) {
        return Err(Error::validation(
            "quantity",
            format!("quantity for product {} must be positive", bad.product_id),
        ));
    }
    let delivery_address = input.delivery_address.trim();
    if delivery_address.is_empty() {
        return Err(Error::validation("delivery_address", "cannot be empty"));
    }
    let delivery_point = GeoPoint::from_optional(input.delivery_latitude, input.delivery_longitude)?;

    let txn = db.begin().await?;

    let vendor = vendor::get_vendor_by_id(&txn, input.vendor_id)
        .await?
        .ok_or_else(|| Error::not_found("Vendor", input.vendor_id))?;
    let supplier = supplier::get_supplier_by_id(&txn, input.supplier_id)
        .await?
        .ok_or_else(|| Error::not_found("Supplier", input.supplier_id))?;

    let mut lines = Vec::with_capacity(input.items.len());
    for requested in &input.items {
        let product = product::get_product_by_id(&txn, requested.product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product", requested.product_id))?;
        lines.push(price_line(requested, &product, supplier.id)?);
    }
    let items = OrderItems(lines);
    let total_amount = items.total();

    if total_amount < supplier.min_order_amount {
        return Err(Error::validation(
            "items",
            format!(
                "order total {total_amount:.2} is below the supplier minimum of {:.2}",
                supplier.min_order_amount
            ),
        ));
    }

    for line in &items.0 {
        reserve_stock(&txn, line.product_id, line.quantity).await?;
    }

    let now = Utc::now();
    let order_number = order_number::generate_order_number(now);
    let order = insert_order(
        &txn,
        order::ActiveModel {
            vendor_id: Set(vendor.id),
            supplier_id: Set(supplier.id),
            order_number: Set(order_number),
            items: Set(items),
            total_amount: Set(total_amount),
            status: Set(OrderStatus::Pending),
            is_emergency: Set(input.is_emergency),
            delivery_address: Set(delivery_address.to_string()),
            delivery_latitude: Set(delivery_point.map(|p| p.latitude)),
            delivery_longitude: Set(delivery_point.map(|p| p.longitude)),
            estimated_delivery_time: Set(None),
            actual_delivery_time: Set(None),
            voice_notes: Set(VoiceNotes(input.voice_notes)),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        },
    )
    .await?;

    let (category, title) = if order.is_emergency {
        (NotificationCategory::Emergency, "Emergency order received")
    } else {
        (NotificationCategory::Order, "New order received")
    };
    notification::create_notification(
        &txn,
        supplier.user_id,
        title,
        format!(
            "Order {} for ₹{:.2} is waiting for confirmation",
            order.order_number, order.total_amount
        ),
        category,
        Some(serde_json::json!({ "order_id": order.id, "order_number": order.order_number })),
    )
    .await?;

    txn.commit().await?;
    info!(
        order_id = order.id,
        order_number = %order.order_number,
        total_amount = order.total_amount,
        is_emergency = order.is_emergency,
        "Order placed"
    );

    Ok(order)
}

fn status_notification(order: &order::Model) -> (NotificationCategory, String) {
    let category = match order.status {
        OrderStatus::OutForDelivery | OrderStatus::Delivered => NotificationCategory::Delivery,
        _ => NotificationCategory::Order,
    };
    let message = match order.status {
        OrderStatus::Pending => format!("Order {} is pending", order.order_number),
        OrderStatus::Confirmed => format!("Order {} was confirmed", order.order_number),
        OrderStatus::Preparing => format!("Order {} is being prepared", order.order_number),
        OrderStatus::OutForDelivery => format!("Order {} is on its way", order.order_number),
        OrderStatus::Delivered => format!("Order {} was delivered", order.order_number),
        OrderStatus::Cancelled => format!("Order {} was cancelled", order.order_number),
    };
    (category, message)
}

/// Writes `change` only if the order is still in `change.from`.
///
/// Zero affected rows means another writer moved the order after `change`
/// was planned; the error then names the status it moved to.
async fn apply_status_change<C>(
    db: &C,
    order_id: i64,
    change: &order_status::StatusChange,
) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let mut patch = order::ActiveModel {
        status: Set(change.to),
        updated_at: Set(change.updated_at),
        ..Default::default()
    };
    if let Some(estimate) = change.estimated_delivery_time {
        patch.estimated_delivery_time = Set(Some(estimate));
    }
    if let Some(delivered_at) = change.actual_delivery_time {
        patch.actual_delivery_time = Set(Some(delivered_at));
    }

    let result = Order::update_many()
        .set(patch)
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::Status.eq(change.from))
        .exec(db)
        .await?;

    let fresh = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if result.rows_affected == 0 {
        debug!(order_id, status = %fresh.status, "Lost a concurrent status update");
        return Err(Error::InvalidTransition {
            from: fresh.status,
            to: change.to,
        });
    }
    Ok(fresh)
}

/// Moves an order to `target` if the lifecycle allows it.
///
/// On failure the stored order is untouched.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist ([`Error::OrderNotFound`])
/// - The transition is not in the table, or a concurrent update moved the
///   order first ([`Error::InvalidTransition`])
/// - A database operation fails
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    target: OrderStatus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let current = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let delivery_minutes = if target == OrderStatus::OutForDelivery {
        supplier::get_supplier_by_id(&txn, current.supplier_id)
            .await?
            .map_or(order_status::EMERGENCY_SLA_MINUTES, |s| {
                i64::from(s.avg_delivery_time_minutes)
            })
    } else {
        0
    };

    let change = order_status::plan_transition(&current, target, Utc::now(), delivery_minutes)?;
    let updated = apply_status_change(&txn, order_id, &change).await?;

    if let Some(vendor) = vendor::get_vendor_by_id(&txn, updated.vendor_id).await? {
        let (category, message) = status_notification(&updated);
        notification::create_notification(
            &txn,
            vendor.user_id,
            "Order status updated",
            message,
            category,
            Some(serde_json::json!({ "order_id": updated.id, "status": updated.status })),
        )
        .await?;
    }

    txn.commit().await?;
    info!(order_id, from = %change.from, to = %change.to, "Order status changed");

    Ok(updated)
}

/// Retrieves an order row by ID.
pub async fn get_order_by_id(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Joins orders with their vendor and supplier profiles and users.
///
/// Loads each related table once, whatever the number of orders.
async fn attach_details(
    db: &DatabaseConnection,
    orders: Vec<order::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<OrderWithDetails>> {
    let vendor_ids: Vec<i64> = orders.iter().map(|o| o.vendor_id).collect();
    let supplier_ids: Vec<i64> = orders.iter().map(|o| o.supplier_id).collect();

    let vendors: HashMap<i64, vendor_entity::Model> = Vendor::find()
        .filter(vendor_entity::Column::Id.is_in(vendor_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let suppliers: HashMap<i64, supplier_entity::Model> = Supplier::find()
        .filter(supplier_entity::Column::Id.is_in(supplier_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let user_ids: Vec<i64> = vendors
        .values()
        .map(|v| v.user_id)
        .chain(suppliers.values().map(|s| s.user_id))
        .collect();
    let users: HashMap<i64, user::Model> = User::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    orders
        .into_iter()
        .map(|order| {
            let vendor = vendors
                .get(&order.vendor_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Vendor", order.vendor_id))?;
            let vendor_user = users
                .get(&vendor.user_id)
                .cloned()
                .ok_or_else(|| Error::not_found("User", vendor.user_id))?;
            let supplier = suppliers
                .get(&order.supplier_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Supplier", order.supplier_id))?;
            let supplier_user = users
                .get(&supplier.user_id)
                .cloned()
                .ok_or_else(|| Error::not_found("User", supplier.user_id))?;

            let overdue = order_status::is_overdue(&order, now);
            Ok(OrderWithDetails {
                order,
                vendor: VendorDetails {
                    vendor,
                    user: vendor_user,
                },
                supplier: SupplierDetails {
                    supplier,
                    user: supplier_user,
                },
                overdue,
            })
        })
        .collect()
}

/// Retrieves an order with both parties attached.
pub async fn get_order_with_details(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<OrderWithDetails>> {
    let Some(order) = get_order_by_id(db, order_id).await? else {
        return Ok(None);
    };
    Ok(attach_details(db, vec![order], Utc::now()).await?.pop())
}

/// Order history of a vendor, newest first.
pub async fn get_orders_for_vendor(
    db: &DatabaseConnection,
    vendor_id: i64,
) -> Result<Vec<OrderWithDetails>> {
    let orders = Order::find()
        .filter(order::Column::VendorId.eq(vendor_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    attach_details(db, orders, Utc::now()).await
}

/// Order queue of a supplier, newest first.
pub async fn get_orders_for_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
) -> Result<Vec<OrderWithDetails>> {
    let orders = Order::find()
        .filter(order::Column::SupplierId.eq(supplier_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    attach_details(db, orders, Utc::now()).await
}

/// Open emergency orders, oldest (most overdue) first.
pub async fn get_emergency_orders(db: &DatabaseConnection) -> Result<Vec<OrderWithDetails>> {
    let orders = Order::find()
        .filter(order::Column::IsEmergency.eq(true))
        .filter(order::Column::Status.is_not_in([OrderStatus::Delivered, OrderStatus::Cancelled]))
        .order_by_asc(order::Column::CreatedAt)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;
    attach_details(db, orders, Utc::now()).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::notification::get_notifications_for_user;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::Iterable;

    /// Valid path from pending to each status.
    fn path_to(status: OrderStatus) -> &'static [OrderStatus] {
        match status {
            OrderStatus::Pending => &[],
            OrderStatus::Confirmed => &[OrderStatus::Confirmed],
            OrderStatus::Preparing => &[OrderStatus::Confirmed, OrderStatus::Preparing],
            OrderStatus::OutForDelivery => &[
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
            ],
            OrderStatus::Delivered => &[
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered,
            ],
            OrderStatus::Cancelled => &[OrderStatus::Cancelled],
        }
    }

    async fn place(db: &DatabaseConnection, fixture: &Marketplace, quantity: i32) -> Result<order::Model> {
        create_order(
            db,
            order_request(
                fixture.vendor_id,
                fixture.supplier_id,
                vec![order_item(fixture.product.id, quantity)],
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_order_snapshots_prices() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        let order = place(&db, &fixture, 5).await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 150.0);
        assert_eq!(order.items.0.len(), 1);
        assert_eq!(order.items.0[0].product_name, "Onions");
        assert_eq!(order.items.0[0].price_per_unit, 30.0);
        assert_eq!(order.items.0[0].total, 150.0);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(order.estimated_delivery_time.is_none());

        let product = product::get_product_by_id(&db, fixture.product.id).await?.unwrap();
        assert_eq!(product.stock_quantity, 95);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_notifies_supplier() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        let mut request = order_request(
            fixture.vendor_id,
            fixture.supplier_id,
            vec![order_item(fixture.product.id, 2)],
        );
        request.is_emergency = true;
        let order = create_order(&db, request).await?;

        let inbox = get_notifications_for_user(&db, fixture.supplier_user_id).await?;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].category, NotificationCategory::Emergency);
        assert!(inbox[0].message.contains(&order.order_number));
        assert!(get_notifications_for_user(&db, fixture.vendor_user_id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_input_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_order(&db, order_request(1, 1, vec![])).await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "items"));

        let result = create_order(&db, order_request(1, 1, vec![order_item(1, 0)])).await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "quantity"));

        let mut request = order_request(1, 1, vec![order_item(1, 1)]);
        request.delivery_address = "  ".to_string();
        let result = create_order(&db, request).await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "delivery_address"));

        let mut request = order_request(1, 1, vec![order_item(1, 1)]);
        request.delivery_latitude = Some(28.65);
        let result = create_order(&db, request).await;
        assert!(matches!(result, Err(Error::InvalidCoordinates { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_insufficient_stock_rolls_back() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let scarce = create_test_product(&db, fixture.supplier_id, "Saffron", 500.0, 2).await?;

        let result = create_order(
            &db,
            order_request(
                fixture.vendor_id,
                fixture.supplier_id,
                vec![order_item(fixture.product.id, 10), order_item(scarce.id, 3)],
            ),
        )
        .await;

        match result {
            Err(Error::InsufficientStock {
                product_id,
                available,
                requested,
            }) => {
                assert_eq!(product_id, scarce.id);
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }

        let onions = product::get_product_by_id(&db, fixture.product.id).await?.unwrap();
        assert_eq!(onions.stock_quantity, 100);
        assert!(get_orders_for_vendor(&db, fixture.vendor_id).await?.is_empty());
        assert!(get_notifications_for_user(&db, fixture.supplier_user_id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_product_rules() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        let mut bulk = new_product(fixture.supplier_id, "Rice", 40.0);
        bulk.min_quantity = Some(10);
        bulk.stock_quantity = Some(100);
        let bulk = product::create_product(&db, bulk).await?;
        let result = create_order(
            &db,
            order_request(fixture.vendor_id, fixture.supplier_id, vec![order_item(bulk.id, 5)]),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "quantity"));

        let mut stale = order_item(fixture.product.id, 1);
        stale.price_per_unit = Some(25.0);
        let result = create_order(
            &db,
            order_request(fixture.vendor_id, fixture.supplier_id, vec![stale]),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "price_per_unit"));

        let mut current = order_item(fixture.product.id, 1);
        current.price_per_unit = Some(30.0);
        create_order(
            &db,
            order_request(fixture.vendor_id, fixture.supplier_id, vec![current]),
        )
        .await?;

        let other = create_test_supplier(&db, "9300000001", KAROL_BAGH, true)
            .await?
            .supplier
            .unwrap();
        let result = create_order(
            &db,
            order_request(fixture.vendor_id, other.id, vec![order_item(fixture.product.id, 1)]),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "items"));

        product::set_available(&db, fixture.product.id, false).await?;
        let result = place(&db, &fixture, 1).await;
        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "items"));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_missing_references() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        let result = create_order(
            &db,
            order_request(999, fixture.supplier_id, vec![order_item(fixture.product.id, 1)]),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Vendor", .. })));

        let result = create_order(
            &db,
            order_request(fixture.vendor_id, 999, vec![order_item(fixture.product.id, 1)]),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Supplier", .. })));

        let result = create_order(
            &db,
            order_request(fixture.vendor_id, fixture.supplier_id, vec![order_item(999, 1)]),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Product", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_order_number() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let existing = place(&db, &fixture, 1).await?;

        let now = Utc::now();
        let clash = order::ActiveModel {
            vendor_id: Set(fixture.vendor_id),
            supplier_id: Set(fixture.supplier_id),
            order_number: Set(existing.order_number.clone()),
            items: Set(OrderItems::default()),
            total_amount: Set(0.0),
            status: Set(OrderStatus::Pending),
            is_emergency: Set(false),
            delivery_address: Set("Karol Bagh Market".to_string()),
            voice_notes: Set(VoiceNotes(vec![])),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = insert_order(&db, clash).await;
        assert!(
            matches!(result, Err(Error::DuplicateOrderNumber { order_number }) if order_number == existing.order_number)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_full_lifecycle() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let order = place(&db, &fixture, 3).await?;

        let confirmed = update_order_status(&db, order.id, OrderStatus::Confirmed).await?;
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert!(confirmed.updated_at >= order.updated_at);

        update_order_status(&db, order.id, OrderStatus::Preparing).await?;

        let shipped = update_order_status(&db, order.id, OrderStatus::OutForDelivery).await?;
        let estimate = shipped.estimated_delivery_time.unwrap();
        let expected = shipped.updated_at + Duration::minutes(30);
        assert!((estimate - expected).num_seconds().abs() <= 1);
        assert!(shipped.actual_delivery_time.is_none());

        let delivered = update_order_status(&db, order.id, OrderStatus::Delivered).await?;
        assert!(delivered.actual_delivery_time.is_some());
        assert_eq!(delivered.estimated_delivery_time, shipped.estimated_delivery_time);

        let inbox = get_notifications_for_user(&db, fixture.vendor_user_id).await?;
        assert_eq!(inbox.len(), 4);
        assert_eq!(inbox[0].category, NotificationCategory::Delivery);
        assert_eq!(inbox[3].category, NotificationCategory::Order);
        Ok(())
    }

    #[tokio::test]
    async fn test_skipping_a_step_is_rejected() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let order = place(&db, &fixture, 1).await?;
        update_order_status(&db, order.id, OrderStatus::Confirmed).await?;
        update_order_status(&db, order.id, OrderStatus::Preparing).await?;

        let result = update_order_status(&db, order.id, OrderStatus::Delivered).await;
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                from: OrderStatus::Preparing,
                to: OrderStatus::Delivered
            })
        ));

        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored.status, OrderStatus::Preparing);
        assert!(stored.actual_delivery_time.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_every_invalid_transition_leaves_order_untouched() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        for from in OrderStatus::iter() {
            let order = place(&db, &fixture, 1).await?;
            for step in path_to(from) {
                update_order_status(&db, order.id, *step).await?;
            }

            for to in OrderStatus::iter().filter(|to| !order_status::can_transition(from, *to)) {
                let result = update_order_status(&db, order.id, to).await;
                assert!(
                    matches!(result, Err(Error::InvalidTransition { .. })),
                    "{from} -> {to} should be rejected"
                );
                let stored = get_order_by_id(&db, order.id).await?.unwrap();
                assert_eq!(stored.status, from);
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_transition_loses_to_concurrent_update() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let order = place(&db, &fixture, 1).await?;

        // Planned against the pending row, then overtaken by another writer
        let stale = order_status::plan_transition(&order, OrderStatus::Cancelled, Utc::now(), 0)?;
        update_order_status(&db, order.id, OrderStatus::Confirmed).await?;

        let result = apply_status_change(&db, order.id, &stale).await;
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Cancelled
            })
        ));

        let stored = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        let inbox = get_notifications_for_user(&db, fixture.vendor_user_id).await?;
        assert_eq!(inbox.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_order() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_order_status(&db, 42, OrderStatus::Confirmed).await;
        assert!(matches!(result, Err(Error::OrderNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_emergency_estimate_uses_sla() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let mut slow = supplier_profile("Slow Wholesale");
        slow.avg_delivery_time_minutes = Some(90);
        slow.is_online = true;
        let slow = crate::core::user::register_user(
            &db,
            new_supplier_user("9300000002", Some(KAROL_BAGH)),
            Some(crate::core::user::NewProfile::Supplier(slow)),
        )
        .await?
        .supplier
        .unwrap();
        let potatoes = create_test_product(&db, slow.id, "Potatoes", 20.0, 50).await?;

        let mut request = order_request(fixture.vendor_id, slow.id, vec![order_item(potatoes.id, 1)]);
        request.is_emergency = true;
        let urgent = create_order(&db, request).await?;
        let regular = create_order(
            &db,
            order_request(fixture.vendor_id, slow.id, vec![order_item(potatoes.id, 1)]),
        )
        .await?;

        for order in [&urgent, &regular] {
            for step in path_to(OrderStatus::OutForDelivery) {
                update_order_status(&db, order.id, *step).await?;
            }
        }

        let urgent = get_order_by_id(&db, urgent.id).await?.unwrap();
        let regular = get_order_by_id(&db, regular.id).await?.unwrap();
        let urgent_minutes = (urgent.estimated_delivery_time.unwrap() - urgent.updated_at).num_minutes();
        let regular_minutes = (regular.estimated_delivery_time.unwrap() - regular.updated_at).num_minutes();
        assert_eq!(urgent_minutes, 30);
        assert_eq!(regular_minutes, 90);
        Ok(())
    }

    #[tokio::test]
    async fn test_emergency_queue() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;

        let urgent = |quantity| {
            let mut request = order_request(
                fixture.vendor_id,
                fixture.supplier_id,
                vec![order_item(fixture.product.id, quantity)],
            );
            request.is_emergency = true;
            request
        };

        let first = create_order(&db, urgent(1)).await?;
        let _regular = place(&db, &fixture, 1).await?;
        let second = create_order(&db, urgent(2)).await?;
        let finished = create_order(&db, urgent(3)).await?;
        update_order_status(&db, finished.id, OrderStatus::Cancelled).await?;
        let shipped = create_order(&db, urgent(4)).await?;
        for step in path_to(OrderStatus::OutForDelivery) {
            update_order_status(&db, shipped.id, *step).await?;
        }

        let queue = get_emergency_orders(&db).await?;
        let ids: Vec<i64> = queue.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![first.id, second.id, shipped.id]);
        assert!(queue.iter().all(|o| !o.overdue));
        Ok(())
    }

    #[tokio::test]
    async fn test_order_listings_with_details() -> Result<()> {
        let (db, fixture) = setup_marketplace().await?;
        let older = place(&db, &fixture, 1).await?;
        let newer = place(&db, &fixture, 2).await?;

        let for_vendor = get_orders_for_vendor(&db, fixture.vendor_id).await?;
        let ids: Vec<i64> = for_vendor.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let for_supplier = get_orders_for_supplier(&db, fixture.supplier_id).await?;
        assert_eq!(for_supplier.len(), 2);
        assert!(get_orders_for_supplier(&db, 999).await?.is_empty());

        let details = get_order_with_details(&db, older.id).await?.unwrap();
        assert_eq!(details.vendor.vendor.id, fixture.vendor_id);
        assert_eq!(details.vendor.user.id, fixture.vendor_user_id);
        assert_eq!(details.supplier.user.id, fixture.supplier_user_id);
        assert!(!details.overdue);

        assert!(get_order_with_details(&db, 999).await?.is_none());
        Ok(())
    }
}
