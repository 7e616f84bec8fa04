//! Proximity queries - Nearest online suppliers and product search.
//!
//! Candidates are filtered in the database (online, available, category) and
//! ranked in process with [`geo::rank_by_distance`]. The SQLite store has no
//! geography extension; a backend that does can implement
//! [`ProximityRepository`] with native distance queries instead.

use crate::{
    core::geo::{self, GeoPoint},
    entities::{Product, Supplier, User, product, supplier, user},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// An online supplier with its user and distance from the search point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierWithDistance {
    /// Supplier profile
    #[serde(flatten)]
    pub supplier: supplier::Model,
    /// Owning user, carries the location
    pub user: user::Model,
    /// Rounded distance in kilometers
    pub distance_km: f64,
}

/// An available product with its supplier, optionally ranked by distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithSupplier {
    /// Product row
    #[serde(flatten)]
    pub product: product::Model,
    /// Owning supplier, always online
    pub supplier: supplier::Model,
    /// Supplier's user, carries the location
    pub supplier_user: user::Model,
    /// Rounded distance in kilometers when a reference point was given
    pub distance_km: Option<f64>,
}

/// Product search filters
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name
    pub text: Option<String>,
    /// Exact category, compared lowercased
    pub category: Option<String>,
    /// Reference point for distance ranking
    pub near: Option<GeoPoint>,
    /// Maximum distance from `near`
    pub radius_km: Option<f64>,
}

/// Storage-side proximity lookups
#[async_trait]
pub trait ProximityRepository: Send + Sync {
    /// Suppliers within `radius_km` of `point`, nearest first.
    async fn find_suppliers_near(
        &self,
        point: GeoPoint,
        radius_km: f64,
        online_only: bool,
    ) -> Result<Vec<SupplierWithDistance>>;

    /// Available products of online suppliers matching `query`.
    ///
    /// Nearest first when `query.near` is set, cheapest first otherwise.
    async fn find_products(&self, query: ProductQuery) -> Result<Vec<ProductWithSupplier>>;
}

/// [`ProximityRepository`] over the `SeaORM` connection
#[derive(Debug, Clone)]
pub struct SeaOrmProximity {
    db: DatabaseConnection,
}

impl SeaOrmProximity {
    /// Wraps a connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn check_radius(radius_km: f64) -> Result<()> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(())
    } else {
        Err(Error::validation("radius", "must be a non-negative number of kilometers"))
    }
}

#[async_trait]
impl ProximityRepository for SeaOrmProximity {
    async fn find_suppliers_near(
        &self,
        point: GeoPoint,
        radius_km: f64,
        online_only: bool,
    ) -> Result<Vec<SupplierWithDistance>> {
        check_radius(radius_km)?;

        let mut select = Supplier::find();
        if online_only {
            select = select.filter(supplier::Column::IsOnline.eq(true));
        }
        let candidates: Vec<(supplier::Model, user::Model)> = select
            .order_by_asc(supplier::Column::Id)
            .find_also_related(User)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(supplier, user)| user.map(|user| (supplier, user)))
            .collect();
        debug!(candidates = candidates.len(), radius_km, "Ranking suppliers");

        let ranked = geo::rank_by_distance(candidates, point, Some(radius_km), |(_, user)| {
            user.location()
        });

        Ok(ranked
            .into_iter()
            .filter_map(|ranked| {
                let (supplier, user) = ranked.item;
                ranked.distance_km.map(|distance_km| SupplierWithDistance {
                    supplier,
                    user,
                    distance_km,
                })
            })
            .collect())
    }

    async fn find_products(&self, query: ProductQuery) -> Result<Vec<ProductWithSupplier>> {
        if let Some(radius_km) = query.radius_km {
            check_radius(radius_km)?;
        }

        let mut select = Product::find().filter(product::Column::IsAvailable.eq(true));
        if let Some(category) = &query.category {
            select = select.filter(product::Column::Category.eq(category.trim().to_lowercase()));
        }
        let mut products = select
            .order_by_asc(product::Column::PricePerUnit)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        if let Some(needle) = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
        {
            products.retain(|p| p.name.to_lowercase().contains(&needle));
        }

        let supplier_ids: Vec<i64> = products.iter().map(|p| p.supplier_id).collect();
        let suppliers: HashMap<i64, (supplier::Model, user::Model)> = Supplier::find()
            .filter(supplier::Column::Id.is_in(supplier_ids))
            .filter(supplier::Column::IsOnline.eq(true))
            .find_also_related(User)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(supplier, user)| user.map(|user| (supplier.id, (supplier, user))))
            .collect();

        let candidates: Vec<(product::Model, supplier::Model, user::Model)> = products
            .into_iter()
            .filter_map(|product| {
                suppliers
                    .get(&product.supplier_id)
                    .cloned()
                    .map(|(supplier, user)| (product, supplier, user))
            })
            .collect();
        debug!(candidates = candidates.len(), "Product candidates");

        let Some(origin) = query.near else {
            return Ok(candidates
                .into_iter()
                .map(|(product, supplier, supplier_user)| ProductWithSupplier {
                    product,
                    supplier,
                    supplier_user,
                    distance_km: None,
                })
                .collect());
        };

        Ok(
            geo::rank_by_distance(candidates, origin, query.radius_km, |(_, _, user)| {
                user.location()
            })
            .into_iter()
            .map(|ranked| {
                let (product, supplier, supplier_user) = ranked.item;
                ProductWithSupplier {
                    product,
                    supplier,
                    supplier_user,
                    distance_km: ranked.distance_km,
                }
            })
            .collect(),
        )
    }
}

/// Online suppliers within `radius_km` of the given coordinates, nearest first.
///
/// # Errors
/// Returns [`Error::InvalidCoordinates`] for an invalid point,
/// [`Error::Validation`] for a negative or non-finite radius, or a storage
/// error.
pub async fn find_nearby_suppliers(
    repo: &dyn ProximityRepository,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Result<Vec<SupplierWithDistance>> {
    let point = GeoPoint::new(latitude, longitude)?;
    repo.find_suppliers_near(point, radius_km, true).await
}

/// Available products whose name contains `text`.
///
/// With coordinates the results are ranked by the supplier's distance;
/// without them, by ascending price. An empty `text` matches everything.
///
/// # Errors
/// Returns [`Error::InvalidCoordinates`] when only one coordinate is given or
/// the point is invalid, or a storage error.
pub async fn search_products(
    repo: &dyn ProximityRepository,
    text: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Vec<ProductWithSupplier>> {
    let near = GeoPoint::from_optional(latitude, longitude)?;
    repo.find_products(ProductQuery {
        text: Some(text.to_string()),
        near,
        ..Default::default()
    })
    .await
}

/// Available products in a category, ordered like [`search_products`].
///
/// # Errors
/// Same as [`search_products`], plus a validation error for a blank category.
pub async fn products_by_category(
    repo: &dyn ProximityRepository,
    category: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Vec<ProductWithSupplier>> {
    if category.trim().is_empty() {
        return Err(Error::validation("category", "cannot be empty"));
    }
    let near = GeoPoint::from_optional(latitude, longitude)?;
    repo.find_products(ProductQuery {
        category: Some(category.to_string()),
        near,
        ..Default::default()
    })
    .await
}
