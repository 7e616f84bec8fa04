//! Core business logic - framework-agnostic marketplace operations.
//!
//! Everything here takes a `SeaORM` connection (or a pure value) and returns
//! typed results; the HTTP layer in [`crate::api`] only translates.

/// Pure geographic math: points, haversine distance, distance ranking
pub mod geo;
/// Notification creation and inbox queries
pub mod notification;
/// Order creation, status updates and order lookups
pub mod order;
/// Order number generation
pub mod order_number;
/// Order lifecycle state machine and emergency SLA
pub mod order_status;
/// Product listing and stock management
pub mod product;
/// Nearest-supplier and product search queries
pub mod proximity;
/// Reviews and aggregate user ratings
pub mod review;
/// Supplier profiles, online status and dashboard stats
pub mod supplier;
/// User registration and profile management
pub mod user;
/// Vendor profiles and spending stats
pub mod vendor;
