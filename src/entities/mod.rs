//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the marketplace tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod notification;
pub mod order;
pub mod product;
pub mod review;
pub mod supplier;
pub mod user;
pub mod vendor;

// Re-export specific types to avoid conflicts
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use supplier::{Column as SupplierColumn, Entity as Supplier, Model as SupplierModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use vendor::{Column as VendorColumn, Entity as Vendor, Model as VendorModel};
