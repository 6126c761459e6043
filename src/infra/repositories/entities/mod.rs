//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod app_config;
pub mod class;
pub mod credit;
pub mod credit_proof;
pub mod grade;
pub mod major;
pub mod notice;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use credit::{ActiveModel as CreditActiveModel, Entity as CreditEntity, Model as CreditModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
