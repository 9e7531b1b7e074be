//! Inventory domain module.
//!
//! This crate contains business rules for products and their stock movements,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//! Stores call into it to decide whether a write may happen; they never
//! re-implement the rules.

pub mod movement;
pub mod price;
pub mod product;

pub use movement::{Movement, StockAdjustment};
pub use price::Price;
pub use product::{NewProduct, Product, ProductPatch, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
