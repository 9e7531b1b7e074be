//! Inventory persistence boundary.
//!
//! `InventoryStore` is the only way the API touches product and movement data.
//! Both backends run stock adjustments as one locked read-decide-write unit.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{InventoryStore, ListWindow, StockAdjusted, StoreError};
