//! Infrastructure layer: persistence adapters and configuration.

pub mod config;
pub mod store;


pub use config::{AppConfig, ConfigError, StorageConfig};
pub use store::{
    InMemoryInventoryStore, InventoryStore, ListWindow, PostgresInventoryStore, StockAdjusted,
    StoreError,
};
