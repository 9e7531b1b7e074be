use std::sync::Arc;

use stockroom_core::{MovementId, ProductId};
use stockroom_infra::{
    InMemoryInventoryStore, InventoryStore, ListWindow, PostgresInventoryStore, StockAdjusted, StorageConfig,
    StoreError,
};
use stockroom_inventory::{Movement, NewProduct, Product, ProductPatch};

/// Store wiring shared by all handlers.
#[derive(Clone)]
pub enum AppServices {
    InMemory {
        store: Arc<InMemoryInventoryStore>,
    },
    Persistent {
        store: Arc<PostgresInventoryStore>,
    },
}

pub async fn build_services(storage: &StorageConfig) -> Result<AppServices, StoreError> {
    match storage {
        StorageConfig::InMemory => {
            tracing::warn!("using in-memory inventory store; data is lost on restart");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresInventoryStore::connect(database_url, *max_connections).await?;
            store.migrate().await?;
            tracing::info!(max_connections, "connected to postgres inventory store");
            Ok(AppServices::Persistent {
                store: Arc::new(store),
            })
        }
    }
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        AppServices::InMemory {
            store: Arc::new(InMemoryInventoryStore::new()),
        }
    }

    fn store(&self) -> &dyn InventoryStore {
        match self {
            AppServices::InMemory { store } => store.as_ref(),
            AppServices::Persistent { store } => store.as_ref(),
        }
    }

    pub async fn products_create(&self, new_product: NewProduct) -> Result<Product, StoreError> {
        let product = self.store().create(new_product).await?;
        tracing::info!(product_id = %product.id_typed(), quantity = product.quantity(), "product created");
        Ok(product)
    }

    pub async fn products_get(&self, id: ProductId) -> Result<Product, StoreError> {
        self.store().get(id).await?.ok_or_else(StoreError::not_found)
    }

    pub async fn products_list(&self, window: ListWindow) -> Result<Vec<Product>, StoreError> {
        self.store().list(window).await
    }

    pub async fn products_patch(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        if patch.is_empty() {
            return self.products_get(id).await;
        }
        let product = self.store().patch(id, patch).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    pub async fn products_delete(&self, id: ProductId) -> Result<(), StoreError> {
        self.store().delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Apply a signed stock delta.
    pub async fn stock_adjust(&self, id: ProductId, delta: i64) -> Result<StockAdjusted, StoreError> {
        let adjusted = self.store().adjust_quantity(id, delta).await?;
        tracing::info!(
            product_id = %id,
            movement_id = %adjusted.movement.id,
            delta,
            quantity = adjusted.product.quantity(),
            "stock adjusted"
        );
        Ok(adjusted)
    }

    pub async fn movements_for_product(&self, id: ProductId) -> Result<Vec<Movement>, StoreError> {
        self.store().movements_for_product(id).await
    }

    pub async fn movement_get(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        self.store().movement(id).await
    }
}
