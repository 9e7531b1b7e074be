use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{DomainError, MovementId, ProductId};
use stockroom_inventory::{Movement, NewProduct, Product, ProductPatch};

/// Offset/limit window for product listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ListWindow {
    pub offset: u64,
    pub limit: u64,
}

impl ListWindow {
    pub const DEFAULT_LIMIT: u64 = 100;

    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

impl Default for ListWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Result of a committed stock adjustment: the refreshed product and the
/// movement recorded with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjusted {
    pub product: Product,
    pub movement: Movement,
}

/// Inventory store operation error.
///
/// ## Error Categories
///
/// - **Domain**: deterministic rejections (validation, missing product,
///   adjustment below zero). Nothing was written.
/// - **Storage**: transaction or connectivity failure. The transaction was
///   rolled back; the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound))
    }

    pub fn is_invalid_adjustment(&self) -> bool {
        matches!(self, Self::Domain(DomainError::InvalidAdjustment { .. }))
    }
}

/// Durable product catalogue plus the movement ledger.
///
/// ## Adjustment Semantics
///
/// `adjust_quantity()` must:
/// - read the product's quantity from the authoritative store while holding a
///   lock on that product (row lock, or an exclusive guard in memory)
/// - decide through `Product::plan_adjustment` (check before insert)
/// - on acceptance, write the movement and the new quantity in one atomic unit
/// - on rejection or failure, leave no trace (no movement, quantity unchanged)
///
/// Adjustments of different products must not serialize on each other in
/// backends that can avoid it.
///
/// ## Cascade
///
/// `delete()` removes the product's movements with it.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Persist a new product under a fresh id.
    async fn create(&self, new_product: NewProduct) -> Result<Product, StoreError>;

    /// Point lookup; `None` when absent.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Products ordered by id ascending within `window`.
    async fn list(&self, window: ListWindow) -> Result<Vec<Product>, StoreError>;

    /// Overwrite the fields present in `patch`.
    async fn patch(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError>;

    /// Delete a product and its movements.
    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;

    /// Apply a signed `delta` to a product's stock, all-or-nothing.
    async fn adjust_quantity(&self, id: ProductId, delta: i64) -> Result<StockAdjusted, StoreError>;

    /// Movements of a product in creation order.
    async fn movements_for_product(&self, id: ProductId) -> Result<Vec<Movement>, StoreError>;

    /// Point lookup of a single movement.
    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn create(&self, new_product: NewProduct) -> Result<Product, StoreError> {
        (**self).create(new_product).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, window: ListWindow) -> Result<Vec<Product>, StoreError> {
        (**self).list(window).await
    }

    async fn patch(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        (**self).patch(id, patch).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn adjust_quantity(&self, id: ProductId, delta: i64) -> Result<StockAdjusted, StoreError> {
        (**self).adjust_quantity(id, delta).await
    }

    async fn movements_for_product(&self, id: ProductId) -> Result<Vec<Movement>, StoreError> {
        (**self).movements_for_product(id).await
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        (**self).movement(id).await
    }
}
