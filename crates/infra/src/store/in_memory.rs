use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use stockroom_core::{MovementId, ProductId};
use stockroom_inventory::{Movement, NewProduct, Product, ProductPatch};

use super::r#trait::{InventoryStore, ListWindow, StockAdjusted, StoreError};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    movements: BTreeMap<MovementId, Movement>,
    last_product_id: i64,
    last_movement_id: i64,
}

impl Tables {
    fn next_product_id(&mut self) -> ProductId {
        self.last_product_id += 1;
        ProductId::new(self.last_product_id)
    }

    fn next_movement_id(&mut self) -> MovementId {
        self.last_movement_id += 1;
        MovementId::new(self.last_movement_id)
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Every write takes the single write guard and never
/// awaits while holding it, so each operation is atomic and adjustments are
/// fully serialized. Ids start at 1, like database serials.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn create(&self, new_product: NewProduct) -> Result<Product, StoreError> {
        new_product.validate()?;

        let mut tables = self.write()?;
        let id = tables.next_product_id();
        let product = Product::create(id, new_product);
        tables.products.insert(id, product.clone());

        debug!(product_id = %id, "product created");
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list(&self, window: ListWindow) -> Result<Vec<Product>, StoreError> {
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);

        Ok(self
            .read()?
            .products
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn patch(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        patch.validate()?;

        let mut tables = self.write()?;
        let product = tables.products.get_mut(&id).ok_or_else(StoreError::not_found)?;
        product.apply_patch(&patch);
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.products.remove(&id).is_none() {
            return Err(StoreError::not_found());
        }
        tables.movements.retain(|_, m| m.product_id != id);

        debug!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn adjust_quantity(&self, id: ProductId, delta: i64) -> Result<StockAdjusted, StoreError> {
        let mut tables = self.write()?;

        let product = tables.products.get(&id).ok_or_else(StoreError::not_found)?;
        let adjustment = match product.plan_adjustment(delta) {
            Ok(a) => a,
            Err(e) => {
                warn!(product_id = %id, delta, quantity = product.quantity(), "stock adjustment rejected");
                return Err(e.into());
            }
        };

        let movement_id = tables.next_movement_id();
        let movement = Movement::record(movement_id, &adjustment, Utc::now());
        tables.movements.insert(movement_id, movement.clone());

        let product = tables.products.get_mut(&id).ok_or_else(StoreError::not_found)?;
        product.apply_adjustment(&adjustment);

        debug!(
            product_id = %id,
            movement_id = %movement_id,
            delta,
            quantity = adjustment.new_quantity,
            "stock adjusted"
        );
        Ok(StockAdjusted {
            product: product.clone(),
            movement,
        })
    }

    async fn movements_for_product(&self, id: ProductId) -> Result<Vec<Movement>, StoreError> {
        let tables = self.read()?;
        if !tables.products.contains_key(&id) {
            return Err(StoreError::not_found());
        }

        Ok(tables
            .movements
            .values()
            .filter(|m| m.product_id == id)
            .cloned()
            .collect())
    }

    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        Ok(self.read()?.movements.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use stockroom_core::DomainError;
    use stockroom_inventory::Price;

    fn leite(quantity: i64) -> NewProduct {
        NewProduct::new(
            "Leite",
            Some("Caixa de leite da empresa X".to_string()),
            Price::from_decimal(4.3).unwrap(),
            quantity,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_from_one() {
        let store = InMemoryInventoryStore::new();
        let a = store.create(leite(1)).await.unwrap();
        let b = store.create(leite(2)).await.unwrap();
        assert_eq!(a.id_typed(), ProductId::new(1));
        assert_eq!(b.id_typed(), ProductId::new(2));
    }

    #[tokio::test]
    async fn create_rejects_unvalidated_input() {
        let store = InMemoryInventoryStore::new();
        let mut bad = leite(1);
        bad.quantity = -3;
        let err = store.create(bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
        assert!(store.list(ListWindow::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_adjustment_on_missing_product_is_not_found() {
        let store = InMemoryInventoryStore::new();
        let err = store.adjust_quantity(ProductId::new(99), 5).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn concurrent_adjustments_never_both_drain_the_same_stock() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let id = store.create(leite(5)).await.unwrap().id_typed();

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.adjust_quantity(id, -3).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.adjust_quantity(id, -4).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_invalid_adjustment()))
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 1);

        let quantity = store.get(id).await.unwrap().unwrap().quantity();
        assert!(quantity == 1 || quantity == 2, "unexpected quantity {quantity}");
        assert_eq!(store.movements_for_product(id).await.unwrap().len(), 1);
    }
}
