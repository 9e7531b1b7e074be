use chrono::{DateTime, Utc};

use stockroom_core::{Entity, MovementId, ProductId};

/// An accepted (not yet persisted) stock change, produced by
/// [`crate::Product::plan_adjustment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub delta: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
}

/// Immutable ledger entry: one committed stock change of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub delta: i64,
    pub recorded_at: DateTime<Utc>,
}

impl Movement {
    pub fn record(id: MovementId, adjustment: &StockAdjustment, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product_id: adjustment.product_id,
            delta: adjustment.delta,
            recorded_at,
        }
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_copies_product_and_delta_from_adjustment() {
        let adj = StockAdjustment {
            product_id: ProductId::new(3),
            delta: -4,
            previous_quantity: 10,
            new_quantity: 6,
        };
        let at = Utc::now();
        let movement = Movement::record(MovementId::new(9), &adj, at);

        assert_eq!(movement.id(), MovementId::new(9));
        assert_eq!(movement.product_id, ProductId::new(3));
        assert_eq!(movement.delta, -4);
        assert_eq!(movement.recorded_at, at);
    }

    #[test]
    fn zero_delta_movement_is_recorded_as_is() {
        let adj = StockAdjustment {
            product_id: ProductId::new(3),
            delta: 0,
            previous_quantity: 5,
            new_quantity: 5,
        };
        let movement = Movement::record(MovementId::new(1), &adj, Utc::now());
        assert_eq!(movement.delta, 0);
    }
}
