use stockroom_core::{DomainError, DomainResult, Entity, ProductId};

use crate::movement::StockAdjustment;
use crate::price::Price;

/// Maximum product name length, in characters.
pub const NAME_MAX_LEN: usize = 50;

/// Maximum product description length, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 300;

/// Create shape: everything a product needs except its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub quantity: i64,
}

impl NewProduct {
    /// Build a validated create request.
    ///
    /// The name is trimmed and a blank description is treated as absent.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        price: Price,
        quantity: i64,
    ) -> DomainResult<Self> {
        let new_product = Self {
            name: name.into().trim().to_string(),
            description: normalize_description(description),
            price,
            quantity,
        };
        new_product.validate()?;
        Ok(new_product)
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        if self.quantity < 0 {
            return Err(DomainError::validation(
                "quantity must be greater than or equal to zero",
            ));
        }
        Ok(())
    }
}

/// Patch shape: only the descriptive fields, each optional.
///
/// `None` leaves the stored value untouched. Quantity is deliberately absent;
/// stock only changes through a [`StockAdjustment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

impl ProductPatch {
    pub fn new(name: Option<String>, description: Option<String>, price: Option<Price>) -> DomainResult<Self> {
        let patch = Self {
            name: name.map(|n| n.trim().to_string()),
            description,
            price,
        };
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }
}

/// Full shape: a stored product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Price,
    quantity: i64,
}

impl Product {
    /// Materialize a freshly created product under its assigned id.
    pub fn create(id: ProductId, new_product: NewProduct) -> Self {
        Self {
            id,
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            quantity: new_product.quantity,
        }
    }

    /// Rebuild a product from persisted columns.
    pub fn restore(
        id: ProductId,
        name: String,
        description: Option<String>,
        price: Price,
        quantity: i64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            price,
            quantity,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Overwrite the fields present in `patch`.
    ///
    /// A blank description clears it.
    pub fn apply_patch(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = normalize_description(Some(description.clone()));
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }

    /// Decide whether `delta` may be applied to the current stock.
    ///
    /// This must run against the authoritative (locked) quantity. It never
    /// mutates; the caller persists the movement and then calls
    /// [`Product::apply_adjustment`].
    pub fn plan_adjustment(&self, delta: i64) -> DomainResult<StockAdjustment> {
        let new_quantity = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_adjustment(self.quantity, delta))?;
        if new_quantity < 0 {
            return Err(DomainError::invalid_adjustment(self.quantity, delta));
        }

        Ok(StockAdjustment {
            product_id: self.id,
            delta,
            previous_quantity: self.quantity,
            new_quantity,
        })
    }

    pub fn apply_adjustment(&mut self, adjustment: &StockAdjustment) {
        debug_assert_eq!(adjustment.product_id, self.id);
        debug_assert_eq!(adjustment.previous_quantity, self.quantity);
        self.quantity = adjustment.new_quantity;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(DomainError::validation(format!(
            "name cannot be longer than {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> DomainResult<()> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => Err(DomainError::validation(format!(
            "description cannot be longer than {DESCRIPTION_MAX_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
