use serde::Deserialize;

use stockroom_core::DomainResult;
use stockroom_inventory::{Movement, NewProduct, Price, Product, ProductPatch};
use stockroom_infra::ListWindow;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

impl CreateProductRequest {
    pub fn into_domain(self) -> DomainResult<NewProduct> {
        let price = Price::from_decimal(self.price)?;
        NewProduct::new(self.name, self.description, price, self.quantity)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl PatchProductRequest {
    pub fn into_domain(self) -> DomainResult<ProductPatch> {
        let price = self.price.map(Price::from_decimal).transpose()?;
        ProductPatch::new(self.name, self.description, price)
    }
}

/// Body of `PATCH /products/{id}/stock`: `quantity` is a signed delta.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    ListWindow::DEFAULT_LIMIT
}

impl From<ListProductsQuery> for ListWindow {
    fn from(q: ListProductsQuery) -> Self {
        ListWindow::new(q.skip, q.limit)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id_product": p.id_typed().get(),
        "name": p.name(),
        "description": p.description(),
        "price": p.price().as_decimal(),
        "quantity": p.quantity(),
    })
}

pub fn movement_to_json(m: &Movement) -> serde_json::Value {
    serde_json::json!({
        "id_movement": m.id.get(),
        "id_product": m.product_id.get(),
        "movement_quantity": m.delta,
        "recorded_at": m.recorded_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{DomainError, MovementId, ProductId};
    use stockroom_inventory::StockAdjustment;

    #[test]
    fn create_request_converts_price_and_validates() {
        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Leite",
            "description": "Caixa de leite da empresa X",
            "price": 4.3,
            "quantity": 12,
        }))
        .unwrap();
        let new_product = req.into_domain().unwrap();
        assert_eq!(new_product.price.cents(), 430);
        assert_eq!(new_product.quantity, 12);

        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Leite",
            "price": 0,
            "quantity": 12,
        }))
        .unwrap();
        assert!(matches!(req.into_domain(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_request_fields_are_all_optional() {
        let req: PatchProductRequest = serde_json::from_value(serde_json::json!({ "price": 52.55 })).unwrap();
        let patch = req.into_domain().unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.price.map(|p| p.cents()), Some(5255));
    }

    #[test]
    fn list_query_defaults_to_first_hundred() {
        let q: ListProductsQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(ListWindow::from(q), ListWindow::new(0, 100));
    }

    #[test]
    fn product_json_uses_id_product_and_decimal_price() {
        let new_product = NewProduct::new("Leite", None, Price::from_decimal(4.3).unwrap(), 12).unwrap();
        let product = Product::create(ProductId::new(7), new_product);
        let json = product_to_json(&product);
        assert_eq!(json["id_product"], 7);
        assert_eq!(json["price"], 4.3);
        assert_eq!(json["description"], serde_json::Value::Null);
    }

    #[test]
    fn movement_json_uses_ledger_column_names() {
        let adjustment = StockAdjustment {
            product_id: ProductId::new(7),
            delta: 0,
            previous_quantity: 12,
            new_quantity: 12,
        };
        let at = chrono::Utc::now();
        let movement = Movement::record(MovementId::new(3), &adjustment, at);
        let json = movement_to_json(&movement);
        assert_eq!(json["id_movement"], 3);
        assert_eq!(json["id_product"], 7);
        assert_eq!(json["movement_quantity"], 0);
        assert_eq!(json["recorded_at"], at.to_rfc3339());
    }
}
