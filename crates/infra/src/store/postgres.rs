//! Postgres-backed inventory store.
//!
//! Products live in `inventory`, movements in `movement` (cascading on product
//! delete). Prices are `NUMERIC(31,2)` in the database and integer cents in
//! Rust; every query converts at the SQL boundary.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (foreign key violation) | `23503` | `Domain(NotFound)` | Movement for a product that no longer exists |
//! | Database (check constraint violation) | `23514` | `Domain(Validation)` | Row rejected by a `CHECK` (price, quantity) |
//! | Database (other) | Any other | `Storage` | Other database errors |
//! | PoolClosed / Io / Other | N/A | `Storage` | Network errors, connection failures, etc. |
//!
//! ## Locking
//!
//! `patch()` and `adjust_quantity()` read the product with `SELECT ... FOR
//! UPDATE` inside a transaction. Concurrent writers on the same product queue on
//! the row lock and re-read the committed quantity; other products are not
//! affected.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, error, instrument, warn};

use stockroom_core::{DomainError, MovementId, ProductId};
use stockroom_inventory::{Movement, NewProduct, Price, Product, ProductPatch};

use super::r#trait::{InventoryStore, ListWindow, StockAdjusted, StoreError};

const CREATE_INVENTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id_product  BIGSERIAL PRIMARY KEY,
    name        VARCHAR(50) NOT NULL,
    description VARCHAR(300),
    price       NUMERIC(31, 2) NOT NULL CHECK (price > 0),
    quantity    BIGINT NOT NULL CHECK (quantity >= 0)
)
"#;

const CREATE_MOVEMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS movement (
    id_movement       BIGSERIAL PRIMARY KEY,
    id_product        BIGINT NOT NULL REFERENCES inventory (id_product) ON DELETE CASCADE,
    movement_quantity BIGINT NOT NULL,
    recorded_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_MOVEMENT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS movement_id_product_idx ON movement (id_product, id_movement)
"#;

/// Postgres-backed inventory store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store can be
/// shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `inventory` and `movement` tables if they do not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in [CREATE_INVENTORY_TABLE, CREATE_MOVEMENT_TABLE, CREATE_MOVEMENT_INDEX] {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip_all, fields(name = %new_product.name))]
    async fn create(&self, new_product: NewProduct) -> Result<Product, StoreError> {
        new_product.validate()?;

        let row = sqlx::query(
            r#"
            INSERT INTO inventory (name, description, price, quantity)
            VALUES ($1, $2, $3::BIGINT / 100.0, $4)
            RETURNING id_product
            "#,
        )
        .bind(&new_product.name)
        .bind(&new_product.description)
        .bind(new_product.price.cents())
        .bind(new_product.quantity)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        let id: i64 = row
            .try_get("id_product")
            .map_err(|e| map_sqlx_error("read_product_id", e))?;

        debug!(product_id = id, "product created");
        Ok(Product::create(ProductId::new(id), new_product))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id_product, name, description, (price * 100)::BIGINT AS price_cents, quantity
            FROM inventory
            WHERE id_product = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, window: ListWindow) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id_product, name, description, (price * 100)::BIGINT AS price_cents, quantity
            FROM inventory
            ORDER BY id_product ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(clamp_to_i64(window.offset))
        .bind(clamp_to_i64(window.limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn patch(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        patch.validate()?;

        let mut tx = self.begin().await?;
        let Some(mut product) = lock_product(&mut tx, id).await? else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::not_found());
        };

        product.apply_patch(&patch);

        sqlx::query(
            r#"
            UPDATE inventory
            SET name = $2, description = $3, price = $4::BIGINT / 100.0
            WHERE id_product = $1
            "#,
        )
        .bind(id.get())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price().cents())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        // Movements go with the row through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM inventory WHERE id_product = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        debug!("product deleted");
        Ok(())
    }

    /// Adjust stock inside one transaction:
    /// 1. Lock the product row (`FOR UPDATE`)
    /// 2. Decide against the locked quantity
    /// 3. Insert the movement
    /// 4. Write the new quantity
    /// 5. Commit
    ///
    /// Any rejection rolls back before a movement is written.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn adjust_quantity(&self, id: ProductId, delta: i64) -> Result<StockAdjusted, StoreError> {
        let mut tx = self.begin().await?;

        let Some(mut product) = lock_product(&mut tx, id).await? else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::not_found());
        };

        let adjustment = match product.plan_adjustment(delta) {
            Ok(a) => a,
            Err(e) => {
                tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
                warn!(quantity = product.quantity(), "stock adjustment rejected");
                return Err(e.into());
            }
        };

        let row = sqlx::query(
            r#"
            INSERT INTO movement (id_product, movement_quantity)
            VALUES ($1, $2)
            RETURNING id_movement, recorded_at
            "#,
        )
        .bind(id.get())
        .bind(delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_movement", e))?;

        let movement_id: i64 = row
            .try_get("id_movement")
            .map_err(|e| map_sqlx_error("read_movement_id", e))?;
        let recorded_at: DateTime<Utc> = row
            .try_get("recorded_at")
            .map_err(|e| map_sqlx_error("read_recorded_at", e))?;

        sqlx::query("UPDATE inventory SET quantity = $2 WHERE id_product = $1")
            .bind(id.get())
            .bind(adjustment.new_quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_quantity", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        product.apply_adjustment(&adjustment);
        debug!(movement_id, quantity = adjustment.new_quantity, "stock adjusted");

        Ok(StockAdjusted {
            product,
            movement: Movement::record(MovementId::new(movement_id), &adjustment, recorded_at),
        })
    }

    /// One statement, so the existence check and the ledger read share a
    /// snapshot: a product row with no movements yields a single row of NULLs.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn movements_for_product(&self, id: ProductId) -> Result<Vec<Movement>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT m.id_movement, i.id_product, m.movement_quantity, m.recorded_at
            FROM inventory i
            LEFT JOIN movement m ON m.id_product = i.id_product
            WHERE i.id_product = $1
            ORDER BY m.id_movement ASC
            "#,
        )
        .bind(id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_movements", e))?;

        if rows.is_empty() {
            return Err(StoreError::not_found());
        }

        let mut movements = Vec::with_capacity(rows.len());
        for row in &rows {
            let movement_id: Option<i64> = row
                .try_get("id_movement")
                .map_err(|e| map_sqlx_error("decode_movement", e))?;
            if movement_id.is_some() {
                movements.push(movement_from_row(row)?);
            }
        }
        Ok(movements)
    }

    #[instrument(skip(self), fields(movement_id = %id))]
    async fn movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id_movement, id_product, movement_quantity, recorded_at
            FROM movement
            WHERE id_movement = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_movement", e))?;

        row.as_ref().map(movement_from_row).transpose()
    }
}

/// Read a product row and hold its lock until the transaction ends.
async fn lock_product(
    tx: &mut Transaction<'static, Postgres>,
    id: ProductId,
) -> Result<Option<Product>, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT id_product, name, description, (price * 100)::BIGINT AS price_cents, quantity
        FROM inventory
        WHERE id_product = $1
        FOR UPDATE
        "#,
    )
    .bind(id.get())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_product", e))?;

    row.as_ref().map(product_from_row).transpose()
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e| map_sqlx_error("decode_product", e);

    let id: i64 = row.try_get("id_product").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let description: Option<String> = row.try_get("description").map_err(decode)?;
    let price_cents: i64 = row.try_get("price_cents").map_err(decode)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode)?;

    let price = Price::from_cents(price_cents)
        .map_err(|e| StoreError::Storage(format!("stored price of product {id} is invalid: {e}")))?;

    Ok(Product::restore(ProductId::new(id), name, description, price, quantity))
}

fn movement_from_row(row: &PgRow) -> Result<Movement, StoreError> {
    let decode = |e| map_sqlx_error("decode_movement", e);

    Ok(Movement {
        id: MovementId::new(row.try_get("id_movement").map_err(decode)?),
        product_id: ProductId::new(row.try_get("id_product").map_err(decode)?),
        delta: row.try_get("movement_quantity").map_err(decode)?,
        recorded_at: row.try_get("recorded_at").map_err(decode)?,
    })
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23503") => StoreError::Domain(DomainError::NotFound),
                Some("23514") => StoreError::Domain(DomainError::validation(msg)),
                _ => {
                    error!(operation, "{msg}");
                    StoreError::Storage(msg)
                }
            }
        }
        other => {
            let msg = format!("{} failed: {}", operation, other);
            error!(operation, "{msg}");
            StoreError::Storage(msg)
        }
    }
}
