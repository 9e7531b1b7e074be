use axum::Router;

pub mod common;
pub mod movements;
pub mod products;
pub mod system;

/// Router for all inventory endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(products::router())
        .merge(movements::router())
}
