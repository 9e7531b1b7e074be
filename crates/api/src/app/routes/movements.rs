use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::MovementId;

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/movements/:id", get(get_movement))
}

pub async fn get_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let movement_id: MovementId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.movement_get(movement_id).await {
        Ok(Some(m)) => (StatusCode::OK, Json(dto::movement_to_json(&m))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Movement not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
