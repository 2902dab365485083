//! Info routes (e.g., /api/v1/info/*)

use axum::{routing::get, Router};

use crate::api::controller::info::discount::InfoDiscountController;
use crate::app_state::AppState;

pub fn info_routes() -> Router<AppState> {
    Router::new().route(
        "/discounts",
        get(InfoDiscountController::get_info_discounts)
            .put(InfoDiscountController::upsert_info_discounts),
    )
}
