use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::core::persistence::info::fixed::discount::info_discount_entity::InfoDiscountEntity;
use crate::domain::info::dto::info_discount_upsert_request::InfoDiscountUpsertRequest;
use crate::errors::AppError;

pub struct InfoDiscountController;

impl InfoDiscountController {
    pub async fn get_info_discounts(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<InfoDiscountEntity>>, AppError> {
        to_json(state.info_service.get_info_discounts().await)
    }

    pub async fn upsert_info_discounts(
        State(state): State<AppState>,
        Json(payload): Json<InfoDiscountUpsertRequest>,
    ) -> Result<Json<ApiResponse<Value>>, AppError> {
        to_json(state.info_service.upsert_info_discounts(payload).await)
    }
}
