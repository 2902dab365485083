use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use crate::api::dto::cost_query_dto::{CostRangeQuery, CostWindowQuery};
use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::cluster_cost::model::{ClusterCosts, Totals};
use crate::errors::AppError;

pub struct ClusterCostController;

fn check<Q: Validate>(q: &Q) -> Result<(), AppError> {
    q.validate()
        .map_err(|e| AppError::BodyParsingError(e.to_string()))
}

impl ClusterCostController {
    pub async fn get_cluster_costs(
        State(state): State<AppState>,
        Query(q): Query<CostWindowQuery>,
    ) -> Result<Json<ApiResponse<BTreeMap<String, ClusterCosts>>>, AppError> {
        check(&q)?;
        to_json(state.cost_service.get_cluster_costs(q).await)
    }

    pub async fn get_cluster_totals(
        State(state): State<AppState>,
        Query(q): Query<CostWindowQuery>,
    ) -> Result<Json<ApiResponse<BTreeMap<String, Totals>>>, AppError> {
        check(&q)?;
        to_json(state.cost_service.get_cluster_totals(q).await)
    }

    pub async fn get_average_totals(
        State(state): State<AppState>,
        Query(q): Query<CostWindowQuery>,
    ) -> Result<Json<ApiResponse<Totals>>, AppError> {
        check(&q)?;
        to_json(state.cost_service.get_average_totals(q).await)
    }

    pub async fn get_totals_over_time(
        State(state): State<AppState>,
        Query(q): Query<CostRangeQuery>,
    ) -> Result<Json<ApiResponse<Totals>>, AppError> {
        check(&q)?;
        to_json(state.cost_service.get_totals_over_time(q).await)
    }
}
