//! Cost routes (e.g., /api/v1/costs/*)

use axum::{routing::get, Router};

use crate::api::controller::cost::ClusterCostController;
use crate::app_state::AppState;

pub fn cost_routes() -> Router<AppState> {
    Router::new()
        .route("/clusters", get(ClusterCostController::get_cluster_costs))
        .route("/clusters/totals", get(ClusterCostController::get_cluster_totals))
        .route("/totals", get(ClusterCostController::get_average_totals))
        .route("/totals/range", get(ClusterCostController::get_totals_over_time))
}
