use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;

use crate::api::dto::cost_query_dto::{CostRangeQuery, CostWindowQuery};
use crate::config::AppConfig;
use crate::core::client::prometheus_client::PrometheusClient;
use crate::core::client::prometheus_transport_trait::PrometheusTransport;
use crate::core::persistence::info::fixed::discount::info_discount_entity::InfoDiscountEntity;
use crate::core::persistence::info::fixed::discount::info_discount_repository::InfoDiscountRepository;
use crate::core::prom::query_executor::QueryExecutor;
use crate::domain::cluster_cost::discount::DiscountProvider;
use crate::domain::cluster_cost::model::{ClusterCosts, Totals};
use crate::domain::cluster_cost::service;
use crate::domain::info::dto::info_discount_upsert_request::InfoDiscountUpsertRequest;
use crate::domain::info::service::info_discount_service;

#[derive(Clone)]
pub struct AppState {
    pub cost_service: Arc<ClusterCostService>,
    pub info_service: Arc<InfoService>,
}

pub fn build_app_state(config: &AppConfig) -> Result<AppState> {
    let transport = PrometheusClient::new(&config.prometheus_url, config.query_timeout)?;
    let discounts = Arc::new(InfoDiscountRepository::new(&config.data_dir));

    Ok(AppState {
        cost_service: Arc::new(ClusterCostService::new(
            Arc::new(transport),
            discounts.clone(),
            config.cluster_id.clone(),
        )),
        info_service: Arc::new(InfoService::new(discounts)),
    })
}

/// Discount record CRUD over the shared repository.
pub struct InfoService {
    discounts: Arc<InfoDiscountRepository>,
}

impl InfoService {
    pub fn new(discounts: Arc<InfoDiscountRepository>) -> Self {
        Self { discounts }
    }

    pub async fn get_info_discounts(&self) -> Result<InfoDiscountEntity> {
        info_discount_service::get_info_discounts(self.discounts.as_ref()).await
    }

    pub async fn upsert_info_discounts(&self, req: InfoDiscountUpsertRequest) -> Result<Value> {
        info_discount_service::upsert_info_discounts(self.discounts.as_ref(), req).await
    }
}

/// Cluster cost entry points bound to one metrics backend, discount source
/// and default cluster identifier.
pub struct ClusterCostService {
    executor: QueryExecutor,
    discounts: Arc<dyn DiscountProvider>,
    default_cluster_id: String,
}

impl ClusterCostService {
    pub fn new(
        transport: Arc<dyn PrometheusTransport>,
        discounts: Arc<dyn DiscountProvider>,
        default_cluster_id: String,
    ) -> Self {
        Self {
            executor: QueryExecutor::new(transport),
            discounts,
            default_cluster_id,
        }
    }

    pub async fn get_cluster_costs(
        &self,
        q: CostWindowQuery,
    ) -> Result<BTreeMap<String, ClusterCosts>> {
        let costs = service::compute_cluster_costs(
            &self.executor,
            self.discounts.as_ref(),
            &self.default_cluster_id,
            &q.window,
            q.offset(),
            Utc::now(),
        )
        .await?;
        Ok(costs)
    }

    pub async fn get_cluster_totals(&self, q: CostWindowQuery) -> Result<BTreeMap<String, Totals>> {
        let totals = service::cluster_costs_for_all_clusters(
            &self.executor,
            &self.default_cluster_id,
            &q.window,
            q.offset(),
        )
        .await?;
        Ok(totals)
    }

    pub async fn get_average_totals(&self, q: CostWindowQuery) -> Result<Totals> {
        let totals = service::average_cluster_totals(
            &self.executor,
            &self.default_cluster_id,
            &q.window,
            q.offset(),
        )
        .await?;
        Ok(totals)
    }

    pub async fn get_totals_over_time(&self, q: CostRangeQuery) -> Result<Totals> {
        let totals = service::cluster_costs_over_time(
            &self.executor,
            &q.start,
            &q.end,
            &q.window,
            q.offset.as_deref().unwrap_or(""),
        )
        .await?;
        Ok(totals)
    }
}
