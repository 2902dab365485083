use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::core::prom::query_batch::{run_batch, BatchResults, NamedQuery};
use crate::core::prom::query_executor::QueryExecutor;
use crate::core::prom::query_result::QueryResult;
use crate::core::util::time_range::{parse_duration, parse_time, resolve_window, validate_window};
use crate::domain::cluster_cost::aggregator::{aggregate_cluster_costs, CostQueryResults};
use crate::domain::cluster_cost::discount::{DiscountProvider, Discounts};
use crate::domain::cluster_cost::model::{to_cost_point, ClusterCosts, CostPoints, Totals};
use crate::domain::cluster_cost::queries;
use crate::errors::CostModelError;

/// Queries whose failure aborts a cluster cost computation. Everything else
/// in the batch degrades to "no data".
const REQUIRED_COST_QUERIES: [&str; 3] =
    [queries::TOTAL_CPU, queries::TOTAL_RAM, queries::TOTAL_STORAGE];

const NOT_ENOUGH_DATA: &str = "Not enough data available in the selected time range";

fn fail_on(batch: &BatchResults, required: &[&str]) -> Result<(), CostModelError> {
    match batch.fatal_errors(required) {
        Some(message) => {
            error!("cluster cost batch failed: {}", message);
            Err(CostModelError::BatchFailed(message))
        }
        None => Ok(()),
    }
}

/// Cumulative and monthly-rate costs per cluster over `window`, ending
/// `offset` before `now`.
pub async fn compute_cluster_costs(
    executor: &QueryExecutor,
    discounts: &dyn DiscountProvider,
    default_cluster_id: &str,
    window: &str,
    offset: &str,
    now: DateTime<Utc>,
) -> Result<BTreeMap<String, ClusterCosts>, CostModelError> {
    let range = resolve_window(window, offset, now)?;

    let batch = run_batch(
        executor,
        vec![
            NamedQuery::instant(queries::DATA_COUNT, queries::data_count(window, offset)),
            NamedQuery::instant(queries::TOTAL_GPU, queries::total_gpu(window, offset)),
            NamedQuery::instant(queries::TOTAL_CPU, queries::total_cpu(window, offset)),
            NamedQuery::instant(queries::TOTAL_RAM, queries::total_ram(window, offset)),
            NamedQuery::instant(queries::TOTAL_STORAGE, queries::total_storage(window, offset)),
            NamedQuery::instant(queries::CPU_MODE_PCT, queries::cpu_mode_pct(window, offset)),
            NamedQuery::instant(queries::RAM_SYSTEM_PCT, queries::ram_system_pct(window, offset)),
            NamedQuery::instant(queries::RAM_OTHER_PCT, queries::ram_other_pct(window, offset)),
        ],
    )
    .await;

    for err in batch.errors().errors() {
        if !REQUIRED_COST_QUERIES.contains(&err.name()) {
            warn!("{}; continuing without it", err);
        }
    }
    fail_on(&batch, &REQUIRED_COST_QUERIES)?;

    let discounts = Discounts::resolve(discounts);
    let costs = aggregate_cluster_costs(
        &CostQueryResults::from_batch(&batch),
        &range,
        &discounts,
        default_cluster_id,
    )?;

    info!(
        "computed cluster costs for {} cluster(s) over {} (offset {:?})",
        costs.len(),
        window,
        offset
    );
    Ok(costs)
}

/// Leading sample of every series, grouped by cluster.
fn result_to_total(
    results: &[QueryResult],
    default_cluster_id: &str,
) -> BTreeMap<String, CostPoints> {
    let mut totals: BTreeMap<String, CostPoints> = BTreeMap::new();

    for result in results {
        let Some(sample) = result.values.first() else {
            warn!("metric values did not contain any valid data");
            continue;
        };

        totals
            .entry(result.cluster_id_or(default_cluster_id).to_string())
            .or_default()
            .push(to_cost_point(sample));
    }

    totals
}

/// Every sample of the first series.
fn result_to_totals(results: &[QueryResult]) -> Result<CostPoints, CostModelError> {
    let first = results
        .first()
        .ok_or_else(|| CostModelError::InsufficientData(NOT_ENOUGH_DATA.into()))?;

    Ok(first.values.iter().map(to_cost_point).collect())
}

/// Monthly-rate CPU, RAM and storage costs for every cluster, averaged over
/// `window`.
pub async fn cluster_costs_for_all_clusters(
    executor: &QueryExecutor,
    default_cluster_id: &str,
    window: &str,
    offset: &str,
) -> Result<BTreeMap<String, Totals>, CostModelError> {
    validate_window(window, offset)?;

    let required = [queries::CLUSTER_CORES, queries::CLUSTER_RAM, queries::CLUSTER_STORAGE];
    let batch = run_batch(
        executor,
        vec![
            NamedQuery::instant(queries::CLUSTER_CORES, queries::cluster_cores(window, offset)),
            NamedQuery::instant(queries::CLUSTER_RAM, queries::cluster_ram(window, offset)),
            NamedQuery::instant(queries::CLUSTER_STORAGE, queries::cluster_storage(window, offset)),
        ],
    )
    .await;
    fail_on(&batch, &required)?;

    let mut by_cluster: BTreeMap<String, Totals> = BTreeMap::new();

    for (id, points) in result_to_total(batch.get(queries::CLUSTER_CORES), default_cluster_id) {
        by_cluster.entry(id).or_default().cpu_cost = points;
    }
    for (id, points) in result_to_total(batch.get(queries::CLUSTER_RAM), default_cluster_id) {
        by_cluster.entry(id).or_default().mem_cost = points;
    }
    for (id, points) in result_to_total(batch.get(queries::CLUSTER_STORAGE), default_cluster_id) {
        by_cluster.entry(id).or_default().storage_cost = points;
    }

    Ok(by_cluster)
}

/// Current monthly-rate totals of the default cluster, averaged over
/// `window`.
pub async fn average_cluster_totals(
    executor: &QueryExecutor,
    default_cluster_id: &str,
    window: &str,
    offset: &str,
) -> Result<Totals, CostModelError> {
    validate_window(window, offset)?;

    let required = [
        queries::CLUSTER_CORES,
        queries::CLUSTER_RAM,
        queries::CLUSTER_STORAGE,
        queries::CLUSTER_TOTAL,
    ];
    let batch = run_batch(
        executor,
        vec![
            NamedQuery::instant(queries::CLUSTER_CORES, queries::cluster_cores(window, offset)),
            NamedQuery::instant(queries::CLUSTER_RAM, queries::cluster_ram(window, offset)),
            NamedQuery::instant(queries::CLUSTER_STORAGE, queries::cluster_storage(window, offset)),
            NamedQuery::instant(queries::CLUSTER_TOTAL, queries::cluster_total()),
        ],
    )
    .await;
    fail_on(&batch, &required)?;

    let pick = |name: &str| {
        result_to_total(batch.get(name), default_cluster_id)
            .remove(default_cluster_id)
            .unwrap_or_default()
    };

    let total_cost = pick(queries::CLUSTER_TOTAL);
    if total_cost.is_empty() {
        return Err(CostModelError::InsufficientData(format!(
            "{} for cluster {:?}",
            NOT_ENOUGH_DATA, default_cluster_id
        )));
    }

    Ok(Totals {
        total_cost,
        cpu_cost: pick(queries::CLUSTER_CORES),
        mem_cost: pick(queries::CLUSTER_RAM),
        storage_cost: pick(queries::CLUSTER_STORAGE),
    })
}

/// Monthly-rate totals sampled every `window` between `start` and `end`
/// (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
pub async fn cluster_costs_over_time(
    executor: &QueryExecutor,
    start: &str,
    end: &str,
    window: &str,
    offset: &str,
) -> Result<Totals, CostModelError> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    let step = parse_duration(window)
        .ok_or_else(|| CostModelError::InvalidRange(format!("error parsing window ({})", window)))?;
    validate_window(window, offset)?;
    if end <= start {
        return Err(CostModelError::InvalidRange(format!(
            "end {} is not after start {}",
            end, start
        )));
    }

    let required = [
        queries::CLUSTER_CORES,
        queries::CLUSTER_RAM,
        queries::CLUSTER_STORAGE,
        queries::CLUSTER_TOTAL,
    ];
    let range = |name: &str, query: String| NamedQuery::range(name, query, start, end, step);
    let batch = run_batch(
        executor,
        vec![
            range(queries::CLUSTER_CORES, queries::cluster_cores(window, offset)),
            range(queries::CLUSTER_RAM, queries::cluster_ram(window, offset)),
            range(queries::CLUSTER_STORAGE, queries::cluster_storage(window, offset)),
            range(queries::CLUSTER_TOTAL, queries::cluster_total()),
        ],
    )
    .await;
    fail_on(&batch, &required)?;

    Ok(Totals {
        total_cost: result_to_totals(batch.get(queries::CLUSTER_TOTAL))?,
        cpu_cost: result_to_totals(batch.get(queries::CLUSTER_CORES))?,
        mem_cost: result_to_totals(batch.get(queries::CLUSTER_RAM))?,
        storage_cost: result_to_totals(batch.get(queries::CLUSTER_STORAGE))?,
    })
}
