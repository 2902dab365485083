use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::prom::query_batch::BatchResults;
use crate::core::prom::query_result::QueryResult;
use crate::core::util::cost_util::MINS_PER_HOUR;
use crate::core::util::time_range::TimeWindow;
use crate::domain::cluster_cost::discount::{DiscountPolicy, Discounts};
use crate::domain::cluster_cost::model::{ClusterCosts, ClusterCostsBreakdown};
use crate::domain::cluster_cost::queries;
use crate::errors::CostModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCategory {
    Cpu,
    Gpu,
    Ram,
    Storage,
}

impl CostCategory {
    /// GPU is exempt from the standard discount and storage from both.
    pub fn discount_policy(self) -> DiscountPolicy {
        match self {
            CostCategory::Cpu | CostCategory::Ram => DiscountPolicy::Both,
            CostCategory::Gpu => DiscountPolicy::CustomOnly,
            CostCategory::Storage => DiscountPolicy::Undiscounted,
        }
    }
}

/// Running cumulative costs of one cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryCosts {
    pub cpu: f64,
    pub gpu: f64,
    pub ram: f64,
    pub storage: f64,
    pub total: f64,
}

impl CategoryCosts {
    fn add(&mut self, category: CostCategory, cost: f64) {
        match category {
            CostCategory::Cpu => self.cpu += cost,
            CostCategory::Gpu => self.gpu += cost,
            CostCategory::Ram => self.ram += cost,
            CostCategory::Storage => self.storage += cost,
        }
        self.total += cost;
    }
}

/// Result sets of the cluster cost batch, one field per query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostQueryResults {
    pub data_count: Vec<QueryResult>,
    pub total_gpu: Vec<QueryResult>,
    pub total_cpu: Vec<QueryResult>,
    pub total_ram: Vec<QueryResult>,
    pub total_storage: Vec<QueryResult>,
    pub cpu_mode_pct: Vec<QueryResult>,
    pub ram_system_pct: Vec<QueryResult>,
}

impl CostQueryResults {
    pub fn from_batch(batch: &BatchResults) -> Self {
        // ramOtherPct is queried but deliberately left out of the RAM
        // breakdown until its meaning as "other" is settled.
        Self {
            data_count: batch.get(queries::DATA_COUNT).to_vec(),
            total_gpu: batch.get(queries::TOTAL_GPU).to_vec(),
            total_cpu: batch.get(queries::TOTAL_CPU).to_vec(),
            total_ram: batch.get(queries::TOTAL_RAM).to_vec(),
            total_storage: batch.get(queries::TOTAL_STORAGE).to_vec(),
            cpu_mode_pct: batch.get(queries::CPU_MODE_PCT).to_vec(),
            ram_system_pct: batch.get(queries::RAM_SYSTEM_PCT).to_vec(),
        }
    }
}

/// Minutes of observed data; falls back to the window length when the data
/// count query returned nothing usable.
pub fn resolve_data_minutes(data_count: &[QueryResult], window: &TimeWindow) -> f64 {
    match data_count.first().and_then(QueryResult::first_value) {
        Some(mins) if mins.is_finite() && mins > 0.0 => mins,
        _ => {
            warn!("cluster cost data count returned no results; using window length");
            window.minutes()
        }
    }
}

/// Adds each series' leading value, discounted per `category`, into its
/// cluster's running totals. Series without a cluster label go to
/// `default_cluster_id`; series without samples only register the cluster.
pub fn accumulate_costs(
    costs: &mut BTreeMap<String, CategoryCosts>,
    results: &[QueryResult],
    category: CostCategory,
    discounts: &Discounts,
    default_cluster_id: &str,
) {
    let factor = discounts.factor(category.discount_policy());

    for result in results {
        let entry = costs
            .entry(result.cluster_id_or(default_cluster_id).to_string())
            .or_default();

        if let Some(value) = result.first_value() {
            entry.add(category, value * factor);
        }
    }
}

pub fn cpu_breakdowns(
    results: &[QueryResult],
    default_cluster_id: &str,
) -> BTreeMap<String, ClusterCostsBreakdown> {
    let mut breakdowns: BTreeMap<String, ClusterCostsBreakdown> = BTreeMap::new();

    for result in results {
        let Some(value) = result.first_value() else {
            continue;
        };

        let mode = result.label("mode");
        if mode.is_none() {
            debug!("CPU mode series without a mode label; counting as other");
        }

        breakdowns
            .entry(result.cluster_id_or(default_cluster_id).to_string())
            .or_default()
            .add_mode(mode, value);
    }

    breakdowns
}

pub fn ram_breakdowns(
    results: &[QueryResult],
    default_cluster_id: &str,
) -> BTreeMap<String, ClusterCostsBreakdown> {
    let mut breakdowns: BTreeMap<String, ClusterCostsBreakdown> = BTreeMap::new();

    for result in results {
        if let Some(value) = result.first_value() {
            breakdowns
                .entry(result.cluster_id_or(default_cluster_id).to_string())
                .or_default()
                .system += value;
        }
    }

    breakdowns
}

/// Folds the batch results into per-cluster costs.
///
/// Pure with respect to its inputs: the same results, window, discounts and
/// default cluster always produce the same map.
pub fn aggregate_cluster_costs(
    results: &CostQueryResults,
    window: &TimeWindow,
    discounts: &Discounts,
    default_cluster_id: &str,
) -> Result<BTreeMap<String, ClusterCosts>, CostModelError> {
    let data_hours = resolve_data_minutes(&results.data_count, window) / MINS_PER_HOUR;
    debug!(
        "data hours {} (window hours {})",
        data_hours,
        window.hours()
    );

    let mut costs: BTreeMap<String, CategoryCosts> = BTreeMap::new();
    for (series, category) in [
        (&results.total_gpu, CostCategory::Gpu),
        (&results.total_cpu, CostCategory::Cpu),
        (&results.total_ram, CostCategory::Ram),
        (&results.total_storage, CostCategory::Storage),
    ] {
        accumulate_costs(&mut costs, series, category, discounts, default_cluster_id);
    }

    let cpu_bd = cpu_breakdowns(&results.cpu_mode_pct, default_cluster_id);
    let ram_bd = ram_breakdowns(&results.ram_system_pct, default_cluster_id);

    let mut by_cluster = BTreeMap::new();
    for (id, cd) in costs {
        let mut cc =
            ClusterCosts::from_cumulative(cd.cpu, cd.gpu, cd.ram, cd.storage, window, data_hours)
                .inspect_err(|_| {
                    warn!("failed to build cluster costs for {} from {:?}", id, cd);
                })?;

        cc.cpu_breakdown = cpu_bd.get(&id).copied();
        cc.ram_breakdown = ram_bd.get(&id).copied();

        debug!("cluster {}: {:?}", id, cc);
        by_cluster.insert(id, cc);
    }

    Ok(by_cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prom::query_result::Sample;
    use chrono::{Duration, TimeZone, Utc};

    fn series(labels: &[(&str, &str)], value: f64) -> QueryResult {
        QueryResult::new(
            labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            vec![Sample {
                timestamp: 1700000000.0,
                value,
            }],
        )
    }

    fn empty_series(labels: &[(&str, &str)]) -> QueryResult {
        QueryResult::new(
            labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            vec![],
        )
    }

    fn window(hours: i64) -> TimeWindow {
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        TimeWindow {
            start: end - Duration::hours(hours),
            end,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_discount_policy_table() {
        assert_eq!(CostCategory::Cpu.discount_policy(), DiscountPolicy::Both);
        assert_eq!(CostCategory::Ram.discount_policy(), DiscountPolicy::Both);
        assert_eq!(CostCategory::Gpu.discount_policy(), DiscountPolicy::CustomOnly);
        assert_eq!(CostCategory::Storage.discount_policy(), DiscountPolicy::Undiscounted);
    }

    #[test]
    fn test_accumulate_applies_category_discounts() {
        let discounts = Discounts {
            standard: 0.5,
            custom: 0.1,
        };
        let mut costs = BTreeMap::new();
        accumulate_costs(&mut costs, &[series(&[], 10.0)], CostCategory::Cpu, &discounts, "a");
        accumulate_costs(&mut costs, &[series(&[], 10.0)], CostCategory::Gpu, &discounts, "a");
        accumulate_costs(&mut costs, &[series(&[], 10.0)], CostCategory::Storage, &discounts, "a");

        let a = costs["a"];
        assert!(approx(a.cpu, 4.5));
        assert!(approx(a.gpu, 9.0));
        assert!(approx(a.storage, 10.0));
        assert!(approx(a.total, 23.5));
    }

    #[test]
    fn test_cluster_attribution() {
        let discounts = Discounts::default();
        let mut costs = BTreeMap::new();
        accumulate_costs(
            &mut costs,
            &[
                series(&[("cluster_id", "east"), ("node", "n1")], 1.0),
                series(&[("cluster_id", "east"), ("node", "n2")], 2.0),
                series(&[("node", "n3")], 4.0),
                series(&[("cluster_id", "")], 8.0),
            ],
            CostCategory::Ram,
            &discounts,
            "default",
        );

        assert_eq!(costs.len(), 2);
        assert_eq!(costs["east"].ram, 3.0);
        assert_eq!(costs["default"].ram, 12.0);
    }

    #[test]
    fn test_series_without_samples_registers_cluster() {
        let mut costs = BTreeMap::new();
        accumulate_costs(
            &mut costs,
            &[empty_series(&[("cluster_id", "quiet")])],
            CostCategory::Cpu,
            &Discounts::default(),
            "default",
        );
        assert_eq!(costs["quiet"], CategoryCosts::default());
    }

    #[test]
    fn test_cpu_breakdown_classification() {
        let bd = cpu_breakdowns(
            &[
                series(&[("mode", "idle")], 0.6),
                series(&[("mode", "system")], 0.1),
                series(&[("mode", "user")], 0.25),
                series(&[("mode", "unexpectedmode")], 0.05),
                empty_series(&[("mode", "user")]),
            ],
            "cluster-a",
        );

        let a = bd["cluster-a"];
        assert_eq!(
            a,
            ClusterCostsBreakdown {
                idle: 0.6,
                system: 0.1,
                user: 0.25,
                other: 0.05,
            }
        );
    }

    #[test]
    fn test_ram_breakdown_only_fills_system() {
        let bd = ram_breakdowns(
            &[
                series(&[("cluster_id", "b")], 0.2),
                series(&[("cluster_id", "b")], 0.05),
            ],
            "a",
        );
        let b = bd["b"];
        assert!(approx(b.system, 0.25));
        assert_eq!(b.other, 0.0);
        assert_eq!(b.idle, 0.0);
        assert_eq!(b.user, 0.0);
        assert!(!bd.contains_key("a"));
    }

    #[test]
    fn test_data_minutes_fallback() {
        let w = window(2);
        assert_eq!(resolve_data_minutes(&[], &w), 120.0);
        assert_eq!(resolve_data_minutes(&[empty_series(&[])], &w), 120.0);
        assert_eq!(resolve_data_minutes(&[series(&[], 0.0)], &w), 120.0);
        assert_eq!(resolve_data_minutes(&[series(&[], 90.0)], &w), 90.0);
    }

    fn scenario() -> CostQueryResults {
        CostQueryResults {
            data_count: vec![series(&[], 60.0)],
            total_gpu: vec![],
            total_cpu: vec![series(&[], 10.0)],
            total_ram: vec![series(&[], 20.0)],
            total_storage: vec![series(&[], 5.0)],
            cpu_mode_pct: vec![
                series(&[("mode", "idle")], 0.6),
                series(&[("mode", "user")], 0.4),
            ],
            ram_system_pct: vec![series(&[], 0.3)],
        }
    }

    #[test]
    fn test_aggregate_end_to_end() {
        let discounts = Discounts {
            standard: 0.1,
            custom: 0.0,
        };
        let costs = aggregate_cluster_costs(&scenario(), &window(24), &discounts, "cluster-a").unwrap();

        assert_eq!(costs.len(), 1);
        let a = &costs["cluster-a"];
        assert!(approx(a.cpu_cumulative, 9.0));
        assert_eq!(a.gpu_cumulative, 0.0);
        assert!(approx(a.ram_cumulative, 18.0));
        assert!(approx(a.storage_cumulative, 5.0));
        assert!(approx(a.total_cumulative, 32.0));

        // 60 observed minutes => one data hour, regardless of the 24h window
        assert!(approx(a.cpu_monthly, 9.0 * 730.0));
        assert!(approx(a.ram_monthly, 18.0 * 730.0));
        assert!(approx(a.storage_monthly, 5.0 * 730.0));
        assert!(approx(a.total_monthly, 32.0 * 730.0));

        assert_eq!(a.cpu_breakdown.unwrap().idle, 0.6);
        assert_eq!(a.ram_breakdown.unwrap().system, 0.3);
        assert!(a.storage_breakdown.is_none());
        assert_eq!(a.start, window(24).start);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let discounts = Discounts {
            standard: 0.13,
            custom: 0.07,
        };
        let results = scenario();
        let first = aggregate_cluster_costs(&results, &window(24), &discounts, "x").unwrap();
        let second = aggregate_cluster_costs(&results, &window(24), &discounts, "x").unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_breakdowns_without_costs_are_dropped() {
        let results = CostQueryResults {
            cpu_mode_pct: vec![series(&[("cluster_id", "ghost"), ("mode", "idle")], 1.0)],
            total_cpu: vec![series(&[("cluster_id", "real")], 1.0)],
            ..Default::default()
        };
        let costs =
            aggregate_cluster_costs(&results, &window(1), &Discounts::default(), "d").unwrap();

        assert_eq!(costs.keys().collect::<Vec<_>>(), vec!["real"]);
        assert!(costs["real"].cpu_breakdown.is_none());
    }
}
