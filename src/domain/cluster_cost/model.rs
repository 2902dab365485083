use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::prom::query_result::Sample;
use crate::core::util::cost_util::CostUtil;
use crate::core::util::time_range::TimeWindow;
use crate::errors::CostModelError;

/// Fractional attribution of a resource's usage. Fields are independent and
/// need not sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterCostsBreakdown {
    pub idle: f64,
    pub other: f64,
    pub system: f64,
    pub user: f64,
}

impl ClusterCostsBreakdown {
    /// Adds `value` to the field for a CPU `mode` label; unknown or missing
    /// modes count as `other`.
    pub fn add_mode(&mut self, mode: Option<&str>, value: f64) {
        match mode {
            Some("idle") => self.idle += value,
            Some("system") => self.system += value,
            Some("user") => self.user += value,
            _ => self.other += value,
        }
    }
}

/// Cumulative and monthly-rate costs of one cluster over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCosts {
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
    #[serde(rename = "cpuCumulativeCost")]
    pub cpu_cumulative: f64,
    #[serde(rename = "cpuMonthlyCost")]
    pub cpu_monthly: f64,
    #[serde(rename = "cpuBreakdown", skip_serializing_if = "Option::is_none")]
    pub cpu_breakdown: Option<ClusterCostsBreakdown>,
    #[serde(rename = "gpuCumulativeCost")]
    pub gpu_cumulative: f64,
    #[serde(rename = "gpuMonthlyCost")]
    pub gpu_monthly: f64,
    #[serde(rename = "ramCumulativeCost")]
    pub ram_cumulative: f64,
    #[serde(rename = "ramMonthlyCost")]
    pub ram_monthly: f64,
    #[serde(rename = "ramBreakdown", skip_serializing_if = "Option::is_none")]
    pub ram_breakdown: Option<ClusterCostsBreakdown>,
    #[serde(rename = "storageCumulativeCost")]
    pub storage_cumulative: f64,
    #[serde(rename = "storageMonthlyCost")]
    pub storage_monthly: f64,
    #[serde(rename = "storageBreakdown", skip_serializing_if = "Option::is_none")]
    pub storage_breakdown: Option<ClusterCostsBreakdown>,
    #[serde(rename = "totalCumulativeCost")]
    pub total_cumulative: f64,
    #[serde(rename = "totalMonthlyCost")]
    pub total_monthly: f64,
}

impl ClusterCosts {
    /// Builds costs from cumulative figures accrued over `data_hours`, which
    /// must be strictly positive.
    pub fn from_cumulative(
        cpu: f64,
        gpu: f64,
        ram: f64,
        storage: f64,
        window: &TimeWindow,
        data_hours: f64,
    ) -> Result<Self, CostModelError> {
        if !(data_hours.is_finite() && data_hours > 0.0) {
            return Err(CostModelError::InvalidRange(format!(
                "{} data hours between {} and {}",
                data_hours, window.start, window.end
            )));
        }

        let cpu_monthly = CostUtil::monthly_rate(cpu, data_hours);
        let gpu_monthly = CostUtil::monthly_rate(gpu, data_hours);
        let ram_monthly = CostUtil::monthly_rate(ram, data_hours);
        let storage_monthly = CostUtil::monthly_rate(storage, data_hours);

        Ok(Self {
            start: window.start,
            end: window.end,
            cpu_cumulative: cpu,
            cpu_monthly,
            cpu_breakdown: None,
            gpu_cumulative: gpu,
            gpu_monthly,
            ram_cumulative: ram,
            ram_monthly,
            ram_breakdown: None,
            storage_cumulative: storage,
            storage_monthly,
            storage_breakdown: None,
            total_cumulative: cpu + gpu + ram + storage,
            total_monthly: cpu_monthly + gpu_monthly + ram_monthly + storage_monthly,
        })
    }
}

/// `(timestamp, value)` pairs rendered with six decimals.
pub type CostPoints = Vec<[String; 2]>;

pub fn to_cost_point(sample: &Sample) -> [String; 2] {
    [
        format!("{:.6}", sample.timestamp),
        format!("{:.6}", sample.value),
    ]
}

/// Simple per-resource cost figures as time-stamped pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "totalcost")]
    pub total_cost: CostPoints,
    #[serde(rename = "cpucost")]
    pub cpu_cost: CostPoints,
    #[serde(rename = "memcost")]
    pub mem_cost: CostPoints,
    #[serde(rename = "storageCost")]
    pub storage_cost: CostPoints,
}
