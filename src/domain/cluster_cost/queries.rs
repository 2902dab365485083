//! PromQL builders for the cluster cost queries.
//!
//! `window` is a range selector duration (`24h`), `offset` an optional
//! duration the evaluation is shifted into the past by.

pub const DATA_COUNT: &str = "dataCount";
pub const TOTAL_GPU: &str = "totalGPU";
pub const TOTAL_CPU: &str = "totalCPU";
pub const TOTAL_RAM: &str = "totalRAM";
pub const TOTAL_STORAGE: &str = "totalStorage";
pub const CPU_MODE_PCT: &str = "cpuModePct";
pub const RAM_SYSTEM_PCT: &str = "ramSystemPct";
pub const RAM_OTHER_PCT: &str = "ramOtherPct";

pub const CLUSTER_CORES: &str = "clusterCores";
pub const CLUSTER_RAM: &str = "clusterRAM";
pub const CLUSTER_STORAGE: &str = "clusterStorage";
pub const CLUSTER_TOTAL: &str = "clusterTotal";

/// ` offset 1h`, or empty when no offset is given.
pub fn fmt_offset(offset: &str) -> String {
    if offset.trim().is_empty() {
        String::new()
    } else {
        format!(" offset {}", offset.trim())
    }
}

// Cumulative costs over the window, sampled per minute.

pub fn data_count(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "max(sum(count_over_time(kube_node_status_capacity_cpu_cores[{window}:1m]{off})) by (node, cluster_id))"
    )
}

pub fn total_gpu(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		sum_over_time(node_gpu_hourly_cost[{window}:1m]{off}) / 60
	) by (cluster_id)"
    )
}

pub fn total_cpu(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		sum(sum_over_time(kube_node_status_capacity_cpu_cores[{window}:1m]{off})) by (node, cluster_id) *
		avg(avg_over_time(node_cpu_hourly_cost[{window}:1m]{off})) by (node, cluster_id) / 60
	) by (cluster_id)"
    )
}

pub fn total_ram(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		sum(sum_over_time(kube_node_status_capacity_memory_bytes[{window}:1m]{off}) / 1024 / 1024 / 1024) by (node, cluster_id) *
		avg(avg_over_time(node_ram_hourly_cost[{window}:1m]{off})) by (node, cluster_id) / 60
	) by (cluster_id)"
    )
}

pub fn total_storage(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		sum(sum_over_time(kube_persistentvolume_capacity_bytes[{window}:1m]{off})) by (persistentvolume, cluster_id) / 1024 / 1024 / 1024 *
		avg(avg_over_time(pv_hourly_cost[{window}:1m]{off})) by (persistentvolume, cluster_id) / 60
	) by (cluster_id)"
    )
}

// Usage breakdowns, as fractions of capacity.

pub fn cpu_mode_pct(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(rate(node_cpu_seconds_total[{window}]{off})) by (cluster_id, mode)
	/ ignoring(mode) group_left sum(rate(node_cpu_seconds_total[{window}]{off})) by (cluster_id)"
    )
}

pub fn ram_system_pct(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(avg_over_time(container_memory_usage_bytes{{container_name!=\"\",namespace=\"kube-system\"}}[{window}]{off})) by (cluster_id)
	/ sum(avg(kube_node_status_capacity_memory_bytes{off}) by (node, cluster_id)) by (cluster_id)"
    )
}

pub fn ram_other_pct(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "avg_over_time(kubecost_cluster_memory_working_set_bytes[{window}]{off})
	/ sum(kube_node_status_capacity_memory_bytes{off})"
    )
}

// Monthly-rate totals, averaged over the window.

pub fn cluster_cores(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		avg(avg_over_time(kube_node_status_capacity_cpu_cores[{window}]{off})) by (node, cluster_id) * avg(avg_over_time(node_cpu_hourly_cost[{window}]{off})) by (node, cluster_id) * 730 +
		avg(avg_over_time(node_gpu_hourly_cost[{window}]{off})) by (node, cluster_id) * 730
	  ) by (cluster_id)"
    )
}

pub fn cluster_ram(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		avg(avg_over_time(kube_node_status_capacity_memory_bytes[{window}]{off})) by (node, cluster_id) / 1024 / 1024 / 1024 * avg(avg_over_time(node_ram_hourly_cost[{window}]{off})) by (node, cluster_id) * 730
	  ) by (cluster_id)"
    )
}

pub fn cluster_storage(window: &str, offset: &str) -> String {
    let off = fmt_offset(offset);
    format!(
        "sum(
		avg(avg_over_time(pv_hourly_cost[{window}]{off})) by (persistentvolume, cluster_id) * 730
		* avg(avg_over_time(kube_persistentvolume_capacity_bytes[{window}]{off})) by (persistentvolume, cluster_id) / 1024 / 1024 / 1024
	  ) by (cluster_id)"
    )
}

/// Current total monthly rate; not windowed.
pub fn cluster_total() -> String {
    "sum(avg(node_total_hourly_cost) by (node, cluster_id)) by (cluster_id) * 730 +
	  sum(
		avg(avg_over_time(pv_hourly_cost[1h])) by (persistentvolume, cluster_id) * 730
		* avg(avg_over_time(kube_persistentvolume_capacity_bytes[1h])) by (persistentvolume, cluster_id) / 1024 / 1024 / 1024
	  ) by (cluster_id)"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_optional() {
        assert_eq!(fmt_offset(""), "");
        assert_eq!(fmt_offset("3h"), " offset 3h");
        assert!(!total_cpu("24h", "").contains("offset"));
        assert!(total_cpu("24h", "3h").contains("[24h:1m] offset 3h"));
    }

    #[test]
    fn test_label_selectors_survive_formatting() {
        let q = ram_system_pct("1d", "");
        assert!(q.contains("{container_name!=\"\",namespace=\"kube-system\"}[1d]"));
    }

    #[test]
    fn test_data_count() {
        assert_eq!(
            data_count("2h", ""),
            "max(sum(count_over_time(kube_node_status_capacity_cpu_cores[2h:1m])) by (node, cluster_id))"
        );
    }
}
