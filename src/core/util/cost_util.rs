use anyhow::{anyhow, Result};

pub const HOURS_PER_MONTH: f64 = 730.0;
pub const MINS_PER_HOUR: f64 = 60.0;

pub struct CostUtil;

impl CostUtil {
    /// Normalizes a cost accrued over `data_hours` to a 730-hour month.
    #[inline]
    pub fn monthly_rate(cumulative: f64, data_hours: f64) -> f64 {
        cumulative / data_hours * HOURS_PER_MONTH
    }

    /// Parses `"10%"` or `"10"` into `0.1`. An empty string is zero.
    pub fn parse_percent_string(percent: &str) -> Result<f64> {
        let trimmed = percent.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }

        let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid percentage {:?}: {}", percent, e))?;

        Ok(value * 0.01)
    }
}
