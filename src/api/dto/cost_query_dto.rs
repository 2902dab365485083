//! Cost API query DTOs

use serde::Deserialize;
use validator::Validate;

/// `?window=24h&offset=1d`
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CostWindowQuery {
    #[validate(length(min = 1, max = 32))]
    pub window: String,
    #[validate(length(max = 32))]
    pub offset: Option<String>,
}

impl CostWindowQuery {
    pub fn offset(&self) -> &str {
        self.offset.as_deref().unwrap_or("")
    }
}

/// `?start=2024-03-01T00:00:00.000Z&end=...&window=1d&offset=`
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CostRangeQuery {
    #[validate(length(min = 1))]
    pub start: String,
    #[validate(length(min = 1))]
    pub end: String,
    #[validate(length(min = 1, max = 32))]
    pub window: String,
    #[validate(length(max = 32))]
    pub offset: Option<String>,
}
