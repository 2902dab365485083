use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::util::cost_util::CostUtil;

/// Upsert payload for discount configuration. Values are percent strings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InfoDiscountUpsertRequest {
    #[validate(length(min = 1, max = 16), custom(function = "validate_percent"))]
    pub discount: Option<String>,
    #[validate(length(min = 1, max = 16), custom(function = "validate_percent"))]
    pub negotiated_discount: Option<String>,
}

fn validate_percent(value: &str) -> Result<(), ValidationError> {
    CostUtil::parse_percent_string(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("percent"))
}
