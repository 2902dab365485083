use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::info::dto::info_discount_upsert_request::InfoDiscountUpsertRequest;

/// Billing discounts applied to cluster costs.
///
/// Both values are percent strings (`"10%"` or `"10"`), kept verbatim so a
/// malformed value can still be shown back to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfoDiscountEntity {
    /// Standard discount (e.g. sustained-use), applied to CPU and RAM.
    pub discount: String,
    /// Separately negotiated discount, applied to CPU, RAM and GPU.
    pub negotiated_discount: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
}

impl Default for InfoDiscountEntity {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            discount: "0%".into(),
            negotiated_discount: "0%".into(),
            created_at: now,
            updated_at: now,
            version: "1.0.0".into(),
        }
    }
}

impl InfoDiscountEntity {
    pub fn apply_update(&mut self, req: InfoDiscountUpsertRequest) {
        if let Some(v) = req.discount {
            self.discount = v;
        }

        if let Some(v) = req.negotiated_discount {
            self.negotiated_discount = v;
        }

        self.updated_at = Utc::now();
    }
}
