use anyhow::Result;
use tracing::warn;

use crate::core::persistence::info::fixed::discount::info_discount_api_repository_trait::InfoDiscountApiRepository;
use crate::core::persistence::info::fixed::discount::info_discount_repository::InfoDiscountRepository;
use crate::core::util::cost_util::CostUtil;

/// Raw discount percent strings, e.g. `"10%"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountPercents {
    pub discount: String,
    pub negotiated_discount: String,
}

pub trait DiscountProvider: Send + Sync {
    fn get_discount(&self) -> Result<DiscountPercents>;
}

impl DiscountProvider for InfoDiscountRepository {
    fn get_discount(&self) -> Result<DiscountPercents> {
        let entity = self.read()?;
        Ok(DiscountPercents {
            discount: entity.discount,
            negotiated_discount: entity.negotiated_discount,
        })
    }
}

/// Which discounts a cost category is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountPolicy {
    Both,
    CustomOnly,
    Undiscounted,
}

/// Discount fractions in `[0, 1]` terms (`0.1` for 10%).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Discounts {
    pub standard: f64,
    pub custom: f64,
}

impl Discounts {
    /// Best-effort lookup: a failing provider or a malformed percent string
    /// counts as no discount.
    pub fn resolve(provider: &dyn DiscountProvider) -> Self {
        let percents = match provider.get_discount() {
            Ok(p) => p,
            Err(e) => {
                warn!("discount lookup failed, applying none: {:#}", e);
                return Self::default();
            }
        };

        Self {
            standard: Self::parse_or_zero("discount", &percents.discount),
            custom: Self::parse_or_zero("negotiated discount", &percents.negotiated_discount),
        }
    }

    fn parse_or_zero(what: &str, pct: &str) -> f64 {
        CostUtil::parse_percent_string(pct).unwrap_or_else(|e| {
            warn!("ignoring {}: {}", what, e);
            0.0
        })
    }

    /// Multiplier applied to a raw cost under `policy`.
    pub fn factor(&self, policy: DiscountPolicy) -> f64 {
        match policy {
            DiscountPolicy::Both => (1.0 - self.standard) * (1.0 - self.custom),
            DiscountPolicy::CustomOnly => 1.0 - self.custom,
            DiscountPolicy::Undiscounted => 1.0,
        }
    }
}
