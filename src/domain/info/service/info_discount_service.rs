use anyhow::Result;
use serde_json::Value;
use validator::Validate;

use crate::core::persistence::info::fixed::discount::info_discount_api_repository_trait::InfoDiscountApiRepository;
use crate::core::persistence::info::fixed::discount::info_discount_entity::InfoDiscountEntity;
use crate::domain::info::dto::info_discount_upsert_request::InfoDiscountUpsertRequest;

pub async fn get_info_discounts<R: InfoDiscountApiRepository>(
    repo: &R,
) -> Result<InfoDiscountEntity> {
    repo.read()
}

/// Validates `req` and persists it as a partial update of the stored record.
pub async fn upsert_info_discounts<R: InfoDiscountApiRepository>(
    repo: &R,
    req: InfoDiscountUpsertRequest,
) -> Result<Value> {
    req.validate()?;

    let mut discounts = repo.read()?;
    discounts.apply_update(req);

    repo.update(&discounts)?;

    Ok(serde_json::json!({
        "message": "Discounts updated successfully",
        "updated_at": discounts.updated_at.to_rfc3339(),
        "discount": discounts.discount,
        "negotiated_discount": discounts.negotiated_discount,
    }))
}
