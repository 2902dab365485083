use crate::core::persistence::info::fixed::info_fixed_fs_adapter_trait::InfoFixedFsAdapterTrait;

use super::info_discount_entity::InfoDiscountEntity;

/// API-facing repository abstraction for discount settings.
pub trait InfoDiscountApiRepository: Send + Sync {
    fn fs_adapter(&self) -> &dyn InfoFixedFsAdapterTrait<InfoDiscountEntity>;

    fn read(&self) -> anyhow::Result<InfoDiscountEntity> {
        self.fs_adapter().read()
    }

    fn update(&self, settings: &InfoDiscountEntity) -> anyhow::Result<()> {
        self.fs_adapter().update(settings)
    }
}
