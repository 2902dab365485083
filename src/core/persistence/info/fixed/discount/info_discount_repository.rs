use std::path::Path;

use crate::core::persistence::info::fixed::info_fixed_fs_adapter_trait::InfoFixedFsAdapterTrait;

use super::info_discount_api_repository_trait::InfoDiscountApiRepository;
use super::info_discount_entity::InfoDiscountEntity;
use super::info_discount_fs_adapter::InfoDiscountFsAdapter;

pub struct InfoDiscountRepository {
    adapter: InfoDiscountFsAdapter,
}

impl InfoDiscountRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            adapter: InfoDiscountFsAdapter::new(data_dir),
        }
    }
}

impl InfoDiscountApiRepository for InfoDiscountRepository {
    fn fs_adapter(&self) -> &dyn InfoFixedFsAdapterTrait<InfoDiscountEntity> {
        &self.adapter
    }
}
