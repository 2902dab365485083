pub mod discount;
pub mod info_fixed_fs_adapter_trait;
