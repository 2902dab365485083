pub mod info_discount_api_repository_trait;
pub mod info_discount_entity;
pub mod info_discount_fs_adapter;
pub mod info_discount_repository;
