//! Info CRUD and validation logic

pub mod info_discount_service;
