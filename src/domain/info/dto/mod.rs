pub mod info_discount_upsert_request;
