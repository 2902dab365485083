pub mod info;
pub mod storage_path;
