use std::path::{Path, PathBuf};

pub fn info_fixed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("info")
}

pub fn info_discount_path(data_dir: &Path) -> PathBuf {
    info_fixed_dir(data_dir).join("discount.rci")
}
