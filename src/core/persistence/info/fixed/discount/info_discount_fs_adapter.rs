use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::core::persistence::info::fixed::info_fixed_fs_adapter_trait::InfoFixedFsAdapterTrait;
use crate::core::persistence::storage_path::info_discount_path;

use super::info_discount_entity::InfoDiscountEntity;

/// FS adapter for persisted discount configuration.
///
/// Uses a simple key-value `discount.rci` file with atomic writes.
pub struct InfoDiscountFsAdapter {
    path: PathBuf,
}

impl InfoDiscountFsAdapter {
    /// Adapter for `<data_dir>/info/discount.rci`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(info_discount_path(data_dir))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl InfoFixedFsAdapterTrait<InfoDiscountEntity> for InfoDiscountFsAdapter {
    fn read(&self) -> Result<InfoDiscountEntity> {
        if !self.path.exists() {
            return Ok(InfoDiscountEntity::default());
        }

        let file = File::open(&self.path).context("Failed to open discount file")?;
        let reader = BufReader::new(file);
        let mut s = InfoDiscountEntity::default();

        for line in reader.lines() {
            let line = line?;
            if let Some((key, val)) = line.split_once(':') {
                let key = key.trim().to_uppercase();
                let val = val.trim();

                match key.as_str() {
                    "DISCOUNT" => s.discount = val.to_string(),
                    "NEGOTIATED_DISCOUNT" => s.negotiated_discount = val.to_string(),
                    "CREATED_AT" => {
                        if let Ok(dt) = val.parse::<DateTime<Utc>>() {
                            s.created_at = dt;
                        }
                    }
                    "UPDATED_AT" => {
                        if let Ok(dt) = val.parse::<DateTime<Utc>>() {
                            s.updated_at = dt;
                        }
                    }
                    "VERSION" => s.version = val.to_string(),
                    _ => {}
                }
            }
        }

        Ok(s)
    }

    fn insert(&self, data: &InfoDiscountEntity) -> Result<()> {
        self.write(data)
    }

    fn update(&self, data: &InfoDiscountEntity) -> Result<()> {
        self.write(data)
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete discount file")?;
        }
        Ok(())
    }
}

impl InfoDiscountFsAdapter {
    fn write(&self, data: &InfoDiscountEntity) -> Result<()> {
        use std::io::Write;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create discount directory")?;
        }

        let tmp_path = self.path.with_extension("rci.tmp");
        let mut f = File::create(&tmp_path).context("Failed to create temp discount file")?;

        writeln!(f, "DISCOUNT:{}", data.discount)?;
        writeln!(f, "NEGOTIATED_DISCOUNT:{}", data.negotiated_discount)?;
        writeln!(f, "CREATED_AT:{}", data.created_at.to_rfc3339())?;
        writeln!(f, "UPDATED_AT:{}", data.updated_at.to_rfc3339())?;
        writeln!(f, "VERSION:{}", data.version)?;

        f.flush()?;
        f.sync_all().context("Failed to sync temp discount file")?;
        fs::rename(&tmp_path, &self.path).context("Failed to finalize discount file")?;

        #[cfg(unix)]
        if let Some(dir) = self.path.parent() {
            let dir_file = File::open(dir).context("Failed to open discount directory")?;
            dir_file.sync_all().context("Failed to sync discount directory")?;
        }

        Ok(())
    }
}
