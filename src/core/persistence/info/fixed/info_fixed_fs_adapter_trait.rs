use anyhow::Result;

/// File-backed storage for a single fixed-info record.
pub trait InfoFixedFsAdapterTrait<T>: Send + Sync {
    fn read(&self) -> Result<T>;

    fn insert(&self, data: &T) -> Result<()>;

    fn update(&self, data: &T) -> Result<()>;

    fn delete(&self) -> Result<()>;
}
