use std::sync::Mutex;

use crate::errors::QueryError;

/// Append-only error sink shared by the tasks of one query batch.
///
/// Safe to report into from any number of tasks; read it only after every
/// task of the batch has been joined.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Mutex<Vec<QueryError>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err`; `None` is a no-op.
    pub fn report(&self, err: Option<QueryError>) {
        if let Some(err) = err {
            self.lock().push(err);
        }
    }

    pub fn errors(&self) -> Vec<QueryError> {
        self.lock().clone()
    }

    /// Errors reported by the query registered under `name`.
    pub fn errors_for(&self, name: &str) -> Vec<QueryError> {
        self.lock()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<QueryError>> {
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn transport_err(name: &str) -> QueryError {
        QueryError::Transport {
            name: name.to_string(),
            message: "boom".into(),
        }
    }

    #[test]
    fn test_report_none_is_noop() {
        let ec = ErrorCollector::new();
        ec.report(None);
        assert!(ec.errors().is_empty());
    }

    #[test]
    fn test_errors_for_filters_by_name() {
        let ec = ErrorCollector::new();
        ec.report(Some(transport_err("totalGPU")));
        ec.report(Some(transport_err("totalCPU")));
        ec.report(Some(transport_err("totalGPU")));

        assert_eq!(ec.errors_for("totalGPU").len(), 2);
        assert_eq!(ec.errors_for("totalCPU").len(), 1);
        assert!(ec.errors_for("totalRAM").is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reports_are_not_lost() {
        let ec = Arc::new(ErrorCollector::new());
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let ec = ec.clone();
                tokio::spawn(async move {
                    ec.report(Some(transport_err(&format!("q{}", i))));
                    ec.report(None);
                })
            })
            .collect();

        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(ec.errors().len(), 64);
    }
}
