pub mod appointments;
pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod format;
pub mod profile;

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;

    use crate::backend::sqlite::SqliteBackend;
    use crate::backend::{Backend, Filter, Query, Row, Table};

    pub fn memory_backend() -> SqliteBackend {
        SqliteBackend::open(":memory:").unwrap()
    }

    /// Backend whose every call fails, like an unreachable hosted service.
    pub struct FailingBackend;

    #[async_trait]
    impl Backend for FailingBackend {
        async fn select(&self, _query: &Query) -> anyhow::Result<Vec<Row>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn insert(&self, _table: Table, _record: Row) -> anyhow::Result<Row> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn update(&self, _table: Table, _changes: Row, _filters: &[Filter]) -> anyhow::Result<u64> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }
}
