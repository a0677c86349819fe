use super::source::DataSource;
use super::table::Table;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

struct Snapshot {
    table: Arc<Table>,
    loaded_at: Option<Instant>,
}

/// Timed cache in front of a [`DataSource`].
///
/// Holds the last snapshot and when it was loaded. [`DatasetCache::get`] reloads
/// the whole table once the snapshot is older than `ttl`. A failed load is
/// logged and cached as an empty table until the next refresh window.
pub struct DatasetCache<S: DataSource> {
    source: S,
    ttl: Duration,
    snapshot: RwLock<Snapshot>,
}

impl<S: DataSource> DatasetCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(Snapshot {
                table: Arc::new(Table::empty()),
                loaded_at: None,
            }),
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current snapshot, reloading first if it is missing or stale.
    pub async fn get(&self) -> Arc<Table> {
        {
            let snapshot = self.snapshot.read().await;
            if self.is_fresh(&snapshot) {
                return Arc::clone(&snapshot.table);
            }
        }

        let mut snapshot = self.snapshot.write().await;
        // another caller may have refreshed while we waited for the lock
        if self.is_fresh(&snapshot) {
            return Arc::clone(&snapshot.table);
        }

        let table = match self.source.load().await {
            Ok(table) => {
                info!(
                    "Dataset loaded from {} ({} rows)",
                    self.source.describe(),
                    table.row_count()
                );
                if table.is_empty() {
                    warn!("Dataset from {} has no values", self.source.describe());
                }
                table
            }
            Err(e) => {
                error!(
                    "Failed to load dataset from {}, using an empty table: {}",
                    self.source.describe(),
                    e
                );
                Table::empty()
            }
        };

        snapshot.table = Arc::new(table);
        snapshot.loaded_at = Some(Instant::now());
        Arc::clone(&snapshot.table)
    }

    /// Forces a reload on the next [`DatasetCache::get`].
    pub async fn invalidate(&self) {
        self.snapshot.write().await.loaded_at = None;
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        snapshot
            .loaded_at
            .is_some_and(|at| at.elapsed() < self.ttl)
    }
}
