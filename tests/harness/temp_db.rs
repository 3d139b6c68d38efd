use std::path::{Path, PathBuf};
use std::sync::Arc;

use insiderwatch::adapter::outbound::sqlite::{open, DbPool, SqliteRecordStore};
use tempfile::TempDir;

/// Temporary SQLite database for integration tests.
///
/// The file lives in its own directory, removed when the value drops.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(format!("insiderwatch-{name}.db"));
        let pool = open(path.to_str().expect("utf-8 temp path")).expect("open sqlite database");
        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn store(&self) -> Arc<SqliteRecordStore> {
        Arc::new(SqliteRecordStore::new(self.pool.clone()))
    }

    /// A second, independent pool over the same file, as a restarted
    /// process would see it.
    pub fn reopen(&self) -> Arc<SqliteRecordStore> {
        let pool = open(self.path.to_str().expect("utf-8 temp path")).expect("reopen database");
        Arc::new(SqliteRecordStore::new(pool))
    }
}
