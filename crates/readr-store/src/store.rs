//! Pool-backed façade: one connection per operation.

use crate::config::{DatabaseConfig, StoreConfig};
use crate::error::StoreResult;
use crate::pool::create_pool;
use crate::record::Record;
use crate::repository::{Repository, UpdateMode};
use deadpool_postgres::{Client, Pool};

/// A [`Repository`] bound to a connection pool.
///
/// Each call checks a connection out, runs exactly one statement, and drops
/// the connection back into the pool before returning, on success, error,
/// or timeout alike.
pub struct Store<R> {
    pool: Pool,
    repo: Repository<R>,
}

impl<R> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("pool", &self.pool.status())
            .field("repo", &self.repo)
            .finish()
    }
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            repo: self.repo.clone(),
        }
    }
}

impl<R: Record> Store<R> {
    pub fn new(pool: Pool, repo: Repository<R>) -> Self {
        Self { pool, repo }
    }

    /// Build the pool and the repository from configuration.
    pub fn connect(database: &DatabaseConfig, config: StoreConfig) -> StoreResult<Self> {
        let pool = create_pool(database)?;
        Ok(Self::new(pool, Repository::new(config)?))
    }

    pub fn with_deleted_code(mut self, code: i64) -> Self {
        self.repo = self.repo.with_deleted_code(code);
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn repository(&self) -> &Repository<R> {
        &self.repo
    }

    pub async fn create(&self, record: &R) -> StoreResult<()> {
        let client = self.checkout().await?;
        self.repo.create(&client, record).await
    }

    pub async fn update(&self, record: &R) -> StoreResult<()> {
        self.update_with(record, UpdateMode::Partial).await
    }

    pub async fn update_with(&self, record: &R, mode: UpdateMode) -> StoreResult<()> {
        let client = self.checkout().await?;
        self.repo.update_with(&client, record, mode).await
    }

    pub async fn delete(&self, id: &R::Id) -> StoreResult<()> {
        let client = self.checkout().await?;
        self.repo.delete(&client, id).await
    }

    pub async fn get(&self, id: &R::Id) -> StoreResult<R> {
        let client = self.checkout().await?;
        self.repo.get(&client, id).await
    }

    /// Check a connection out of the pool, bounded by the query timeout.
    ///
    /// A pool that cannot produce a connection in time fails with
    /// [`ExecutionFailure::Timeout`](crate::ExecutionFailure::Timeout).
    pub async fn checkout(&self) -> StoreResult<Client> {
        self.repo
            .bounded(async { Ok(self.pool.get().await?) })
            .await
    }
}
