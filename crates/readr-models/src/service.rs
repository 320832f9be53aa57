//! Lifecycle-aware access to one model kind.

use crate::comment::Comment;
use crate::config::AppConfig;
use crate::error::ModelResult;
use crate::lifecycle::Lifecycle;
use crate::member::Member;
use crate::post::Post;
use crate::status::{Status, StatusTable};
use chrono::Utc;
use readr_store::deadpool_postgres::{Client, Pool};
use readr_store::{
    GenericClient, Record, Repository, Store, StoreConfig, UpdateMode, create_pool,
};

/// Applies [`Lifecycle`] rules, then delegates to the record's [`Store`].
///
/// The operations below run on a caller-supplied client so several of them
/// can share a transaction; [`Service::checkout`] hands out a pooled one.
#[derive(Debug, Clone)]
pub struct Service<R> {
    store: Store<R>,
    status: StatusTable,
}

impl<R: Record + Lifecycle> Service<R> {
    pub fn new(pool: Pool, store: StoreConfig, status: StatusTable) -> ModelResult<Self> {
        let deleted = status.code(R::KIND, Status::Deleted);
        let repo = Repository::new(store)?.with_deleted_code(deleted);
        Ok(Self {
            store: Store::new(pool, repo),
            status,
        })
    }

    pub fn from_config(pool: Pool, config: &AppConfig) -> ModelResult<Self> {
        Self::new(pool, config.store_config(), config.status)
    }

    pub fn store(&self) -> &Store<R> {
        &self.store
    }

    pub fn repository(&self) -> &Repository<R> {
        self.store.repository()
    }

    pub fn status(&self) -> &StatusTable {
        &self.status
    }

    /// Pooled connection, bounded by the configured query timeout.
    pub async fn checkout(&self) -> ModelResult<Client> {
        Ok(self.store.checkout().await?)
    }

    /// Stamp and insert. `record` keeps the stamped values.
    pub async fn create<C: GenericClient>(&self, client: &C, record: &mut R) -> ModelResult<()> {
        record.check_codes(&self.status)?;
        record.prepare_create(&self.status, Utc::now())?;
        self.repository().create(client, record).await?;
        tracing::debug!(target: "readr_models", table = R::table(), "created record");
        Ok(())
    }

    /// Stamp and partially update.
    pub async fn update<C: GenericClient>(&self, client: &C, record: &mut R) -> ModelResult<()> {
        self.update_with(client, record, UpdateMode::Partial).await
    }

    pub async fn update_with<C: GenericClient>(
        &self,
        client: &C,
        record: &mut R,
        mode: UpdateMode,
    ) -> ModelResult<()> {
        record.check_codes(&self.status)?;
        record.prepare_update(&self.status, Utc::now())?;
        self.repository().update_with(client, record, mode).await?;
        Ok(())
    }

    /// Mark the row deleted.
    pub async fn delete<C: GenericClient>(&self, client: &C, id: &R::Id) -> ModelResult<()> {
        self.repository().delete(client, id).await?;
        tracing::debug!(target: "readr_models", table = R::table(), "soft-deleted record");
        Ok(())
    }

    pub async fn get<C: GenericClient>(&self, client: &C, id: &R::Id) -> ModelResult<R> {
        Ok(self.repository().get(client, id).await?)
    }
}

/// Every model service, all drawing from one pool.
#[derive(Debug, Clone)]
pub struct Models {
    pub members: Service<Member>,
    pub posts: Service<Post>,
    pub comments: Service<Comment>,
}

impl Models {
    pub fn connect(config: &AppConfig) -> ModelResult<Self> {
        let pool = create_pool(&config.database)?;
        Ok(Self {
            members: Service::from_config(pool.clone(), config)?,
            posts: Service::from_config(pool.clone(), config)?,
            comments: Service::from_config(pool, config)?,
        })
    }

    pub fn pool(&self) -> &Pool {
        self.members.store().pool()
    }

    /// Check out a connection for one operation.
    ///
    /// The services share the pool and the store configuration, so any of
    /// them bounds the checkout the same way.
    pub async fn client(&self) -> ModelResult<Client> {
        self.members.checkout().await
    }
}
