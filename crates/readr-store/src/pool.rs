//! Connection pool utilities

use crate::config::DatabaseConfig;
use crate::error::{StoreError, StoreResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a connection pool from database configuration, without TLS.
///
/// ```ignore
/// let pool = readr_store::create_pool(&DatabaseConfig::new("postgres://localhost/readr"))?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> StoreResult<Pool> {
    create_pool_with_tls(config, NoTls)
}

/// Create a connection pool using a custom TLS connector.
pub fn create_pool_with_tls<T>(config: &DatabaseConfig, tls: T) -> StoreResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let max_size = config.max_connections;
    create_pool_with_manager_config(&config.url, tls, default_manager_config(), |builder| {
        builder.max_size(max_size)
    })
}

/// Create a connection pool with injected `ManagerConfig` and `PoolBuilder` tuning.
pub fn create_pool_with_manager_config<T>(
    database_url: &str,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> StoreResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| StoreError::connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| StoreError::pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
