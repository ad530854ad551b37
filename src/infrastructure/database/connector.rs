//! Store connectors: how a handle is opened, probed, and closed.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::ConnectionError;
use crate::config::Config;

/// Opens and checks handles to the primary store.
///
/// [`super::ConnectionManager`] is generic over this trait so that the
/// supervision logic can run against a fake store in tests.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Shared, cheaply clonable store handle (a pool).
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, ConnectionError>;

    /// One liveness round-trip over `handle`.
    async fn ping(&self, handle: &Self::Handle) -> Result<(), ConnectionError>;

    /// Releases a handle that has been replaced.
    async fn close(&self, _handle: Self::Handle) {}
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub probe_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 3,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(3600),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for PoolConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout: Duration::from_secs(config.db_connect_timeout),
            idle_timeout: Duration::from_secs(config.db_idle_timeout),
            max_lifetime: Duration::from_secs(config.db_max_lifetime),
            probe_timeout: Duration::from_secs(config.db_connect_timeout),
        }
    }
}

/// PostgreSQL connector producing [`PgPool`] handles.
pub struct PgConnector {
    database_url: String,
    pool: PoolConfig,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>, pool: PoolConfig) -> Self {
        Self {
            database_url: database_url.into(),
            pool,
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.pool.max_connections)
            .min_connections(self.pool.min_connections)
            .acquire_timeout(self.pool.acquire_timeout)
            .idle_timeout(self.pool.idle_timeout)
            .max_lifetime(self.pool.max_lifetime)
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    async fn connect(&self) -> Result<PgPool, ConnectionError> {
        self.options()
            .connect(&self.database_url)
            .await
            .map_err(ConnectionError::Connect)
    }

    async fn ping(&self, pool: &PgPool) -> Result<(), ConnectionError> {
        let probe = sqlx::query("SELECT 1").execute(pool);

        match tokio::time::timeout(self.pool.probe_timeout, probe).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::Probe(e)),
            Err(_) => Err(ConnectionError::ProbeTimeout(self.pool.probe_timeout)),
        }
    }

    async fn close(&self, pool: PgPool) {
        pool.close().await;
    }
}
