//! Primary store connection management.
//!
//! - [`connector`] - opening and probing store handles ([`PgConnector`])
//! - [`manager`] - supervised handle, reconnects, health loop
//! - [`backoff`] - reconnect delay schedule

pub mod backoff;
pub mod connector;
pub mod manager;

pub use connector::{Connector, PgConnector, PoolConfig};
pub use manager::{ConnectionManager, ConnectionState, HealthLoop, StoreHealth};

use std::time::Duration;
use thiserror::Error;

/// Supervised PostgreSQL connection.
pub type Database = ConnectionManager<PgConnector>;

/// Failure to reach the primary store.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to the store: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("store probe failed: {0}")]
    Probe(#[source] sqlx::Error),

    #[error("store probe timed out after {0:?}")]
    ProbeTimeout(Duration),

    #[error("store unavailable after {attempts} reconnect attempts")]
    Unavailable { attempts: usize },
}
