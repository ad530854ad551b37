//! Composition root: connects the store and the cache, wires the repository
//! stack, starts the health loop, and runs the Axum server until shutdown.

use crate::application::services::BookService;
use crate::config::Config;
use crate::domain::repositories::BookRepository;
use crate::infrastructure::cache::{CacheKeys, CacheService, NullCache, RedisCache};
use crate::infrastructure::database::{ConnectionManager, Database, PgConnector, PoolConfig};
use crate::infrastructure::persistence::{CachedBookRepository, PgBookRepository};
use crate::routes::app_router;
use crate::state::{AppState, SharedBookService};
use crate::utils::id_generator::IdGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Opens the supervised PostgreSQL connection. Fails fast if unreachable.
pub async fn connect_database(config: &Config) -> Result<Arc<Database>> {
    let connector = PgConnector::new(config.database_url.clone(), PoolConfig::from(config));

    ConnectionManager::connect(connector, config.db_retry_attempts)
        .await
        .context("Failed to connect to database")
}

/// Connects to Redis when configured, falling back to [`NullCache`].
pub async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("No Redis configured, reads go straight to the store");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => Arc::new(redis),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unreachable, serving without a cache");
            Arc::new(NullCache::new())
        }
    }
}

/// Builds the book usecase over `PgBookRepository` wrapped in the
/// cache-aside decorator.
pub fn book_service(
    config: &Config,
    db: Arc<Database>,
    cache: Arc<dyn CacheService>,
) -> Result<SharedBookService> {
    let store: Arc<dyn BookRepository> = Arc::new(PgBookRepository::new(db));
    let repository: Arc<dyn BookRepository> = Arc::new(CachedBookRepository::new(
        store,
        cache,
        CacheKeys::new(config.cache_namespace.clone()),
    ));
    let ids = IdGenerator::new(config.node_id).context("Invalid NODE_ID")?;

    Ok(BookService::new(repository, ids, config.request_deadline()))
}

/// Serves until Ctrl+C or SIGTERM, then stops the health loop and closes
/// the pool.
///
/// Startup order: store connection, migrations (unless
/// `RUN_MIGRATIONS=false`), health loop, cache, listener. Any failure before
/// the listener is bound aborts startup.
pub async fn run(config: Config) -> Result<()> {
    let db = connect_database(&config).await?;

    if config.run_migrations {
        let pool = db.handle()?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    let health_loop = db.start_health_loop(config.ping_interval());

    let cache = connect_cache(&config).await;
    let service = book_service(&config, db.clone(), cache.clone())?;
    let state = AppState::new(Arc::new(service), db.clone(), cache);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    health_loop.stop().await;
    if let Ok(pool) = db.handle() {
        pool.close().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
