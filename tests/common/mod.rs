#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use book_service::application::services::BookService;
use book_service::domain::entities::{Book, NewBook};
use book_service::domain::repositories::BookRepository;
use book_service::infrastructure::cache::{CacheKeys, InMemoryCache};
use book_service::infrastructure::database::{
    ConnectionError, ConnectionManager, ConnectionState, Connector, StoreHealth,
};
use book_service::infrastructure::persistence::{
    CachedBookRepository, InMemoryBookRepository, PgBookRepository,
};
use book_service::routes::service_router;
use book_service::state::AppState;
use book_service::utils::id_generator::IdGenerator;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Store health reporter whose state the test controls.
pub struct FakeStoreHealth {
    state: Mutex<ConnectionState>,
}

impl FakeStoreHealth {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Connected),
        }
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap() = state;
    }
}

#[async_trait]
impl StoreHealth for FakeStoreHealth {
    fn connection_state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    async fn ping(&self) -> Result<(), ConnectionError> {
        match self.connection_state() {
            ConnectionState::Connected => Ok(()),
            _ => Err(ConnectionError::Unavailable { attempts: 3 }),
        }
    }
}

/// Handler-level test stack: in-memory store and cache behind the real
/// cache-aside repository and usecase service.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryBookRepository>,
    pub cache: Arc<InMemoryCache>,
    pub health: Arc<FakeStoreHealth>,
}

pub fn create_test_state() -> (
    AppState,
    Arc<InMemoryBookRepository>,
    Arc<InMemoryCache>,
    Arc<FakeStoreHealth>,
) {
    let store = Arc::new(InMemoryBookRepository::new());
    let cache = Arc::new(InMemoryCache::new());
    let health = Arc::new(FakeStoreHealth::new());

    let repository: Arc<dyn BookRepository> = Arc::new(CachedBookRepository::new(
        store.clone(),
        cache.clone(),
        CacheKeys::default(),
    ));
    let service = BookService::new(
        repository,
        IdGenerator::new(1).unwrap(),
        Duration::from_secs(5),
    );

    let state = AppState::new(Arc::new(service), health.clone(), cache.clone());

    (state, store, cache, health)
}

pub fn test_app() -> TestApp {
    let (state, store, cache, health) = create_test_state();
    let server = TestServer::new(service_router(state)).unwrap();

    TestApp {
        server,
        store,
        cache,
        health,
    }
}

pub fn new_book(title: &str, author: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        description: format!("{title} by {author}"),
        published_date: "1965-08-01".to_string(),
    }
}

pub fn book(id: i64, title: &str) -> Book {
    Book::new(id, new_book(title, "Frank Herbert"), Utc::now())
}

/// Connector that hands out an existing pool, for `#[sqlx::test]` databases.
pub struct FixedPool(pub PgPool);

#[async_trait]
impl Connector for FixedPool {
    type Handle = PgPool;

    async fn connect(&self) -> Result<PgPool, ConnectionError> {
        Ok(self.0.clone())
    }

    async fn ping(&self, pool: &PgPool) -> Result<(), ConnectionError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(ConnectionError::Probe)
    }
}

pub async fn pg_repository(pool: PgPool) -> PgBookRepository<FixedPool> {
    let db = ConnectionManager::connect(FixedPool(pool), 3).await.unwrap();
    PgBookRepository::new(db)
}
