//! Shared handler state.

use std::sync::Arc;

use crate::application::services::BookService;
use crate::domain::repositories::BookRepository;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::database::StoreHealth;

/// Usecase service over the type-erased repository stack.
pub type SharedBookService = BookService<dyn BookRepository>;

/// Handles built by the composition root and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub book_service: Arc<SharedBookService>,
    pub store: Arc<dyn StoreHealth>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        book_service: Arc<SharedBookService>,
        store: Arc<dyn StoreHealth>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            book_service,
            store,
            cache,
        }
    }
}
