//! PostgreSQL implementation of the book repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Book, BookUpdate};
use crate::domain::pagination;
use crate::domain::repositories::{BookRepository, RepositoryError};
use crate::infrastructure::database::{ConnectionManager, Connector, PgConnector};

const BOOK_COLUMNS: &str =
    "id, title, author, description, published_date, created_at, updated_at, deleted_at";

/// PostgreSQL repository for book storage.
///
/// The pool is taken from the supervised connection on every call, so a
/// handle swapped by a reconnect is picked up by the next query. Writes run
/// in a transaction.
pub struct PgBookRepository<C: Connector<Handle = PgPool> = PgConnector> {
    db: Arc<ConnectionManager<C>>,
}

impl<C: Connector<Handle = PgPool>> PgBookRepository<C> {
    pub fn new(db: Arc<ConnectionManager<C>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<C: Connector<Handle = PgPool>> BookRepository for PgBookRepository<C> {
    async fn create(&self, book: &Book) -> Result<(), RepositoryError> {
        let pool = self.db.handle()?;
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO books
                (id, title, author, description, published_date, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.published_date)
        .bind(book.created_at)
        .bind(book.updated_at)
        .bind(book.deleted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, book.id))?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Book, RepositoryError> {
        let pool = self.db.handle()?;

        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn find_all(&self, page: i64, size: i64) -> Result<Vec<Book>, RepositoryError> {
        let pool = self.db.handle()?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE deleted_at IS NULL \
             ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(size.max(0))
            .bind(pagination::offset(page, size))
            .fetch_all(&pool)
            .await?;

        Ok(books)
    }

    async fn count_all(&self) -> Result<i64, RepositoryError> {
        let pool = self.db.handle()?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
                .fetch_one(&pool)
                .await?;

        Ok(count)
    }

    async fn update(&self, update: &BookUpdate) -> Result<Book, RepositoryError> {
        let pool = self.db.handle()?;
        let mut tx = pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE books SET
                title          = COALESCE($2, title),
                author         = COALESCE($3, author),
                description    = COALESCE($4, description),
                published_date = COALESCE($5, published_date),
                updated_at     = $6
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(update.id)
            .bind(update.title.as_deref())
            .bind(update.author.as_deref())
            .bind(update.description.as_deref())
            .bind(update.published_date.as_deref())
            .bind(update.updated_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound { id: update.id })?;

        tx.commit().await?;
        Ok(book)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let pool = self.db.handle()?;
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { id });
        }

        tx.commit().await?;
        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error, id: i64) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists { id }
        }
        _ => RepositoryError::Store(e),
    }
}
