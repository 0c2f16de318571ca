//! Database connection handle.
//!
//! Wraps a sqlx [`AnyPool`] together with the URL it was opened with, so the
//! reconciler can infer the dialect from the URL scheme.

use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};

use crate::error::Result;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// A live SQLite or PostgreSQL database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    url: String,
}

impl Database {
    /// Connects to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WatchError::Database`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Connects with an explicit pool size.
    ///
    /// In-memory SQLite databases are private to one connection, so they
    /// need `max_connections = 1`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WatchError::Database`] if the connection fails.
    pub async fn connect_with(url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = PoolOptions::<Any>::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        Ok(Self::from_pool(pool, url))
    }

    /// Wraps an existing pool opened with `url`.
    #[must_use]
    pub fn from_pool(pool: AnyPool, url: impl Into<String>) -> Self {
        Self {
            pool,
            url: url.into(),
        }
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Closes every connection in the pool.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
