//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
mod sql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryOrderStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderStore;

use crate::core::error::{ConfigError, ToroResult};
use crate::core::store::OrderStore;
use std::fmt;
use std::sync::Arc;

/// Storage backend selected by the scheme of a database URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
    Postgres,
}

impl Backend {
    /// Pick the backend for `url`.
    ///
    /// Fails for unknown schemes and for backends whose cargo feature is not
    /// compiled in.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            field: "database_url".to_string(),
            value: url.to_string(),
            message,
        };

        let backend = if url.starts_with("memory:") {
            Backend::Memory
        } else if url.starts_with("sqlite:") {
            Backend::Sqlite
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Backend::Postgres
        } else {
            return Err(invalid(
                "expected a memory:, sqlite: or postgres: URL".to_string(),
            ));
        };

        if !backend.is_compiled_in() {
            return Err(invalid(format!(
                "the {backend} backend is not compiled in (enable the `{backend}` feature)"
            )));
        }
        Ok(backend)
    }

    pub fn is_compiled_in(&self) -> bool {
        match self {
            Backend::Memory => true,
            Backend::Sqlite => cfg!(feature = "sqlite"),
            Backend::Postgres => cfg!(feature = "postgres"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Memory => "memory",
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        })
    }
}

/// Open the store `url` points at, creating its schema when needed.
pub async fn connect(url: &str) -> ToroResult<Arc<dyn OrderStore>> {
    match Backend::from_url(url)? {
        Backend::Memory => Ok(Arc::new(InMemoryOrderStore::new())),
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => Ok(Arc::new(SqliteOrderStore::connect(url).await?)),
        #[cfg(feature = "postgres")]
        Backend::Postgres => Ok(Arc::new(PostgresOrderStore::connect(url).await?)),
        #[allow(unreachable_patterns)]
        backend => Err(ConfigError::InvalidValue {
            field: "database_url".to_string(),
            value: url.to_string(),
            message: format!("the {backend} backend is not compiled in"),
        }
        .into()),
    }
}
