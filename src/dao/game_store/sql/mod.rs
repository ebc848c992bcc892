mod config;
mod error;
mod models;
mod store;

pub use config::{DEFAULT_DATABASE_URL, SqlConfig};
pub use error::SqlDaoError;
pub use store::SqlGameStore;

use crate::dao::storage::StorageError;

impl From<SqlDaoError> for StorageError {
    fn from(err: SqlDaoError) -> Self {
        match err {
            SqlDaoError::GameNotFound { id } => StorageError::not_found(id),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
