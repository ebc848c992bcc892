//! Error types shared by the relational storage implementation.

use sea_orm::DbErr;
use thiserror::Error;

/// Convenient result alias returning [`SqlDaoError`] failures.
pub type SqlResult<T> = Result<T, SqlDaoError>;

/// Failures that can occur while talking to the relational database.
#[derive(Debug, Error)]
pub enum SqlDaoError {
    /// Opening the connection pool failed.
    #[error("failed to connect to database `{url}`")]
    Connect {
        url: String,
        #[source]
        source: DbErr,
    },
    /// Creating the table from the entity definition failed.
    #[error("failed to ensure table `{table}` exists")]
    EnsureSchema {
        table: &'static str,
        #[source]
        source: DbErr,
    },
    /// A statement against the games table failed.
    #[error("failed to {operation} games")]
    Query {
        operation: &'static str,
        #[source]
        source: DbErr,
    },
    /// A statement addressing a single game failed.
    #[error("failed to {operation} game `{id}`")]
    QueryGame {
        operation: &'static str,
        id: i32,
        #[source]
        source: DbErr,
    },
    /// The addressed game does not exist.
    #[error("game `{id}` not found")]
    GameNotFound { id: i32 },
    /// The database did not answer the health ping.
    #[error("database ping health check failed")]
    HealthPing {
        #[source]
        source: DbErr,
    },
    /// Closing the connection pool failed.
    #[error("failed to close database connection")]
    Close {
        #[source]
        source: DbErr,
    },
}
