pub mod sql;

use crate::dao::models::{GameEntity, GameFields, GameSearchCriteria};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for game listings.
pub trait GameStore: Send + Sync {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn create_game(&self, fields: GameFields) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Insert a batch of games, returning how many rows were written.
    fn create_games(&self, batch: Vec<GameFields>) -> BoxFuture<'static, StorageResult<u64>>;
    fn find_game(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Overwrite the mutable columns of an existing game.
    fn update_game(
        &self,
        id: i32,
        fields: GameFields,
    ) -> BoxFuture<'static, StorageResult<GameEntity>>;
    fn delete_game(&self, id: i32) -> BoxFuture<'static, StorageResult<()>>;
    fn search_games(
        &self,
        criteria: GameSearchCriteria,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Release the underlying connections. The store must not be used afterwards.
    fn close(&self) -> BoxFuture<'static, StorageResult<()>>;
}
