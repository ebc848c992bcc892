/// Game persistence backends and the store abstraction.
pub mod game_store;
/// Backend-independent model definitions.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
