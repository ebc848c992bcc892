/// OpenAPI documentation generation.
pub mod documentation;
/// Game catalog CRUD and search.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Bulk import of the remote top-100 snapshots.
pub mod populate_service;
