use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the database answered the ping.
    pub storage_reachable: bool,
}

impl HealthResponse {
    /// The database answered; the service is fully operational.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            storage_reachable: true,
        }
    }

    /// The database could not be reached; game routes will fail until it recovers.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            storage_reachable: false,
        }
    }
}
