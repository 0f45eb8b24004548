use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of sessions currently holding random play state.
    pub sessions: usize,
}

impl HealthResponse {
    /// Create a health response indicating the quiz store is reachable.
    pub fn ok(sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            sessions,
        }
    }

    /// Whether this response reports degraded mode.
    pub fn is_degraded(&self) -> bool {
        self.status == "degraded"
    }

    /// Create a health response indicating no quiz store is installed.
    pub fn degraded(sessions: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            sessions,
        }
    }
}
