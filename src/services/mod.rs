/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Random play game engine.
pub mod random_play_service;
/// Expired session cleanup.
pub mod session_reaper;
/// Quiz store connection supervisor.
pub mod storage_supervisor;
