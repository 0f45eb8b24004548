//! Wire payloads and their validation.

pub mod catalog;
/// Health check payload.
pub mod health;
pub mod random_play;
pub mod validation;
