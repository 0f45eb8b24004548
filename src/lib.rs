//! Library crate for quiz-random-play, exposing modules for binaries and integration tests.

mod config;
pub mod dao;
mod dto;
mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AppConfig;
