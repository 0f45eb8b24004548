/// Database model definitions.
pub mod models;
/// Quiz catalog access used by the random play engine.
pub mod quiz_store;
/// Storage abstraction layer for database operations.
pub mod storage;
