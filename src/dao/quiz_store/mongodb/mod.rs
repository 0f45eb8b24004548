//! Quiz store reading a MongoDB `quizzes` collection.

mod error;
mod models;
mod store;

pub use error::{MongoQuizError, QuizQuery};
pub use store::MongoQuizStore;

use crate::dao::storage::StorageError;

impl From<MongoQuizError> for StorageError {
    fn from(err: MongoQuizError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
