//! Quiz catalog backends.

pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::collections::HashSet;

use futures::future::BoxFuture;

use crate::dao::{
    models::{PlayableQuizEntity, QuizEntity, QuizId},
    storage::StorageResult,
};

/// Read-only access to the quiz catalog as consumed by random play.
///
/// Eligibility is always computed by the backend: a quiz whose id is part of
/// `excluded` is never counted nor returned.
pub trait QuizStore: Send + Sync {
    /// Number of quizzes whose id is not in `excluded`.
    fn count_eligible(&self, excluded: HashSet<QuizId>) -> BoxFuture<'static, StorageResult<u64>>;
    /// Quiz at position `offset` of the eligible set, tips included without authorship.
    fn fetch_one_at(
        &self,
        excluded: HashSet<QuizId>,
        offset: u64,
    ) -> BoxFuture<'static, StorageResult<PlayableQuizEntity>>;
    /// Load a single quiz by id.
    fn find_quiz(&self, id: QuizId) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Cheap liveness probe of the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
