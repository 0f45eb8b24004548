//! Random selection of the next quiz among those not answered yet.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::dao::{
    models::{PlayableQuizEntity, QuizId},
    quiz_store::QuizStore,
    storage::StorageResult,
};

/// Source of uniformly distributed offsets.
pub trait OffsetSource: Send + Sync {
    /// Draw an offset in `[0, upper)`. `upper` is always strictly positive.
    fn pick(&self, upper: u64) -> u64;
}

/// Offsets drawn from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngOffsets;

impl OffsetSource for ThreadRngOffsets {
    fn pick(&self, upper: u64) -> u64 {
        rand::rng().random_range(0..upper)
    }
}

/// Outcome of a selection round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult {
    /// Every quiz of the catalog was answered.
    Exhausted {
        /// Score reached by the game, i.e. the size of the excluded set.
        final_score: usize,
    },
    /// A quiz that was not answered yet.
    Selected {
        /// The selected quiz, tips without authorship.
        quiz: PlayableQuizEntity,
    },
}

/// Picks one eligible quiz at random, delegating eligibility to the store.
pub struct RandomSelector<'a> {
    store: &'a dyn QuizStore,
    offsets: &'a dyn OffsetSource,
}

impl<'a> RandomSelector<'a> {
    /// Selector reading `store` and drawing offsets from `offsets`.
    pub fn new(store: &'a dyn QuizStore, offsets: &'a dyn OffsetSource) -> Self {
        Self { store, offsets }
    }

    /// Select the next quiz among those whose id is not in `excluded`.
    ///
    /// Store failures are returned as-is; nothing is retried.
    pub async fn select_next(&self, excluded: &HashSet<QuizId>) -> StorageResult<SelectionResult> {
        let count = self.store.count_eligible(excluded.clone()).await?;
        if count == 0 {
            return Ok(SelectionResult::Exhausted {
                final_score: excluded.len(),
            });
        }

        let offset = self.offsets.pick(count);
        debug!(count, offset, "selecting random quiz");
        let quiz = self.store.fetch_one_at(excluded.clone(), offset).await?;
        Ok(SelectionResult::Selected { quiz })
    }
}
