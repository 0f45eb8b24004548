use std::fmt;

use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::models::QuizId;

/// Result alias for the MongoDB quiz store.
pub type MongoQuizResult<T> = Result<T, MongoQuizError>;

/// Quiz lookups issued against the `quizzes` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizQuery {
    /// Count of quizzes outside the answered set.
    CountEligible {
        /// Size of the answered set.
        excluded: usize,
    },
    /// Eligible quiz at a given position.
    FetchAt {
        /// Position in the `_id`-ordered eligible set.
        offset: u64,
    },
    /// Full quiz by id.
    FindById {
        /// Requested quiz.
        id: QuizId,
    },
}

impl fmt::Display for QuizQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizQuery::CountEligible { excluded } => {
                write!(f, "count eligible quizzes ({excluded} answered)")
            }
            QuizQuery::FetchAt { offset } => write!(f, "fetch eligible quiz at offset {offset}"),
            QuizQuery::FindById { id } => write!(f, "find quiz `{id}`"),
        }
    }
}

/// Failures of the MongoDB quiz store.
#[derive(Debug, Error)]
pub enum MongoQuizError {
    /// The connection string or client options were rejected.
    #[error("cannot configure MongoDB client for database `{database}`")]
    Configure {
        /// Database the client was meant for.
        database: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Database did not answer a ping after every connection attempt.
    #[error("database `{database}` unreachable after {attempts} attempt(s)")]
    Unreachable {
        /// Database name.
        database: String,
        /// Attempts made before giving up.
        attempts: u32,
        /// Last driver error.
        #[source]
        source: MongoError,
    },
    /// Liveness ping of an established connection failed.
    #[error("database `{database}` did not answer ping")]
    Ping {
        /// Database name.
        database: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A quiz query failed.
    #[error("quiz query failed: {query}")]
    Query {
        /// The failed lookup.
        query: QuizQuery,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl MongoQuizError {
    pub(super) fn query(query: QuizQuery) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoQuizError::Query { query, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_describe_themselves() {
        assert_eq!(
            QuizQuery::CountEligible { excluded: 3 }.to_string(),
            "count eligible quizzes (3 answered)"
        );
        assert_eq!(
            QuizQuery::FetchAt { offset: 2 }.to_string(),
            "fetch eligible quiz at offset 2"
        );
        assert_eq!(QuizQuery::FindById { id: 7 }.to_string(), "find quiz `7`");
    }
}
