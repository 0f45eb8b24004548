//! Quiz store backed by an in-process catalog, seeded from a JSON file.

use std::{collections::HashSet, fs, io, path::Path, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::{
        models::{PlayableQuizEntity, QuizEntity, QuizId},
        quiz_store::QuizStore,
        storage::{StorageError, StorageResult},
    },
    dto::catalog::CatalogFile,
};

/// Errors raised while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read quiz catalog `{path}`")]
    Read {
        /// Path of the catalog.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a well-formed catalog.
    #[error("failed to parse quiz catalog `{path}`")]
    Parse {
        /// Path of the catalog.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A quiz or tip failed validation.
    #[error("quiz catalog is invalid: {0}")]
    Invalid(#[from] ValidationErrors),
    /// Two quizzes share an id.
    #[error("quiz catalog declares quiz `{0}` more than once")]
    DuplicateQuiz(QuizId),
}

/// In-memory quiz catalog ordered by ascending quiz id.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    quizzes: Arc<IndexMap<QuizId, QuizEntity>>,
}

impl MemoryQuizStore {
    /// Build a store from already validated quizzes.
    pub fn new(quizzes: impl IntoIterator<Item = QuizEntity>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();
        for quiz in quizzes {
            let id = quiz.id;
            if map.insert(id, quiz).is_some() {
                return Err(CatalogError::DuplicateQuiz(id));
            }
        }
        map.sort_keys();
        Ok(Self {
            quizzes: Arc::new(map),
        })
    }

    /// Parse, validate and index the JSON catalog stored at `path`.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let shown = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: shown.clone(),
            source,
        })?;
        let catalog: CatalogFile =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: shown.clone(),
                source,
            })?;
        catalog.validate()?;

        let store = Self::new(catalog.quizzes.into_iter().map(Into::into))?;
        info!(path = %shown, count = store.len(), "loaded quiz catalog");
        Ok(store)
    }

    /// Number of quizzes in the catalog.
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    /// Whether the catalog holds no quiz.
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    fn eligible<'a>(
        &'a self,
        excluded: &'a HashSet<QuizId>,
    ) -> impl Iterator<Item = &'a QuizEntity> + 'a {
        self.quizzes
            .values()
            .filter(move |quiz| !excluded.contains(&quiz.id))
    }
}

impl QuizStore for MemoryQuizStore {
    fn count_eligible(&self, excluded: HashSet<QuizId>) -> BoxFuture<'static, StorageResult<u64>> {
        let count = self.eligible(&excluded).count() as u64;
        Box::pin(async move { Ok(count) })
    }

    fn fetch_one_at(
        &self,
        excluded: HashSet<QuizId>,
        offset: u64,
    ) -> BoxFuture<'static, StorageResult<PlayableQuizEntity>> {
        let found = usize::try_from(offset)
            .ok()
            .and_then(|skip| self.eligible(&excluded).nth(skip))
            .cloned();
        Box::pin(async move {
            found
                .map(Into::into)
                .ok_or(StorageError::OffsetOutOfRange { offset })
        })
    }

    fn find_quiz(&self, id: QuizId) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let found = self.quizzes.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dao::models::TipEntity;

    pub(crate) fn quiz(id: QuizId, answer: &str) -> QuizEntity {
        QuizEntity {
            id,
            question: format!("question {id}"),
            answer: answer.into(),
            author_id: Some(1),
            tips: vec![
                TipEntity {
                    id: id * 10,
                    text: format!("first tip for {id}"),
                    author_id: Some(2),
                    accepted: true,
                },
                TipEntity {
                    id: id * 10 + 1,
                    text: format!("second tip for {id}"),
                    author_id: Some(3),
                    accepted: false,
                },
            ],
        }
    }

    pub(crate) fn store_with(ids: &[QuizId]) -> MemoryQuizStore {
        MemoryQuizStore::new(ids.iter().map(|id| quiz(*id, &format!("answer {id}")))).unwrap()
    }

    #[tokio::test]
    async fn count_skips_excluded_ids() {
        let store = store_with(&[1, 2, 3, 4]);
        assert_eq!(store.count_eligible(HashSet::new()).await.unwrap(), 4);
        assert_eq!(
            store.count_eligible(HashSet::from([2, 4, 99])).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn fetch_walks_eligible_set_in_id_order() {
        let store = MemoryQuizStore::new([quiz(7, "a"), quiz(3, "b"), quiz(5, "c")]).unwrap();
        let excluded = HashSet::from([5]);

        let first = store.fetch_one_at(excluded.clone(), 0).await.unwrap();
        let second = store.fetch_one_at(excluded.clone(), 1).await.unwrap();
        assert_eq!(first.id, 3);
        assert_eq!(second.id, 7);
        assert_eq!(second.tips.len(), 2);

        let err = store.fetch_one_at(excluded, 2).await.unwrap_err();
        assert!(matches!(err, StorageError::OffsetOutOfRange { offset: 2 }));
    }

    #[tokio::test]
    async fn find_quiz_returns_full_entity() {
        let store = store_with(&[1]);
        let found = store.find_quiz(1).await.unwrap().unwrap();
        assert_eq!(found.author_id, Some(1));
        assert_eq!(found.tips[0].author_id, Some(2));
        assert!(store.find_quiz(2).await.unwrap().is_none());
    }

    #[test]
    fn from_file_loads_a_valid_catalog() {
        let path = std::env::temp_dir().join(format!("quizzes-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"{"quizzes": [
                {"id": 2, "question": "Capital of Portugal", "answer": "Lisbon"},
                {"id": 1, "question": "Capital of Italy", "answer": "Rome",
                 "tips": [{"id": 10, "text": "Colosseum"}]}
            ]}"#,
        )
        .unwrap();

        let store = MemoryQuizStore::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.quizzes.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn from_file_reports_missing_catalog() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        let err = MemoryQuizStore::from_file(&path).err().expect("missing file must fail");
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = MemoryQuizStore::new([quiz(1, "a"), quiz(1, "b")])
            .err()
            .expect("duplicate must fail");
        assert!(matches!(err, CatalogError::DuplicateQuiz(1)));
    }
}
