use std::{collections::HashSet, sync::Arc, time::Duration};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::ClientOptions};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info};

use super::{
    error::{MongoQuizError, MongoQuizResult, QuizQuery},
    models::{
        MongoPlayableQuizDocument, MongoQuizDocument, doc_id, eligible_filter,
        playable_projection,
    },
};
use crate::dao::{
    models::{PlayableQuizEntity, QuizEntity, QuizId},
    quiz_store::QuizStore,
    storage::{StorageError, StorageResult},
};

const QUIZ_COLLECTION_NAME: &str = "quizzes";
const DEFAULT_DATABASE: &str = "quizzes";
const CONNECT_ATTEMPTS: u32 = 5;
const FIRST_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Quiz store reading the `quizzes` collection of a MongoDB database.
#[derive(Clone)]
pub struct MongoQuizStore {
    inner: Arc<Shared>,
}

struct Shared {
    options: ClientOptions,
    database_name: String,
    database: RwLock<Database>,
}

impl MongoQuizStore {
    /// Connect to `uri` and read quizzes from `database` (`quizzes` when unset).
    ///
    /// Fails once the database has ignored a few pings.
    pub async fn connect(uri: &str, database: Option<&str>) -> MongoQuizResult<Self> {
        let database_name = database.unwrap_or(DEFAULT_DATABASE).to_owned();
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoQuizError::Configure {
                database: database_name.clone(),
                source,
            })?;

        let database = open_database(&options, &database_name).await?;
        info!(database = %database_name, "connected to MongoDB quiz store");

        Ok(Self {
            inner: Arc::new(Shared {
                options,
                database_name,
                database: RwLock::new(database),
            }),
        })
    }

    async fn ping(&self) -> MongoQuizResult<()> {
        let database = self.inner.database.read().await.clone();
        ping(&database)
            .await
            .map_err(|source| MongoQuizError::Ping {
                database: self.inner.database_name.clone(),
                source,
            })
    }

    async fn reconnect(&self) -> MongoQuizResult<()> {
        let database = open_database(&self.inner.options, &self.inner.database_name).await?;
        *self.inner.database.write().await = database;
        Ok(())
    }

    async fn collection(&self) -> Collection<MongoQuizDocument> {
        let guard = self.inner.database.read().await;
        guard.collection::<MongoQuizDocument>(QUIZ_COLLECTION_NAME)
    }

    async fn count_documents(&self, excluded: HashSet<QuizId>) -> MongoQuizResult<u64> {
        self.collection()
            .await
            .count_documents(eligible_filter(&excluded))
            .await
            .map_err(MongoQuizError::query(QuizQuery::CountEligible {
                excluded: excluded.len(),
            }))
    }

    async fn find_document_at(
        &self,
        excluded: HashSet<QuizId>,
        offset: u64,
    ) -> MongoQuizResult<Option<PlayableQuizEntity>> {
        let collection = self
            .collection()
            .await
            .clone_with_type::<MongoPlayableQuizDocument>();

        let documents: Vec<MongoPlayableQuizDocument> = collection
            .find(eligible_filter(&excluded))
            .projection(playable_projection())
            .sort(doc! {"_id": 1})
            .skip(offset)
            .limit(1)
            .await
            .map_err(MongoQuizError::query(QuizQuery::FetchAt { offset }))?
            .try_collect()
            .await
            .map_err(MongoQuizError::query(QuizQuery::FetchAt { offset }))?;

        Ok(documents.into_iter().next().map(Into::into))
    }

    async fn load_document(&self, id: QuizId) -> MongoQuizResult<Option<QuizEntity>> {
        let document = self
            .collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(MongoQuizError::query(QuizQuery::FindById { id }))?;

        Ok(document.map(Into::into))
    }
}

impl QuizStore for MongoQuizStore {
    fn count_eligible(&self, excluded: HashSet<QuizId>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_documents(excluded).await.map_err(Into::into) })
    }

    fn fetch_one_at(
        &self,
        excluded: HashSet<QuizId>,
        offset: u64,
    ) -> BoxFuture<'static, StorageResult<PlayableQuizEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_document_at(excluded, offset)
                .await?
                .ok_or(StorageError::OffsetOutOfRange { offset })
        })
    }

    fn find_quiz(&self, id: QuizId) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_document(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reconnect().await.map_err(Into::into) })
    }
}

/// Build a client for `name` and wait until the database answers a ping.
async fn open_database(options: &ClientOptions, name: &str) -> MongoQuizResult<Database> {
    let client =
        Client::with_options(options.clone()).map_err(|source| MongoQuizError::Configure {
            database: name.to_owned(),
            source,
        })?;
    let database = client.database(name);

    let mut backoff = FIRST_BACKOFF;
    let mut attempt = 1;
    loop {
        match ping(&database).await {
            Ok(()) => return Ok(database),
            Err(source) if attempt >= CONNECT_ATTEMPTS => {
                return Err(MongoQuizError::Unreachable {
                    database: name.to_owned(),
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(attempt, database = name, error = %err, "quiz database not ready; retrying");
                sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
        }
    }
}

async fn ping(database: &Database) -> Result<(), mongodb::error::Error> {
    database.run_command(doc! { "ping": 1 }).await.map(|_| ())
}
