//! Shared application state and the per-session random play games.

/// Value types of a session's game.
pub mod game;
pub mod selector;
pub mod session;
/// Pure random play rules.
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::quiz_store::QuizStore,
    error::ServiceError,
    state::{
        selector::{OffsetSource, ThreadRngOffsets},
        session::SessionStore,
        state_machine::GameStateMachine,
    },
};

/// Handle to the application state shared by every request.
pub type SharedState = Arc<AppState>;

/// Central application state: quiz store handle, session games and rules.
pub struct AppState {
    quiz_store: RwLock<Option<Arc<dyn QuizStore>>>,
    sessions: SessionStore,
    config: AppConfig,
    offsets: Arc<dyn OffsetSource>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a quiz store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_offsets(config, Arc::new(ThreadRngOffsets))
    }

    /// Same as [`Self::new`] with a custom source of random offsets.
    pub fn with_offsets(config: AppConfig, offsets: Arc<dyn OffsetSource>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            quiz_store: RwLock::new(None),
            sessions: SessionStore::new(config.session_ttl()),
            config,
            offsets,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current quiz store, if one is installed.
    pub async fn quiz_store(&self) -> Option<Arc<dyn QuizStore>> {
        let guard = self.quiz_store.read().await;
        guard.as_ref().cloned()
    }

    /// Quiz store handle, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_quiz_store(&self) -> Result<Arc<dyn QuizStore>, ServiceError> {
        self.quiz_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new quiz store implementation and leave degraded mode.
    pub async fn set_quiz_store(&self, store: Arc<dyn QuizStore>) {
        {
            let mut guard = self.quiz_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current quiz store and enter degraded mode.
    pub async fn clear_quiz_store(&self) {
        {
            let mut guard = self.quiz_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Game state of every session.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Transition rules of random play.
    pub fn game_rules(&self) -> GameStateMachine {
        self.config.game_rules()
    }

    /// Source of random offsets used to pick quizzes and tips.
    pub fn offsets(&self) -> &dyn OffsetSource {
        self.offsets.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::quiz_store::memory::tests::store_with;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_quiz_store().await,
            Err(ServiceError::Degraded)
        ));

        let mut watcher = state.degraded_watcher();
        state.set_quiz_store(Arc::new(store_with(&[1]))).await;
        assert!(!state.is_degraded().await);
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_quiz_store().await.is_ok());

        state.clear_quiz_store().await;
        assert!(state.is_degraded().await);
    }
}
