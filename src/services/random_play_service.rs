//! Random play game engine: each operation runs inside the session's critical section.

use tracing::{debug, info};

use crate::{
    dao::models::QuizId,
    dto::random_play::{
        CheckAnswerResponse, CountdownResponse, RandomPlayResponse, RandomTipResponse,
        TimeUpResponse,
    },
    error::ServiceError,
    state::{
        SharedState,
        selector::RandomSelector,
        session::SessionId,
        state_machine::{PlayOutcome, TipOutcome},
    },
};

/// Serve a random unanswered quiz, starting a game when none is running.
///
/// When every quiz has been answered the final score is returned and the game
/// is cleared. A store failure leaves the session untouched.
pub async fn start_or_continue(
    state: &SharedState,
    session: SessionId,
) -> Result<RandomPlayResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    let rules = state.game_rules();

    let mut slot = state.sessions().lock(session).await;
    let record = slot.load();
    let selection = RandomSelector::new(store.as_ref(), state.offsets())
        .select_next(&record.game.answered_ids())
        .await?;
    let (next, outcome) = rules.on_selection(record, selection);
    slot.save(next);
    drop(slot);

    match &outcome {
        PlayOutcome::Exhausted { final_score } => {
            info!(%session, score = final_score, "random play finished: no quiz left")
        }
        PlayOutcome::Serving { quiz, score, .. } => {
            debug!(%session, quiz_id = quiz.id, score, "serving random quiz")
        }
    }

    Ok(outcome.into())
}

/// Check `answer` against quiz `quiz_id` and apply the matching transition.
pub async fn check_answer(
    state: &SharedState,
    session: SessionId,
    quiz_id: QuizId,
    answer: &str,
) -> Result<CheckAnswerResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{quiz_id}` not found")))?;

    let rules = state.game_rules();
    let mut slot = state.sessions().lock(session).await;
    let (next, outcome) = rules.check_answer(slot.load(), quiz_id, &quiz.answer, answer);
    slot.save(next);
    drop(slot);

    if outcome.result {
        debug!(%session, quiz_id, score = outcome.score, "correct answer");
    } else {
        info!(%session, quiz_id, "wrong answer; random play game reset");
    }

    Ok(outcome.into())
}

/// Advance the session's countdown by one tick.
///
/// The countdown keeps ticking after the game ends; it restarts on the next
/// play or check.
pub async fn poll_countdown(state: &SharedState, session: SessionId) -> CountdownResponse {
    let rules = state.game_rules();
    let mut slot = state.sessions().lock(session).await;
    let (next, tick) = rules.poll_countdown(slot.load());
    slot.save(next);

    tick.into()
}

/// Finish the game because the countdown ran out.
pub async fn time_up(state: &SharedState, session: SessionId) -> TimeUpResponse {
    let rules = state.game_rules();
    let mut slot = state.sessions().lock(session).await;
    let (next, score) = rules.time_up(slot.load());
    slot.save(next);
    drop(slot);

    info!(%session, score, "random play finished: time is up");
    TimeUpResponse { score }
}

/// Reveal one unused tip of the current quiz if a credit is left.
pub async fn random_tip(state: &SharedState, session: SessionId) -> RandomTipResponse {
    let rules = state.game_rules();
    let offsets = state.offsets();
    let mut slot = state.sessions().lock(session).await;
    let (next, outcome) = rules.reveal_tip(slot.load(), |candidates| {
        offsets.pick(candidates as u64) as usize
    });
    slot.save(next);
    drop(slot);

    match &outcome {
        TipOutcome::Revealed { tip, credits_left } => {
            debug!(%session, tip_id = tip.id, credits_left, "tip revealed")
        }
        TipOutcome::Rejected { credits_left } => {
            debug!(%session, credits_left, "tip request rejected")
        }
    }

    outcome.into()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::quiz_store::memory::tests::store_with,
        state::{
            AppState,
            game::{GameState, SessionRecord},
            selector::tests::{FailingStore, ScriptedOffsets},
        },
    };

    async fn app(ids: &[QuizId], offsets: impl IntoIterator<Item = u64>) -> SharedState {
        let state = AppState::with_offsets(
            AppConfig::default(),
            Arc::new(ScriptedOffsets::new(offsets)),
        );
        state.set_quiz_store(Arc::new(store_with(ids))).await;
        state
    }

    fn served_id(response: &RandomPlayResponse) -> QuizId {
        match response {
            RandomPlayResponse::Playing { quiz, .. } => quiz.id,
            other => panic!("expected a quiz, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concrete_game_scenario() {
        let state = app(&[1, 2, 3, 4, 5], [0, 0]).await;
        let session = SessionId::generate();

        let first = start_or_continue(&state, session).await.unwrap();
        assert_eq!(served_id(&first), 1);

        let checked = check_answer(&state, session, 1, "Answer 1").await.unwrap();
        assert_eq!((checked.result, checked.score), (true, 1));

        assert_eq!(poll_countdown(&state, session).await.count, 9);
        assert_eq!(poll_countdown(&state, session).await.count, 8);

        let second = start_or_continue(&state, session).await.unwrap();
        assert_eq!(served_id(&second), 2);
        let checked = check_answer(&state, session, 2, "something else").await.unwrap();
        assert_eq!((checked.result, checked.score), (false, 0));

        let slot = state.sessions().lock(session).await;
        assert_eq!(slot.load().game, GameState::NoGame);
    }

    #[tokio::test]
    async fn countdown_restarts_on_every_check() {
        let state = app(&[1, 2, 3], [0, 0]).await;
        let session = SessionId::generate();
        start_or_continue(&state, session).await.unwrap();
        for expected in [9, 8, 7] {
            assert_eq!(poll_countdown(&state, session).await.count, expected);
        }

        check_answer(&state, session, 1, "answer 1").await.unwrap();
        let first = poll_countdown(&state, session).await;
        let second = poll_countdown(&state, session).await;
        assert_eq!((first.count, second.count), (9, 8));
        assert!(first.blockrefresh);

        start_or_continue(&state, session).await.unwrap();
        poll_countdown(&state, session).await;
        poll_countdown(&state, session).await;
        let wrong = check_answer(&state, session, 2, "nope").await.unwrap();
        assert!(!wrong.result);

        let counts = [
            poll_countdown(&state, session).await.count,
            poll_countdown(&state, session).await.count,
            poll_countdown(&state, session).await.count,
        ];
        assert_eq!(counts, [9, 8, 7]);
    }

    #[tokio::test]
    async fn answered_quizzes_are_never_served_again() {
        let state = app(&[1, 2, 3, 4, 5, 6], [5, 4, 3, 2, 1, 0]).await;
        let session = SessionId::generate();
        let mut seen = Vec::new();

        for _ in 0..6 {
            let response = start_or_continue(&state, session).await.unwrap();
            let id = served_id(&response);
            assert!(!seen.contains(&id));
            check_answer(&state, session, id, &format!("answer {id}"))
                .await
                .unwrap();
            seen.push(id);
        }

        let done = start_or_continue(&state, session).await.unwrap();
        assert_eq!(done, RandomPlayResponse::NoMore { score: 6 });

        // The exhausted game was cleared; the next request starts over.
        let again = start_or_continue(&state, session).await.unwrap();
        match again {
            RandomPlayResponse::Playing { score, credits_left, .. } => {
                assert_eq!(score, 0);
                assert_eq!(credits_left, 3);
            }
            other => panic!("expected a fresh game, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_submission_keeps_score() {
        let state = app(&[1, 2], [0]).await;
        let session = SessionId::generate();
        start_or_continue(&state, session).await.unwrap();

        let first = check_answer(&state, session, 1, "answer 1").await.unwrap();
        let second = check_answer(&state, session, 1, " ANSWER 1 ").await.unwrap();
        assert_eq!(first.score, 1);
        assert_eq!(second.score, 1);
        assert_eq!(second.answer, "answer 1");
    }

    #[tokio::test]
    async fn concurrent_correct_answers_are_all_counted() {
        let state = app(&[1, 2, 3, 4, 5, 6, 7, 8], []).await;
        let session = SessionId::generate();

        let tasks: Vec<_> = (1..=8)
            .map(|id| {
                let state = state.clone();
                tokio::spawn(async move {
                    check_answer(&state, session, id, &format!("answer {id}")).await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap().result);
        }

        assert_eq!(time_up(&state, session).await.score, 8);
    }

    #[tokio::test]
    async fn time_up_is_idempotent() {
        let state = app(&[1], [0]).await;
        let session = SessionId::generate();

        assert_eq!(time_up(&state, session).await.score, 0);
        start_or_continue(&state, session).await.unwrap();
        check_answer(&state, session, 1, "answer 1").await.unwrap();
        assert_eq!(time_up(&state, session).await.score, 1);
        assert_eq!(time_up(&state, session).await.score, 0);
    }

    #[tokio::test]
    async fn tips_follow_the_credit_ledger() {
        let state = app(&[1], [0, 1, 0]).await;
        let session = SessionId::generate();

        let none = random_tip(&state, session).await;
        assert_eq!(none.tip, None);
        assert_eq!(none.credits_left, 0);

        start_or_continue(&state, session).await.unwrap();
        let first = random_tip(&state, session).await;
        assert_eq!(first.tip.as_deref(), Some("second tip for 1"));
        assert_eq!(first.credits_left, 2);

        let second = random_tip(&state, session).await;
        assert_eq!(second.tip.as_deref(), Some("first tip for 1"));
        assert_eq!(second.credits_left, 1);

        let exhausted = random_tip(&state, session).await;
        assert_eq!(exhausted.tip, None);
        assert_eq!(exhausted.credits_left, 1);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found_and_state_is_kept() {
        let state = app(&[1], [0]).await;
        let session = SessionId::generate();
        start_or_continue(&state, session).await.unwrap();
        check_answer(&state, session, 1, "answer 1").await.unwrap();

        let err = check_answer(&state, session, 42, "x").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(time_up(&state, session).await.score, 1);
    }

    #[tokio::test]
    async fn store_failure_propagates_without_touching_the_game() {
        let state = AppState::with_offsets(
            AppConfig::default(),
            Arc::new(ScriptedOffsets::default()),
        );
        let session = SessionId::generate();

        let err = start_or_continue(&state, session).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));

        state.set_quiz_store(Arc::new(FailingStore)).await;
        let err = start_or_continue(&state, session).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let err = check_answer(&state, session, 1, "a").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let slot = state.sessions().lock(session).await;
        assert_eq!(slot.load(), SessionRecord::default());
    }

    #[tokio::test]
    async fn countdown_poll_without_game_is_benign() {
        let state = app(&[1], [0]).await;
        let tick = poll_countdown(&state, SessionId::generate()).await;
        assert_eq!(tick.count, 10);
        assert!(!tick.blockrefresh);
        assert!(!tick.is_new_quiz);
    }
}
