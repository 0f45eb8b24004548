use tracing::debug;

use crate::{
    dao::models::{PlayableQuizEntity, QuizId},
    state::{
        game::{
            CountdownTick, CountdownTimer, GameState, ServedQuiz, ServedTip, SessionGameState,
            SessionRecord,
        },
        selector::SelectionResult,
    },
};

/// Result of a start/continue request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// No eligible quiz left; the game is over and was cleared.
    Exhausted {
        /// Score the game ended with.
        final_score: usize,
    },
    /// A quiz is being served.
    Serving {
        /// Quiz to display.
        quiz: PlayableQuizEntity,
        /// Score of the running game.
        score: usize,
        /// Tip credits still available.
        credits_left: u32,
    },
}

/// Result of an answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether the submission matched the canonical answer.
    pub result: bool,
    /// Submission after normalisation.
    pub answer: String,
    /// Score after the transition.
    pub score: usize,
}

/// Result of a tip reveal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipOutcome {
    /// One credit was spent on `tip`.
    Revealed {
        /// Tip revealed to the player.
        tip: ServedTip,
        /// Credits left after the reveal.
        credits_left: u32,
    },
    /// Nothing was revealed: no game, no quiz, no unused tip or no credit left.
    Rejected {
        /// Credits left (unchanged).
        credits_left: u32,
    },
}

/// Transition rules of random play.
///
/// Every operation consumes the session's [`GameState`] and returns the state
/// to store back alongside what should be rendered. No operation fails:
/// a missing game is handled as a regular state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateMachine {
    max_tip_credits: u32,
    allowed_time: u32,
}

impl GameStateMachine {
    /// Rules granting `max_tip_credits` per game and `allowed_time` ticks per quiz.
    pub fn new(max_tip_credits: u32, allowed_time: u32) -> Self {
        Self {
            max_tip_credits,
            allowed_time,
        }
    }

    /// Credits granted at the start of a game.
    pub fn max_tip_credits(&self) -> u32 {
        self.max_tip_credits
    }

    /// Ticks a player gets for each quiz.
    pub fn allowed_time(&self) -> u32 {
        self.allowed_time
    }

    /// Continue the running game, or start a fresh one.
    pub fn begin(&self, state: GameState) -> SessionGameState {
        match state {
            GameState::Playing(game) => game,
            GameState::NoGame => SessionGameState::new(),
        }
    }

    /// Apply the selector's verdict, selected with `record.game.answered_ids()`.
    ///
    /// The countdown restarts whatever the verdict.
    pub fn on_selection(
        &self,
        record: SessionRecord,
        selection: SelectionResult,
    ) -> (SessionRecord, PlayOutcome) {
        let mut countdown = CountdownTimer::new(self.allowed_time);

        match selection {
            SelectionResult::Exhausted { final_score } => {
                debug!(final_score, "quiz pool exhausted; clearing game");
                let next = SessionRecord {
                    game: GameState::NoGame,
                    countdown: Some(countdown),
                };
                (next, PlayOutcome::Exhausted { final_score })
            }
            SelectionResult::Selected { quiz } => {
                let mut game = self.begin(record.game);
                game.tips_mut().ensure_initialized(self.max_tip_credits);
                game.serve(ServedQuiz::from(&quiz));
                countdown.start(self.allowed_time);

                let outcome = PlayOutcome::Serving {
                    score: game.score(),
                    credits_left: game.tips().credits_left(),
                    quiz,
                };
                let next = SessionRecord {
                    game: GameState::Playing(game),
                    countdown: Some(countdown),
                };
                (next, outcome)
            }
        }
    }

    /// Compare `submitted` to `canonical` and record or punish the attempt.
    ///
    /// A wrong answer discards the whole game, whatever its score. The
    /// countdown restarts on every check, right or wrong.
    pub fn check_answer(
        &self,
        record: SessionRecord,
        quiz_id: QuizId,
        canonical: &str,
        submitted: &str,
    ) -> (SessionRecord, CheckOutcome) {
        let answer = normalize_answer(submitted);
        let result = answer == normalize_answer(canonical);
        let mut countdown = CountdownTimer::new(self.allowed_time);

        if !result {
            debug!(quiz_id, lost_score = record.game.score(), "wrong answer; clearing game");
            let next = SessionRecord {
                game: GameState::NoGame,
                countdown: Some(countdown),
            };
            let outcome = CheckOutcome {
                result,
                answer,
                score: 0,
            };
            return (next, outcome);
        }

        let mut game = self.begin(record.game);
        if !game.record_correct(quiz_id) {
            debug!(quiz_id, "quiz already answered; score unchanged");
        }
        game.finish_quiz();
        countdown.block_refresh();

        let outcome = CheckOutcome {
            result,
            answer,
            score: game.score(),
        };
        let next = SessionRecord {
            game: GameState::Playing(game),
            countdown: Some(countdown),
        };
        (next, outcome)
    }

    /// Advance the session's countdown by one tick.
    ///
    /// Before the first play or check the countdown reads as full and nothing
    /// is stored.
    pub fn poll_countdown(&self, record: SessionRecord) -> (SessionRecord, CountdownTick) {
        let SessionRecord { game, countdown } = record;
        match countdown {
            None => (
                SessionRecord::with_game(game),
                CountdownTimer::new(self.allowed_time).peek(),
            ),
            Some(mut timer) => {
                let tick = timer.poll();
                let next = SessionRecord {
                    game,
                    countdown: Some(timer),
                };
                (next, tick)
            }
        }
    }

    /// End the game because time ran out, returning the final score.
    ///
    /// The countdown is left as is.
    pub fn time_up(&self, record: SessionRecord) -> (SessionRecord, usize) {
        let score = record.game.score();
        let next = SessionRecord {
            game: GameState::NoGame,
            countdown: record.countdown,
        };
        (next, score)
    }

    /// Reveal one unused tip of the current quiz, chosen by `pick`.
    ///
    /// `pick` receives the number of candidate tips (strictly positive) and
    /// returns the index of the tip to reveal.
    pub fn reveal_tip(
        &self,
        record: SessionRecord,
        pick: impl FnOnce(usize) -> usize,
    ) -> (SessionRecord, TipOutcome) {
        let SessionRecord { game, countdown } = record;
        let GameState::Playing(mut game) = game else {
            let next = SessionRecord {
                game: GameState::NoGame,
                countdown,
            };
            return (next, TipOutcome::Rejected { credits_left: 0 });
        };

        let credits_left = game.tips().credits_left();
        let candidates: Vec<ServedTip> = game
            .current_quiz()
            .map(|quiz| {
                quiz.tips
                    .iter()
                    .filter(|tip| !game.tips().is_used(tip.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let outcome = if candidates.is_empty() || credits_left == 0 {
            TipOutcome::Rejected { credits_left }
        } else {
            let index = pick(candidates.len()).min(candidates.len() - 1);
            let tip = candidates[index].clone();
            if game.tips_mut().consume(tip.id) {
                TipOutcome::Revealed {
                    tip,
                    credits_left: game.tips().credits_left(),
                }
            } else {
                TipOutcome::Rejected { credits_left }
            }
        };

        let next = SessionRecord {
            game: GameState::Playing(game),
            countdown,
        };
        (next, outcome)
    }
}

/// Case-fold and trim an answer before comparison.
pub fn normalize_answer(answer: &str) -> String {
    answer.to_lowercase().trim().to_owned()
}
