use std::collections::HashSet;

use crate::dao::models::{PlayableQuizEntity, QuizId, TipId};

/// Per-session random play state.
///
/// `NoGame` is a regular state, not an error: every entry point accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GameState {
    /// No random play game is in progress for the session.
    #[default]
    NoGame,
    /// A game is in progress.
    Playing(SessionGameState),
}

impl GameState {
    /// Number of quizzes answered correctly in the current game (0 without a game).
    pub fn score(&self) -> usize {
        match self {
            GameState::NoGame => 0,
            GameState::Playing(game) => game.score(),
        }
    }

    /// Ids answered in the running game; empty without one.
    pub fn answered_ids(&self) -> HashSet<QuizId> {
        self.playing()
            .map(|game| game.answered().clone())
            .unwrap_or_default()
    }

    /// Borrow the running game, if any.
    pub fn playing(&self) -> Option<&SessionGameState> {
        match self {
            GameState::NoGame => None,
            GameState::Playing(game) => Some(game),
        }
    }
}

/// Everything stored for one session.
///
/// The countdown lives beside the game rather than inside it: a wrong answer
/// or a timeout ends the game but leaves the countdown ticking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    /// Random play game of the session.
    pub game: GameState,
    /// Countdown of the quiz on screen; unset until the first play or check.
    pub countdown: Option<CountdownTimer>,
}

impl SessionRecord {
    /// Record holding `game` and no countdown.
    pub fn with_game(game: GameState) -> Self {
        Self {
            game,
            countdown: None,
        }
    }
}

/// Aggregate of everything a session remembers about its random play game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGameState {
    answered: HashSet<QuizId>,
    tips: TipCreditLedger,
    current_quiz: Option<ServedQuiz>,
}

impl SessionGameState {
    /// Fresh game: nothing answered and the ledger unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score of the game, i.e. the number of distinct quizzes answered correctly.
    pub fn score(&self) -> usize {
        self.answered.len()
    }

    /// Quizzes answered correctly so far.
    pub fn answered(&self) -> &HashSet<QuizId> {
        &self.answered
    }

    /// Record a correct answer; returns `false` when the quiz was already recorded.
    pub fn record_correct(&mut self, quiz_id: QuizId) -> bool {
        self.answered.insert(quiz_id)
    }

    /// Tip credits of the game.
    pub fn tips(&self) -> &TipCreditLedger {
        &self.tips
    }

    /// Mutable access to the tip credits.
    pub fn tips_mut(&mut self) -> &mut TipCreditLedger {
        &mut self.tips
    }

    /// Quiz currently shown to the player, if one was served since the last check.
    pub fn current_quiz(&self) -> Option<&ServedQuiz> {
        self.current_quiz.as_ref()
    }

    /// Remember `quiz` as the one being played and forget the previous quiz's tips.
    pub fn serve(&mut self, quiz: ServedQuiz) {
        self.tips.clear_used();
        self.current_quiz = Some(quiz);
    }

    /// Drop the current quiz once its answer has been checked.
    pub fn finish_quiz(&mut self) {
        self.tips.clear_used();
        self.current_quiz = None;
    }
}

/// The quiz a session is currently answering, with the tips it may reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedQuiz {
    /// Id of the served quiz.
    pub id: QuizId,
    /// Tips that may be revealed for it.
    pub tips: Vec<ServedTip>,
}

/// A tip of the served quiz; authorship is never kept in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedTip {
    /// Id of the tip.
    pub id: TipId,
    /// Text shown when the tip is revealed.
    pub text: String,
}

impl From<&PlayableQuizEntity> for ServedQuiz {
    fn from(quiz: &PlayableQuizEntity) -> Self {
        Self {
            id: quiz.id,
            tips: quiz
                .tips
                .iter()
                .map(|tip| ServedTip {
                    id: tip.id,
                    text: tip.text.clone(),
                })
                .collect(),
        }
    }
}

/// Consumable hint credits for one game.
///
/// Credits are granted once per game on first access and survive from quiz to
/// quiz; the list of used tips only covers the quiz being played.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipCreditLedger {
    credits_left: Option<u32>,
    used_tips: Vec<TipId>,
}

impl TipCreditLedger {
    /// Grant `max_credits` unless credits were already granted for this game.
    pub fn ensure_initialized(&mut self, max_credits: u32) {
        if self.credits_left.is_none() {
            self.credits_left = Some(max_credits);
        }
    }

    /// Remaining credits (0 while the ledger is unset).
    pub fn credits_left(&self) -> u32 {
        self.credits_left.unwrap_or(0)
    }

    /// Whether credits were granted for the running game.
    pub fn is_initialized(&self) -> bool {
        self.credits_left.is_some()
    }

    /// Tips revealed for the current quiz, in reveal order.
    pub fn used_tips(&self) -> &[TipId] {
        &self.used_tips
    }

    /// Whether `tip_id` was already revealed for the current quiz.
    pub fn is_used(&self, tip_id: TipId) -> bool {
        self.used_tips.contains(&tip_id)
    }

    /// Spend one credit on `tip_id`.
    ///
    /// Returns `false` without touching the ledger when no credit is left or
    /// the tip was already revealed for the current quiz.
    pub fn consume(&mut self, tip_id: TipId) -> bool {
        match self.credits_left {
            Some(left) if left > 0 && !self.is_used(tip_id) => {
                self.credits_left = Some(left - 1);
                self.used_tips.push(tip_id);
                true
            }
            _ => false,
        }
    }

    /// Forget every credit and used tip.
    pub fn reset(&mut self) {
        self.credits_left = None;
        self.used_tips.clear();
    }

    fn clear_used(&mut self) {
        self.used_tips.clear();
    }
}

/// Advisory countdown advanced only by client polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    count: u32,
    allowed_time: u32,
    block_refresh: bool,
    is_new_quiz: bool,
}

/// What a single countdown poll reports back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// Ticks left before the quiz is over.
    pub count: u32,
    /// Whether the client should stop refreshing the quiz view.
    pub block_refresh: bool,
    /// Whether this is the first poll since a quiz was served.
    pub is_new_quiz: bool,
}

impl CountdownTimer {
    /// Full timer at `allowed_time` with both flags lowered.
    pub fn new(allowed_time: u32) -> Self {
        Self {
            count: allowed_time,
            allowed_time,
            block_refresh: false,
            is_new_quiz: false,
        }
    }

    /// Restart at `allowed_time` for a freshly served quiz.
    pub fn start(&mut self, allowed_time: u32) {
        self.allowed_time = allowed_time;
        self.count = allowed_time;
        self.block_refresh = false;
        self.is_new_quiz = true;
    }

    /// Advance one tick: decrement, or wrap to `allowed_time` once at zero.
    ///
    /// `is_new_quiz` is reported once, on the first poll after [`Self::start`].
    pub fn poll(&mut self) -> CountdownTick {
        if self.count > 0 {
            self.count -= 1;
        } else {
            self.count = self.allowed_time;
        }

        let tick = self.peek();
        self.is_new_quiz = false;
        tick
    }

    /// Current values without advancing the timer.
    pub fn peek(&self) -> CountdownTick {
        CountdownTick {
            count: self.count,
            block_refresh: self.block_refresh,
            is_new_quiz: self.is_new_quiz,
        }
    }

    /// Ask the client to stop refreshing until the next quiz is served.
    pub fn block_refresh(&mut self) {
        self.block_refresh = true;
    }

    /// Value the timer wraps back to.
    pub fn allowed_time(&self) -> u32 {
        self.allowed_time
    }
}
