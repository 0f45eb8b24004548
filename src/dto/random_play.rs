//! Payloads of the random play endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::{PlayableQuizEntity, QuizId},
    state::{
        game::CountdownTick,
        state_machine::{CheckOutcome, PlayOutcome, TipOutcome},
    },
};

/// Quiz as shown to a random play player; the answer is never sent.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RandomQuizView {
    /// Identifier to send back when checking the answer.
    pub id: QuizId,
    /// Question text.
    pub question: String,
    /// Number of tips that can be revealed for this quiz.
    pub tip_count: usize,
}

impl From<PlayableQuizEntity> for RandomQuizView {
    fn from(quiz: PlayableQuizEntity) -> Self {
        Self {
            id: quiz.id,
            question: quiz.question,
            tip_count: quiz.tips.len(),
        }
    }
}

/// Response of `GET /quizzes/randomplay`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RandomPlayResponse {
    /// A quiz to answer.
    Playing {
        /// Quiz being served.
        quiz: RandomQuizView,
        /// Correct answers so far in this game.
        score: usize,
        /// Tip credits left for the game.
        #[serde(rename = "creditsLeft")]
        credits_left: u32,
    },
    /// Every quiz was answered; the game is over.
    NoMore {
        /// Final score of the game.
        score: usize,
    },
}

impl From<PlayOutcome> for RandomPlayResponse {
    fn from(outcome: PlayOutcome) -> Self {
        match outcome {
            PlayOutcome::Exhausted { final_score } => RandomPlayResponse::NoMore { score: final_score },
            PlayOutcome::Serving {
                quiz,
                score,
                credits_left,
            } => RandomPlayResponse::Playing {
                quiz: quiz.into(),
                score,
                credits_left,
            },
        }
    }
}

/// Query string of `GET /quizzes/randomcheck/{quizId}`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckAnswerQuery {
    /// Free-text answer; a missing answer counts as an empty one.
    #[serde(default)]
    pub answer: String,
}

/// Response of `GET /quizzes/randomcheck/{quizId}`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct CheckAnswerResponse {
    /// Whether the answer matched.
    pub result: bool,
    /// Submitted answer after case folding and trimming.
    pub answer: String,
    /// Score after the check; 0 after a wrong answer.
    pub score: usize,
}

impl From<CheckOutcome> for CheckAnswerResponse {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            result: outcome.result,
            answer: outcome.answer,
            score: outcome.score,
        }
    }
}

/// Response of `GET /quizzes/randomplay/countdown`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct CountdownResponse {
    /// Seconds left before the quiz times out.
    pub count: u32,
    /// Set once the served quiz was answered correctly.
    pub blockrefresh: bool,
    /// True on the first poll after a quiz is served.
    #[serde(rename = "isNewQuiz")]
    pub is_new_quiz: bool,
}

impl From<CountdownTick> for CountdownResponse {
    fn from(tick: CountdownTick) -> Self {
        Self {
            count: tick.count,
            blockrefresh: tick.block_refresh,
            is_new_quiz: tick.is_new_quiz,
        }
    }
}

/// Response of `GET /quizzes/randomplay/timeup`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct TimeUpResponse {
    /// Final score of the ended game.
    pub score: usize,
}

/// Response of `GET /quizzes/randomplay/randomtip`.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RandomTipResponse {
    /// Revealed tip text, absent when nothing could be revealed.
    pub tip: Option<String>,
    /// Tip credits left for the game.
    pub credits_left: u32,
}

impl From<TipOutcome> for RandomTipResponse {
    fn from(outcome: TipOutcome) -> Self {
        match outcome {
            TipOutcome::Revealed { tip, credits_left } => Self {
                tip: Some(tip.text),
                credits_left,
            },
            TipOutcome::Rejected { credits_left } => Self {
                tip: None,
                credits_left,
            },
        }
    }
}
