use serde::{Deserialize, Serialize};

/// Identifier of a quiz in the backing store.
pub type QuizId = u32;
/// Identifier of a tip attached to a quiz.
pub type TipId = u32;
/// Identifier of the user who authored a quiz or tip.
pub type AuthorId = u32;

/// Quiz definition as stored by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizEntity {
    /// Primary key of the quiz.
    pub id: QuizId,
    /// Question shown to the player.
    pub question: String,
    /// Canonical answer the submission is compared against.
    pub answer: String,
    /// Author of the quiz, if known.
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    /// Hints attached to the quiz, in authoring order.
    #[serde(default)]
    pub tips: Vec<TipEntity>,
}

/// Hint attached to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TipEntity {
    /// Primary key of the tip.
    pub id: TipId,
    /// Hint text.
    pub text: String,
    /// Author of the tip, if known.
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    /// Whether a moderator accepted the tip.
    #[serde(default)]
    pub accepted: bool,
}

/// Quiz projection served during random play: tips carry no authorship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableQuizEntity {
    /// Primary key of the quiz.
    pub id: QuizId,
    /// Question shown to the player.
    pub question: String,
    /// Canonical answer, never sent to the player.
    pub answer: String,
    /// Hints in authoring order.
    pub tips: Vec<PlayableTipEntity>,
}

/// Tip projection without its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableTipEntity {
    /// Primary key of the tip.
    pub id: TipId,
    /// Hint text.
    pub text: String,
    /// Whether a moderator accepted the tip.
    pub accepted: bool,
}

impl From<TipEntity> for PlayableTipEntity {
    fn from(value: TipEntity) -> Self {
        Self {
            id: value.id,
            text: value.text,
            accepted: value.accepted,
        }
    }
}

impl From<QuizEntity> for PlayableQuizEntity {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
            tips: value.tips.into_iter().map(Into::into).collect(),
        }
    }
}
