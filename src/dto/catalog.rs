//! JSON layout of the quiz catalog used to seed the in-memory store.

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{AuthorId, QuizEntity, QuizId, TipEntity, TipId},
    dto::validation::validate_not_blank,
};

/// Root document of a catalog file.
#[derive(Debug, Deserialize, Validate)]
pub struct CatalogFile {
    /// Every quiz of the catalog.
    #[validate(nested)]
    pub quizzes: Vec<CatalogQuiz>,
}

/// Quiz entry inside a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogQuiz {
    /// Unique quiz id.
    pub id: QuizId,
    /// Question text; must not be blank.
    pub question: String,
    /// Canonical answer; must not be blank.
    pub answer: String,
    /// Optional author.
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    /// Hints, in authoring order.
    #[serde(default)]
    pub tips: Vec<CatalogTip>,
}

/// Tip entry attached to a catalog quiz.
#[derive(Debug, Deserialize)]
pub struct CatalogTip {
    /// Tip id, unique within its quiz.
    pub id: TipId,
    /// Hint text.
    pub text: String,
    /// Optional author.
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    /// Moderation flag; defaults to accepted.
    #[serde(default = "default_accepted")]
    pub accepted: bool,
}

fn default_accepted() -> bool {
    true
}

impl Validate for CatalogQuiz {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.question) {
            errors.add("question", e);
        }
        if let Err(e) = validate_not_blank(&self.answer) {
            errors.add("answer", e);
        }
        if self.tips.iter().any(|tip| validate_not_blank(&tip.text).is_err()) {
            let mut err = validator::ValidationError::new("blank_tip");
            err.message = Some(format!("quiz {} has a blank tip", self.id).into());
            errors.add("tips", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<CatalogTip> for TipEntity {
    fn from(value: CatalogTip) -> Self {
        Self {
            id: value.id,
            text: value.text,
            author_id: value.author_id,
            accepted: value.accepted,
        }
    }
}

impl From<CatalogQuiz> for QuizEntity {
    fn from(value: CatalogQuiz) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
            author_id: value.author_id,
            tips: value.tips.into_iter().map(Into::into).collect(),
        }
    }
}
