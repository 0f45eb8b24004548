use std::collections::HashSet;

use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{
    AuthorId, PlayableQuizEntity, PlayableTipEntity, QuizEntity, QuizId, TipEntity, TipId,
};

/// Full quiz document, tips embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuizDocument {
    #[serde(rename = "_id")]
    id: QuizId,
    question: String,
    answer: String,
    #[serde(default)]
    author_id: Option<AuthorId>,
    #[serde(default)]
    tips: Vec<MongoTipDocument>,
}

/// Tip embedded in a quiz document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTipDocument {
    id: TipId,
    text: String,
    #[serde(default)]
    author_id: Option<AuthorId>,
    #[serde(default)]
    accepted: bool,
}

/// Random play projection: every authorship field is projected away by the query.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoPlayableQuizDocument {
    #[serde(rename = "_id")]
    id: QuizId,
    question: String,
    answer: String,
    #[serde(default)]
    tips: Vec<MongoPlayableTipDocument>,
}

/// Projected tip, without authorship.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoPlayableTipDocument {
    id: TipId,
    text: String,
    #[serde(default)]
    accepted: bool,
}

impl From<MongoQuizDocument> for QuizEntity {
    fn from(value: MongoQuizDocument) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
            author_id: value.author_id,
            tips: value
                .tips
                .into_iter()
                .map(|tip| TipEntity {
                    id: tip.id,
                    text: tip.text,
                    author_id: tip.author_id,
                    accepted: tip.accepted,
                })
                .collect(),
        }
    }
}

impl From<MongoPlayableQuizDocument> for PlayableQuizEntity {
    fn from(value: MongoPlayableQuizDocument) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
            tips: value
                .tips
                .into_iter()
                .map(|tip| PlayableTipEntity {
                    id: tip.id,
                    text: tip.text,
                    accepted: tip.accepted,
                })
                .collect(),
        }
    }
}

/// Filter matching every quiz whose id is not part of `excluded`.
pub fn eligible_filter(excluded: &HashSet<QuizId>) -> Document {
    let ids: Vec<Bson> = excluded
        .iter()
        .map(|id| Bson::Int64(i64::from(*id)))
        .collect();
    doc! {"_id": {"$nin": ids}}
}

/// Projection stripping authorship from the quiz and its tips.
pub fn playable_projection() -> Document {
    doc! {"author_id": 0, "tips.author_id": 0}
}

/// Filter selecting the quiz with primary key `id`.
pub fn doc_id(id: QuizId) -> Document {
    doc! {"_id": i64::from(id)}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligible_filter_lists_excluded_ids() {
        let filter = eligible_filter(&HashSet::from([4]));
        let nin = filter
            .get_document("_id")
            .unwrap()
            .get_array("$nin")
            .unwrap();
        assert_eq!(nin, &vec![Bson::Int64(4)]);
    }

    #[test]
    fn empty_exclusion_still_builds_a_filter() {
        let filter = eligible_filter(&HashSet::new());
        let nin = filter
            .get_document("_id")
            .unwrap()
            .get_array("$nin")
            .unwrap();
        assert!(nin.is_empty());
    }
}
