use std::{collections::HashMap, sync::Arc};

use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::catalog::{parse_object_id, record_from_json},
    repositories::CatalogRepository,
    services::catalog_service::reference_filter,
};

pub const QUESTION_FIELD: &str = "pregunta";
const SELECTED_FIELD: &str = "respuestaSeleccionada";
const CORRECT_FIELD: &str = "respuestaCorrecta";
/// Question fields embedded in listed answers.
const QUESTION_SUMMARY_FIELDS: [&str; 2] = ["titulo", "nivelDificultad"];

/// Records answers to questions and scores them against the stored
/// correct answer.
pub struct AnswerService {
    questions: Arc<dyn CatalogRepository>,
    answers: Arc<dyn CatalogRepository>,
}

impl AnswerService {
    pub fn new(questions: Arc<dyn CatalogRepository>, answers: Arc<dyn CatalogRepository>) -> Self {
        Self { questions, answers }
    }

    /// Scores and stores an answer. `answered_by` is the principal that
    /// submitted it.
    pub async fn register(
        &self,
        question_id: &str,
        body: Value,
        answered_by: &str,
    ) -> AppResult<Document> {
        let oid = parse_object_id(question_id)?;
        let question = self
            .questions
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| AppError::NotFound("La pregunta no existe".to_string()))?;

        let mut answer = record_from_json(body)?;
        let selected = match answer.get(SELECTED_FIELD) {
            None | Some(Bson::Null) => {
                return Err(AppError::ValidationError(
                    "respuestaSeleccionada es requerida".to_string(),
                ))
            }
            Some(selected) => selected.clone(),
        };

        let correct = question
            .get(CORRECT_FIELD)
            .is_some_and(|expected| same_answer(expected, &selected));
        answer.insert(QUESTION_FIELD, oid);
        answer.insert("esCorrecta", correct);
        answer.insert("calificacion", if correct { 1 } else { 0 });
        answer.insert("respondidoPor", answered_by);
        answer.insert("respondidaEn", DateTime::now());

        let stored = self.answers.create(answer).await?;
        log::info!(
            "Answer to question {} by {} scored {}",
            question_id,
            answered_by,
            if correct { 1 } else { 0 }
        );
        Ok(stored)
    }

    pub async fn list_for_question(&self, question_id: &str) -> AppResult<Vec<Document>> {
        let filter = reference_filter(QUESTION_FIELD, question_id)?;
        let answers = self.answers.list(filter).await?;
        self.with_question_summaries(answers).await
    }

    /// All answers, optionally narrowed to one question.
    pub async fn history(&self, question_id: Option<&str>) -> AppResult<Vec<Document>> {
        let filter = match question_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => reference_filter(QUESTION_FIELD, id)?,
            None => Document::new(),
        };
        let answers = self.answers.list(filter).await?;
        self.with_question_summaries(answers).await
    }

    /// Replaces each answer's `pregunta` id with the question's `_id`,
    /// `titulo` and `nivelDificultad`, or null once the question is gone.
    async fn with_question_summaries(&self, mut answers: Vec<Document>) -> AppResult<Vec<Document>> {
        let mut summaries: HashMap<ObjectId, Bson> = HashMap::new();
        for answer in &mut answers {
            let Ok(id) = answer.get_object_id(QUESTION_FIELD) else {
                continue;
            };
            let summary = match summaries.get(&id) {
                Some(summary) => summary.clone(),
                None => {
                    let summary = match self.questions.find_by_id(&id).await? {
                        Some(question) => Bson::Document(question_summary(id, &question)),
                        None => Bson::Null,
                    };
                    summaries.insert(id, summary.clone());
                    summary
                }
            };
            answer.insert(QUESTION_FIELD, summary);
        }
        Ok(answers)
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.answers.ensure_indexes().await
    }
}

fn question_summary(id: ObjectId, question: &Document) -> Document {
    let mut summary = doc! { "_id": id };
    for field in QUESTION_SUMMARY_FIELDS {
        if let Some(value) = question.get(field) {
            summary.insert(field, value.clone());
        }
    }
    summary
}

/// Numbers compare by value regardless of their BSON width.
fn same_answer(expected: &Bson, selected: &Bson) -> bool {
    match (as_number(expected), as_number(selected)) {
        (Some(a), Some(b)) => a == b,
        _ => expected == selected,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}
