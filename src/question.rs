use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub stem: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

/// External question collaborator. Must return a question outside
/// `exclude_ids` when one exists for the subject.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn pick(&self, subject: &str, exclude_ids: &[String]) -> Result<Question, AppError>;
}

/// Question source over a static JSON bank, grouped by subject.
pub struct BankSource {
    by_subject: HashMap<String, Vec<Question>>,
}

impl BankSource {
    pub fn new(questions: Vec<Question>) -> Self {
        let mut by_subject: HashMap<String, Vec<Question>> = HashMap::new();
        for q in questions {
            by_subject.entry(q.subject.clone()).or_default().push(q);
        }
        Self { by_subject }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading question bank {}", path.as_ref().display()))?;
        let questions: Vec<Question> =
            serde_json::from_str(&raw).context("parsing question bank")?;
        tracing::info!("loaded {} questions", questions.len());
        Ok(Self::new(questions))
    }
}

#[async_trait]
impl QuestionSource for BankSource {
    async fn pick(&self, subject: &str, exclude_ids: &[String]) -> Result<Question, AppError> {
        let pool = self
            .by_subject
            .get(subject)
            .ok_or_else(|| AppError::QuestionUnavailable(format!("unknown subject {subject}")))?;
        let fresh: Vec<&Question> = pool
            .iter()
            .filter(|q| !exclude_ids.contains(&q.id))
            .collect();
        if fresh.is_empty() {
            return Err(AppError::QuestionUnavailable(format!(
                "subject {subject} exhausted"
            )));
        }
        let idx = rand::rng().random_range(0..fresh.len());
        Ok(fresh[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, subject: &str) -> Question {
        Question {
            id: id.to_string(),
            subject: subject.to_string(),
            stem: "?".to_string(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
            explanation: String::new(),
        }
    }

    #[tokio::test]
    async fn respects_exclusions_until_exhausted() {
        let source = BankSource::new(vec![q("1", "geo"), q("2", "geo")]);
        let picked = source.pick("geo", &["1".to_string()]).await.unwrap();
        assert_eq!(picked.id, "2");

        let err = source
            .pick("geo", &["1".to_string(), "2".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuestionUnavailable(_)));
    }

    #[tokio::test]
    async fn unknown_subject_is_unavailable() {
        let source = BankSource::new(vec![]);
        let err = source.pick("history", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::QuestionUnavailable(_)));
    }
}
