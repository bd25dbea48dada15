//! In-memory consultation log.
//!
//! Stands in for the spreadsheet the institute uses in production; rows
//! are 1-based to match how staff reference them there. Good enough for
//! single-process deployments and for tests.

use async_trait::async_trait;
use aula_core::error::LogError;
use aula_core::logbook::{ConsultationLog, Feedback, LogStatistics, NewConsultation};
use tokio::sync::RwLock;

/// A log that keeps every consultation in process memory.
pub struct InMemoryLog {
    rows: RwLock<Vec<Row>>,
}

struct Row {
    consultation: NewConsultation,
    feedback: Option<Feedback>,
    feedback_comment: Option<String>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Number of recorded rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsultationLog for InMemoryLog {
    async fn record(&self, consultation: NewConsultation) -> Result<u64, LogError> {
        let mut rows = self.rows.write().await;
        rows.push(Row {
            consultation,
            feedback: None,
            feedback_comment: None,
        });
        Ok(rows.len() as u64)
    }

    async fn update(&self, row: u64, consultation: NewConsultation) -> Result<(), LogError> {
        let mut rows = self.rows.write().await;
        let entry = row
            .checked_sub(1)
            .and_then(|i| rows.get_mut(i as usize))
            .ok_or(LogError::RowNotFound(row))?;
        // Feedback already attached to the row survives the update
        entry.consultation = consultation;
        Ok(())
    }

    async fn set_feedback(
        &self,
        row: u64,
        feedback: Option<Feedback>,
        comment: Option<String>,
    ) -> Result<(), LogError> {
        let mut rows = self.rows.write().await;
        let entry = row
            .checked_sub(1)
            .and_then(|i| rows.get_mut(i as usize))
            .ok_or(LogError::RowNotFound(row))?;
        entry.feedback = feedback;
        entry.feedback_comment = if feedback.is_some() { comment } else { None };
        Ok(())
    }

    async fn statistics(&self) -> Result<LogStatistics, LogError> {
        let rows = self.rows.read().await;
        let mut stats = LogStatistics {
            total: rows.len() as u64,
            ..LogStatistics::default()
        };

        for row in rows.iter() {
            *stats
                .by_topic
                .entry(row.consultation.topic.to_string())
                .or_insert(0) += 1;
            match row.feedback {
                Some(Feedback::Like) => stats.likes += 1,
                Some(Feedback::Dislike) => stats.dislikes += 1,
                None => {}
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::Topic;
    use chrono::Utc;

    fn consultation(topic: Topic) -> NewConsultation {
        NewConsultation {
            query: "¿Cuánto cuesta la matrícula?".into(),
            response: "La matrícula regular cuesta S/. 200.00".into(),
            topic,
            status: "completado".into(),
            answered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn record_returns_one_based_rows() {
        let log = InMemoryLog::new();
        assert_eq!(log.record(consultation(Topic::Matricula)).await.unwrap(), 1);
        assert_eq!(log.record(consultation(Topic::Costos)).await.unwrap(), 2);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn update_replaces_row_and_keeps_feedback() {
        let log = InMemoryLog::new();
        let row = log.record(consultation(Topic::Matricula)).await.unwrap();
        log.set_feedback(row, Some(Feedback::Like), None).await.unwrap();

        log.update(row, consultation(Topic::Costos)).await.unwrap();

        let stats = log.statistics().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_topic.get("costos"), Some(&1));
        assert_eq!(stats.likes, 1);
    }

    #[tokio::test]
    async fn update_unknown_row_fails() {
        let log = InMemoryLog::new();
        let err = log.update(7, consultation(Topic::General)).await.unwrap_err();
        assert!(matches!(err, LogError::RowNotFound(7)));
        assert!(log.set_feedback(0, None, None).await.is_err());
    }

    #[tokio::test]
    async fn clearing_feedback_drops_comment() {
        let log = InMemoryLog::new();
        let row = log.record(consultation(Topic::Becas)).await.unwrap();

        log.set_feedback(row, Some(Feedback::Dislike), Some("respuesta vaga".into()))
            .await
            .unwrap();
        let stats = log.statistics().await.unwrap();
        assert_eq!(stats.dislikes, 1);

        // Toggling feedback off clears the comment too
        log.set_feedback(row, None, Some("ignorado".into())).await.unwrap();
        let stats = log.statistics().await.unwrap();
        assert_eq!(stats.dislikes, 0);
    }

    #[tokio::test]
    async fn statistics_aggregate_topics() {
        let log = InMemoryLog::new();
        log.record(consultation(Topic::Matricula)).await.unwrap();
        log.record(consultation(Topic::Matricula)).await.unwrap();
        log.record(consultation(Topic::Fechas)).await.unwrap();

        let stats = log.statistics().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_topic.get("matrícula"), Some(&2));
        assert_eq!(stats.by_topic.get("fechas"), Some(&1));
    }
}
