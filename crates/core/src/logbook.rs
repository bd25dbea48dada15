//! Consultation log contract.
//!
//! Every answered query is recorded to a durable store (a spreadsheet in
//! production) together with its topic and, later, the student's feedback.
//! Failed AI turns are never recorded — the caller enforces that policy,
//! this trait just exposes the store.

use crate::error::LogError;
use crate::topic::Topic;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A consultation about to be recorded.
#[derive(Debug, Clone)]
pub struct NewConsultation {
    /// The sanitized user query
    pub query: String,

    /// The accepted assistant response
    pub response: String,

    /// The classified topic
    pub topic: Topic,

    /// Completion status (e.g., "completado")
    pub status: String,

    /// When the query was answered
    pub answered_at: DateTime<Utc>,
}

/// Student feedback on a recorded consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Like,
    Dislike,
}

/// Aggregate statistics over the log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogStatistics {
    /// Total recorded consultations
    pub total: u64,

    /// Consultations per topic label
    pub by_topic: HashMap<String, u64>,

    /// Responses marked useful
    pub likes: u64,

    /// Responses marked not useful
    pub dislikes: u64,
}

/// The durable consultation store.
#[async_trait]
pub trait ConsultationLog: Send + Sync {
    /// Append a consultation. Returns its 1-based row number.
    async fn record(&self, consultation: NewConsultation) -> std::result::Result<u64, LogError>;

    /// Replace the query/response/topic of an existing row, keeping any
    /// feedback already attached to it.
    async fn update(
        &self,
        row: u64,
        consultation: NewConsultation,
    ) -> std::result::Result<(), LogError>;

    /// Attach, change, or clear (`None`) feedback on a row.
    async fn set_feedback(
        &self,
        row: u64,
        feedback: Option<Feedback>,
        comment: Option<String>,
    ) -> std::result::Result<(), LogError>;

    /// Aggregate statistics over all recorded rows.
    async fn statistics(&self) -> std::result::Result<LogStatistics, LogError>;
}
