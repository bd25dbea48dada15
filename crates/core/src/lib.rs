//! # Aula Core
//!
//! Domain types, traits, and error definitions for the Aula assistant
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! External collaborators (model providers, knowledge caches, the
//! consultation log) are defined as traits here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod knowledge;
pub mod logbook;
pub mod provider;
pub mod topic;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use knowledge::ContextSource;
pub use logbook::{ConsultationLog, Feedback, LogStatistics, NewConsultation};
pub use provider::{CompletionRequest, CompletionResponse, Provider};
pub use topic::Topic;
pub use turn::{Role, Turn};
