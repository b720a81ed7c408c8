//! Scheduling and reschedule engine for recurring agricultural field
//! tasks.
//!
//! Generates task calendars from recurrence templates, resolves
//! hormone/fertilizer application conflicts, evaluates task viability
//! against sensor and weather conditions, and proposes reschedules
//! subject to manager approval.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `TaskTemplate`,
//!   `EvalThresholds`, `SensorReading`, `RainCalendar`, `Worker`
//! - **`expand`**: Recurrence template → concrete task dates
//! - **`conflict`**: Hormone buffer windows and fertilizer shifting
//! - **`assign`**: Deterministic round-robin worker assignment
//! - **`safe_date`**: Weather-aware forward search for an operable day
//! - **`evaluator`**: Proceed/Pending/Stop threshold rules and AI
//!   escalation
//! - **`insights`**: Advisory recommendations and field status lines
//! - **`reason`**: Append-only audit trail handling
//! - **`ports`**: Collaborator traits (stores, feeds, predictor)
//! - **`memory`**: In-memory port implementations
//! - **`engine`**: Orchestration — generation, evaluation, approval,
//!   the daily job
//!
//! # Architecture
//!
//! The engine is transport- and storage-agnostic: persistence, sensors,
//! weather, and the trained status classifier sit behind the `ports`
//! traits and are injected at construction. All operations are
//! synchronous; feed failures are handled fail-open so evaluation keeps
//! running on degraded infrastructure.

pub mod assign;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod expand;
pub mod insights;
pub mod memory;
pub mod models;
pub mod ports;
pub mod reason;
pub mod safe_date;

pub use config::{EngineConfig, RetryPolicy};
pub use engine::{
    DailyRunSummary, Engine, EnginePorts, GenerateMode, GenerateSummary, PlotEvaluation,
    PlotInsights, TaskEvaluation,
};
pub use error::{EngineError, FeedError, StoreError};
pub use models::{
    EvalThresholds, RainCalendar, ReadingValues, Task, TaskStatus, TaskTemplate,
    ThresholdOverrides,
};
