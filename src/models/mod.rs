//! Scheduling domain models.
//!
//! Core data types for the field-task scheduling engine: tasks and their
//! reschedule metadata, recurrence templates, evaluation thresholds,
//! sensor readings, the daily rain calendar, and the worker roster.

mod sensor;
mod task;
mod template;
mod thresholds;
mod weather;
mod worker;

pub use sensor::{ReadingValues, SensorReading};
pub use task::{ApprovalState, RescheduleType, Task, TaskKind, TaskStatus, WorkerRef};
pub use template::{Frequency, TaskTemplate};
pub use thresholds::{resolve_thresholds, EvalThresholds, ThresholdOverrides};
pub use weather::{ForecastPoint, RainCalendar};
pub use worker::{Plot, Worker, FIELD_WORKER_ROLE};
