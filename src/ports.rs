//! Collaborator interfaces.
//!
//! The engine never talks to a database, sensor network, weather
//! provider, or model server directly — each one sits behind a trait
//! here, injected at construction. Store failures abort the operation;
//! feed failures ([`FeedError`]) are handled fail-open by the caller.
//!
//! All traits are `Send + Sync` so an engine can be shared across
//! threads by the embedding application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, StoreError};
use crate::models::{
    ForecastPoint, Plot, SensorReading, Task, TaskStatus, TaskTemplate, ThresholdOverrides, Worker,
};

/// Task persistence.
pub trait TaskStore: Send + Sync {
    /// All tasks for a plot, ascending by date.
    fn tasks_for_plot(&self, plot_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Tasks for a plot on an exact date.
    fn tasks_on(&self, plot_id: &str, date: NaiveDate) -> Result<Vec<Task>, StoreError>;

    /// A task by id.
    fn task(&self, task_id: &str) -> Result<Option<Task>, StoreError>;

    /// Tasks carrying a reschedule proposal, across plots, ascending by
    /// date.
    fn tasks_with_proposal(&self) -> Result<Vec<Task>, StoreError>;

    /// Inserts new tasks.
    fn insert(&self, tasks: &[Task]) -> Result<(), StoreError>;

    /// Replaces a stored task (matched by id).
    fn update(&self, task: &Task) -> Result<(), StoreError>;

    /// Deletes tasks by id.
    fn delete(&self, task_ids: &[String]) -> Result<(), StoreError>;
}

/// Recurrence template source.
pub trait TemplateStore: Send + Sync {
    /// Active templates only.
    fn active_templates(&self) -> Result<Vec<TaskTemplate>, StoreError>;
}

/// Threshold profile source.
///
/// The stored profile is partial by design: absent fields fall through
/// to the hard-coded defaults during resolution.
pub trait ThresholdStore: Send + Sync {
    /// The active profile, if one is configured.
    fn active_thresholds(&self) -> Result<Option<ThresholdOverrides>, StoreError>;
}

/// Plot registry.
pub trait PlotStore: Send + Sync {
    /// A plot by id.
    fn plot(&self, plot_id: &str) -> Result<Option<Plot>, StoreError>;

    /// All plots (daily evaluation job input).
    fn plots(&self) -> Result<Vec<Plot>, StoreError>;
}

/// Latest cleaned sensor reading per device.
pub trait SensorFeed: Send + Sync {
    /// The most recent reading for a device, if any.
    fn latest_reading(&self, device_id: &str) -> Result<Option<SensorReading>, FeedError>;
}

/// Hourly weather forecast provider.
pub trait WeatherFeed: Send + Sync {
    /// Hourly points covering `past_days` back and `forecast_days`
    /// ahead.
    fn hourly_forecast(
        &self,
        past_days: u32,
        forecast_days: u32,
    ) -> Result<Vec<ForecastPoint>, FeedError>;
}

/// Active worker roster.
pub trait WorkerRoster: Send + Sync {
    /// All workers (the assigner filters and sorts).
    fn workers(&self) -> Result<Vec<Worker>, StoreError>;
}

/// Feature vector handed to the status predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFeatures {
    /// Soil moisture (%), 0.0 when unknown.
    pub soil_moisture: f64,
    /// Air temperature (°C), 0.0 when unknown.
    pub temperature: f64,
    /// Rainfall on the evaluation date (mm).
    pub rain_today: f64,
    /// Total rainfall over the following three days (mm).
    pub rain_next_3d: f64,
    /// Task category label.
    pub task_type: String,
}

/// Predictor output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted status label.
    pub status: TaskStatus,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Default for Prediction {
    /// The fail-safe prediction: Proceed at low confidence. Used when
    /// the predictor is unavailable.
    fn default() -> Self {
        Self {
            status: TaskStatus::Proceed,
            confidence: 0.5,
        }
    }
}

/// Trained status classifier.
pub trait StatusPredictor: Send + Sync {
    /// Predicts a status label with confidence. Callers degrade to
    /// [`Prediction::default`] on error.
    fn predict(&self, features: &StatusFeatures) -> Result<Prediction, FeedError>;
}
