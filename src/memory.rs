//! In-memory port implementations.
//!
//! Backing implementations of the collaborator traits for tests and for
//! embedding without external infrastructure. The task store counts
//! writes so idempotence is observable.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::{FeedError, StoreError};
use crate::models::{
    ForecastPoint, Plot, SensorReading, Task, TaskTemplate, ThresholdOverrides, Worker,
};
use crate::ports::{
    PlotStore, Prediction, SensorFeed, StatusFeatures, StatusPredictor, TaskStore, TemplateStore,
    ThresholdStore, WeatherFeed, WorkerRoster,
};

fn poisoned() -> StoreError {
    StoreError::new("in-memory store lock poisoned")
}

/// Mutex-backed task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    writes: Mutex<usize>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with tasks.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            writes: Mutex::new(0),
        }
    }

    /// Number of insert/update/delete calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }

    fn bump_writes(&self) -> Result<(), StoreError> {
        let mut writes = self.writes.lock().map_err(|_| poisoned())?;
        *writes += 1;
        Ok(())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn tasks_for_plot(&self, plot_id: &str) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Task> = tasks
            .iter()
            .filter(|t| t.plot_id == plot_id)
            .cloned()
            .collect();
        out.sort_by_key(|t| t.task_date);
        Ok(out)
    }

    fn tasks_on(&self, plot_id: &str, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;
        Ok(tasks
            .iter()
            .filter(|t| t.plot_id == plot_id && t.task_date == date)
            .cloned()
            .collect())
    }

    fn task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;
        Ok(tasks.iter().find(|t| t.id == task_id).cloned())
    }

    fn tasks_with_proposal(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Task> = tasks
            .iter()
            .filter(|t| t.proposed_date.is_some())
            .cloned()
            .collect();
        out.sort_by_key(|t| t.task_date);
        Ok(out)
    }

    fn insert(&self, new_tasks: &[Task]) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().map_err(|_| poisoned())?;
        tasks.extend_from_slice(new_tasks);
        drop(tasks);
        self.bump_writes()
    }

    fn update(&self, task: &Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().map_err(|_| poisoned())?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| StoreError::new(format!("no task with id {}", task.id)))?;
        *slot = task.clone();
        drop(tasks);
        self.bump_writes()
    }

    fn delete(&self, task_ids: &[String]) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().map_err(|_| poisoned())?;
        tasks.retain(|t| !task_ids.contains(&t.id));
        drop(tasks);
        self.bump_writes()
    }
}

/// Fixed template list.
#[derive(Debug, Default)]
pub struct StaticTemplates {
    templates: Vec<TaskTemplate>,
}

impl StaticTemplates {
    /// Creates a source over the given templates.
    pub fn new(templates: Vec<TaskTemplate>) -> Self {
        Self { templates }
    }
}

impl TemplateStore for StaticTemplates {
    fn active_templates(&self) -> Result<Vec<TaskTemplate>, StoreError> {
        Ok(self
            .templates
            .iter()
            .filter(|t| t.active)
            .cloned()
            .collect())
    }
}

/// Fixed threshold profile (or none).
#[derive(Debug, Default)]
pub struct StaticThresholds {
    profile: Option<ThresholdOverrides>,
}

impl StaticThresholds {
    /// A store with no active profile (defaults apply).
    pub fn none() -> Self {
        Self::default()
    }

    /// A store holding one active profile.
    pub fn new(profile: ThresholdOverrides) -> Self {
        Self {
            profile: Some(profile),
        }
    }
}

impl ThresholdStore for StaticThresholds {
    fn active_thresholds(&self) -> Result<Option<ThresholdOverrides>, StoreError> {
        Ok(self.profile.clone())
    }
}

/// Fixed plot registry.
#[derive(Debug, Default)]
pub struct StaticPlots {
    plots: Vec<Plot>,
}

impl StaticPlots {
    /// Creates a registry over the given plots.
    pub fn new(plots: Vec<Plot>) -> Self {
        Self { plots }
    }
}

impl PlotStore for StaticPlots {
    fn plot(&self, plot_id: &str) -> Result<Option<Plot>, StoreError> {
        Ok(self.plots.iter().find(|p| p.id == plot_id).cloned())
    }

    fn plots(&self) -> Result<Vec<Plot>, StoreError> {
        Ok(self.plots.clone())
    }
}

/// Latest reading per device id.
#[derive(Debug, Default)]
pub struct StaticReadings {
    readings: HashMap<String, SensorReading>,
}

impl StaticReadings {
    /// A feed with no readings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A feed over the given readings (keyed by device id).
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self {
            readings: readings
                .into_iter()
                .map(|r| (r.device_id.clone(), r))
                .collect(),
        }
    }
}

impl SensorFeed for StaticReadings {
    fn latest_reading(&self, device_id: &str) -> Result<Option<SensorReading>, FeedError> {
        Ok(self.readings.get(device_id).cloned())
    }
}

/// Fixed forecast, with optional leading failures for retry tests.
#[derive(Debug, Default)]
pub struct StaticForecast {
    points: Vec<ForecastPoint>,
    failures_before_success: Mutex<u32>,
}

impl StaticForecast {
    /// A feed returning no forecast points.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A feed over the given points.
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self {
            points,
            failures_before_success: Mutex::new(0),
        }
    }

    /// Makes the first `n` calls fail before serving the points.
    pub fn failing_first(mut self, n: u32) -> Self {
        self.failures_before_success = Mutex::new(n);
        self
    }
}

impl WeatherFeed for StaticForecast {
    fn hourly_forecast(
        &self,
        _past_days: u32,
        _forecast_days: u32,
    ) -> Result<Vec<ForecastPoint>, FeedError> {
        let mut remaining = self
            .failures_before_success
            .lock()
            .map_err(|_| FeedError::new("forecast lock poisoned"))?;
        if *remaining > 0 {
            *remaining -= 1;
            return Err(FeedError::new("weather provider unavailable"));
        }
        Ok(self.points.clone())
    }
}

/// Fixed worker roster.
#[derive(Debug, Default)]
pub struct StaticRoster {
    workers: Vec<Worker>,
}

impl StaticRoster {
    /// A roster with nobody on it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A roster over the given workers.
    pub fn new(workers: Vec<Worker>) -> Self {
        Self { workers }
    }
}

impl WorkerRoster for StaticRoster {
    fn workers(&self) -> Result<Vec<Worker>, StoreError> {
        Ok(self.workers.clone())
    }
}

/// Predictor returning one fixed prediction, or always failing.
#[derive(Debug, Default)]
pub struct StaticPredictor {
    prediction: Option<Prediction>,
}

impl StaticPredictor {
    /// A predictor that always returns `prediction`.
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction: Some(prediction),
        }
    }

    /// A predictor that always fails (callers degrade to the default).
    pub fn unavailable() -> Self {
        Self { prediction: None }
    }
}

impl StatusPredictor for StaticPredictor {
    fn predict(&self, _features: &StatusFeatures) -> Result<Prediction, FeedError> {
        self.prediction
            .ok_or_else(|| FeedError::new("status classifier unavailable"))
    }
}
