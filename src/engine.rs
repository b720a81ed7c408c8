//! Engine orchestration.
//!
//! Ties the components together behind the injected ports: schedule
//! generation, the threshold evaluation pass, insights, the approval
//! workflow, and the periodic evaluation job. All operations are
//! synchronous; the backing store is the sole arbiter of consistency.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::assign::assign_round_robin;
use crate::config::EngineConfig;
use crate::conflict::{ConflictResolver, ResolutionMode};
use crate::error::EngineError;
use crate::evaluator::{apply_ai_escalation, evaluate_rules};
use crate::expand::expand_template;
use crate::insights::{field_status, task_recommendations, Recommendation};
use crate::models::{
    resolve_thresholds, ApprovalState, RainCalendar, ReadingValues, RescheduleType, Task,
    TaskStatus, ThresholdOverrides,
};
use crate::ports::{
    PlotStore, Prediction, SensorFeed, StatusFeatures, StatusPredictor, TaskStore, TemplateStore,
    ThresholdStore, WeatherFeed, WorkerRoster,
};
use crate::reason::{merge_reasons, APPROVED_REASON, AUTO_GENERATED_REASON, REJECTED_REASON};
use crate::safe_date::find_safe_date;

/// The injected collaborator set.
#[derive(Clone)]
pub struct EnginePorts {
    pub tasks: Arc<dyn TaskStore>,
    pub templates: Arc<dyn TemplateStore>,
    pub thresholds: Arc<dyn ThresholdStore>,
    pub plots: Arc<dyn PlotStore>,
    pub sensors: Arc<dyn SensorFeed>,
    pub weather: Arc<dyn WeatherFeed>,
    pub predictor: Arc<dyn StatusPredictor>,
    pub roster: Arc<dyn WorkerRoster>,
}

/// How schedule generation treats existing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    /// Purge previously generated tasks in the window first; manual
    /// tasks survive.
    Overwrite,
    /// Keep everything, add the new tasks alongside.
    Append,
}

/// Result of a schedule generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub plot_id: String,
    pub start_date: NaiveDate,
    pub mode: GenerateMode,
    pub templates_used: usize,
    pub tasks_created: usize,
    pub tasks_purged: usize,
}

/// Per-task outcome of an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvaluation {
    pub task_id: String,
    pub status: TaskStatus,
    pub reason: Option<String>,
    pub proposed_date: Option<NaiveDate>,
    /// Whether this task was written back.
    pub updated: bool,
}

/// Outcome of evaluating one plot on one date.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotEvaluation {
    /// Nothing to evaluate, or no usable sensor data. Not an error.
    Skipped {
        reason: String,
    },
    Evaluated {
        results: Vec<TaskEvaluation>,
        updated: usize,
    },
}

impl PlotEvaluation {
    fn skipped(reason: impl Into<String>) -> Self {
        PlotEvaluation::Skipped {
            reason: reason.into(),
        }
    }

    /// Number of tasks written back (0 for skipped plots).
    pub fn updated(&self) -> usize {
        match self {
            PlotEvaluation::Skipped { .. } => 0,
            PlotEvaluation::Evaluated { updated, .. } => *updated,
        }
    }
}

/// Insight bundle for one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotInsights {
    /// Per-task recommendations, at most one per task.
    pub recommendations: Vec<Recommendation>,
    /// Field-level status lines.
    pub field_status: Vec<Recommendation>,
}

/// Aggregate result of one daily evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyRunSummary {
    pub plots_evaluated: usize,
    pub plots_skipped: usize,
    pub plots_failed: usize,
    pub tasks_updated: usize,
}

/// The scheduling and reschedule engine.
pub struct Engine {
    config: EngineConfig,
    ports: EnginePorts,
}

impl Engine {
    /// Creates an engine over the given configuration and ports.
    pub fn new(config: EngineConfig, ports: EnginePorts) -> Self {
        Self { config, ports }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn resolver(&self) -> ConflictResolver {
        ConflictResolver::new(
            self.config.hormone_buffer_days,
            self.config.conflict_lookahead_days,
        )
    }

    /// Fetches the forecast through the retry policy and folds it into
    /// a rain calendar. Feed failure yields an empty calendar, never an
    /// error.
    fn rain_calendar(&self) -> RainCalendar {
        let result = self.config.weather_retry.run("weather fetch", || {
            self.ports.weather.hourly_forecast(
                self.config.weather_past_days,
                self.config.weather_forecast_days,
            )
        });
        match result {
            Ok(points) => RainCalendar::from_hourly(&points),
            Err(err) => {
                warn!(%err, "weather feed unavailable, evaluating with empty forecast");
                RainCalendar::empty()
            }
        }
    }

    /// Generates the task schedule for a plot from the active templates.
    ///
    /// Expansion, conflict shifting, and worker assignment all happen
    /// before insertion, so generated tasks land already resolved. In
    /// [`GenerateMode::Overwrite`], previously generated tasks inside
    /// the window are purged first; manual tasks are never touched.
    pub fn generate_schedule(
        &self,
        plot_id: &str,
        start_date: NaiveDate,
        mode: GenerateMode,
        horizon_days: Option<i64>,
    ) -> Result<GenerateSummary, EngineError> {
        self.ports
            .plots
            .plot(plot_id)?
            .ok_or_else(|| EngineError::validation(format!("unknown plot {plot_id}")))?;

        let templates = self.ports.templates.active_templates()?;
        if templates.is_empty() {
            return Err(EngineError::validation("no active task templates"));
        }

        let horizon = horizon_days.unwrap_or(self.config.horizon_days);
        let window_end = start_date + Duration::days(horizon);

        let existing = self.ports.tasks.tasks_for_plot(plot_id)?;
        let mut purged_ids: Vec<String> = Vec::new();
        if mode == GenerateMode::Overwrite {
            purged_ids = existing
                .iter()
                .filter(|t| {
                    t.is_generated() && t.task_date >= start_date && t.task_date <= window_end
                })
                .map(|t| t.id.clone())
                .collect();
            if !purged_ids.is_empty() {
                self.ports.tasks.delete(&purged_ids)?;
            }
        }
        let context: Vec<Task> = existing
            .into_iter()
            .filter(|t| !purged_ids.contains(&t.id))
            .collect();

        let mut new_tasks: Vec<Task> = Vec::new();
        for template in &templates {
            for date in expand_template(start_date, template, horizon) {
                let mut task = Task::new(
                    format!("TASK-{plot_id}-{}-{date}", template.id),
                    plot_id,
                    template.kind,
                    date,
                )
                .with_title(template.title.clone())
                .with_reason(AUTO_GENERATED_REASON)
                .with_original_date(date);
                if let Some(buffer) = template.buffer_days {
                    task = task.with_buffer_days(buffer);
                }
                new_tasks.push(task);
            }
        }
        new_tasks.sort_by(|a, b| a.task_date.cmp(&b.task_date).then(a.id.cmp(&b.id)));

        let shifted = self
            .resolver()
            .resolve(&mut new_tasks, &context, ResolutionMode::Shift);
        if !shifted.is_empty() {
            debug!(plot_id, count = shifted.len(), "conflict-shifted generated tasks");
        }

        let workers = self.ports.roster.workers()?;
        assign_round_robin(&mut new_tasks, plot_id, &workers);

        if !new_tasks.is_empty() {
            self.ports.tasks.insert(&new_tasks)?;
        }
        info!(
            plot_id,
            created = new_tasks.len(),
            purged = purged_ids.len(),
            "schedule generated"
        );

        Ok(GenerateSummary {
            plot_id: plot_id.to_string(),
            start_date,
            mode,
            templates_used: templates.len(),
            tasks_created: new_tasks.len(),
            tasks_purged: purged_ids.len(),
        })
    }

    fn resolve_readings(
        &self,
        plot_id: &str,
        device: Option<&str>,
        caller: Option<ReadingValues>,
    ) -> Result<Option<ReadingValues>, EngineError> {
        if let Some(values) = caller {
            if !values.is_empty() {
                return Ok(Some(values));
            }
        }
        let plot = self.ports.plots.plot(plot_id)?;
        let plot_device = plot.and_then(|p| p.device_id);
        let device_id = device
            .map(str::to_string)
            .or(plot_device)
            .unwrap_or_else(|| self.config.default_device_id.clone());

        match self.ports.sensors.latest_reading(&device_id) {
            Ok(Some(reading)) if reading.has_values() => {
                Ok(Some(ReadingValues::from_reading(&reading)))
            }
            Ok(_) => Ok(None),
            Err(err) => {
                warn!(%err, device_id, "sensor feed unavailable");
                Ok(None)
            }
        }
    }

    fn predict(&self, features: &StatusFeatures) -> Prediction {
        match self.ports.predictor.predict(features) {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!(%err, "status predictor unavailable, using fail-safe default");
                Prediction::default()
            }
        }
    }

    /// Runs the threshold evaluation pass for one plot and date.
    ///
    /// Re-running with unchanged inputs produces zero writes: status can
    /// only escalate, reasons merge idempotently, and a proposal is
    /// persisted only when it differs from both the stored proposal and
    /// the task date.
    pub fn evaluate_plot(
        &self,
        plot_id: &str,
        date: NaiveDate,
        device: Option<&str>,
        readings: Option<ReadingValues>,
        overrides: Option<&ThresholdOverrides>,
    ) -> Result<PlotEvaluation, EngineError> {
        self.ports
            .plots
            .plot(plot_id)?
            .ok_or_else(|| EngineError::validation(format!("unknown plot {plot_id}")))?;

        let tasks = self.ports.tasks.tasks_on(plot_id, date)?;
        if tasks.is_empty() {
            return Ok(PlotEvaluation::skipped("no tasks on that date"));
        }

        let Some(values) = self.resolve_readings(plot_id, device, readings)? else {
            return Ok(PlotEvaluation::skipped(
                "insufficient data: no sensor reading available",
            ));
        };

        let stored = self.ports.thresholds.active_thresholds()?;
        let thresholds = resolve_thresholds(overrides, stored.as_ref());
        let calendar = self.rain_calendar();
        let plot_tasks = self.ports.tasks.tasks_for_plot(plot_id)?;
        let resolver = self.resolver();

        let mut results = Vec::with_capacity(tasks.len());
        let mut updated = 0;

        for stored_task in tasks {
            let mut task = stored_task.clone();

            let outcome = evaluate_rules(&task, &values, &thresholds, self.config.stop_buffer);
            let mut status = task.status.escalate(outcome.status);
            let mut reason = task.reason.clone();
            for message in &outcome.reasons {
                reason = merge_reasons(reason.as_deref(), message);
            }

            // Soft breach: look for a viable alternative date.
            let mut candidate = None;
            if outcome.status == TaskStatus::Pending {
                let safe = find_safe_date(
                    &task,
                    date,
                    &calendar,
                    &thresholds,
                    self.config.safe_date_lookahead_days,
                    self.config.reschedule_days,
                );
                candidate = Some(resolver.resolve_date(safe.date, &plot_tasks));
            }

            let features = StatusFeatures {
                soil_moisture: values.soil_moisture.unwrap_or(0.0),
                temperature: values.temperature.unwrap_or(0.0),
                rain_today: calendar.rain_on(date),
                rain_next_3d: calendar.rain_after(date, 3),
                task_type: task.kind.as_str().to_string(),
            };
            let prediction = self.predict(&features);
            if let Some((escalated, ai_reason)) =
                apply_ai_escalation(status, &prediction, self.config.ai_stop_confidence)
            {
                status = escalated;
                reason = merge_reasons(reason.as_deref(), &ai_reason);
            }

            let mut proposed = task.proposed_date;
            if let Some(new_date) = candidate {
                if Some(new_date) != task.proposed_date && new_date != task.task_date {
                    proposed = Some(new_date);
                }
            }

            let changed = status != task.status
                || proposed != task.proposed_date
                || reason != task.reason;
            if changed {
                if proposed != task.proposed_date {
                    task.seed_original_date();
                    task.proposed_date = proposed;
                    task.reschedule = Some(RescheduleType::ThresholdReschedule);
                    task.reschedule_visible = true;
                    task.approval_state = ApprovalState::Pending;
                }
                task.status = status;
                task.reason = reason.clone();
                self.ports.tasks.update(&task)?;
                updated += 1;
            }

            results.push(TaskEvaluation {
                task_id: task.id.clone(),
                status,
                reason,
                proposed_date: task.proposed_date,
                updated: changed,
            });
        }

        Ok(PlotEvaluation::Evaluated { results, updated })
    }

    /// Advisory insights for a plot: per-task recommendations plus
    /// field-level status lines. Nothing is persisted.
    pub fn insights(&self, plot_id: &str) -> Result<PlotInsights, EngineError> {
        self.ports
            .plots
            .plot(plot_id)?
            .ok_or_else(|| EngineError::validation(format!("unknown plot {plot_id}")))?;

        let tasks = self.ports.tasks.tasks_for_plot(plot_id)?;
        let values = self
            .resolve_readings(plot_id, None, None)?
            .unwrap_or_default();
        let stored = self.ports.thresholds.active_thresholds()?;
        let thresholds = resolve_thresholds(None, stored.as_ref());
        let calendar = self.rain_calendar();

        Ok(PlotInsights {
            recommendations: task_recommendations(&tasks, &calendar, &values, &thresholds),
            field_status: field_status(&values, &calendar, &thresholds),
        })
    }

    /// Approves a reschedule proposal: the task moves to the proposed
    /// date and returns to Proceed.
    pub fn approve_reschedule(&self, task_id: &str) -> Result<Task, EngineError> {
        let mut task = self
            .ports
            .tasks
            .task(task_id)?
            .ok_or_else(|| EngineError::validation(format!("unknown task {task_id}")))?;
        let proposed = task
            .proposed_date
            .ok_or_else(|| EngineError::validation("no proposed date to approve"))?;

        task.seed_original_date();
        task.task_date = proposed;
        task.proposed_date = None;
        task.status = TaskStatus::Proceed;
        task.reason = merge_reasons(task.reason.as_deref(), APPROVED_REASON);
        task.approval_state = ApprovalState::Approved;
        self.ports.tasks.update(&task)?;
        Ok(task)
    }

    /// Rejects a reschedule proposal: the proposal is cleared, the task
    /// date stands, and a Proceed task is forced to Pending so the
    /// rejection cannot silently read as all-clear.
    pub fn reject_reschedule(&self, task_id: &str) -> Result<Task, EngineError> {
        let mut task = self
            .ports
            .tasks
            .task(task_id)?
            .ok_or_else(|| EngineError::validation(format!("unknown task {task_id}")))?;
        if task.proposed_date.is_none() {
            return Err(EngineError::validation("no proposed date to reject"));
        }

        task.proposed_date = None;
        if task.status == TaskStatus::Proceed {
            task.status = TaskStatus::Pending;
        }
        task.reason = merge_reasons(task.reason.as_deref(), REJECTED_REASON);
        task.approval_state = ApprovalState::Rejected;
        self.ports.tasks.update(&task)?;
        Ok(task)
    }

    /// The manager-facing proposal queue: visible proposals still
    /// awaiting a decision, ascending by date. Conflict-buffer shifts
    /// are internal and stay hidden.
    pub fn pending_reschedules(&self) -> Result<Vec<Task>, EngineError> {
        let tasks = self.ports.tasks.tasks_with_proposal()?;
        Ok(tasks
            .into_iter()
            .filter(|t| {
                t.reschedule_visible || t.reschedule == Some(RescheduleType::ThresholdReschedule)
            })
            .filter(|t| {
                matches!(t.approval_state, ApprovalState::None | ApprovalState::Pending)
            })
            .collect())
    }

    /// Evaluates every plot for the given date. A failure on one plot
    /// is logged and does not abort the rest.
    pub fn run_daily_evaluation(&self, date: NaiveDate) -> Result<DailyRunSummary, EngineError> {
        let plots = self.ports.plots.plots()?;
        let mut summary = DailyRunSummary::default();

        for plot in plots {
            match self.evaluate_plot(&plot.id, date, None, None, None) {
                Ok(PlotEvaluation::Evaluated { updated, .. }) => {
                    summary.plots_evaluated += 1;
                    summary.tasks_updated += updated;
                }
                Ok(PlotEvaluation::Skipped { reason }) => {
                    debug!(plot_id = %plot.id, reason, "plot skipped");
                    summary.plots_skipped += 1;
                }
                Err(err) => {
                    warn!(plot_id = %plot.id, %err, "plot evaluation failed, continuing");
                    summary.plots_failed += 1;
                }
            }
        }

        info!(
            evaluated = summary.plots_evaluated,
            skipped = summary.plots_skipped,
            failed = summary.plots_failed,
            updated = summary.tasks_updated,
            "daily evaluation finished"
        );
        Ok(summary)
    }
}
