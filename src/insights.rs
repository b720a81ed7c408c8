//! Field insights and per-task recommendations.
//!
//! Rule-based advisory layer on top of the same inputs the evaluator
//! uses: forecast rain on each task's date, current sensor values, and
//! the resolved thresholds. Output is advisory only — nothing here
//! writes to the store; reschedule recommendations carry a suggested
//! date from the safe-date finder.

use chrono::NaiveDate;

use crate::models::{EvalThresholds, RainCalendar, ReadingValues, Task, TaskKind};
use crate::safe_date::find_safe_date;

/// Recommendation urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

/// What kind of action a recommendation suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationKind {
    /// Move the task to another day.
    Reschedule,
    /// Keep the day, move to cooler hours.
    TimeShift,
    /// Hold until conditions recover.
    Delay,
    /// Immediate field action needed (drainage check).
    Trigger,
    /// Condition alert, no specific task affected.
    Alert,
    /// Conditions are fine.
    Info,
}

/// Which input produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    WeatherRain,
    WeatherTemperature,
    SensorMoisture,
    SensorTemperature,
}

/// One advisory recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Affected task, `None` for field-level lines.
    pub task_id: Option<String>,
    /// Task title or condition headline.
    pub headline: String,
    /// The task's current date, where applicable.
    pub original_date: Option<NaiveDate>,
    /// Weather-validated alternative date, where one was computed.
    pub suggested_date: Option<NaiveDate>,
    pub kind: RecommendationKind,
    pub severity: Severity,
    /// Rationale shown to the manager.
    pub reason: String,
    pub source: InsightSource,
}

fn is_moisture_sensitive(task: &Task) -> bool {
    matches!(
        task.kind,
        TaskKind::Weeding | TaskKind::Hormone | TaskKind::Harvesting | TaskKind::LandPrep
    )
}

fn is_heat_sensitive(task: &Task) -> bool {
    let hay = task.title.to_lowercase();
    task.is_hormone() || hay.contains("flower") || hay.contains("spray")
}

fn reschedule_rec(
    task: &Task,
    calendar: &RainCalendar,
    thresholds: &EvalThresholds,
    severity: Severity,
    reason: String,
    source: InsightSource,
) -> Recommendation {
    let safe = find_safe_date(task, task.task_date, calendar, thresholds, 7, 2);
    Recommendation {
        task_id: Some(task.id.clone()),
        headline: task.title.clone(),
        original_date: Some(task.task_date),
        suggested_date: Some(safe.date),
        kind: RecommendationKind::Reschedule,
        severity,
        reason,
        source,
    }
}

/// Per-task recommendations for the given tasks.
///
/// Rules fire in priority order and at most one recommendation is
/// emitted per task: rain first, then soil moisture, then temperature.
pub fn task_recommendations(
    tasks: &[Task],
    calendar: &RainCalendar,
    values: &ReadingValues,
    thresholds: &EvalThresholds,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    for task in tasks {
        let rain = calendar.rain_on(task.task_date);

        if rain > thresholds.rain_mm_heavy && task.is_rain_sensitive() {
            recs.push(reschedule_rec(
                task,
                calendar,
                thresholds,
                Severity::High,
                format!(
                    "Heavy rain expected ({rain:.1} mm): risk of field erosion and \
                     nutrient washout. Inspect the plot for standing water."
                ),
                InsightSource::WeatherRain,
            ));
            continue;
        }
        if rain > thresholds.rain_mm_min && task.is_rain_sensitive() {
            recs.push(reschedule_rec(
                task,
                calendar,
                thresholds,
                Severity::Moderate,
                format!(
                    "Rain expected ({rain:.1} mm): halt spraying to prevent \
                     nutrient washout."
                ),
                InsightSource::WeatherRain,
            ));
            continue;
        }

        if let Some(moisture) = values.soil_moisture {
            if moisture > thresholds.soil_moisture_field_max && is_moisture_sensitive(task) {
                recs.push(reschedule_rec(
                    task,
                    calendar,
                    thresholds,
                    Severity::High,
                    format!(
                        "Waterlogging risk: soil at {moisture:.0}% for a sustained \
                         period. Postpone until moisture drops below \
                         {:.0}%.",
                        thresholds.soil_moisture_field_max
                    ),
                    InsightSource::SensorMoisture,
                ));
                continue;
            }
        }

        if let Some(temperature) = values.temperature {
            if temperature > thresholds.temperature_max && is_heat_sensitive(task) {
                recs.push(Recommendation {
                    task_id: Some(task.id.clone()),
                    headline: task.title.clone(),
                    original_date: Some(task.task_date),
                    suggested_date: None,
                    kind: RecommendationKind::TimeShift,
                    severity: Severity::Moderate,
                    reason: format!(
                        "Heat stress ({temperature:.0} deg C): move hormone and \
                         induction work to morning or evening to limit evaporation."
                    ),
                    source: InsightSource::SensorTemperature,
                });
                continue;
            }
            if temperature < thresholds.temperature_min && task.kind == TaskKind::Fertilization {
                recs.push(Recommendation {
                    task_id: Some(task.id.clone()),
                    headline: task.title.clone(),
                    original_date: Some(task.task_date),
                    suggested_date: None,
                    kind: RecommendationKind::Delay,
                    severity: Severity::Moderate,
                    reason: format!(
                        "Low temperature ({temperature:.0} deg C): the crop cannot \
                         process nutrients efficiently, delay heavy fertilisation."
                    ),
                    source: InsightSource::SensorTemperature,
                });
                continue;
            }
        }

        // Forecast temperature covers tasks further out than the
        // current sensor snapshot.
        if let Some(forecast_temp) = calendar.temperature_on(task.task_date) {
            if forecast_temp > thresholds.temperature_max && is_heat_sensitive(task) {
                recs.push(Recommendation {
                    task_id: Some(task.id.clone()),
                    headline: task.title.clone(),
                    original_date: Some(task.task_date),
                    suggested_date: None,
                    kind: RecommendationKind::TimeShift,
                    severity: Severity::Moderate,
                    reason: format!(
                        "Heat forecast ({forecast_temp:.0} deg C): plan hormone and \
                         induction work for cooler hours."
                    ),
                    source: InsightSource::WeatherTemperature,
                });
            } else if forecast_temp < thresholds.temperature_min
                && task.kind == TaskKind::Fertilization
            {
                recs.push(Recommendation {
                    task_id: Some(task.id.clone()),
                    headline: task.title.clone(),
                    original_date: Some(task.task_date),
                    suggested_date: None,
                    kind: RecommendationKind::Delay,
                    severity: Severity::Moderate,
                    reason: format!(
                        "Cold forecast ({forecast_temp:.0} deg C): delay heavy \
                         fertilisation until warmer weather."
                    ),
                    source: InsightSource::WeatherTemperature,
                });
            }
        }
    }

    recs
}

fn field_line(
    headline: &str,
    kind: RecommendationKind,
    severity: Severity,
    reason: String,
    source: InsightSource,
) -> Recommendation {
    Recommendation {
        task_id: None,
        headline: headline.to_string(),
        original_date: None,
        suggested_date: None,
        kind,
        severity,
        reason,
        source,
    }
}

/// Field-level status lines: one per sensor dimension plus the overall
/// forecast outlook.
pub fn field_status(
    values: &ReadingValues,
    calendar: &RainCalendar,
    thresholds: &EvalThresholds,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if let Some(moisture) = values.soil_moisture {
        if moisture > thresholds.soil_moisture_field_max {
            recs.push(field_line(
                "Waterlogging risk",
                RecommendationKind::Trigger,
                Severity::Critical,
                "Soil saturated beyond the safe ceiling. Check drainage today to \
                 prevent heart rot and root loss."
                    .to_string(),
                InsightSource::SensorMoisture,
            ));
        } else if moisture < thresholds.soil_moisture_min {
            recs.push(field_line(
                "Irrigation needed",
                RecommendationKind::Alert,
                Severity::Moderate,
                "Soil moisture is dropping. Monitor closely to avoid plant stress."
                    .to_string(),
                InsightSource::SensorMoisture,
            ));
        } else {
            recs.push(field_line(
                "Optimal moisture",
                RecommendationKind::Info,
                Severity::Low,
                "Soil moisture is within the ideal range for root health.".to_string(),
                InsightSource::SensorMoisture,
            ));
        }
    }

    if let Some(temperature) = values.temperature {
        if temperature > thresholds.temperature_max {
            recs.push(field_line(
                "Heat stress",
                RecommendationKind::Alert,
                Severity::Moderate,
                "High temperatures: shift hormone and induction work to cooler hours."
                    .to_string(),
                InsightSource::SensorTemperature,
            ));
        } else if temperature < thresholds.temperature_min {
            recs.push(field_line(
                "Growth retardation",
                RecommendationKind::Alert,
                Severity::Moderate,
                "Temperatures are too low for efficient nutrient uptake; delay \
                 fertilisation."
                    .to_string(),
                InsightSource::SensorTemperature,
            ));
        } else {
            recs.push(field_line(
                "Optimal temperature",
                RecommendationKind::Info,
                Severity::Low,
                "Good conditions for growth and chemical absorption.".to_string(),
                InsightSource::SensorTemperature,
            ));
        }
    }

    if !calendar.is_empty() {
        let avg_rain = calendar.mean_daily_rain();
        if avg_rain > thresholds.rain_mm_heavy {
            recs.push(field_line(
                "Heavy rain outlook",
                RecommendationKind::Alert,
                Severity::High,
                "Sustained heavy rain in the forecast: expect washout and plan \
                 drainage checks."
                    .to_string(),
                InsightSource::WeatherRain,
            ));
        } else if avg_rain > thresholds.rain_mm_min {
            recs.push(field_line(
                "Wet spell",
                RecommendationKind::Alert,
                Severity::Moderate,
                "Rainy period ahead: spraying windows will be short.".to_string(),
                InsightSource::WeatherRain,
            ));
        } else {
            recs.push(field_line(
                "Clear skies",
                RecommendationKind::Info,
                Severity::Low,
                "Little rain in the forecast: good window for field work.".to_string(),
                InsightSource::WeatherRain,
            ));
        }
    }

    recs
}
