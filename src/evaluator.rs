//! Per-task threshold rules and AI escalation.
//!
//! Pure decision logic: given a task, the resolved sensor values, and
//! the resolved thresholds, compute the rule breaches and the resulting
//! Proceed/Pending/Stop status. Orchestration (reading resolution, safe
//! dates, persistence) lives in the engine.
//!
//! # Stop Buffer
//! A breach whose distance past the limit stays within the stop buffer
//! is soft (Pending); beyond it the breach is hard (Stop). Multiple
//! breaches combine by severity: any hard breach forces Stop.
//!
//! # Missing Inputs
//! A missing sensor value disables the rules that need it (logged at
//! debug), it never fails the evaluation.

use tracing::debug;

use crate::models::{EvalThresholds, ReadingValues, Task, TaskStatus};
use crate::ports::Prediction;

/// Tolerance past a limit separating a soft breach from a hard one.
pub const DEFAULT_STOP_BUFFER: f64 = 10.0;

/// Minimum predictor confidence to escalate all the way to Stop.
pub const DEFAULT_AI_STOP_CONFIDENCE: f64 = 0.70;

/// One rule breach.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBreach {
    /// Pending (soft) or Stop (hard).
    pub severity: TaskStatus,
    /// Human-readable rationale, merged into the task reason.
    pub message: String,
}

/// Combined outcome of the rule checks for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Fused status (worst breach wins; Proceed when no breach).
    pub status: TaskStatus,
    /// All breach messages, in rule order.
    pub reasons: Vec<String>,
}

impl RuleOutcome {
    /// Whether any rule fired.
    pub fn breached(&self) -> bool {
        self.status != TaskStatus::Proceed
    }
}

fn severity_for(delta: f64, stop_buffer: f64) -> TaskStatus {
    if delta > stop_buffer {
        TaskStatus::Stop
    } else {
        TaskStatus::Pending
    }
}

/// Runs the type-specific threshold rules for one task.
pub fn evaluate_rules(
    task: &Task,
    values: &ReadingValues,
    thresholds: &EvalThresholds,
    stop_buffer: f64,
) -> RuleOutcome {
    let mut breaches: Vec<RuleBreach> = Vec::new();

    match values.soil_moisture {
        Some(moisture) => {
            if task.kind.is_irrigation_like() && moisture > thresholds.soil_moisture_max {
                breaches.push(RuleBreach {
                    severity: severity_for(moisture - thresholds.soil_moisture_max, stop_buffer),
                    message: format!(
                        "Soil moisture too high ({moisture} > {}); reschedule watering.",
                        thresholds.soil_moisture_max
                    ),
                });
            }
            if task.kind.is_field_work() && moisture > thresholds.soil_moisture_field_max {
                breaches.push(RuleBreach {
                    severity: severity_for(
                        moisture - thresholds.soil_moisture_field_max,
                        stop_buffer,
                    ),
                    message: format!(
                        "Field too wet ({moisture} > {}); postpone task.",
                        thresholds.soil_moisture_field_max
                    ),
                });
            }
        }
        None => debug!(task_id = %task.id, "no soil moisture value, moisture rules disabled"),
    }

    match values.temperature {
        Some(temperature) => {
            if temperature > thresholds.temperature_max {
                breaches.push(RuleBreach {
                    severity: severity_for(temperature - thresholds.temperature_max, stop_buffer),
                    message: format!(
                        "Temperature too high ({temperature} > {}); avoid field work.",
                        thresholds.temperature_max
                    ),
                });
            } else if temperature < thresholds.temperature_min {
                breaches.push(RuleBreach {
                    severity: severity_for(thresholds.temperature_min - temperature, stop_buffer),
                    message: format!(
                        "Temperature too low ({temperature} < {}); delay task.",
                        thresholds.temperature_min
                    ),
                });
            }
        }
        None => debug!(task_id = %task.id, "no temperature value, temperature rules disabled"),
    }

    RuleOutcome {
        status: TaskStatus::combine(breaches.iter().map(|b| b.severity)),
        reasons: breaches.into_iter().map(|b| b.message).collect(),
    }
}

/// Applies the escalation-only AI rule.
///
/// A predicted label below or equal to the current status is ignored.
/// Escalation to Pending is always accepted; escalation to Stop needs
/// `confidence >= min_stop_confidence`. Returns the new status and the
/// rationale to merge, or `None` when nothing changes.
pub fn apply_ai_escalation(
    current: TaskStatus,
    prediction: &Prediction,
    min_stop_confidence: f64,
) -> Option<(TaskStatus, String)> {
    if prediction.status <= current {
        return None;
    }
    if prediction.status == TaskStatus::Stop && prediction.confidence < min_stop_confidence {
        debug!(
            confidence = prediction.confidence,
            "AI Stop prediction below confidence floor, ignored"
        );
        return None;
    }
    Some((
        prediction.status,
        format!(
            "AI predicts {} (confidence {:.2})",
            prediction.status.as_str(),
            prediction.confidence
        ),
    ))
}
