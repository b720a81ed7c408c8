//! Worker roster model.
//!
//! Read-only roster consumed by the assigner; only active workers with
//! the field-worker role receive tasks.

use serde::{Deserialize, Serialize};

/// Role eligible for task assignment.
pub const FIELD_WORKER_ROLE: &str = "Field Worker";

/// A farm worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker identifier.
    pub id: String,
    /// Display name (assignment order is name-sorted).
    pub name: String,
    /// Worker role; only [`FIELD_WORKER_ROLE`] is assignable.
    pub role: String,
    /// Inactive workers are skipped.
    pub active: bool,
}

impl Worker {
    /// Creates an active field worker.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: FIELD_WORKER_ROLE.to_string(),
            active: true,
        }
    }

    /// Sets the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Marks the worker inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this worker can receive task assignments.
    pub fn is_assignable(&self) -> bool {
        self.active && self.role == FIELD_WORKER_ROLE
    }
}

/// A crop plot (read-only input to the evaluation job).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    /// Unique plot identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sensor device serving this plot, if any.
    pub device_id: Option<String>,
}

impl Plot {
    /// Creates a plot without a sensor device.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_id: None,
        }
    }

    /// Sets the sensor device.
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}
