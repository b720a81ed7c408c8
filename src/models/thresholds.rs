//! Evaluation thresholds.
//!
//! Two layers, validated once at the boundary:
//! - [`ThresholdOverrides`] — the all-optional payload callers may supply
//!   per request (any present field wins).
//! - [`EvalThresholds`] — the fully resolved profile the rule engine
//!   runs against.
//!
//! # Resolution Order
//! caller overrides > active stored profile > hard-coded defaults.
//! `soil_moisture_field_max` falls back to `soil_moisture_max` when
//! absent at every layer.

use serde::{Deserialize, Serialize};

/// Fully resolved thresholds used by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalThresholds {
    /// Soil moisture floor (%), below which irrigation is advised.
    pub soil_moisture_min: f64,
    /// Soil moisture ceiling (%) for watering/irrigation tasks.
    pub soil_moisture_max: f64,
    /// Soil moisture ceiling (%) for field work (weeding, land-prep,
    /// fertilization).
    pub soil_moisture_field_max: f64,
    /// Temperature floor (°C).
    pub temperature_min: f64,
    /// Temperature ceiling (°C).
    pub temperature_max: f64,
    /// Soft rain threshold (mm/day): blocks rain-sensitive tasks.
    pub rain_mm_min: f64,
    /// Hard rain threshold (mm/day): blocks every task.
    pub rain_mm_heavy: f64,
    /// Hours of sustained saturation treated as waterlogging.
    pub waterlogging_hours: f64,
}

impl Default for EvalThresholds {
    fn default() -> Self {
        Self {
            soil_moisture_min: 15.0,
            soil_moisture_max: 25.0,
            soil_moisture_field_max: 25.0,
            temperature_min: 22.0,
            temperature_max: 32.0,
            rain_mm_min: 2.0,
            rain_mm_heavy: 10.0,
            waterlogging_hours: 24.0,
        }
    }
}

/// Caller-supplied threshold payload; any present field overrides the
/// stored profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    pub soil_moisture_min: Option<f64>,
    pub soil_moisture_max: Option<f64>,
    pub soil_moisture_field_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub rain_mm_min: Option<f64>,
    pub rain_mm_heavy: Option<f64>,
    pub waterlogging_hours: Option<f64>,
}

impl ThresholdOverrides {
    /// Whether any numeric field is present.
    pub fn is_empty(&self) -> bool {
        self.soil_moisture_min.is_none()
            && self.soil_moisture_max.is_none()
            && self.soil_moisture_field_max.is_none()
            && self.temperature_min.is_none()
            && self.temperature_max.is_none()
            && self.rain_mm_min.is_none()
            && self.rain_mm_heavy.is_none()
            && self.waterlogging_hours.is_none()
    }

    /// Applies present fields on top of `base`.
    pub fn apply(&self, base: &EvalThresholds) -> EvalThresholds {
        let soil_moisture_max = self.soil_moisture_max.unwrap_or(base.soil_moisture_max);
        EvalThresholds {
            soil_moisture_min: self.soil_moisture_min.unwrap_or(base.soil_moisture_min),
            soil_moisture_max,
            // Field limit follows the irrigation limit unless explicitly set.
            soil_moisture_field_max: self.soil_moisture_field_max.unwrap_or(soil_moisture_max),
            temperature_min: self.temperature_min.unwrap_or(base.temperature_min),
            temperature_max: self.temperature_max.unwrap_or(base.temperature_max),
            rain_mm_min: self.rain_mm_min.unwrap_or(base.rain_mm_min),
            rain_mm_heavy: self.rain_mm_heavy.unwrap_or(base.rain_mm_heavy),
            waterlogging_hours: self.waterlogging_hours.unwrap_or(base.waterlogging_hours),
        }
    }
}

/// Resolves the effective thresholds from the caller payload and the
/// active stored profile.
///
/// Precedence: caller overrides > stored profile > defaults. Earlier
/// variants of this logic gave the stored profile precedence; the payload
/// now wins.
pub fn resolve_thresholds(
    overrides: Option<&ThresholdOverrides>,
    stored: Option<&ThresholdOverrides>,
) -> EvalThresholds {
    let defaults = EvalThresholds::default();
    let base = match stored {
        Some(profile) => profile.apply(&defaults),
        None => defaults,
    };
    match overrides {
        Some(payload) if !payload.is_empty() => payload.apply(&base),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = EvalThresholds::default();
        assert_eq!(t.soil_moisture_max, 25.0);
        assert_eq!(t.soil_moisture_field_max, 25.0);
        assert_eq!(t.rain_mm_heavy, 10.0);
    }

    #[test]
    fn test_field_max_follows_moisture_max() {
        let overrides = ThresholdOverrides {
            soil_moisture_max: Some(30.0),
            ..Default::default()
        };
        let resolved = overrides.apply(&EvalThresholds::default());
        assert_eq!(resolved.soil_moisture_max, 30.0);
        assert_eq!(resolved.soil_moisture_field_max, 30.0);
    }

    #[test]
    fn test_caller_beats_stored_beats_defaults() {
        let stored = ThresholdOverrides {
            temperature_max: Some(35.0),
            soil_moisture_max: Some(40.0),
            ..Default::default()
        };
        let caller = ThresholdOverrides {
            soil_moisture_max: Some(20.0),
            ..Default::default()
        };
        let resolved = resolve_thresholds(Some(&caller), Some(&stored));
        assert_eq!(resolved.soil_moisture_max, 20.0); // caller
        assert_eq!(resolved.temperature_max, 35.0); // stored
        assert_eq!(resolved.rain_mm_min, 2.0); // default
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let resolved = resolve_thresholds(Some(&ThresholdOverrides::default()), None);
        assert_eq!(resolved, EvalThresholds::default());
    }
}
