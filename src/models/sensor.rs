//! Sensor reading snapshot.
//!
//! Read-only output of the external cleaning pipeline. Cleaned values are
//! preferred over raw ones when both are present; the engine owns no
//! lifecycle here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Latest cleaned sensor row for a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorReading {
    /// Source device.
    pub device_id: String,
    /// When the row was recorded.
    pub timestamp: Option<NaiveDateTime>,
    /// Raw temperature (°C).
    pub temperature: Option<f64>,
    /// Raw soil moisture (%).
    pub soil_moisture: Option<f64>,
    /// Cleaned temperature, preferred when present.
    pub cleaned_temperature: Option<f64>,
    /// Cleaned soil moisture, preferred when present.
    pub cleaned_soil_moisture: Option<f64>,
}

impl SensorReading {
    /// Creates an empty reading for a device.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Sets the raw values.
    pub fn with_raw(mut self, temperature: f64, soil_moisture: f64) -> Self {
        self.temperature = Some(temperature);
        self.soil_moisture = Some(soil_moisture);
        self
    }

    /// Sets the cleaned values.
    pub fn with_cleaned(mut self, temperature: f64, soil_moisture: f64) -> Self {
        self.cleaned_temperature = Some(temperature);
        self.cleaned_soil_moisture = Some(soil_moisture);
        self
    }

    /// Effective temperature: cleaned over raw.
    pub fn effective_temperature(&self) -> Option<f64> {
        self.cleaned_temperature.or(self.temperature)
    }

    /// Effective soil moisture: cleaned over raw.
    pub fn effective_soil_moisture(&self) -> Option<f64> {
        self.cleaned_soil_moisture.or(self.soil_moisture)
    }

    /// Whether the reading carries at least one usable value.
    pub fn has_values(&self) -> bool {
        self.effective_temperature().is_some() || self.effective_soil_moisture().is_some()
    }
}

/// Per-request reading payload, taking precedence over the sensor feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingValues {
    /// Soil moisture (%).
    pub soil_moisture: Option<f64>,
    /// Temperature (°C).
    pub temperature: Option<f64>,
}

impl ReadingValues {
    /// Whether any value is present.
    pub fn is_empty(&self) -> bool {
        self.soil_moisture.is_none() && self.temperature.is_none()
    }

    /// Extracts effective values from a sensor row.
    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            soil_moisture: reading.effective_soil_moisture(),
            temperature: reading.effective_temperature(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_preferred_over_raw() {
        let reading = SensorReading::new("DEV205")
            .with_raw(31.0, 44.0)
            .with_cleaned(29.5, 41.0);
        assert_eq!(reading.effective_temperature(), Some(29.5));
        assert_eq!(reading.effective_soil_moisture(), Some(41.0));
    }

    #[test]
    fn test_raw_fallback_when_cleaned_missing() {
        let reading = SensorReading::new("DEV205").with_raw(31.0, 44.0);
        assert_eq!(reading.effective_temperature(), Some(31.0));
        assert_eq!(reading.effective_soil_moisture(), Some(44.0));
    }

    #[test]
    fn test_empty_reading_has_no_values() {
        let reading = SensorReading::new("DEV205");
        assert!(!reading.has_values());
        assert!(ReadingValues::from_reading(&reading).is_empty());
    }
}
