//! Hourly forecast points and the daily rain calendar.
//!
//! The rain calendar aggregates an hourly feed into a per-day rainfall
//! lookup: rain is summed per day, temperature is averaged. It is built
//! fresh per evaluation call and never persisted.
//!
//! # Fail-Open Lookups
//! Missing dates read as 0.0 mm — an absent or failed forecast must never
//! block evaluation.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One hourly forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Sample time.
    pub time: NaiveDateTime,
    /// Rainfall during the hour (mm).
    pub rain_mm: f64,
    /// Air temperature (°C), if the feed provides it.
    pub temperature: Option<f64>,
}

impl ForecastPoint {
    /// Creates a rain-only sample.
    pub fn new(time: NaiveDateTime, rain_mm: f64) -> Self {
        Self {
            time,
            rain_mm,
            temperature: None,
        }
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Per-day weather aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DayAggregate {
    rain_mm: f64,
    temp_sum: f64,
    temp_samples: u32,
}

/// Daily rainfall lookup built from hourly forecast points.
#[derive(Debug, Clone, Default)]
pub struct RainCalendar {
    days: BTreeMap<NaiveDate, DayAggregate>,
}

impl RainCalendar {
    /// An empty calendar (every lookup reads 0.0).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a calendar from hourly points, summing rain and averaging
    /// temperature per day.
    pub fn from_hourly(points: &[ForecastPoint]) -> Self {
        let mut days: BTreeMap<NaiveDate, DayAggregate> = BTreeMap::new();
        for point in points {
            let entry = days.entry(point.time.date()).or_default();
            entry.rain_mm += point.rain_mm;
            if let Some(temp) = point.temperature {
                entry.temp_sum += temp;
                entry.temp_samples += 1;
            }
        }
        Self { days }
    }

    /// Builds a calendar directly from daily rain totals (feeds that
    /// already aggregate per day).
    pub fn from_daily<I: IntoIterator<Item = (NaiveDate, f64)>>(days: I) -> Self {
        let mut map: BTreeMap<NaiveDate, DayAggregate> = BTreeMap::new();
        for (date, rain_mm) in days {
            map.entry(date).or_default().rain_mm += rain_mm;
        }
        Self { days: map }
    }

    /// Whether the calendar holds any data.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total rainfall on a day (mm); 0.0 for missing dates.
    pub fn rain_on(&self, date: NaiveDate) -> f64 {
        self.days.get(&date).map(|d| d.rain_mm).unwrap_or(0.0)
    }

    /// Total rainfall over `(after, after + days]` (mm).
    ///
    /// Used for the `rain_next_3d` predictor feature.
    pub fn rain_after(&self, after: NaiveDate, days: u32) -> f64 {
        (1..=u64::from(days))
            .filter_map(|offset| after.checked_add_days(Days::new(offset)))
            .map(|d| self.rain_on(d))
            .sum()
    }

    /// Mean temperature on a day (°C), if any sample carried one.
    pub fn temperature_on(&self, date: NaiveDate) -> Option<f64> {
        self.days.get(&date).and_then(|d| {
            (d.temp_samples > 0).then(|| d.temp_sum / f64::from(d.temp_samples))
        })
    }

    /// Mean daily rainfall across all days in the calendar.
    pub fn mean_daily_rain(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        let total: f64 = self.days.values().map(|d| d.rain_mm).sum();
        total / self.days.len() as f64
    }

    /// Days covered by the calendar, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_rain_summed_per_day() {
        let calendar = RainCalendar::from_hourly(&[
            ForecastPoint::new(dt("2026-01-01T06:00:00"), 1.5),
            ForecastPoint::new(dt("2026-01-01T14:00:00"), 2.5),
            ForecastPoint::new(dt("2026-01-02T09:00:00"), 0.5),
        ]);
        assert_eq!(calendar.rain_on(date("2026-01-01")), 4.0);
        assert_eq!(calendar.rain_on(date("2026-01-02")), 0.5);
    }

    #[test]
    fn test_missing_date_reads_zero() {
        let calendar = RainCalendar::empty();
        assert_eq!(calendar.rain_on(date("2026-01-01")), 0.0);
        assert_eq!(calendar.rain_after(date("2026-01-01"), 3), 0.0);
    }

    #[test]
    fn test_temperature_averaged() {
        let calendar = RainCalendar::from_hourly(&[
            ForecastPoint::new(dt("2026-01-01T06:00:00"), 0.0).with_temperature(24.0),
            ForecastPoint::new(dt("2026-01-01T14:00:00"), 0.0).with_temperature(30.0),
        ]);
        assert_eq!(calendar.temperature_on(date("2026-01-01")), Some(27.0));
        assert_eq!(calendar.temperature_on(date("2026-01-02")), None);
    }

    #[test]
    fn test_rain_after_window() {
        let calendar = RainCalendar::from_hourly(&[
            ForecastPoint::new(dt("2026-01-01T12:00:00"), 9.0), // excluded (day itself)
            ForecastPoint::new(dt("2026-01-02T12:00:00"), 1.0),
            ForecastPoint::new(dt("2026-01-03T12:00:00"), 2.0),
            ForecastPoint::new(dt("2026-01-04T12:00:00"), 3.0),
            ForecastPoint::new(dt("2026-01-05T12:00:00"), 4.0), // excluded (past window)
        ]);
        assert_eq!(calendar.rain_after(date("2026-01-01"), 3), 6.0);
    }

    #[test]
    fn test_dates_ascending() {
        let calendar = RainCalendar::from_daily([
            (date("2026-01-03"), 1.0),
            (date("2026-01-01"), 2.0),
            (date("2026-01-02"), 0.0),
        ]);
        let dates: Vec<NaiveDate> = calendar.dates().collect();
        assert_eq!(
            dates,
            vec![date("2026-01-01"), date("2026-01-02"), date("2026-01-03")]
        );
    }

    #[test]
    fn test_mean_daily_rain() {
        let calendar = RainCalendar::from_hourly(&[
            ForecastPoint::new(dt("2026-01-01T12:00:00"), 4.0),
            ForecastPoint::new(dt("2026-01-02T12:00:00"), 2.0),
        ]);
        assert_eq!(calendar.mean_daily_rain(), 3.0);
        assert_eq!(RainCalendar::empty().mean_daily_rain(), 0.0);
    }
}
