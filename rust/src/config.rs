//! Configuration types for the coverage engine.

use chrono::NaiveTime;
use pyo3::prelude::*;
use thiserror::Error;

use crate::window::{add_minutes, hhmm};

/// Combinations are held as 64-bit masks, one bit per roster entry.
pub const MASK_WIDTH_LIMIT: usize = 63;

/// Reasons a configuration is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("max_teachers {requested} exceeds the supported limit of {limit}")]
    CeilingTooHigh { requested: usize, limit: usize },
    #[error("operating day starting at {0} must end before midnight")]
    PastMidnight(String),
}

/// Configuration for day sampling, matrix slots and combinatorial search.
#[pyclass]
#[derive(Clone, Debug)]
pub struct CoverageConfig {
    /// Start of the operating day.
    #[pyo3(get, set)]
    pub day_start: NaiveTime,
    /// Length of the operating day in minutes.
    #[pyo3(get, set)]
    pub day_minutes: u32,
    /// Distance between sampled instants of the day check.
    #[pyo3(get, set)]
    pub sample_step_minutes: u32,
    /// Width of one schedule matrix column.
    #[pyo3(get, set)]
    pub slot_minutes: u32,
    /// Largest roster the exhaustive search accepts.
    #[pyo3(get, set)]
    pub max_teachers: usize,
    /// Worker threads for candidate and slot evaluation (1 = sequential).
    #[pyo3(get, set)]
    pub workers: usize,
    /// Wall-clock budget for one search call.
    #[pyo3(get, set)]
    pub time_budget_ms: Option<u64>,
    /// Matrix legend lists the highest total priority first.
    #[pyo3(get, set)]
    pub matrix_descending: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            day_minutes: 660,
            sample_step_minutes: 1,
            slot_minutes: 15,
            max_teachers: 20,
            workers: 4,
            time_budget_ms: None,
            matrix_descending: true,
            verbosity: 0,
        }
    }
}

impl CoverageConfig {
    /// End of the operating day (`day_start + day_minutes`).
    pub fn day_end(&self) -> Option<NaiveTime> {
        add_minutes(self.day_start, self.day_minutes as i64)
    }

    /// Number of matrix columns: `ceil(day_minutes / slot_minutes)`.
    pub fn slot_count(&self) -> usize {
        if self.slot_minutes == 0 {
            return 0;
        }
        self.day_minutes.div_ceil(self.slot_minutes) as usize
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_minutes == 0 {
            return Err(ConfigError::NotPositive("day_minutes"));
        }
        if self.sample_step_minutes == 0 {
            return Err(ConfigError::NotPositive("sample_step_minutes"));
        }
        if self.slot_minutes == 0 {
            return Err(ConfigError::NotPositive("slot_minutes"));
        }
        if self.workers == 0 {
            return Err(ConfigError::NotPositive("workers"));
        }
        if self.max_teachers > MASK_WIDTH_LIMIT {
            return Err(ConfigError::CeilingTooHigh {
                requested: self.max_teachers,
                limit: MASK_WIDTH_LIMIT,
            });
        }
        // The last slot may run past day_end, so bound it rather than the day itself.
        let last_slot_end = self.slot_count() as i64 * self.slot_minutes as i64;
        if self.day_end().is_none() || add_minutes(self.day_start, last_slot_end).is_none() {
            return Err(ConfigError::PastMidnight(hhmm(self.day_start)));
        }
        Ok(())
    }
}

#[pymethods]
impl CoverageConfig {
    #[new]
    #[pyo3(signature = (
        day_start=None,
        day_minutes=None,
        sample_step_minutes=None,
        slot_minutes=None,
        max_teachers=None,
        workers=None,
        time_budget_ms=None,
        matrix_descending=None,
        verbosity=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        day_start: Option<NaiveTime>,
        day_minutes: Option<u32>,
        sample_step_minutes: Option<u32>,
        slot_minutes: Option<u32>,
        max_teachers: Option<usize>,
        workers: Option<usize>,
        time_budget_ms: Option<u64>,
        matrix_descending: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            day_start: day_start.unwrap_or(defaults.day_start),
            day_minutes: day_minutes.unwrap_or(defaults.day_minutes),
            sample_step_minutes: sample_step_minutes.unwrap_or(defaults.sample_step_minutes),
            slot_minutes: slot_minutes.unwrap_or(defaults.slot_minutes),
            max_teachers: max_teachers.unwrap_or(defaults.max_teachers),
            workers: workers.unwrap_or(defaults.workers),
            time_budget_ms,
            matrix_descending: matrix_descending.unwrap_or(defaults.matrix_descending),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CoverageConfig(day_start={}, day_minutes={}, slot_minutes={}, max_teachers={}, workers={})",
            hhmm(self.day_start),
            self.day_minutes,
            self.slot_minutes,
            self.max_teachers,
            self.workers
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_day() {
        let config = CoverageConfig::default();
        assert_eq!(config.day_end(), NaiveTime::from_hms_opt(20, 0, 0));
        assert_eq!(config.slot_count(), 44);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_slot_count_rounds_up() {
        let config = CoverageConfig {
            day_minutes: 50,
            slot_minutes: 15,
            ..CoverageConfig::default()
        };
        assert_eq!(config.slot_count(), 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_step = CoverageConfig {
            sample_step_minutes: 0,
            ..CoverageConfig::default()
        };
        assert_eq!(
            zero_step.validate(),
            Err(ConfigError::NotPositive("sample_step_minutes"))
        );

        let too_wide = CoverageConfig {
            max_teachers: 64,
            ..CoverageConfig::default()
        };
        assert_eq!(
            too_wide.validate(),
            Err(ConfigError::CeilingTooHigh {
                requested: 64,
                limit: MASK_WIDTH_LIMIT
            })
        );

        let past_midnight = CoverageConfig {
            day_start: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            day_minutes: 50,
            slot_minutes: 15,
            ..CoverageConfig::default()
        };
        // 23:00 + 4 slots of 15 minutes reaches 24:00
        assert_eq!(
            past_midnight.validate(),
            Err(ConfigError::PastMidnight("23:00".to_string()))
        );
    }
}
