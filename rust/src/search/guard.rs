//! Limits on the exhaustive combination search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{ConfigError, CoverageConfig, MASK_WIDTH_LIMIT};

/// Errors that stop a search before it produces a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Roster of {count} teachers exceeds the search limit of {limit}")]
    TooManyTeachers { count: usize, limit: usize },
    #[error("Search cancelled")]
    Cancelled,
    #[error("Search exceeded its time budget of {0} ms")]
    DeadlineExceeded(u64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Roster ceiling, optional deadline and optional cancel flag for one search call.
///
/// Polled between work items; a single item is never interrupted.
#[derive(Clone, Debug)]
pub struct SearchGuard {
    max_teachers: usize,
    deadline: Option<(Instant, u64)>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchGuard {
    pub fn new(max_teachers: usize) -> Self {
        Self {
            max_teachers: max_teachers.min(MASK_WIDTH_LIMIT),
            deadline: None,
            cancel: None,
        }
    }

    /// Guard with the config's ceiling; the time budget starts now.
    pub fn from_config(config: &CoverageConfig) -> Self {
        let guard = Self::new(config.max_teachers);
        match config.time_budget_ms {
            Some(ms) => guard.with_time_budget(ms),
            None => guard,
        }
    }

    pub fn with_time_budget(mut self, budget_ms: u64) -> Self {
        self.deadline = Some((Instant::now() + Duration::from_millis(budget_ms), budget_ms));
        self
    }

    /// Share a flag another thread can set to stop the search.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn max_teachers(&self) -> usize {
        self.max_teachers
    }

    /// Refuse rosters the exhaustive search must not attempt.
    pub fn check_roster(&self, count: usize) -> Result<(), SearchError> {
        if count > self.max_teachers {
            return Err(SearchError::TooManyTeachers {
                count,
                limit: self.max_teachers,
            });
        }
        Ok(())
    }

    /// Fail if cancellation was requested or the deadline has passed.
    pub fn check(&self) -> Result<(), SearchError> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(SearchError::Cancelled);
            }
        }
        if let Some((deadline, budget_ms)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SearchError::DeadlineExceeded(budget_ms));
            }
        }
        Ok(())
    }
}

impl Default for SearchGuard {
    fn default() -> Self {
        Self::from_config(&CoverageConfig::default())
    }
}
