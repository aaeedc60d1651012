//! Selection of minimal teacher combinations for the whole day.

use chrono::NaiveTime;
use pyo3::prelude::*;
use std::cmp::Reverse;

use crate::combinations::{masks_of_size, select, NameBits, TeacherMask};
use crate::config::CoverageConfig;
use crate::day::{feasible_for_day, first_infeasible_instant};
use crate::models::{Student, Teacher, TeacherCombination};
use crate::window::hhmm;
use crate::{log_changes, log_checks};

use super::guard::{SearchError, SearchGuard};
use super::pool::map_bounded;

/// Why a selection came out the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageStatus {
    /// At least one combination covers the day.
    Covered,
    /// The roster is empty, so there is nothing to combine.
    NoTeachers,
    /// Even the full roster fails; `first_failure` is the earliest failing instant.
    Uncoverable { first_failure: Option<NaiveTime> },
}

impl CoverageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Covered => "covered",
            Self::NoTeachers => "no_teachers",
            Self::Uncoverable { .. } => "uncoverable",
        }
    }
}

/// Accepted combinations, cheapest total priority first, plus the status.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Selection {
    #[pyo3(get)]
    pub combinations: Vec<TeacherCombination>,
    pub status: CoverageStatus,
}

#[pymethods]
impl Selection {
    pub fn is_covered(&self) -> bool {
        self.status == CoverageStatus::Covered
    }

    #[getter(status)]
    fn py_status(&self) -> &'static str {
        self.status.as_str()
    }

    #[getter]
    fn first_failure(&self) -> Option<NaiveTime> {
        match self.status {
            CoverageStatus::Uncoverable { first_failure } => first_failure,
            _ => None,
        }
    }

    fn __len__(&self) -> usize {
        self.combinations.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Selection(status={}, combinations={})",
            self.status.as_str(),
            self.combinations.len()
        )
    }
}

/// Feasible subsets of an `n`-entry roster that contain no smaller accepted subset.
///
/// Candidates are visited smallest first, in mask order within a size. Each
/// size layer is evaluated on the pool; acceptance is then decided in order,
/// so the result matches a one-by-one scan. Subset tests compare by name.
pub(crate) fn minimal_feasible_masks<F>(
    n: usize,
    names: &NameBits,
    workers: usize,
    guard: &SearchGuard,
    verbosity: u8,
    is_feasible: F,
) -> Result<Vec<TeacherMask>, SearchError>
where
    F: Fn(TeacherMask) -> bool + Sync,
{
    guard.check_roster(n)?;

    let mut accepted: Vec<TeacherMask> = Vec::new();
    for size in 1..=n {
        let candidates: Vec<TeacherMask> = masks_of_size(n, size)
            .into_iter()
            .filter(|&mask| !accepted.iter().any(|&a| names.is_subset(a, mask)))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let verdicts = map_bounded(&candidates, workers, guard, verbosity, |&mask| {
            is_feasible(mask)
        })?;

        for (mask, feasible) in candidates.into_iter().zip(verdicts) {
            if !feasible {
                log_checks!(verbosity, "    Rejected {:#b}: not feasible", mask);
                continue;
            }
            if accepted.iter().any(|&a| names.is_subset(a, mask)) {
                log_checks!(verbosity, "    Rejected {:#b}: contains an accepted combination", mask);
                continue;
            }
            accepted.push(mask);
        }
    }

    Ok(accepted)
}

/// Turn roster masks into owned combinations.
pub(crate) fn to_combinations(teachers: &[Teacher], masks: &[TeacherMask]) -> Vec<TeacherCombination> {
    masks
        .iter()
        .map(|&mask| TeacherCombination::new(select(teachers, mask).into_iter().cloned().collect()))
        .collect()
}

/// Order combinations by total priority, keeping discovery order on ties.
pub(crate) fn sort_by_priority(combinations: &mut [TeacherCombination], descending: bool) {
    if descending {
        combinations.sort_by_key(|c| Reverse(c.total_priority()));
    } else {
        combinations.sort_by_key(|c| c.total_priority());
    }
}

/// Select every minimal teacher combination that covers the whole day.
///
/// A combination is accepted when it passes the day check and does not
/// contain an already accepted combination. The result is ordered by total
/// priority, cheapest first.
pub fn select_combo_for_day(
    students: &[Student],
    teachers: &[Teacher],
    config: &CoverageConfig,
    guard: &SearchGuard,
) -> Result<Selection, SearchError> {
    config.validate()?;
    let verbosity = config.verbosity;

    if teachers.is_empty() {
        log_changes!(verbosity, "No teachers on the roster");
        return Ok(Selection {
            combinations: Vec::new(),
            status: CoverageStatus::NoTeachers,
        });
    }

    // Name bits are one per distinct name, so the ceiling must hold first.
    guard.check_roster(teachers.len())?;
    let names = NameBits::new(teachers.iter().map(|t| t.name.as_str()));
    let masks = minimal_feasible_masks(
        teachers.len(),
        &names,
        config.workers,
        guard,
        verbosity,
        |mask| feasible_for_day(students, &select(teachers, mask), config),
    )?;

    let mut combinations = to_combinations(teachers, &masks);
    sort_by_priority(&mut combinations, false);

    for (i, combo) in combinations.iter().enumerate() {
        log_changes!(
            verbosity,
            "  Combination {}: {} (priority {})",
            i + 1,
            combo.names().join(", "),
            combo.total_priority()
        );
    }

    let status = if combinations.is_empty() {
        let first_failure = first_infeasible_instant(students, teachers, config);
        log_changes!(
            verbosity,
            "No combination covers the day; first failure at {}",
            first_failure.map(hhmm).unwrap_or_else(|| "-".to_string())
        );
        CoverageStatus::Uncoverable { first_failure }
    } else {
        CoverageStatus::Covered
    };

    Ok(Selection {
        combinations,
        status,
    })
}
