//! Per-slot coverage matrix.
//!
//! The day is cut into fixed-width slots and every slot gets its own
//! minimal combination search over the teachers present for the whole slot.
//! Slots are independent, so they are evaluated on the worker pool.

use chrono::NaiveTime;
use pyo3::prelude::*;

use crate::allocation::can_allocate;
use crate::combinations::{select, NameBits};
use crate::config::{ConfigError, CoverageConfig};
use crate::models::{Student, Teacher, TeacherCombination};
use crate::window::{add_minutes, hhmm};
use crate::{log_changes, log_debug};

use super::guard::{SearchError, SearchGuard};
use super::pool::map_bounded;
use super::selector::{minimal_feasible_masks, sort_by_priority, to_combinations};

pub const HEADER_LABEL: &str = "Teachers/Time";
pub const COMBINATIONS_LABEL: &str = "Combinations";
pub const NOT_MEMBER: &str = "0";
pub const NO_SESSION: &str = "-";
pub const NO_VALID_COMBINATIONS: &str = "No valid combinations";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    /// No student overlaps the slot.
    NoSession,
    /// Students are present but no combination of present teachers serves them.
    Uncovered,
    Covered,
}

/// One matrix column.
#[derive(Clone, Debug)]
pub struct SlotColumn {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: SlotStatus,
    /// Accepted combinations in legend order.
    pub combinations: Vec<TeacherCombination>,
    /// 1-based legend indices per roster position.
    pub memberships: Vec<Vec<usize>>,
}

impl SlotColumn {
    pub fn label(&self) -> String {
        format!("{}-{}", hhmm(self.start), hhmm(self.end))
    }

    /// Cell text for the teacher at roster position `teacher`.
    pub fn cell(&self, teacher: usize) -> String {
        match self.memberships.get(teacher) {
            Some(indices) if !indices.is_empty() => indices
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(","),
            _ => NOT_MEMBER.to_string(),
        }
    }

    /// Text of the synthetic combinations row.
    pub fn legend(&self) -> String {
        match self.status {
            SlotStatus::NoSession => NO_SESSION.to_string(),
            SlotStatus::Uncovered => NO_VALID_COMBINATIONS.to_string(),
            SlotStatus::Covered => self
                .combinations
                .iter()
                .enumerate()
                .map(|(i, combo)| format!("{}: {}", i + 1, combo.names().join(", ")))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Teacher-by-slot combination memberships for one day.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ScheduleMatrix {
    #[pyo3(get)]
    pub teacher_names: Vec<String>,
    pub slots: Vec<SlotColumn>,
}

impl ScheduleMatrix {
    /// Slots for which no combination was found although students were present.
    pub fn uncovered_slots(&self) -> impl Iterator<Item = &SlotColumn> {
        self.slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Uncovered)
    }
}

#[pymethods]
impl ScheduleMatrix {
    fn __len__(&self) -> usize {
        self.slots.len()
    }

    /// Slot labels in column order.
    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(SlotColumn::label).collect()
    }

    /// Combination legend per slot.
    pub fn legends(&self) -> Vec<String> {
        self.slots.iter().map(SlotColumn::legend).collect()
    }

    /// Render the exportable grid.
    ///
    /// Row 0 is the header, then one row per teacher in roster order, then
    /// the combinations row. Column 0 holds the row labels.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.teacher_names.len() + 2);

        let mut header = Vec::with_capacity(self.slots.len() + 1);
        header.push(HEADER_LABEL.to_string());
        header.extend(self.labels());
        grid.push(header);

        for (t, name) in self.teacher_names.iter().enumerate() {
            let mut row = Vec::with_capacity(self.slots.len() + 1);
            row.push(name.clone());
            row.extend(self.slots.iter().map(|slot| slot.cell(t)));
            grid.push(row);
        }

        let mut legend = Vec::with_capacity(self.slots.len() + 1);
        legend.push(COMBINATIONS_LABEL.to_string());
        legend.extend(self.legends());
        grid.push(legend);

        grid
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleMatrix(teachers={}, slots={}, uncovered={})",
            self.teacher_names.len(),
            self.slots.len(),
            self.uncovered_slots().count()
        )
    }
}

fn evaluate_slot(
    index: usize,
    students: &[Student],
    teachers: &[Teacher],
    config: &CoverageConfig,
    guard: &SearchGuard,
) -> Result<SlotColumn, SearchError> {
    let offset = index as i64 * config.slot_minutes as i64;
    let (start, end) = match (
        add_minutes(config.day_start, offset),
        add_minutes(config.day_start, offset + config.slot_minutes as i64),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ConfigError::PastMidnight(hhmm(config.day_start)).into())
        }
    };

    let present_students: Vec<&Student> = students
        .iter()
        .filter(|s| s.window.overlaps_slot(start, end))
        .collect();

    if present_students.is_empty() {
        return Ok(SlotColumn {
            start,
            end,
            status: SlotStatus::NoSession,
            combinations: Vec::new(),
            memberships: vec![Vec::new(); teachers.len()],
        });
    }

    let present_teachers: Vec<Teacher> = teachers
        .iter()
        .filter(|t| t.window.covers_slot(start, end))
        .cloned()
        .collect();

    guard.check_roster(present_teachers.len())?;
    let names = NameBits::new(present_teachers.iter().map(|t| t.name.as_str()));
    // Slots already run in parallel, so each slot searches sequentially.
    let masks = minimal_feasible_masks(
        present_teachers.len(),
        &names,
        1,
        guard,
        config.verbosity,
        |mask| can_allocate(&select(&present_teachers, mask), &present_students),
    )?;

    let mut combinations = to_combinations(&present_teachers, &masks);
    sort_by_priority(&mut combinations, config.matrix_descending);

    let memberships = teachers
        .iter()
        .map(|teacher| {
            combinations
                .iter()
                .enumerate()
                .filter(|(_, combo)| combo.contains_name(&teacher.name))
                .map(|(i, _)| i + 1)
                .collect()
        })
        .collect();

    let status = if combinations.is_empty() {
        SlotStatus::Uncovered
    } else {
        SlotStatus::Covered
    };

    log_debug!(
        config.verbosity,
        "    Slot {}-{}: {} students, {} teachers, {} combinations",
        hhmm(start),
        hhmm(end),
        present_students.len(),
        present_teachers.len(),
        combinations.len()
    );

    Ok(SlotColumn {
        start,
        end,
        status,
        combinations,
        memberships,
    })
}

/// Build the per-slot combination matrix for the day.
///
/// A student is present in a slot when its window overlaps the slot; a
/// teacher only when its window covers the slot entirely. Each slot keeps its
/// own redundancy set and legend order.
pub fn generate_matrix(
    students: &[Student],
    teachers: &[Teacher],
    config: &CoverageConfig,
    guard: &SearchGuard,
) -> Result<ScheduleMatrix, SearchError> {
    config.validate()?;

    let indices: Vec<usize> = (0..config.slot_count()).collect();
    let columns = map_bounded(&indices, config.workers, guard, config.verbosity, |&i| {
        evaluate_slot(i, students, teachers, config, guard)
    })?;
    let slots = columns.into_iter().collect::<Result<Vec<_>, _>>()?;

    for slot in slots.iter().filter(|s| s.status == SlotStatus::Uncovered) {
        log_changes!(config.verbosity, "  Slot {} is not covered", slot.label());
    }

    Ok(ScheduleMatrix {
        teacher_names: teachers.iter().map(|t| t.name.clone()).collect(),
        slots,
    })
}
