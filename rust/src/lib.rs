//! Teacher coverage engine for a day of lesson sessions.
//!
//! This module provides the allocation check, the whole-day combination
//! selector and the per-slot schedule matrix, plus Python bindings for the
//! loader and exporter that surround them.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveTime;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

pub mod allocation;
pub mod combinations;
mod config;
pub mod day;
pub mod logging;
mod models;
pub mod records;
pub mod search;
pub mod subjects;
pub mod window;

pub use allocation::{allocate, can_allocate, working_teachers, Allocation, AllocationReport};
pub use config::{ConfigError, CoverageConfig, MASK_WIDTH_LIMIT};
pub use day::{admission_report, availability_report, feasible_for_day, first_infeasible_instant};
pub use models::{
    Available, Student, SubjectId, Teacher, TeacherCombination, DEFAULT_MAXIMUM_ATTENTION,
    DEFAULT_NEED, DEFAULT_PRIORITY,
};
pub use records::{
    check_student, check_teacher, load_students, load_teachers, parse_student_row,
    parse_teacher_row, parse_time_of_day, RowError, StudentRow, TeacherRow,
};
pub use search::{
    generate_matrix, select_combo_for_day, CoverageStatus, ScheduleMatrix, SearchError,
    SearchGuard, Selection, SlotColumn, SlotStatus,
};
pub use subjects::SubjectCatalog;
pub use window::TimeWindow;

fn search_error_to_py(err: SearchError) -> PyErr {
    match err {
        SearchError::InvalidConfig(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn checked_config(config: Option<CoverageConfig>) -> PyResult<CoverageConfig> {
    let config = config.unwrap_or_default();
    config
        .validate()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(config)
}

/// Check whether the teachers can serve every student at once.
///
/// # Returns
/// * True when the greedy allocation places every student
#[pyfunction]
#[pyo3(name = "can_allocate")]
fn py_can_allocate(teachers: Vec<Teacher>, students: Vec<Student>) -> bool {
    can_allocate(&teachers, &students)
}

/// Run the greedy allocation and report who serves whom.
#[pyfunction]
fn allocate_students(teachers: Vec<Teacher>, students: Vec<Student>) -> AllocationReport {
    let allocation = allocate(&teachers, &students);
    AllocationReport::from_allocation(&teachers, &students, &allocation)
}

/// Teachers who receive at least one student in the greedy allocation.
#[pyfunction]
#[pyo3(name = "working_teachers")]
fn py_working_teachers(teachers: Vec<Teacher>, students: Vec<Student>) -> Vec<Teacher> {
    working_teachers(&teachers, &students)
        .into_iter()
        .cloned()
        .collect()
}

/// Check at each interval whether one more student could be admitted.
///
/// # Returns
/// * List of (time, admissible) pairs from `start` to `end` inclusive
///
/// # Raises
/// * ValueError if `interval_minutes` is zero
#[pyfunction]
#[pyo3(name = "admission_report", signature = (candidate, students, teachers, start, end, interval_minutes=30))]
fn py_admission_report(
    py: Python<'_>,
    candidate: Student,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    start: NaiveTime,
    end: NaiveTime,
    interval_minutes: u32,
) -> PyResult<Vec<(NaiveTime, bool)>> {
    if interval_minutes == 0 {
        return Err(PyValueError::new_err("interval_minutes must be positive"));
    }
    Ok(py.allow_threads(|| {
        admission_report(&candidate, &students, &teachers, start, end, interval_minutes)
    }))
}

/// Check whether the teachers cover every sampled instant of the day.
///
/// # Raises
/// * ValueError if the configuration is invalid
#[pyfunction]
#[pyo3(name = "feasible_for_day", signature = (students, teachers, config=None))]
fn py_feasible_for_day(
    py: Python<'_>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    config: Option<CoverageConfig>,
) -> PyResult<bool> {
    let config = checked_config(config)?;
    Ok(py.allow_threads(|| feasible_for_day(&students, &teachers, &config)))
}

/// Feasibility of the full roster every `interval_minutes` across the day.
///
/// # Returns
/// * List of (time, feasible) pairs from day start to day end inclusive
#[pyfunction]
#[pyo3(name = "availability_report", signature = (students, teachers, interval_minutes=30, config=None))]
fn py_availability_report(
    py: Python<'_>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    interval_minutes: u32,
    config: Option<CoverageConfig>,
) -> PyResult<Vec<(NaiveTime, bool)>> {
    if interval_minutes == 0 {
        return Err(PyValueError::new_err("interval_minutes must be positive"));
    }
    let config = checked_config(config)?;
    Ok(py.allow_threads(|| availability_report(&students, &teachers, &config, interval_minutes)))
}

/// Select every minimal teacher combination covering the day.
///
/// # Returns
/// * Selection with combinations sorted by total priority (cheapest first)
///
/// # Raises
/// * ValueError if the configuration is invalid
/// * RuntimeError if the roster is too large or the time budget runs out
#[pyfunction]
#[pyo3(name = "select_combo_for_day", signature = (students, teachers, config=None))]
fn py_select_combo_for_day(
    py: Python<'_>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    config: Option<CoverageConfig>,
) -> PyResult<Selection> {
    let config = config.unwrap_or_default();
    py.allow_threads(|| {
        let guard = SearchGuard::from_config(&config);
        select_combo_for_day(&students, &teachers, &config, &guard)
    })
    .map_err(search_error_to_py)
}

/// Build the per-slot combination matrix for the day.
///
/// # Raises
/// * ValueError if the configuration is invalid
/// * RuntimeError if a slot has too many teachers or the time budget runs out
#[pyfunction]
#[pyo3(name = "generate_matrix", signature = (students, teachers, config=None))]
fn py_generate_matrix(
    py: Python<'_>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    config: Option<CoverageConfig>,
) -> PyResult<ScheduleMatrix> {
    let config = config.unwrap_or_default();
    py.allow_threads(|| {
        let guard = SearchGuard::from_config(&config);
        generate_matrix(&students, &teachers, &config, &guard)
    })
    .map_err(search_error_to_py)
}

/// Parse `HH:MM`, `HH:MM:SS`, `HH.MM` or `HHMM`.
///
/// # Raises
/// * ValueError if the text is not a time of day
#[pyfunction]
#[pyo3(name = "parse_time_of_day")]
fn py_parse_time_of_day(text: &str) -> PyResult<NaiveTime> {
    parse_time_of_day(text).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Turn raw teacher rows into teachers, skipping invalid rows and repeated names.
#[pyfunction]
#[pyo3(signature = (rows, catalog=None))]
fn load_teacher_rows(rows: Vec<TeacherRow>, catalog: Option<SubjectCatalog>) -> Vec<Teacher> {
    load_teachers(&rows, &catalog.unwrap_or_default())
}

/// Turn raw student rows into students, skipping invalid rows.
#[pyfunction]
#[pyo3(signature = (rows, catalog=None))]
fn load_student_rows(rows: Vec<StudentRow>, catalog: Option<SubjectCatalog>) -> Vec<Student> {
    load_students(&rows, &catalog.unwrap_or_default())
}

/// The lesson_cover.engine Python module.
#[pymodule]
fn engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Teacher>()?;
    m.add_class::<Student>()?;
    m.add_class::<TeacherCombination>()?;
    m.add_class::<AllocationReport>()?;
    m.add_class::<Selection>()?;
    m.add_class::<ScheduleMatrix>()?;

    // Loader types
    m.add_class::<TeacherRow>()?;
    m.add_class::<StudentRow>()?;
    m.add_class::<SubjectCatalog>()?;

    // Config types
    m.add_class::<CoverageConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_can_allocate, m)?)?;
    m.add_function(wrap_pyfunction!(allocate_students, m)?)?;
    m.add_function(wrap_pyfunction!(py_working_teachers, m)?)?;
    m.add_function(wrap_pyfunction!(py_admission_report, m)?)?;
    m.add_function(wrap_pyfunction!(py_feasible_for_day, m)?)?;
    m.add_function(wrap_pyfunction!(py_availability_report, m)?)?;
    m.add_function(wrap_pyfunction!(py_select_combo_for_day, m)?)?;
    m.add_function(wrap_pyfunction!(py_generate_matrix, m)?)?;

    // Loader helpers
    m.add_function(wrap_pyfunction!(py_parse_time_of_day, m)?)?;
    m.add_function(wrap_pyfunction!(load_teacher_rows, m)?)?;
    m.add_function(wrap_pyfunction!(load_student_rows, m)?)?;

    Ok(())
}
