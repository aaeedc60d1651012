//! Core data types for the coverage engine.

use chrono::NaiveTime;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::hash::{Hash, Hasher};

use crate::records::{check_student, check_teacher};
use crate::window::{hhmm, TimeWindow};

/// Subject identifier (as listed in the subject catalog).
pub type SubjectId = u32;

/// Attention units a teacher can serve at once unless stated otherwise.
pub const DEFAULT_MAXIMUM_ATTENTION: u32 = 15;
/// Priority weight used when the source row leaves it blank.
pub const DEFAULT_PRIORITY: i32 = 1;
/// Need-for-attention used when the source row leaves it blank.
pub const DEFAULT_NEED: u32 = 1;

/// Anything scheduled by an availability window.
pub trait Available {
    fn window(&self) -> &TimeWindow;
}

impl<T: Available + ?Sized> Available for &T {
    fn window(&self) -> &TimeWindow {
        (**self).window()
    }
}

/// A teacher available on the target day.
///
/// Identity is the name: two teachers with the same name compare equal.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Teacher {
    #[pyo3(get, set)]
    pub name: String,
    pub window: TimeWindow,
    #[pyo3(get, set)]
    pub subjects: Vec<SubjectId>,
    /// Cost weight; lower is preferred.
    #[pyo3(get, set)]
    pub priority: i32,
    /// Total need-for-attention this teacher can carry simultaneously.
    #[pyo3(get, set)]
    pub maximum_attention: u32,
}

impl Teacher {
    /// Create a teacher with default priority and capacity.
    pub fn new(name: impl Into<String>, window: TimeWindow, subjects: Vec<SubjectId>) -> Self {
        Self {
            name: name.into(),
            window,
            subjects,
            priority: DEFAULT_PRIORITY,
            maximum_attention: DEFAULT_MAXIMUM_ATTENTION,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_maximum_attention(mut self, maximum_attention: u32) -> Self {
        self.maximum_attention = maximum_attention;
        self
    }

    #[inline]
    pub fn qualifies_for(&self, subject: SubjectId) -> bool {
        self.subjects.contains(&subject)
    }
}

#[pymethods]
impl Teacher {
    #[new]
    #[pyo3(signature = (
        name,
        start,
        end,
        subjects,
        priority=DEFAULT_PRIORITY,
        maximum_attention=DEFAULT_MAXIMUM_ATTENTION
    ))]
    fn py_new(
        name: String,
        start: NaiveTime,
        end: NaiveTime,
        subjects: Vec<SubjectId>,
        priority: i32,
        maximum_attention: u32,
    ) -> PyResult<Self> {
        let teacher = Self {
            name,
            window: TimeWindow::new(start, end),
            subjects,
            priority,
            maximum_attention,
        };
        check_teacher(&teacher).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(teacher)
    }

    #[getter]
    fn start(&self) -> NaiveTime {
        self.window.start
    }

    #[getter]
    fn end(&self) -> NaiveTime {
        self.window.end
    }

    fn __repr__(&self) -> String {
        format!(
            "Teacher(name={:?}, window={}-{}, subjects={:?}, priority={}, maximum_attention={})",
            self.name,
            hhmm(self.window.start),
            hhmm(self.window.end),
            self.subjects,
            self.priority,
            self.maximum_attention
        )
    }
}

impl Available for Teacher {
    fn window(&self) -> &TimeWindow {
        &self.window
    }
}

impl PartialEq for Teacher {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Teacher {}

impl Hash for Teacher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A student session on the target day. One subject, one window.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Student {
    #[pyo3(get, set)]
    pub name: String,
    pub window: TimeWindow,
    #[pyo3(get, set)]
    pub subject: SubjectId,
    #[pyo3(get, set)]
    pub need_for_attention: u32,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        window: TimeWindow,
        subject: SubjectId,
        need_for_attention: u32,
    ) -> Self {
        Self {
            name: name.into(),
            window,
            subject,
            need_for_attention,
        }
    }
}

#[pymethods]
impl Student {
    #[new]
    #[pyo3(signature = (name, start, end, subject, need_for_attention=DEFAULT_NEED))]
    fn py_new(
        name: String,
        start: NaiveTime,
        end: NaiveTime,
        subject: SubjectId,
        need_for_attention: u32,
    ) -> PyResult<Self> {
        let student = Self::new(name, TimeWindow::new(start, end), subject, need_for_attention);
        check_student(&student).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(student)
    }

    #[getter]
    fn start(&self) -> NaiveTime {
        self.window.start
    }

    #[getter]
    fn end(&self) -> NaiveTime {
        self.window.end
    }

    fn __repr__(&self) -> String {
        format!(
            "Student(name={:?}, window={}-{}, subject={}, need_for_attention={})",
            self.name,
            hhmm(self.window.start),
            hhmm(self.window.end),
            self.subject,
            self.need_for_attention
        )
    }
}

impl Available for Student {
    fn window(&self) -> &TimeWindow {
        &self.window
    }
}

/// A set of teachers considered together as one staffing option.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct TeacherCombination {
    #[pyo3(get)]
    pub teachers: Vec<Teacher>,
}

impl TeacherCombination {
    pub fn new(teachers: Vec<Teacher>) -> Self {
        Self { teachers }
    }
}

#[pymethods]
impl TeacherCombination {
    /// Sum of member priorities.
    pub fn total_priority(&self) -> i64 {
        self.teachers.iter().map(|t| t.priority as i64).sum()
    }

    pub fn names(&self) -> Vec<String> {
        self.teachers.iter().map(|t| t.name.clone()).collect()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.teachers.iter().any(|t| t.name == name)
    }

    /// Whether every member of `self` (by name) is also in `other`.
    pub fn is_subset_of(&self, other: &TeacherCombination) -> bool {
        self.teachers.iter().all(|t| other.contains_name(&t.name))
    }

    fn __len__(&self) -> usize {
        self.teachers.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "TeacherCombination(teachers=[{}], total_priority={})",
            self.names().join(", "),
            self.total_priority()
        )
    }
}
