//! Parsing of loader rows into engine records.
//!
//! The external loader hands over raw cell text. Rows that cannot be turned
//! into a valid record are skipped with a warning and never reach the engine.

use chrono::NaiveTime;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::log_warn;
use crate::models::{Student, SubjectId, Teacher, DEFAULT_NEED, DEFAULT_PRIORITY};
use crate::subjects::SubjectCatalog;
use crate::window::{hhmm, TimeWindow};

/// Reasons a loader row is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Row has no name")]
    MissingName,
    #[error("Unparsable time of day: {0:?}")]
    BadTime(String),
    #[error("Window of {name} does not end after it starts ({start}-{end})")]
    InvertedWindow {
        name: String,
        start: String,
        end: String,
    },
    #[error("Teacher {0} lists no subjects")]
    NoSubjects(String),
    #[error("Unknown subject {subject:?} for {name}")]
    UnknownSubject { name: String, subject: String },
    #[error("Student {0} needs no attention")]
    ZeroNeed(String),
}

/// Parse a time of day written as `HH:MM`, `HH:MM:SS`, `HH.MM` or `HHMM`.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, RowError> {
    let bad = || RowError::BadTime(text.to_string());
    let trimmed = text.trim();

    let normalized = if trimmed.contains('.') && !trimmed.contains(':') {
        trimmed.replace('.', ":")
    } else {
        trimmed.to_string()
    };

    let (hours, minutes, seconds) = if normalized.contains(':') {
        let parts: Vec<&str> = normalized.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(bad());
        }
        let seconds = match parts.get(2) {
            Some(s) => s.trim().parse::<u32>().map_err(|_| bad())?,
            None => 0,
        };
        (
            parts[0].trim().parse::<u32>().map_err(|_| bad())?,
            parts[1].trim().parse::<u32>().map_err(|_| bad())?,
            seconds,
        )
    } else if normalized.len() == 4 && normalized.chars().all(|c| c.is_ascii_digit()) {
        (
            normalized[..2].parse::<u32>().map_err(|_| bad())?,
            normalized[2..].parse::<u32>().map_err(|_| bad())?,
            0,
        )
    } else {
        return Err(bad());
    };

    NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or_else(bad)
}

/// Raw teacher row as delivered by the loader.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct TeacherRow {
    #[pyo3(get, set)]
    pub name: String,
    /// Comma separated subject ids or catalog names.
    #[pyo3(get, set)]
    pub subjects: String,
    #[pyo3(get, set)]
    pub priority: String,
    #[pyo3(get, set)]
    pub start: String,
    #[pyo3(get, set)]
    pub end: String,
}

#[pymethods]
impl TeacherRow {
    #[new]
    #[pyo3(signature = (name, subjects, start, end, priority=String::new()))]
    fn new(name: String, subjects: String, start: String, end: String, priority: String) -> Self {
        Self {
            name,
            subjects,
            priority,
            start,
            end,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TeacherRow(name={:?}, subjects={:?}, start={:?}, end={:?})",
            self.name, self.subjects, self.start, self.end
        )
    }
}

/// Raw student row as delivered by the loader.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct StudentRow {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub subject: String,
    #[pyo3(get, set)]
    pub need: String,
    #[pyo3(get, set)]
    pub start: String,
    #[pyo3(get, set)]
    pub end: String,
}

#[pymethods]
impl StudentRow {
    #[new]
    #[pyo3(signature = (name, subject, start, end, need=String::new()))]
    fn new(name: String, subject: String, start: String, end: String, need: String) -> Self {
        Self {
            name,
            subject,
            need,
            start,
            end,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "StudentRow(name={:?}, subject={:?}, start={:?}, end={:?})",
            self.name, self.subject, self.start, self.end
        )
    }
}

fn check_name(name: &str) -> Result<(), RowError> {
    if name.trim().is_empty() {
        return Err(RowError::MissingName);
    }
    Ok(())
}

fn check_window(name: &str, window: &TimeWindow) -> Result<(), RowError> {
    if window.end <= window.start {
        return Err(RowError::InvertedWindow {
            name: name.to_string(),
            start: hhmm(window.start),
            end: hhmm(window.end),
        });
    }
    Ok(())
}

/// Invariants every teacher must hold before it reaches the engine.
pub fn check_teacher(teacher: &Teacher) -> Result<(), RowError> {
    check_name(&teacher.name)?;
    check_window(&teacher.name, &teacher.window)?;
    if teacher.subjects.is_empty() {
        return Err(RowError::NoSubjects(teacher.name.clone()));
    }
    Ok(())
}

/// Invariants every student must hold before it reaches the engine.
pub fn check_student(student: &Student) -> Result<(), RowError> {
    check_name(&student.name)?;
    check_window(&student.name, &student.window)?;
    if student.need_for_attention == 0 {
        return Err(RowError::ZeroNeed(student.name.clone()));
    }
    Ok(())
}

fn parse_window(start: &str, end: &str) -> Result<TimeWindow, RowError> {
    Ok(TimeWindow::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
}

fn strip_token(token: &str) -> &str {
    token.trim_matches(|c: char| c == '.' || c == ';' || c.is_whitespace())
}

pub fn parse_teacher_row(row: &TeacherRow, catalog: &SubjectCatalog) -> Result<Teacher, RowError> {
    let name = row.name.trim().to_string();
    check_name(&name)?;
    let window = parse_window(&row.start, &row.end)?;

    let mut subjects: Vec<SubjectId> = Vec::new();
    for token in row.subjects.split(',').map(strip_token) {
        if token.is_empty() {
            continue;
        }
        let id = catalog.resolve(token).ok_or_else(|| RowError::UnknownSubject {
            name: name.clone(),
            subject: token.to_string(),
        })?;
        if !subjects.contains(&id) {
            subjects.push(id);
        }
    }

    let priority = row.priority.trim().parse().unwrap_or(DEFAULT_PRIORITY);
    let teacher = Teacher::new(name, window, subjects).with_priority(priority);
    check_teacher(&teacher)?;
    Ok(teacher)
}

pub fn parse_student_row(row: &StudentRow, catalog: &SubjectCatalog) -> Result<Student, RowError> {
    let name = row.name.trim().to_string();
    check_name(&name)?;
    let window = parse_window(&row.start, &row.end)?;

    let token = strip_token(&row.subject);
    let subject = catalog
        .resolve(token)
        .ok_or_else(|| RowError::UnknownSubject {
            name: name.clone(),
            subject: token.to_string(),
        })?;

    // Blank or unparsable need falls back to the default; an explicit zero is rejected.
    let need = row.need.trim().parse().unwrap_or(DEFAULT_NEED);
    let student = Student::new(name, window, subject, need);
    check_student(&student)?;
    Ok(student)
}

/// Parse teacher rows, skipping invalid rows and repeated names (first row wins).
pub fn load_teachers(rows: &[TeacherRow], catalog: &SubjectCatalog) -> Vec<Teacher> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut teachers = Vec::with_capacity(rows.len());

    for (line, row) in rows.iter().enumerate() {
        match parse_teacher_row(row, catalog) {
            Ok(teacher) => {
                if !seen.insert(teacher.name.clone()) {
                    log_warn!("teacher row {}: duplicate name {}, keeping the first", line + 1, teacher.name);
                    continue;
                }
                teachers.push(teacher);
            }
            Err(e) => log_warn!("teacher row {} skipped: {}", line + 1, e),
        }
    }

    teachers
}

/// Parse student rows, skipping invalid rows.
pub fn load_students(rows: &[StudentRow], catalog: &SubjectCatalog) -> Vec<Student> {
    rows.iter()
        .enumerate()
        .filter_map(|(line, row)| match parse_student_row(row, catalog) {
            Ok(student) => Some(student),
            Err(e) => {
                log_warn!("student row {} skipped: {}", line + 1, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn teacher_row(name: &str, subjects: &str, start: &str, end: &str) -> TeacherRow {
        TeacherRow {
            name: name.to_string(),
            subjects: subjects.to_string(),
            priority: String::new(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    fn student_row(name: &str, subject: &str, start: &str, end: &str, need: &str) -> StudentRow {
        StudentRow {
            name: name.to_string(),
            subject: subject.to_string(),
            need: need.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time_of_day("09:30"), Ok(t(9, 30)));
        assert_eq!(parse_time_of_day(" 9:05 "), Ok(t(9, 5)));
        assert_eq!(parse_time_of_day("14:15:00"), Ok(t(14, 15)));
        assert_eq!(parse_time_of_day("10.45"), Ok(t(10, 45)));
        assert_eq!(parse_time_of_day("1830"), Ok(t(18, 30)));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        for text in ["", "noon", "25:00", "12:61", "930", "1:2:3:4"] {
            assert_eq!(
                parse_time_of_day(text),
                Err(RowError::BadTime(text.to_string())),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_teacher_row_subjects_and_defaults() {
        let catalog = SubjectCatalog::default();
        let row = teacher_row("  Anna ", "1, physics; ,3.", "09:00", "17:00");
        let teacher = parse_teacher_row(&row, &catalog).unwrap();

        assert_eq!(teacher.name, "Anna");
        assert_eq!(teacher.subjects, vec![1, 2, 3]);
        assert_eq!(teacher.priority, DEFAULT_PRIORITY);
        assert_eq!(teacher.window, TimeWindow::new(t(9, 0), t(17, 0)));
    }

    #[test]
    fn test_teacher_priority_parsed_or_defaulted() {
        let catalog = SubjectCatalog::default();
        let mut row = teacher_row("Anna", "1", "09:00", "17:00");
        row.priority = " 4 ".to_string();
        assert_eq!(parse_teacher_row(&row, &catalog).unwrap().priority, 4);
        row.priority = "high".to_string();
        assert_eq!(parse_teacher_row(&row, &catalog).unwrap().priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_teacher_row_errors() {
        let catalog = SubjectCatalog::default();
        assert_eq!(
            parse_teacher_row(&teacher_row("", "1", "09:00", "10:00"), &catalog),
            Err(RowError::MissingName)
        );
        assert_eq!(
            parse_teacher_row(&teacher_row("Anna", " ; ", "09:00", "10:00"), &catalog),
            Err(RowError::NoSubjects("Anna".to_string()))
        );
        assert_eq!(
            parse_teacher_row(&teacher_row("Anna", "chemistry", "09:00", "10:00"), &catalog),
            Err(RowError::UnknownSubject {
                name: "Anna".to_string(),
                subject: "chemistry".to_string()
            })
        );
        assert!(matches!(
            parse_teacher_row(&teacher_row("Anna", "1", "12:00", "10:00"), &catalog),
            Err(RowError::InvertedWindow { .. })
        ));
        assert_eq!(
            parse_teacher_row(&teacher_row("Anna", "1", "", "10:00"), &catalog),
            Err(RowError::BadTime(String::new()))
        );
    }

    #[test]
    fn test_student_row() {
        let catalog = SubjectCatalog::default();
        let student = parse_student_row(&student_row("Ivan", "Informatics", "10.00", "1130", "4"), &catalog).unwrap();
        assert_eq!(student.subject, 3);
        assert_eq!(student.need_for_attention, 4);
        assert_eq!(student.window, TimeWindow::new(t(10, 0), t(11, 30)));

        let defaulted = parse_student_row(&student_row("Ivan", "2", "10:00", "11:00", ""), &catalog).unwrap();
        assert_eq!(defaulted.need_for_attention, DEFAULT_NEED);
    }

    #[test]
    fn test_zero_need_rejected() {
        let catalog = SubjectCatalog::default();
        assert_eq!(
            parse_student_row(&student_row("Ivan", "1", "10:00", "11:00", "0"), &catalog),
            Err(RowError::ZeroNeed("Ivan".to_string()))
        );
    }

    #[test]
    fn test_empty_window_rejected() {
        let catalog = SubjectCatalog::default();
        let expected = RowError::InvertedWindow {
            name: "Anna".to_string(),
            start: "10:00".to_string(),
            end: "10:00".to_string(),
        };
        assert_eq!(
            parse_teacher_row(&teacher_row("Anna", "1", "10:00", "10:00"), &catalog),
            Err(expected)
        );
        assert!(matches!(
            parse_student_row(&student_row("Ivan", "1", "10.00", "1000", "2"), &catalog),
            Err(RowError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn test_check_records_directly() {
        let window = TimeWindow::new(t(9, 0), t(12, 0));
        assert!(check_teacher(&Teacher::new("Anna", window, vec![1])).is_ok());
        assert_eq!(
            check_teacher(&Teacher::new("Anna", window, Vec::new())),
            Err(RowError::NoSubjects("Anna".to_string()))
        );
        assert_eq!(
            check_student(&Student::new(" ", window, 1, 1)),
            Err(RowError::MissingName)
        );
        assert_eq!(
            check_student(&Student::new("Ivan", window, 1, 0)),
            Err(RowError::ZeroNeed("Ivan".to_string()))
        );
    }

    #[test]
    fn test_load_skips_bad_rows_and_duplicates() {
        let catalog = SubjectCatalog::default();
        let rows = vec![
            teacher_row("Anna", "1", "09:00", "17:00"),
            teacher_row("Boris", "2", "bad", "17:00"),
            teacher_row("Anna", "2", "12:00", "20:00"),
            teacher_row("Clara", "3", "13:00", "20:00"),
        ];
        let teachers = load_teachers(&rows, &catalog);
        let names: Vec<&str> = teachers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Clara"]);
        assert_eq!(teachers[0].subjects, vec![1]);

        let students = load_students(
            &[
                student_row("Ivan", "1", "10:00", "11:00", "2"),
                student_row("", "1", "10:00", "11:00", "2"),
                student_row("Olga", "biology", "10:00", "11:00", "2"),
            ],
            &catalog,
        );
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Ivan");
    }
}
