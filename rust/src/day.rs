//! Whole-day feasibility of a teacher set.
//!
//! The operating day is sampled at a fixed step. At each sampled instant the
//! teachers and students whose windows contain it must pass `can_allocate`.

use chrono::NaiveTime;
use std::borrow::Borrow;

use crate::allocation::can_allocate;
use crate::config::CoverageConfig;
use crate::log_debug;
use crate::models::{Available, Student, Teacher};
use crate::window::{add_minutes, hhmm};

/// Sampled instants of the day: `day_start + k * step` while `k * step < day_minutes`.
pub fn sample_instants(config: &CoverageConfig) -> impl Iterator<Item = NaiveTime> + '_ {
    let step = config.sample_step_minutes.max(1) as usize;
    (0..config.day_minutes)
        .step_by(step)
        .map_while(move |offset| add_minutes(config.day_start, offset as i64))
}

/// Positions of the people whose window contains `instant`.
pub fn active_at<P: Available>(people: &[P], instant: NaiveTime) -> Vec<usize> {
    people
        .iter()
        .enumerate()
        .filter(|(_, p)| p.window().contains(instant))
        .map(|(i, _)| i)
        .collect()
}

/// First sampled instant at which `teachers` cannot serve the active students.
///
/// Consecutive instants with identical active sets share one verdict.
pub fn first_infeasible_instant<T, S>(
    students: &[S],
    teachers: &[T],
    config: &CoverageConfig,
) -> Option<NaiveTime>
where
    T: Borrow<Teacher> + Available,
    S: Borrow<Student> + Available,
{
    let mut previous: Option<(Vec<usize>, Vec<usize>)> = None;

    for instant in sample_instants(config) {
        let active_teachers = active_at(teachers, instant);
        let active_students = active_at(students, instant);

        // Only feasible verdicts are remembered, so a repeat means "still feasible".
        if let Some((prev_teachers, prev_students)) = &previous {
            if *prev_teachers == active_teachers && *prev_students == active_students {
                continue;
            }
        }

        let present_teachers: Vec<&Teacher> =
            active_teachers.iter().map(|&i| teachers[i].borrow()).collect();
        let present_students: Vec<&Student> =
            active_students.iter().map(|&i| students[i].borrow()).collect();

        if !can_allocate(&present_teachers, &present_students) {
            log_debug!(
                config.verbosity,
                "      {}: {} teachers cannot serve {} students",
                hhmm(instant),
                present_teachers.len(),
                present_students.len()
            );
            return Some(instant);
        }

        previous = Some((active_teachers, active_students));
    }

    None
}

/// Whether `teachers` can serve the active students at every sampled instant.
pub fn feasible_for_day<T, S>(students: &[S], teachers: &[T], config: &CoverageConfig) -> bool
where
    T: Borrow<Teacher> + Available,
    S: Borrow<Student> + Available,
{
    first_infeasible_instant(students, teachers, config).is_none()
}

/// Borrowed records whose window contains `instant`.
fn present_at<'a, P, R>(people: &'a [P], instant: NaiveTime) -> Vec<&'a R>
where
    P: Borrow<R>,
    R: Available + 'a,
{
    people
        .iter()
        .map(Borrow::<R>::borrow)
        .filter(|p| p.window().contains(instant))
        .collect()
}

/// Instants from `from` to `to` inclusive, `step_minutes` apart, stopping at midnight.
fn instants_between(from: NaiveTime, to: NaiveTime, step_minutes: u32) -> impl Iterator<Item = NaiveTime> {
    let step = step_minutes.max(1) as i64;
    std::iter::successors(Some(from), move |&instant| add_minutes(instant, step))
        .take_while(move |&instant| instant <= to)
}

/// Verdict for the full roster every `interval_minutes`, from day start to day end inclusive.
pub fn availability_report<T, S>(
    students: &[S],
    teachers: &[T],
    config: &CoverageConfig,
    interval_minutes: u32,
) -> Vec<(NaiveTime, bool)>
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    let step = interval_minutes.max(1) as usize;
    (0..=config.day_minutes)
        .step_by(step)
        .map_while(|offset| add_minutes(config.day_start, offset as i64))
        .map(|instant| {
            let present_teachers: Vec<&Teacher> = present_at(teachers, instant);
            let present_students: Vec<&Student> = present_at(students, instant);
            (instant, can_allocate(&present_teachers, &present_students))
        })
        .collect()
}

/// Whether `candidate` could be admitted at each instant from `from` to `to`.
///
/// At every instant the candidate joins the students already present, and the
/// teachers present must still serve all of them. The candidate's own window
/// is not consulted: the caller is asking about the requested range.
pub fn admission_report<T, S>(
    candidate: &Student,
    students: &[S],
    teachers: &[T],
    from: NaiveTime,
    to: NaiveTime,
    interval_minutes: u32,
) -> Vec<(NaiveTime, bool)>
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    instants_between(from, to, interval_minutes)
        .map(|instant| {
            let present_teachers: Vec<&Teacher> = present_at(teachers, instant);
            let mut present_students: Vec<&Student> = present_at(students, instant);
            present_students.push(candidate);
            (instant, can_allocate(&present_teachers, &present_students))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::TimeWindow;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn teacher(name: &str, from: NaiveTime, to: NaiveTime, capacity: u32) -> Teacher {
        Teacher::new(name, TimeWindow::new(from, to), vec![1]).with_maximum_attention(capacity)
    }

    fn student(name: &str, from: NaiveTime, to: NaiveTime, need: u32) -> Student {
        Student::new(name, TimeWindow::new(from, to), 1, need)
    }

    #[test]
    fn test_sample_instants_cover_day() {
        let config = CoverageConfig::default();
        let instants: Vec<NaiveTime> = sample_instants(&config).collect();
        assert_eq!(instants.len(), 660);
        assert_eq!(instants[0], t(9, 0));
        assert_eq!(instants[659], t(19, 59));
    }

    #[test]
    fn test_sample_step() {
        let config = CoverageConfig {
            sample_step_minutes: 30,
            ..CoverageConfig::default()
        };
        let instants: Vec<NaiveTime> = sample_instants(&config).collect();
        assert_eq!(instants.len(), 22);
        assert_eq!(instants[1], t(9, 30));
    }

    #[test]
    fn test_active_at_closed_window() {
        let students = vec![
            student("S1", t(9, 0), t(10, 0), 1),
            student("S2", t(10, 0), t(11, 0), 1),
        ];
        assert_eq!(active_at(&students, t(10, 0)), vec![0, 1]);
        assert_eq!(active_at(&students, t(10, 30)), vec![1]);
        assert!(active_at(&students, t(12, 0)).is_empty());
    }

    #[test]
    fn test_no_students_is_feasible() {
        let config = CoverageConfig::default();
        let none: Vec<Student> = Vec::new();
        let nobody: Vec<Teacher> = Vec::new();
        assert!(feasible_for_day(&none, &nobody, &config));
    }

    #[test]
    fn test_gap_in_teacher_coverage_fails_at_first_uncovered_minute() {
        let config = CoverageConfig::default();
        let students = vec![student("S1", t(10, 0), t(12, 0), 5)];
        let morning = teacher("Morning", t(9, 0), t(11, 0), 15);

        assert_eq!(
            first_infeasible_instant(&students, &[&morning], &config),
            Some(t(11, 1))
        );
    }

    #[test]
    fn test_handover_at_shared_minute_is_covered() {
        let config = CoverageConfig::default();
        let students = vec![student("S1", t(10, 0), t(12, 0), 5)];
        let morning = teacher("Morning", t(9, 0), t(11, 0), 15);
        let afternoon = teacher("Afternoon", t(11, 0), t(20, 0), 15);

        assert!(feasible_for_day(&students, &[&morning, &afternoon], &config));
    }

    #[test]
    fn test_overlapping_students_exceed_capacity() {
        let config = CoverageConfig::default();
        let students = vec![
            student("S1", t(10, 0), t(11, 0), 8),
            student("S2", t(10, 30), t(11, 30), 8),
        ];
        let solo = teacher("Solo", t(9, 0), t(20, 0), 15);

        assert_eq!(
            first_infeasible_instant(&students, &[&solo], &config),
            Some(t(10, 30))
        );
    }

    #[test]
    fn test_sessions_outside_day_are_ignored() {
        let config = CoverageConfig::default();
        let students = vec![student("Late", t(20, 30), t(21, 30), 5)];
        let nobody: Vec<Teacher> = Vec::new();
        assert!(feasible_for_day(&students, &nobody, &config));
    }

    #[test]
    fn test_availability_report_intervals() {
        let config = CoverageConfig::default();
        let students = vec![student("S1", t(10, 0), t(12, 0), 5)];
        let teachers = vec![teacher("Morning", t(9, 0), t(11, 0), 15)];

        let report = availability_report(&students, &teachers, &config, 60);
        assert_eq!(report.len(), 12);
        assert_eq!(report[0], (t(9, 0), true));
        assert_eq!(report[2], (t(11, 0), true));
        assert_eq!(report[3], (t(12, 0), false));
        assert_eq!(report[11], (t(20, 0), true));
    }

    #[test]
    fn test_admission_respects_capacity_and_presence() {
        let teachers = vec![
            teacher("Morning", t(9, 0), t(12, 0), 10),
            teacher("Evening", t(16, 0), t(20, 0), 10),
        ];
        let students = vec![student("Booked", t(10, 0), t(11, 0), 6)];
        let candidate = student("New", t(9, 0), t(20, 0), 5);

        let report = admission_report(&candidate, &students, &teachers, t(9, 0), t(17, 0), 60);
        let verdicts: Vec<bool> = report.iter().map(|(_, ok)| *ok).collect();
        // 09 free, 10 and 11 full (6 + 5 > 10), 12 still Morning, 13-15 nobody, 16-17 Evening.
        assert_eq!(
            verdicts,
            vec![true, false, false, true, false, false, false, true, true]
        );
        assert_eq!(report[0].0, t(9, 0));
        assert_eq!(report[8].0, t(17, 0));
    }

    #[test]
    fn test_admission_needs_qualified_teacher() {
        let teachers = vec![Teacher::new("Physics", TimeWindow::new(t(9, 0), t(20, 0)), vec![2])];
        let nobody_booked: Vec<Student> = Vec::new();
        let candidate = student("New", t(10, 0), t(11, 0), 1);

        let report = admission_report(&candidate, &nobody_booked, &teachers, t(10, 0), t(10, 30), 15);
        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|(_, ok)| !ok));
    }

    #[test]
    fn test_admission_range_stops_before_midnight() {
        let teachers = vec![teacher("Late", t(22, 0), t(23, 59), 10)];
        let nobody_booked: Vec<Student> = Vec::new();
        let candidate = student("New", t(23, 0), t(23, 30), 1);

        let report = admission_report(&candidate, &nobody_booked, &teachers, t(23, 0), t(23, 59), 30);
        assert_eq!(report, vec![(t(23, 0), true), (t(23, 30), true)]);
    }
}
