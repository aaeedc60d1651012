//! Greedy allocation of students to teachers.
//!
//! Students are served scarcest subject first, neediest first within a
//! subject tier. Each student goes to the least-loaded qualified teacher
//! (cheaper priority on ties) that still has room. Assignments are never
//! revisited, so this can reject a set that an exact matching would accept.

use pyo3::prelude::*;
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::log_warn;
use crate::models::{Student, SubjectId, Teacher};

/// Outcome of one greedy allocation, by position in the input slices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Student positions assigned to each teacher position.
    pub assignments: Vec<Vec<usize>>,
    /// Committed need-for-attention per teacher position.
    pub loads: Vec<u64>,
    /// Student positions no teacher could take, in service order.
    pub unassigned: Vec<usize>,
}

impl Allocation {
    /// Every student found a teacher.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Number of teachers qualified for each subject requested by `students`.
fn subject_rarity<T, S>(teachers: &[T], students: &[S]) -> FxHashMap<SubjectId, usize>
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    let mut rarity = FxHashMap::default();
    for student in students {
        let subject = student.borrow().subject;
        rarity.entry(subject).or_insert_with(|| {
            teachers
                .iter()
                .filter(|t| Borrow::<Teacher>::borrow(*t).qualifies_for(subject))
                .count()
        });
    }
    rarity
}

/// Assign students to teachers greedily and report the full outcome.
///
/// Load bookkeeping lives in the returned value; inputs are untouched.
pub fn allocate<T, S>(teachers: &[T], students: &[S]) -> Allocation
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    let rarity = subject_rarity(teachers, students);

    let mut order: Vec<usize> = (0..students.len()).collect();
    order.sort_by_key(|&i| {
        let student = students[i].borrow();
        (
            rarity.get(&student.subject).copied().unwrap_or(0),
            Reverse(student.need_for_attention),
        )
    });

    let mut assignments: Vec<Vec<usize>> = vec![Vec::new(); teachers.len()];
    let mut loads: Vec<u64> = vec![0; teachers.len()];
    let mut unassigned = Vec::new();

    for student_idx in order {
        let student = students[student_idx].borrow();
        let need = student.need_for_attention as u64;

        let mut candidates: Vec<usize> = (0..teachers.len())
            .filter(|&t| teachers[t].borrow().qualifies_for(student.subject))
            .collect();
        candidates.sort_by_key(|&t| (loads[t], teachers[t].borrow().priority));

        let chosen = candidates
            .into_iter()
            .find(|&t| loads[t] + need <= teachers[t].borrow().maximum_attention as u64);

        match chosen {
            Some(t) => {
                loads[t] += need;
                assignments[t].push(student_idx);
            }
            None => unassigned.push(student_idx),
        }
    }

    Allocation {
        assignments,
        loads,
        unassigned,
    }
}

/// Whether the greedy assigns every student.
///
/// No students is trivially true; students with no teachers is false.
pub fn can_allocate<T, S>(teachers: &[T], students: &[S]) -> bool
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    if students.is_empty() {
        return true;
    }
    if teachers.is_empty() {
        return false;
    }
    allocate(teachers, students).is_complete()
}

/// Teachers the greedy gives at least one student, in roster order.
pub fn working_teachers<'a, T, S>(teachers: &'a [T], students: &[S]) -> Vec<&'a Teacher>
where
    T: Borrow<Teacher>,
    S: Borrow<Student>,
{
    let allocation = allocate(teachers, students);
    if !allocation.is_complete() {
        log_warn!(
            "{} of {} students could not be allocated",
            allocation.unassigned.len(),
            students.len()
        );
    }
    teachers
        .iter()
        .zip(&allocation.assignments)
        .filter(|(_, assigned)| !assigned.is_empty())
        .map(|(teacher, _)| Borrow::<Teacher>::borrow(teacher))
        .collect()
}

/// Allocation keyed by names, for callers outside Rust.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct AllocationReport {
    #[pyo3(get)]
    pub assignments: HashMap<String, Vec<String>>,
    #[pyo3(get)]
    pub loads: HashMap<String, u64>,
    #[pyo3(get)]
    pub unassigned: Vec<String>,
}

impl AllocationReport {
    pub fn from_allocation(teachers: &[Teacher], students: &[Student], allocation: &Allocation) -> Self {
        let mut assignments = HashMap::new();
        let mut loads = HashMap::new();
        for (t, teacher) in teachers.iter().enumerate() {
            let names = allocation.assignments[t]
                .iter()
                .map(|&s| students[s].name.clone())
                .collect();
            assignments.insert(teacher.name.clone(), names);
            loads.insert(teacher.name.clone(), allocation.loads[t]);
        }
        let unassigned = allocation
            .unassigned
            .iter()
            .map(|&s| students[s].name.clone())
            .collect();
        Self {
            assignments,
            loads,
            unassigned,
        }
    }
}

#[pymethods]
impl AllocationReport {
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "AllocationReport(teachers={}, unassigned={})",
            self.assignments.len(),
            self.unassigned.len()
        )
    }
}
