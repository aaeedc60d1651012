//! Combination search over teacher rosters.
//!
//! This module provides the whole-day combination selector and the per-slot
//! schedule matrix, both built on the same minimal-subset search and the
//! bounded worker pool.

mod guard;
mod matrix;
mod pool;
mod selector;

pub use guard::{SearchError, SearchGuard};
pub use matrix::{
    generate_matrix, ScheduleMatrix, SlotColumn, SlotStatus, COMBINATIONS_LABEL, HEADER_LABEL,
    NOT_MEMBER, NO_SESSION, NO_VALID_COMBINATIONS,
};
pub use pool::map_bounded;
pub use selector::{select_combo_for_day, CoverageStatus, Selection};
