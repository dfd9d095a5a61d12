//! Grid composition: assignments onto the slot axis.
//!
//! Produces, for one day, a render plan with one cell per flattened slot.
//! Each cell is an origin (an assignment starts here and spans one or more
//! slots), covered (subsumed by an earlier origin's span), or empty.
//!
//! # Algorithm
//!
//! 1. Keep the day's assignments, ordered by id.
//! 2. Resolve each assignment's start/end slot indices once and mark the
//!    slots strictly after the start index up to and including the end
//!    index in a difference array (coverage).
//! 3. For each slot, pick the first assignment (by id) whose range contains
//!    the slot. If the slot starts where that assignment starts, emit an
//!    origin with span `end_index - start_index + 1`. Otherwise emit covered
//!    if any assignment covers the slot, else empty.
//!
//! A boundary missing from the axis is a lookup miss: the span falls back to
//! one slot and the assignment covers nothing.
//!
//! # Complexity
//! O(a * s) for the containment pick, O(a + s) for coverage, where
//! a = assignments on the day and s = slots.

mod week;

pub use week::{shift_week, start_of_week, week_days, week_range_label};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Assignment, TimeAxis, TimeSlot};

/// Render state of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind<'a> {
    /// An assignment starts in this slot and spans `span` slots.
    Origin {
        assignment: &'a Assignment,
        span: usize,
    },
    /// Subsumed by a preceding origin; rendered with zero width.
    Covered,
    /// Nothing scheduled; an interactive placeholder.
    Empty,
}

/// One cell of a day row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<'a> {
    /// Position in the flattened axis.
    pub index: usize,
    /// The slot this cell stands for.
    pub slot: TimeSlot,
    /// What to render.
    pub kind: CellKind<'a>,
}

impl GridCell<'_> {
    /// Columns this cell occupies when rendered.
    pub fn width(&self) -> usize {
        match self.kind {
            CellKind::Origin { span, .. } => span,
            CellKind::Covered => 0,
            CellKind::Empty => 1,
        }
    }
}

/// The render plan for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan<'a> {
    /// The day this row shows.
    pub day: NaiveDate,
    /// One cell per flattened slot, in axis order.
    pub cells: Vec<GridCell<'a>>,
}

impl<'a> DayPlan<'a> {
    /// Cells that are actually drawn (covered cells skipped).
    pub fn rendered(&self) -> impl Iterator<Item = &GridCell<'a>> {
        self.cells
            .iter()
            .filter(|c| !matches!(c.kind, CellKind::Covered))
    }

    /// Cell at a flattened slot index.
    pub fn cell(&self, index: usize) -> Option<&GridCell<'a>> {
        self.cells.get(index)
    }

    /// Assignments starting in this row, with their spans.
    pub fn origins(&self) -> Vec<(&'a Assignment, usize)> {
        self.cells
            .iter()
            .filter_map(|c| match c.kind {
                CellKind::Origin { assignment, span } => Some((assignment, span)),
                _ => None,
            })
            .collect()
    }

    /// Total drawn width; equals the slot count when nothing overlaps.
    pub fn total_width(&self) -> usize {
        self.cells.iter().map(GridCell::width).sum()
    }
}

/// Number of slots an assignment spans, inclusive of both boundary slots.
///
/// Falls back to 1 when either boundary is not on the axis.
pub fn span_of(axis: &TimeAxis, assignment: &Assignment) -> usize {
    match slot_range(axis, assignment) {
        Some((start, end)) => end - start + 1,
        None => {
            debug!(id = %assignment.id, "assignment boundary not on axis, span defaults to 1");
            1
        }
    }
}

/// Start and end slot indices, when both are on the axis and ordered.
fn slot_range(axis: &TimeAxis, assignment: &Assignment) -> Option<(usize, usize)> {
    let start = axis.index_of_start(assignment.start_time)?;
    let end = axis.index_of_end(assignment.end_time)?;
    (end >= start).then_some((start, end))
}

/// Composes the render plan for `day`.
///
/// `assignments` should already be narrowed to the active resource filter;
/// entries for other days are ignored.
pub fn compose_day<'a>(
    axis: &TimeAxis,
    day: NaiveDate,
    assignments: &[&'a Assignment],
) -> DayPlan<'a> {
    let slots = axis.flatten();

    let mut todays: Vec<&'a Assignment> = assignments
        .iter()
        .copied()
        .filter(|a| a.day == day)
        .collect();
    todays.sort_by(|a, b| a.id.cmp(&b.id));

    // Coverage: slot i is covered when start < i <= end for some assignment.
    let mut delta = vec![0i32; slots.len() + 1];
    for a in &todays {
        if let Some((start, end)) = slot_range(axis, a) {
            if end > start {
                delta[start + 1] += 1;
                delta[end + 1] -= 1;
            }
        }
    }
    let mut depth = 0;
    let covered: Vec<bool> = delta[..slots.len()]
        .iter()
        .map(|d| {
            depth += d;
            depth > 0
        })
        .collect();

    let cells = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let matched = todays.iter().copied().find(|a| a.covers(day, slot));
            let kind = match matched {
                Some(assignment) if assignment.start_time == slot.start_time => {
                    CellKind::Origin {
                        assignment,
                        span: span_of(axis, assignment),
                    }
                }
                _ if covered[index] => CellKind::Covered,
                _ => CellKind::Empty,
            };
            GridCell {
                index,
                slot: *slot,
                kind,
            }
        })
        .collect();

    DayPlan { day, cells }
}

/// Composes one plan per displayed day.
pub fn compose_week<'a>(
    axis: &TimeAxis,
    days: &[NaiveDate],
    assignments: &[&'a Assignment],
) -> Vec<DayPlan<'a>> {
    days.iter()
        .map(|&day| compose_day(axis, day, assignments))
        .collect()
}
