//! Tuning loop iteration types.

use std::fmt;

use chrono::NaiveDate;

/// One (run, day) step of the tuning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    /// Run number, starting at 1.
    pub run: u32,
    /// Calendar day whose glucose entries are tuned against.
    pub date: NaiveDate,
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run {} / {}", self.run, self.date)
    }
}

/// External step that can fail inside an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Preparing the day's glucose data.
    Prep,
    /// Producing the tuned profile.
    Tune,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Prep => write!(f, "prep"),
            Step::Tune => write!(f, "tune"),
        }
    }
}

/// What happened in one iteration.
///
/// Failed tool invocations do not stop the loop; the iteration is marked and
/// the next one starts from whatever profile was promoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationStatus {
    /// Both tools exited successfully.
    Succeeded,
    /// A tool failed and the loop carried on regardless.
    FailedButContinued {
        /// The first step that failed.
        step: Step,
        /// Exit status or launch error.
        reason: String,
    },
}

impl IterationStatus {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Outcome of a completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationRecord {
    pub iteration: Iteration,
    pub status: IterationStatus,
}

/// Every calendar day in `[start, end)`, ascending. Empty if `end <= start`.
#[must_use]
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d < end).collect()
}

/// The full iteration order: runs outermost, days ascending within each run.
#[must_use]
pub fn plan(runs: u32, days: &[NaiveDate]) -> Vec<Iteration> {
    (1..=runs)
        .flat_map(|run| days.iter().map(move |&date| Iteration { run, date }))
        .collect()
}
