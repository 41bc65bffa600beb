//! Run state types.
//!
//! Paths under the OpenAPS directory, the single current-profile handle, and
//! the (run, day) iteration records produced by the tuning loop.

mod iteration;
mod layout;
mod profile;

pub use iteration::{days_in_range, plan, Iteration, IterationRecord, IterationStatus, Step};
pub use layout::{date_key, AutotuneLayout};
pub use profile::CurrentProfile;
