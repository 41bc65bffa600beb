//! Run oref0 autotune against Nightscout history.
//!
//! The run stages the pump profile, downloads treatments and per-day glucose
//! entries from Nightscout, then feeds them day by day through the external
//! `oref0-autotune-prep` and `oref0-autotune-core` tools, carrying the tuned
//! profile from one iteration to the next. Export and recommendation reports
//! are delegated to the remaining oref0 tools.

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod state;
pub mod utils;
