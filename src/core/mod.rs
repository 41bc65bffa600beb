//! Autotune workflow: configuration, staging, fetching, tuning.

pub mod config;
pub mod nightscout;
pub mod pipeline;
pub mod resolver;
pub mod stager;
pub mod tools;
pub mod tuning;
