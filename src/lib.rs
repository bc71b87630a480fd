//! Time tracking with an eight-sided orientation device. Each face stands for an activity, the
//! face pointing up is what's being worked on. Orientation changes are turned into a per-day
//! ledger that can be edited and reported on from the terminal.
//!

pub mod app;
pub mod cli;
pub mod error;
pub mod fs;
pub mod labels;
pub mod ledger;
pub mod orientation;
pub mod report;
pub mod timer;
pub mod tracker;
pub mod utils;
