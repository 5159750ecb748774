//! HTTP service and command-line entry point for the school timetable.
//!
//! # Components
//!
//! - `api`: REST endpoints over [`timetable_core::SchoolService`]
//! - `cli`: command-line arguments of the `timetable` binary

pub mod api;
pub mod cli;
