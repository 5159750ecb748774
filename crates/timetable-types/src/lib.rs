//! Shared types for the timetable service.
//!
//! - `school`: catalog, workload and lesson entities
//! - `prompt`: the denormalized class → subject → teachers rows
//! - `api`: HTTP request and response bodies

pub mod api;
pub mod prompt;
pub mod school;

pub use api::*;
pub use prompt::*;
pub use school::*;
