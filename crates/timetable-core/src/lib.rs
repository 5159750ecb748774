//! School timetable core: the persisted school snapshot and every operation
//! on it.

pub mod catalog;
pub mod data;
pub mod error;
pub mod lessons;
pub mod prompt;
pub mod service;
pub mod solver;
pub mod store;

pub use data::SchoolData;
pub use error::{CoreError, Result};
pub use lessons::validate_lesson;
pub use service::{Grid, SchoolService, ServiceOptions};
pub use store::SchoolStore;
