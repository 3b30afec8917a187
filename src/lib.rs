pub mod api;
pub mod core;
pub mod format;

pub use crate::core::{Inputs, ProjectionResult, project, validate_inputs};
