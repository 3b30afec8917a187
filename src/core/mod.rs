mod engine;
mod types;
mod validate;

pub use engine::project;
pub use types::{
    AccumulationPoint, DecumulationPoint, Inputs, LifecyclePhase, ProjectionResult, YearRecord,
};
pub use validate::{InputError, MAX_AGE, validate_inputs};
