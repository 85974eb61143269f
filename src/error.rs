use thiserror::Error;

/// Hard failures: malformed models and broken internal invariants.
///
/// Infeasible and unbounded programs are not errors; they are reported
/// through [`crate::Status`] on a successfully returned solution.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("the model has no objective; call `maximize` or `minimize` first")]
    MissingObjective,

    #[error("the model has no constraints")]
    NoConstraints,

    #[error("constraint {index} does not reference any variable")]
    EmptyConstraint { index: usize },

    #[error("variable `{name}` (index {index}) does not belong to this model")]
    UnknownVariable { index: usize, name: String },

    #[error("{what} must be finite")]
    NonFinite { what: String },

    #[error("phase {phase} did not converge within {iterations} pivots")]
    IterationLimit { phase: u8, iterations: usize },

    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type Result<T> = std::result::Result<T, Error>;
