//! Error type of `fluidspec`
//!
//! Construction errors (configuration) and usage errors (shapes,
//! unknown variables) are raised immediately. Numerical divergence
//! stops the time stepping. Nothing is retried.
use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the simulation framework
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent parameter
    #[error("configuration error: {0}")]
    Config(String),

    /// Solver name not found in the registry
    #[error("unknown solver {name:?}, available: {available}")]
    UnknownSolver {
        /// Requested name
        name: String,
        /// Registered names
        available: String,
    },

    /// Forcing type not found in the registry
    #[error("wrong value for params.forcing.type: {name:?}, available: {available}")]
    UnknownForcingType {
        /// Requested name
        name: String,
        /// Registered names
        available: String,
    },

    /// Initialization type not found in the registry
    #[error("wrong value for params.init_fields.type: {name:?}, available: {available}")]
    UnknownInitFields {
        /// Requested name
        name: String,
        /// Registered names
        available: String,
    },

    /// Unknown time scheme
    #[error("wrong value for params.time_stepping.type_time_scheme: {0:?}")]
    UnknownTimeScheme(String),

    /// Array does not conform to the operator
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Shape dictated by the operator
        expected: Vec<usize>,
        /// Shape of the argument
        got: Vec<usize>,
    },

    /// Variable key not part of a set of variables
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),

    /// Non-finite values in the state
    #[error("numerical divergence (NaN or Inf) at t = {t:.4}, it = {it}")]
    NumericalDivergence {
        /// Simulation time of the last good state
        t: f64,
        /// Time step index of the last good state
        it: usize,
    },

    /// Hdf5 error
    #[error("hdf5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Io error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Parameter file error
    #[error("parameter file error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shape mismatch from two shapes
    pub(crate) fn shape(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
