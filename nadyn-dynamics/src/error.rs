use std::error::Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DynamicsError>;

/// Errors raised by the propagation routines. None of them is recovered from
/// internally: a step that fails leaves the touched trajectories in an
/// unspecified state.
#[derive(Debug, Error)]
pub enum DynamicsError {
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{0:?} is not a permutation")]
    InvalidPermutation(Vec<usize>),
    #[error("state overlaps are unusable: {0}")]
    Degeneracy(String),
    #[error("eigendecomposition of a {0}x{0} matrix did not converge")]
    Eigensolver(usize),
    #[error("electronic amplitudes have zero norm")]
    ZeroNorm,
    #[error("{what} requires {expected} electronic states, found {found}")]
    UnsupportedStateCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("trajectory {0} carries masses that differ from the first trajectory")]
    InconsistentMasses(usize),
    #[error("trajectory {index} is out of range for an ensemble of {ntraj}")]
    TrajectoryIndex { index: usize, ntraj: usize },
    #[error("evaluation of the diabatic Hamiltonian failed")]
    Evaluation(#[source] Box<dyn Error + Send + Sync>),
}

impl DynamicsError {
    /// Wraps an error of an external Hamiltonian evaluator
    pub fn evaluation<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        DynamicsError::Evaluation(err.into())
    }

    pub(crate) fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected != found {
            Err(DynamicsError::DimensionMismatch {
                what,
                expected,
                found,
            })
        } else {
            Ok(())
        }
    }
}
