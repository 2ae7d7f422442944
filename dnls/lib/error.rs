//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! Expected numerical conditions (non-convergence, an all-zero state, a step
//! size that cannot meet its error bound inside a single call) are never
//! reported through these types; they are surfaced as typed outcomes and
//! logged warnings instead.
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check_len<S, A>(a: &nd::ArrayBase<S, nd::Ix1>, n: usize)
        -> Result<(), Self>
    where S: nd::Data<Elem = A>
    {
        let na = a.len();
        (na == n).then_some(()).ok_or(Self(na, n))
    }
}

/// Returned from the adaptive integrator.
#[derive(Debug, Error)]
pub enum TError {
    /// Returned when a non-positive `epsilon` value is encountered.
    #[error("epsilon values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when an initial step size below
    /// [`MIN_STEP`][crate::timedep::MIN_STEP] is encountered.
    #[error(
        "step sizes must be finite and at least {min:e}; got {0}",
        min = crate::timedep::MIN_STEP,
    )]
    BadStep(f64),

    /// Returned when a non-positive or non-finite propagation span is
    /// encountered.
    #[error("propagation duration must be finite and non-negative; got {0}")]
    BadDuration(f64),

    /// Returned from [`Rka::advance`][crate::timedep::Rka::advance] when a
    /// single step could not satisfy the error bound.
    #[error("rka error bound could not be satisfied at t = {0:.6e}")]
    RKAErrorBound(f64),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}

impl TError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_step(dt: f64) -> Result<(), Self> {
        (dt >= crate::timedep::MIN_STEP && dt.is_finite())
            .then_some(())
            .ok_or(Self::BadStep(dt))
    }

    pub(crate) fn check_duration(duration: f64) -> Result<(), Self> {
        (duration >= 0.0 && duration.is_finite())
            .then_some(())
            .ok_or(Self::BadDuration(duration))
    }
}

/// Returned from ground-state solver construction.
#[derive(Debug, Error)]
pub enum GError {
    /// Returned when a non-positive target norm is encountered.
    #[error("target norm must be greater than 0; got {0}")]
    BadTarget(f64),

    /// Returned when a zero step cap is encountered.
    #[error("maxsteps must be greater than 0; got {0}")]
    BadMaxsteps(usize),
}

impl GError {
    pub(crate) fn check_target(target: f64) -> Result<(), Self> {
        (target > 0.0 && target.is_finite())
            .then_some(())
            .ok_or(Self::BadTarget(target))
    }

    pub(crate) fn check_maxsteps(maxsteps: usize) -> Result<(), Self> {
        (maxsteps != 0).then_some(()).ok_or(Self::BadMaxsteps(maxsteps))
    }
}

/// Returned when reading a persisted state file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The file ended before the chemical potential line.
    #[error("missing chemical potential line")]
    MissingMu,

    /// The chemical potential line could not be parsed.
    #[error("bad chemical potential: {0:?}")]
    BadMu(String),

    /// An amplitude token could not be parsed.
    #[error("bad complex amplitude: {0:?}")]
    BadAmplitude(String),

    /// Underlying I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
