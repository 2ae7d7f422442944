//! Imaginary-time relaxation to the ground state at fixed particle number.
//!
//! Each iteration of [`GroundState::relax`]
//! 1. takes one adaptive step along `-i`, damping every excited component of
//!    the state relative to the lowest one;
//! 2. feeds the resulting change in norm back into the chemical potential;
//! 3. rescales the state back to the target norm.
//!
//! The loop stops when the RMS per-index change of the state over one iteration
//! drops to `epsilon * CONV_FACTOR`, or when the accumulated number of trial
//! steps passes a cap.
//!
//! ```
//! use ndarray as nd;
//! use num_complex::Complex64 as C64;
//! use dnls::{ ground::GroundState, rhs::{ Chain, ChainParams }, timedep::Rka };
//!
//! let q0: nd::Array1<C64>
//!     = (0..8).map(|k| C64::from(1.0 + 0.2 * (k as f64).cos())).collect();
//! let chain = Chain::new(8, ChainParams { mu: 1.0, j: 1.0, u: 0.0 });
//! let rka = Rka::new(1e-4, 1e-10, &q0, chain).unwrap();
//! let mut gs = GroundState::new(rka, 8.0).unwrap();
//! assert!(gs.relax().is_converged());
//! assert!((gs.norm() - 8.0).abs() < 1e-9);
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    error::GError,
    rhs::Evaluator,
    timedep::{ Rka, StepInfo },
    utils,
    DEF_MAXSTEPS,
};

pub type GResult<T> = Result<T, GError>;

/// Ratio between the convergence threshold on the per-iteration state change
/// and the integrator's error bound.
pub const CONV_FACTOR: f64 = 1e4;

/// Result of a single relaxation iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Iteration {
    /// Diagnostics of the imaginary-time step.
    pub step: StepInfo,
    /// RMS per-index change of the state over the iteration.
    pub diff: f64,
}

/// Final outcome of [`GroundState::relax`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Relaxation {
    /// The per-iteration change dropped below threshold.
    Converged {
        /// Number of iterations performed.
        iters: usize,
        /// Number of integrator trial steps consumed.
        substeps: usize,
        /// Last RMS per-index change.
        diff: f64,
    },
    /// The trial step cap was reached first. The state is still the best
    /// available estimate.
    NonConverged {
        /// Number of iterations performed.
        iters: usize,
        /// Number of integrator trial steps consumed.
        substeps: usize,
        /// Last RMS per-index change.
        diff: f64,
    },
}

impl Relaxation {
    /// Return `true` if `self` is `Converged`.
    pub fn is_converged(&self) -> bool { matches!(self, Self::Converged { .. }) }

    /// Number of iterations performed.
    pub fn iters(&self) -> usize {
        match self {
            Self::Converged { iters, .. } => *iters,
            Self::NonConverged { iters, .. } => *iters,
        }
    }

    /// Number of integrator trial steps consumed.
    pub fn substeps(&self) -> usize {
        match self {
            Self::Converged { substeps, .. } => *substeps,
            Self::NonConverged { substeps, .. } => *substeps,
        }
    }

    /// Last RMS per-index change.
    pub fn diff(&self) -> f64 {
        match self {
            Self::Converged { diff, .. } => *diff,
            Self::NonConverged { diff, .. } => *diff,
        }
    }
}

/// Ground-state solver driving an [`Rka`] integrator in imaginary time while
/// holding its norm at a fixed target.
#[derive(Clone, Debug)]
pub struct GroundState<E> {
    rka: Rka<E>,
    target: f64,
    maxsteps: usize,
}

impl<E> GroundState<E>
where E: Evaluator
{
    /// Wrap an integrator, immediately rescaling its state to the target norm.
    ///
    /// An all-zero initial state cannot be rescaled; it is kept as-is and a
    /// warning is logged.
    pub fn new(mut rka: Rka<E>, target: f64) -> GResult<Self> {
        GError::check_target(target)?;
        if !rka.renormalize(target) {
            warn!("initial state is all zeros; skipping normalization");
        }
        Ok(Self { rka, target, maxsteps: DEF_MAXSTEPS })
    }

    /// Replace the cap on accumulated trial steps (default:
    /// [`DEF_MAXSTEPS`][crate::DEF_MAXSTEPS]).
    pub fn with_maxsteps(mut self, maxsteps: usize) -> GResult<Self> {
        GError::check_maxsteps(maxsteps)?;
        self.maxsteps = maxsteps;
        Ok(self)
    }

    // drive μ toward the value that holds the norm at its target
    //
    // a μ that has decayed to within epsilon of zero is flipped and reset to
    // unit magnitude; an exactly zero μ has no sign to flip and is left alone
    fn adapt_mu(&mut self) {
        let epsilon = self.rka.epsilon();
        let ratio = self.rka.norm() / self.target;
        let eval = self.rka.evaluator_mut();
        let mut mu = eval.mu();
        if mu != 0.0 && mu.abs() <= epsilon { mu = -mu.signum(); }
        if ratio > 0.0 && ratio.is_finite() {
            mu = if mu > 0.0 { mu / ratio } else { mu * ratio };
        }
        eval.set_mu(mu);
    }

    /// Perform a single propagate-adapt-renormalize iteration.
    pub fn iterate(&mut self) -> Iteration {
        let q_prev: nd::Array1<C64> = self.rka.state().clone();
        let step = self.rka.full_step(-C64::i());
        self.adapt_mu();
        self.rka.renormalize(self.target);
        let diff = utils::rms_diff(self.rka.state(), &q_prev);
        Iteration { step, diff }
    }

    /// Iterate until convergence or until the trial step cap is passed, then
    /// reset the integrator's time to zero.
    pub fn relax(&mut self) -> Relaxation {
        let threshold = self.rka.epsilon() * CONV_FACTOR;
        let mut iters: usize = 0;
        let mut substeps: usize = 0;
        let mut diff: f64 = f64::INFINITY;
        let outcome
            = loop {
                if substeps > self.maxsteps {
                    warn!(
                        iters,
                        substeps,
                        diff,
                        threshold,
                        "step overflow, no convergence",
                    );
                    break Relaxation::NonConverged { iters, substeps, diff };
                }
                let Iteration { step, diff: d } = self.iterate();
                iters += 1;
                substeps += step.substeps.max(1);
                diff = d;
                debug!(
                    iters,
                    substeps,
                    diff,
                    mu = self.mu(),
                    t = self.rka.time(),
                    "relaxation step",
                );
                if step.accepted && diff <= threshold {
                    break Relaxation::Converged { iters, substeps, diff };
                }
            };
        self.rka.set_time(0.0);
        outcome
    }

    /// Current chemical potential.
    pub fn mu(&self) -> f64 { self.rka.evaluator().mu() }

    /// Target norm.
    pub fn target(&self) -> f64 { self.target }

    /// Cap on accumulated trial steps.
    pub fn maxsteps(&self) -> usize { self.maxsteps }

    /// Total squared magnitude of the state.
    pub fn norm(&self) -> f64 { self.rka.norm() }

    /// Get a reference to the state vector.
    pub fn state(&self) -> &nd::Array1<C64> { self.rka.state() }

    /// Particle number held by each interleaved component.
    pub fn component_norms(&self) -> Vec<f64> {
        utils::component_norms(
            self.rka.state(), self.rka.evaluator().components())
    }

    /// Get a reference to the underlying integrator.
    pub fn integrator(&self) -> &Rka<E> { &self.rka }

    /// Get a mutable reference to the underlying integrator.
    pub fn integrator_mut(&mut self) -> &mut Rka<E> { &mut self.rka }

    /// Consume `self`, returning the underlying integrator.
    pub fn into_inner(self) -> Rka<E> { self.rka }
}
