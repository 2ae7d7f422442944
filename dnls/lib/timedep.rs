//! Adaptive-step integration of the lattice equations of motion.
//!
//! [`Rka`] owns the state vector and the elapsed time and advances both with an
//! embedded fourth/fifth-order Runge-Kutta pair (Dormand-Prince). The
//! direction of time is a complex unit passed to every step: `1` for real-time
//! evolution, `-i` for imaginary-time relaxation.

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::warn;
use crate::{
    Arr1,
    error::{ LengthError, TError },
    rhs::Evaluator,
    utils,
};

pub type TResult<T> = Result<T, TError>;

/// Maximum number of trial steps taken in a single call to
/// [`Rka::full_step`].
pub const MAX_RETRIES: usize = 100;

/// Trial steps smaller than this are treated as a collapse of the step size.
pub const MIN_STEP: f64 = 1e-14;

// safety numbers -- particular to a fifth-order error estimate
const SAFE1: f64 = 0.9;
const SAFE2: f64 = 4.0;

// Dormand-Prince tableau; the right-hand sides carry no explicit time
// dependence, so the nodes are not needed
const A: [&[f64]; 7] = [
    &[],
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
    &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
// fifth-order weights
const B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
// fourth-order weights
const B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];
// error weights, fifth minus fourth
const ERR: [f64; 7] = [
    B5[0] - B4[0],
    B5[1] - B4[1],
    B5[2] - B4[2],
    B5[3] - B4[3],
    B5[4] - B4[4],
    B5[5] - B4[5],
    B5[6] - B4[6],
];

// perform the operation `q + h * Σ w[j] k[j]` succinctly
fn array_step<S>(q: &Arr1<S>, h: C64, w: &[f64], k: &[nd::Array1<C64>])
    -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let mut acc = q.to_owned();
    w.iter().zip(k)
        .filter(|(wj, _)| **wj != 0.0)
        .for_each(|(wj, kj)| acc.scaled_add(h * *wj, kj));
    acc
}

/// Diagnostics for a single call to [`Rka::full_step`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepInfo {
    /// Number of trial steps consumed, accepted or not.
    pub substeps: usize,
    /// RMS local error estimate of the last trial step.
    pub error: f64,
    /// Whether a step was committed. `false` means the error bound could not
    /// be met within [`MAX_RETRIES`] trials and the state is unchanged.
    pub accepted: bool,
}

/// Embedded Runge-Kutta integrator with adaptive step size.
///
/// The error of each trial step is estimated as the RMS over indices of the
/// difference between the fifth- and fourth-order solutions and compared
/// directly against `epsilon`; the fifth-order solution is the one committed.
#[derive(Clone, Debug)]
pub struct Rka<E> {
    q: nd::Array1<C64>,
    t: f64,
    dt: f64,
    epsilon: f64,
    eval: E,
}

impl<E> Rka<E>
where E: Evaluator
{
    /// Create a new integrator from an initial trial step size `dt`, an error
    /// bound `epsilon`, an initial state, and a derivative evaluator.
    ///
    /// The initial state is taken as-is; see
    /// [`GroundState::new`][crate::ground::GroundState::new] for normalization.
    pub fn new<S>(dt: f64, epsilon: f64, q0: &Arr1<S>, eval: E) -> TResult<Self>
    where S: nd::Data<Elem = C64>
    {
        TError::check_step(dt)?;
        TError::check_epsilon(epsilon)?;
        LengthError::check_len(q0, eval.len())?;
        Ok(Self { q: q0.to_owned(), t: 0.0, dt, epsilon, eval })
    }

    // a single trial step of size `h` along `direction`, returning the
    // fifth-order solution and the RMS error estimate
    fn trial(&self, h: f64, direction: C64) -> (nd::Array1<C64>, f64) {
        let hc = h * direction;
        let mut k: Vec<nd::Array1<C64>> = Vec::with_capacity(7);
        for (stage, a) in A.iter().enumerate() {
            let k_stage
                = if stage == 0 {
                    self.eval.eval(self.q.view(), self.q.view())
                } else {
                    let q_stage = array_step(&self.q, hc, a, &k);
                    self.eval.eval(q_stage.view(), self.q.view())
                };
            k.push(k_stage);
        }
        let q5 = array_step(&self.q, hc, &B5, &k);
        // taken from the increments rather than q5 - q4, which rounds to zero
        // once the step is below the resolution of q
        let n = self.q.len().max(1) as f64;
        let zero: nd::Array1<C64> = nd::Array1::zeros(self.q.len());
        let delta = array_step(&zero, hc, &ERR, &k);
        let err = (utils::norm(&delta) / n).sqrt();
        // the weighted increments themselves cancel exactly for small enough
        // steps; no estimate is finer than one ulp of the first increment
        let floor = f64::EPSILON * h * (utils::norm(&k[0]) / n).sqrt();
        (q5, err.max(floor))
    }

    /// Advance the state by one adaptively sized step along `direction`.
    ///
    /// Trial steps are repeated with shrinking size until the error estimate
    /// falls below `epsilon`; the step size used for the next call grows when
    /// the error is comfortably small. Time advances by the (real) size of the
    /// accepted step. If no trial meets the bound within [`MAX_RETRIES`]
    /// attempts, or the trial size drops below [`MIN_STEP`], nothing is
    /// committed, the trial step size is restored, and a
    /// warning is logged.
    pub fn full_step(&mut self, direction: C64) -> StepInfo {
        let dt_entry = self.dt;
        let mut er: f64 = f64::NAN;
        let mut substeps: usize = 0;
        while substeps < MAX_RETRIES && self.dt >= MIN_STEP {
            substeps += 1;
            let dt_old = self.dt;
            let (q_new, err) = self.trial(dt_old, direction);
            er = err / self.epsilon;
            if !er.is_finite() {
                self.dt = dt_old / SAFE2;
                continue;
            }

            // estimate new step size (with safety factors)
            let dt_new
                = if er == 0.0 {
                    dt_old * SAFE2
                } else {
                    (dt_old * er.powf(-0.2) * SAFE1)
                        .clamp(dt_old / SAFE2, dt_old * SAFE2)
                };
            self.dt = dt_new;

            if er <= 1.0 {
                self.dt = dt_new.max(MIN_STEP);
                self.q = q_new;
                self.t += dt_old;
                return StepInfo { substeps, error: err, accepted: true };
            }
        }
        warn!(
            t = self.t,
            dt = dt_entry,
            epsilon = self.epsilon,
            substeps,
            "rka error bound could not be satisfied",
        );
        self.dt = dt_entry;
        StepInfo {
            substeps,
            error: er * self.epsilon,
            accepted: false,
        }
    }

    /// Propagate along `direction` for a fixed span of time, landing on
    /// `t + duration` to within [`MIN_STEP`]. Returns the total number of trial
    /// steps consumed.
    ///
    /// Unlike [`full_step`][Self::full_step], a step that cannot meet the error
    /// bound is an error here, since the requested end time cannot be reached.
    pub fn advance(&mut self, duration: f64, direction: C64) -> TResult<usize> {
        TError::check_duration(duration)?;
        let t_end = self.t + duration;
        let mut substeps: usize = 0;
        while t_end - self.t >= MIN_STEP {
            let remaining = t_end - self.t;
            let dt_free = self.dt;
            let clamped = dt_free > remaining;
            if clamped { self.dt = remaining; }
            let info = self.full_step(direction);
            substeps += info.substeps;
            if !info.accepted { return Err(TError::RKAErrorBound(self.t)); }
            // keep the unclamped trial size for later steps
            if clamped && self.dt > dt_free { self.dt = dt_free; }
        }
        self.t = t_end;
        Ok(substeps)
    }

    /// Rescale the state so that its norm equals `target`, returning `false`
    /// (and leaving the state untouched) if the state is all zeros.
    pub fn renormalize(&mut self, target: f64) -> bool {
        utils::renormalize(&mut self.q, target)
    }

    /// Total squared magnitude of the state.
    pub fn norm(&self) -> f64 { utils::norm(&self.q) }

    /// Elapsed time.
    pub fn time(&self) -> f64 { self.t }

    /// Overwrite the elapsed time.
    pub fn set_time(&mut self, t: f64) { self.t = t; }

    /// Trial size of the next step.
    pub fn step_size(&self) -> f64 { self.dt }

    /// Error bound.
    pub fn epsilon(&self) -> f64 { self.epsilon }

    /// Get a reference to the state vector.
    pub fn state(&self) -> &nd::Array1<C64> { &self.q }

    /// Get a reference to the derivative evaluator.
    pub fn evaluator(&self) -> &E { &self.eval }

    /// Get a mutable reference to the derivative evaluator.
    pub fn evaluator_mut(&mut self) -> &mut E { &mut self.eval }

    /// Consume `self`, returning the state and the evaluator.
    pub fn into_parts(self) -> (nd::Array1<C64>, E) { (self.q, self.eval) }
}
