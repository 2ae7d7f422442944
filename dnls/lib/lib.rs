//! Provides functions and higher-level constructs for finding stationary
//! (ground) states of the discrete nonlinear Schrödinger equation on periodic
//! lattices via imaginary-time propagation, driven by an adaptive embedded
//! Runge-Kutta integrator.
//!
//! Provides implementations for the following:
//! - Lattice topologies (all with periodic boundaries):
//!     - Single-component ring
//!     - Two-component (spin-1/2) ring with spin-orbit coupling and a Zeeman
//!       field
//!     - Two-component square lattice with anisotropic hopping, spin-orbit
//!       coupling, and a Zeeman field
//! - Time evolution:
//!     - Dormand-Prince fourth/fifth-order embedded Runge-Kutta with adaptive
//!       step size, in real or imaginary time
//! - Ground states:
//!     - Imaginary-time relaxation at fixed particle number with adaptive
//!       chemical potential
//! - Plain-text persistence of relaxed states and momentum-space diagnostics
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod lattice;
pub mod rhs;
pub mod timedep;
pub mod ground;
pub mod output;
pub mod utils;

pub mod docs;

/// Default error bound for the adaptive integrator.
pub const DEF_EPSILON: f64 = 1e-12;
/// Default cap on accumulated integrator trial steps during relaxation.
pub const DEF_MAXSTEPS: usize = 50_000;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
