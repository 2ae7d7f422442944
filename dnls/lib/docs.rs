//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Spin-orbit coupling](#spin-orbit-coupling)
//! - [Imaginary time](#imaginary-time)
//! - [Adaptive integration](#adaptive-integration)
//! - [Fixing the particle number](#fixing-the-particle-number)
//!
//! # Background
//! The discrete nonlinear Schrödinger equation (DNLS) describes a field *ψ*
//! sampled on the sites of a lattice, in the mean-field (Gross-Pitaevskii)
//! limit of bosons hopping between neighboring sites and interacting on-site.
//! In natural units,
//! ```text
//!   ∂ψ[i]
//! i ----- = -μ ψ[i] - J Σ ψ[j] + U |ψ[i]|² ψ[i]
//!    ∂t              ⟨ij⟩
//! ```
//! where the sum runs over the nearest neighbors *j* of site *i*, *μ* is the
//! chemical potential, *J* is the hopping amplitude, and *U* is the strength of
//! the on-site interaction. Boundaries are periodic throughout: the chain is a
//! ring and the square lattice a torus, so a uniform state is an exact
//! stationary state of the linear part with energy *-μ* - *zJ* for
//! coordination number *z*.
//!
//! The total squared magnitude
//! ```text
//! N = Σ |ψ[i]|²
//!      i
//! ```
//! is the particle number and is conserved by evolution in real time.
//!
//! # Spin-orbit coupling
//! For spin-1/2 bosons each site carries two components, stored interleaved in
//! a single vector as `[ψ(0, ↑), ψ(0, ↓), ψ(1, ↑), ψ(1, ↓), ...]`. Besides the
//! spin-conserving hopping, the two components are coupled by a spin-flip
//! hopping of amplitude *t*<sub>so</sub>,
//! ```text
//! H_so = -t_so Σ [ψ†(r + x̂) (iσ_y) ψ(r) + ψ†(r + ŷ) (iσ_x) ψ(r) + h.c.]
//!              r
//! ```
//! which is odd in the hopping direction and therefore vanishes on a uniform
//! state, and split by a Zeeman term *M*<sub>z</sub> *σ*<sub>z</sub>. On the
//! square lattice the hopping along *y* may differ from that along *x*
//! (*t*<sub>z</sub> vs. *J*). With *t*<sub>so</sub> ≠ 0 the single-particle
//! band minimum moves away from zero momentum, which shows up directly in the
//! [momentum density][crate::utils::momentum_density_2d] of the relaxed state.
//!
//! # Imaginary time
//! Taking *t* → -*i* *τ* turns the equation of motion into a diffusion-like
//! equation,
//! ```text
//! ∂ψ
//! -- = -H[ψ] ψ
//! ∂τ
//! ```
//! under which each eigencomponent of energy *E* is multiplied by
//! exp(-*E* *τ*). Relative to the lowest one, all other components decay
//! exponentially, so after renormalization the state flows to the ground state.
//! In this crate the rotation is expressed as a complex direction multiplier
//! on the step: the integrator evaluates *dψ/dt* and advances along `-i dt`.
//!
//! For *U* ≠ 0 the operator *H* depends on the state itself. The nonlinear term
//! of every stage evaluation is computed from the most recently committed state
//! rather than the intermediate stage value; the difference is of higher order
//! in the step size and vanishes at a fixed point.
//!
//! # Adaptive integration
//! Steps are taken with the Dormand-Prince embedded pair: seven evaluations of
//! the right-hand side give both a fifth- and a fourth-order estimate of the
//! new state, and their difference serves as an estimate of the local error.
//! Taking the RMS of this difference over the vector as *err*, the step is
//! accepted if *err* ≤ *ε*, and the next trial step is
//! ```text
//! dt' = 0.9 dt (ε / err)^(1/5)
//! ```
//! clamped to within a factor of 4 of the current one. Rejected steps are
//! retried at the new size.
//!
//! # Fixing the particle number
//! Imaginary-time evolution does not conserve *N*, so the state is rescaled to
//! the target after every step. The chemical potential is adjusted at the same
//! time with a multiplicative feedback on the ratio *r* = *N*(*τ* + *dτ*) /
//! *N*<sub>target</sub>:
//! ```text
//! μ → μ / r   (μ > 0)
//! μ → μ r     (μ < 0)
//! ```
//! Since the growth rate of the norm is set by *μ* minus the ground-state
//! energy, both branches pull *μ* toward that energy. A multiplicative update
//! cannot change the sign of *μ*, so when |*μ*| decays to within *ε* of zero
//! its sign is flipped and its magnitude reset to 1.
//!
//! Relaxation stops when the RMS per-index change of the renormalized state over
//! one iteration falls below 10⁴ *ε*.
