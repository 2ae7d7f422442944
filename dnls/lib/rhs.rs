//! Right-hand sides of the discrete nonlinear Schrödinger equation for the
//! supported lattice/spin topologies.
//!
//! Every variant evaluates
//! ```text
//! dq[i]/dt = (1/i) (H q)[i]
//! (H q)[i] = -μ q[i] - (hopping terms) + (spin-mixing terms) + U q[i] |p[i]|²
//! ```
//! where `p` is the *live* state held by the integrator rather than the stage
//! snapshot `q`. The nonlinearity is therefore sampled from the most recently
//! committed state for every stage of a step; this is an approximation that
//! the integrator trajectory depends on, so it must be kept as is.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::lattice::{ Ring, Torus };

/// A derivative evaluator.
///
/// The integrator depends only on this interface. The chemical potential `μ`
/// is the only parameter expected to change after construction; it is driven
/// by the [ground-state solver][crate::ground::GroundState].
pub trait Evaluator {
    /// Required length of the state vector.
    fn len(&self) -> usize;

    /// Number of interleaved components per lattice site.
    fn components(&self) -> usize;

    /// Current chemical potential.
    fn mu(&self) -> f64;

    /// Replace the chemical potential.
    fn set_mu(&mut self, mu: f64);

    /// Compute the time derivative at every index of the snapshot `q`, using
    /// `live` for the nonlinear term.
    ///
    /// *Panics if either `q` or `live` does not have length
    /// [`len`][Self::len]*.
    fn eval(&self, q: nd::ArrayView1<C64>, live: nd::ArrayView1<C64>)
        -> nd::Array1<C64>;
}

fn assert_lens(n: usize, q: &nd::ArrayView1<C64>, live: &nd::ArrayView1<C64>) {
    assert!(
        q.len() == n && live.len() == n,
        "evaluator expects state vectors of length {n}; got snapshot of length \
        {} and live state of length {}",
        q.len(),
        live.len(),
    );
}

// multiplication by 1/i
fn over_i(h: C64) -> C64 { -C64::i() * h }

/// Parameters of a [`Chain`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChainParams {
    /// Chemical potential (seed).
    pub mu: f64,
    /// Hopping amplitude.
    pub j: f64,
    /// Interaction strength.
    pub u: f64,
}

impl Default for ChainParams {
    fn default() -> Self { Self { mu: 1.0, j: 1.0, u: 0.0 } }
}

/// Single-component one-dimensional ring.
#[derive(Clone, Debug)]
pub struct Chain {
    ring: Ring,
    mu: f64,
    j: f64,
    u: f64,
}

impl Chain {
    /// Create a new chain of `n` sites.
    ///
    /// *Panics if `n` is zero*.
    pub fn new(n: usize, params: ChainParams) -> Self {
        let ChainParams { mu, j, u } = params;
        Self { ring: Ring::new(n), mu, j, u }
    }

    /// Get the neighbor map.
    pub fn ring(&self) -> Ring { self.ring }

    /// Get the hopping amplitude.
    pub fn j(&self) -> f64 { self.j }

    /// Get the interaction strength.
    pub fn u(&self) -> f64 { self.u }
}

impl Evaluator for Chain {
    fn len(&self) -> usize { self.ring.len() }

    fn components(&self) -> usize { 1 }

    fn mu(&self) -> f64 { self.mu }

    fn set_mu(&mut self, mu: f64) { self.mu = mu; }

    fn eval(&self, q: nd::ArrayView1<C64>, live: nd::ArrayView1<C64>)
        -> nd::Array1<C64>
    {
        assert_lens(self.len(), &q, &live);
        (0..self.ring.len())
            .map(|i| {
                let hop = q[self.ring.left(i)] + q[self.ring.right(i)];
                over_i(
                    -self.mu * q[i]
                    - self.j * hop
                    + self.u * q[i] * live[i].norm_sqr()
                )
            })
            .collect()
    }
}

/// Parameters of a [`SpinChain`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpinChainParams {
    /// Chemical potential (seed).
    pub mu: f64,
    /// Spin-conserving hopping amplitude.
    pub j: f64,
    /// Interaction strength.
    pub u: f64,
    /// Spin-orbit (spin-flip) hopping amplitude.
    pub tso: f64,
    /// Zeeman splitting.
    pub mz: f64,
}

impl Default for SpinChainParams {
    fn default() -> Self {
        Self { mu: 1.0, j: 1.0, u: 0.0, tso: 0.0, mz: 0.0 }
    }
}

/// Two-component (spin-1/2) one-dimensional ring.
///
/// Index `2 s` holds the up component of site `s` and `2 s + 1` the down
/// component. Besides spin-conserving hopping, neighboring sites are coupled
/// by a spin-flip hopping
/// ```text
/// (H q)[s, ↑] ∋ -tso (q[s - 1, ↓] - q[s + 1, ↓])
/// (H q)[s, ↓] ∋ -tso (q[s + 1, ↑] - q[s - 1, ↑])
/// ```
/// and the components are split by a Zeeman term `±mz`.
#[derive(Clone, Debug)]
pub struct SpinChain {
    ring: Ring,
    mu: f64,
    j: f64,
    u: f64,
    tso: f64,
    mz: f64,
}

impl SpinChain {
    /// Create a new spin chain of `n` sites (state length `2 n`).
    ///
    /// *Panics if `n` is zero*.
    pub fn new(n: usize, params: SpinChainParams) -> Self {
        let SpinChainParams { mu, j, u, tso, mz } = params;
        Self { ring: Ring::new(n), mu, j, u, tso, mz }
    }

    /// Get the neighbor map.
    pub fn ring(&self) -> Ring { self.ring }

    /// Get the model parameters, with the current chemical potential.
    pub fn params(&self) -> SpinChainParams {
        SpinChainParams {
            mu: self.mu,
            j: self.j,
            u: self.u,
            tso: self.tso,
            mz: self.mz,
        }
    }
}

impl Evaluator for SpinChain {
    fn len(&self) -> usize { 2 * self.ring.len() }

    fn components(&self) -> usize { 2 }

    fn mu(&self) -> f64 { self.mu }

    fn set_mu(&mut self, mu: f64) { self.mu = mu; }

    fn eval(&self, q: nd::ArrayView1<C64>, live: nd::ArrayView1<C64>)
        -> nd::Array1<C64>
    {
        assert_lens(self.len(), &q, &live);
        let mut dq: nd::Array1<C64> = nd::Array1::zeros(self.len());
        for s in 0..self.ring.len() {
            let (l, r) = (self.ring.left(s), self.ring.right(s));
            let (up, dn) = (q[2 * s], q[2 * s + 1]);
            dq[2 * s] = over_i(
                -self.mu * up
                - self.j * (q[2 * l] + q[2 * r])
                - self.tso * (q[2 * l + 1] - q[2 * r + 1])
                + self.mz * up
                + self.u * up * live[2 * s].norm_sqr()
            );
            dq[2 * s + 1] = over_i(
                -self.mu * dn
                - self.j * (q[2 * l + 1] + q[2 * r + 1])
                - self.tso * (q[2 * r] - q[2 * l])
                - self.mz * dn
                + self.u * dn * live[2 * s + 1].norm_sqr()
            );
        }
        dq
    }
}

/// Parameters of a [`SpinLattice`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpinLatticeParams {
    /// Chemical potential (seed).
    pub mu: f64,
    /// Horizontal hopping amplitude.
    pub j: f64,
    /// Vertical hopping amplitude.
    pub tz: f64,
    /// Interaction strength.
    pub u: f64,
    /// Spin-orbit coupling.
    pub tso: f64,
    /// Zeeman splitting.
    pub mz: f64,
}

impl Default for SpinLatticeParams {
    fn default() -> Self {
        Self { mu: 1.0, j: 1.0, tz: 1.0, u: 0.0, tso: 0.0, mz: 0.0 }
    }
}

/// Two-component (spin-1/2) square lattice with periodic boundaries.
///
/// Site `s = x + l y` stores its up and down components at `2 s` and `2 s + 1`.
/// Hopping is `-j` along `x` and `-tz` along `y`; spin-orbit coupling flips the
/// spin along both axes, with a relative phase of `i` between them:
/// ```text
/// (H q)[r, ↑] ∋ -tso (q[r - x̂, ↓] - q[r + x̂, ↓]) - i tso (q[r - ŷ, ↓] - q[r + ŷ, ↓])
/// (H q)[r, ↓] ∋ -tso (q[r + x̂, ↑] - q[r - x̂, ↑]) - i tso (q[r - ŷ, ↑] - q[r + ŷ, ↑])
/// ```
#[derive(Clone, Debug)]
pub struct SpinLattice {
    torus: Torus,
    mu: f64,
    j: f64,
    tz: f64,
    u: f64,
    tso: f64,
    mz: f64,
}

impl SpinLattice {
    /// Create a new `l × l` spin lattice (state length `2 l²`).
    ///
    /// *Panics if `l` is zero*.
    pub fn new(l: usize, params: SpinLatticeParams) -> Self {
        let SpinLatticeParams { mu, j, tz, u, tso, mz } = params;
        Self { torus: Torus::new(l), mu, j, tz, u, tso, mz }
    }

    /// Get the neighbor map.
    pub fn torus(&self) -> Torus { self.torus }

    /// Get the model parameters, with the current chemical potential.
    pub fn params(&self) -> SpinLatticeParams {
        SpinLatticeParams {
            mu: self.mu,
            j: self.j,
            tz: self.tz,
            u: self.u,
            tso: self.tso,
            mz: self.mz,
        }
    }
}

impl Evaluator for SpinLattice {
    fn len(&self) -> usize { 2 * self.torus.len() }

    fn components(&self) -> usize { 2 }

    fn mu(&self) -> f64 { self.mu }

    fn set_mu(&mut self, mu: f64) { self.mu = mu; }

    fn eval(&self, q: nd::ArrayView1<C64>, live: nd::ArrayView1<C64>)
        -> nd::Array1<C64>
    {
        assert_lens(self.len(), &q, &live);
        let i = C64::i();
        let mut dq: nd::Array1<C64> = nd::Array1::zeros(self.len());
        for s in 0..self.torus.len() {
            let (l, r) = (self.torus.left(s), self.torus.right(s));
            let (d, u) = (self.torus.down(s), self.torus.up(s));
            let (up, dn) = (q[2 * s], q[2 * s + 1]);
            dq[2 * s] = over_i(
                -self.mu * up
                - self.j * (q[2 * l] + q[2 * r])
                - self.tz * (q[2 * d] + q[2 * u])
                - self.tso * (q[2 * l + 1] - q[2 * r + 1])
                - self.tso * i * (q[2 * d + 1] - q[2 * u + 1])
                + self.mz * up
                + self.u * up * live[2 * s].norm_sqr()
            );
            dq[2 * s + 1] = over_i(
                -self.mu * dn
                - self.j * (q[2 * l + 1] + q[2 * r + 1])
                - self.tz * (q[2 * d + 1] + q[2 * u + 1])
                - self.tso * (q[2 * r] - q[2 * l])
                - self.tso * i * (q[2 * d] - q[2 * u])
                - self.mz * dn
                + self.u * dn * live[2 * s + 1].norm_sqr()
            );
        }
        dq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, c: C64) -> nd::Array1<C64> {
        nd::Array1::from_elem(n, c)
    }

    // deterministic, structureless test vector
    fn scrambled(n: usize, seed: f64) -> nd::Array1<C64> {
        (0..n)
            .map(|k| {
                let x = k as f64 + seed;
                C64::new((1.3 * x).sin() + 0.2, (0.7 * x * x).cos())
            })
            .collect()
    }

    // H q, recovered from the derivative
    fn apply_h<E: Evaluator>(eval: &E, q: &nd::Array1<C64>) -> nd::Array1<C64> {
        eval.eval(q.view(), q.view()).mapv(|dqk| C64::i() * dqk)
    }

    fn inner(a: &nd::Array1<C64>, b: &nd::Array1<C64>) -> C64 {
        a.iter().zip(b).map(|(ak, bk)| ak.conj() * bk).sum()
    }

    fn assert_hermitian<E: Evaluator>(eval: &E) {
        let a = scrambled(eval.len(), 0.1);
        let b = scrambled(eval.len(), 2.9);
        let lhs = inner(&a, &apply_h(eval, &b));
        let rhs = inner(&apply_h(eval, &a), &b);
        assert!((lhs - rhs).norm() < 1e-12, "{lhs} != {rhs}");
    }

    #[test]
    fn chain_uniform_is_translation_invariant() {
        let (mu, j) = (0.3, 1.2);
        let c = C64::new(0.5, -0.25);
        let chain = Chain::new(7, ChainParams { mu, j, u: 0.0 });
        let q = uniform(7, c);
        let expected = (-mu * c - 2.0 * j * c) / C64::i();
        chain.eval(q.view(), q.view()).iter()
            .for_each(|dqk| assert!((dqk - expected).norm() < 1e-14));
    }

    #[test]
    fn spin_variants_uniform_reduce_to_hopping() {
        let (mu, j, tz) = (0.4, 1.0, 0.1);
        let c = C64::new(1.0, 0.5);
        let spin = SpinChain::new(
            5, SpinChainParams { mu, j, u: 0.0, tso: 0.3, mz: 0.0 });
        let q = uniform(10, c);
        let expected = (-mu * c - 2.0 * j * c) / C64::i();
        spin.eval(q.view(), q.view()).iter()
            .for_each(|dqk| assert!((dqk - expected).norm() < 1e-14));

        let lattice = SpinLattice::new(
            4,
            SpinLatticeParams { mu, j, tz, u: 0.0, tso: 0.3, mz: 0.0 },
        );
        let q = uniform(32, c);
        let expected = (-mu * c - 2.0 * (j + tz) * c) / C64::i();
        lattice.eval(q.view(), q.view()).iter()
            .for_each(|dqk| assert!((dqk - expected).norm() < 1e-14));
    }

    #[test]
    fn zeeman_splits_components() {
        let mz = 0.25;
        let spin = SpinChain::new(
            3, SpinChainParams { mu: 0.0, j: 0.0, u: 0.0, tso: 0.0, mz });
        let q = uniform(6, C64::from(1.0));
        let h = apply_h(&spin, &q);
        for s in 0..3 {
            assert!((h[2 * s] - mz).norm() < 1e-14);
            assert!((h[2 * s + 1] + mz).norm() < 1e-14);
        }
    }

    #[test]
    fn linear_parts_are_hermitian() {
        assert_hermitian(&Chain::new(6, ChainParams { mu: 0.7, j: 1.1, u: 0.0 }));
        assert_hermitian(&SpinChain::new(
            5,
            SpinChainParams { mu: 0.2, j: 0.9, u: 0.0, tso: 0.4, mz: -0.3 },
        ));
        assert_hermitian(&SpinLattice::new(
            3,
            SpinLatticeParams {
                mu: 0.2, j: 1.0, tz: 0.1, u: 0.0, tso: 0.1, mz: -0.5,
            },
        ));
    }

    #[test]
    fn nonlinearity_reads_live_state() {
        let chain = Chain::new(3, ChainParams { mu: 0.0, j: 0.0, u: 2.0 });
        let q = uniform(3, C64::from(1.0));
        let live = uniform(3, C64::from(3.0));
        chain.eval(q.view(), live.view()).iter()
            .for_each(|dqk| assert!((dqk - 18.0 / C64::i()).norm() < 1e-14));
    }

    #[test]
    #[should_panic(expected = "evaluator expects state vectors of length 8")]
    fn mismatched_length_panics() {
        let chain = Chain::new(8, ChainParams::default());
        let q = uniform(7, C64::from(1.0));
        chain.eval(q.view(), q.view());
    }
}
