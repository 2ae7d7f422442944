use ndarray as nd;
use num_complex::Complex64 as C64;
use dnls::{
    ground::{ GroundState, Relaxation },
    output::{ read_state, write_state },
    rhs::{
        Chain,
        ChainParams,
        Evaluator,
        SpinChain,
        SpinChainParams,
        SpinLattice,
        SpinLatticeParams,
    },
    timedep::{ Rka, MAX_RETRIES },
    utils,
};

fn bumpy(n: usize) -> nd::Array1<C64> {
    (0..n)
        .map(|k| {
            let x = k as f64;
            C64::new(1.0 + 0.3 * (0.9 * x).cos(), 0.1 * (1.7 * x).sin())
        })
        .collect()
}

#[test]
fn norm_is_held_after_every_iteration() {
    let chain = Chain::new(10, ChainParams { mu: 1.0, j: 1.0, u: 0.4 });
    let rka = Rka::new(1e-4, 1e-10, &bumpy(10), chain).unwrap();
    let mut gs = GroundState::new(rka, 10.0).unwrap();
    assert!((gs.norm() - 10.0).abs() < 1e-10);
    for _ in 0..200 {
        gs.iterate();
        assert!((gs.norm() - 10.0).abs() < 1e-10);
    }
}

#[test]
fn chain_relaxes_to_uniform_state() {
    let n = 6;
    let target = 3.0;
    let chain = Chain::new(n, ChainParams { mu: 1.0, j: 1.0, u: 0.0 });
    let rka = Rka::new(1e-4, 1e-10, &bumpy(n), chain).unwrap();
    let mut gs = GroundState::new(rka, target).unwrap();
    let outcome = gs.relax();
    assert!(outcome.is_converged(), "{outcome:?}");
    assert_eq!(gs.integrator().time(), 0.0);

    let density = target / n as f64;
    let phase = gs.state()[0] / gs.state()[0].norm();
    gs.state().iter()
        .for_each(|qk| {
            assert!((qk.norm_sqr() - density).abs() < 1e-3 * density);
            assert!((qk / qk.norm() - phase).norm() < 1e-3);
        });
}

#[test]
fn uniform_state_is_stationary_with_repulsion() {
    // a uniform state is an eigenstate for any U on a ring
    let n = 5;
    let q0: nd::Array1<C64> = nd::Array1::from_elem(n, C64::from(1.0));
    let chain = Chain::new(n, ChainParams { mu: -1.0, j: 1.0, u: 0.5 });
    let rka = Rka::new(1e-4, 1e-10, &q0, chain).unwrap();
    let mut gs = GroundState::new(rka, n as f64).unwrap();
    let outcome = gs.relax();
    assert!(outcome.is_converged());
    assert_eq!(outcome.iters(), 1);
    gs.state().iter()
        .for_each(|qk| assert!((qk - C64::from(1.0)).norm() < 1e-9));
}

#[test]
fn zeeman_field_polarizes_spin_lattice() {
    let l = 3;
    let params = SpinLatticeParams {
        mu: 1.0, j: 1.0, tz: 0.1, u: 0.0, tso: 0.0, mz: -0.5,
    };
    let lattice = SpinLattice::new(l, params);
    let q0: nd::Array1<C64> = nd::Array1::from_elem(2 * l * l, C64::from(1.0));
    let rka = Rka::new(1e-4, 1e-10, &q0, lattice).unwrap();
    let target = (l * l) as f64;
    let mut gs = GroundState::new(rka, target).unwrap();
    let outcome = gs.relax();
    assert!(outcome.is_converged(), "{outcome:?}");
    let norms = gs.component_norms();
    assert_eq!(norms.len(), 2);
    assert!(norms[0] > 0.999 * target);
    assert!(norms[1] < 1e-3 * target);
}

#[test]
fn spin_orbit_moves_condensate_off_zero_momentum() {
    // with strong spin-flip hopping the band minimum of a 1D spin chain sits at
    // finite momentum
    let n = 8;
    let params = SpinChainParams { mu: 1.0, j: 0.2, u: 0.0, tso: 1.0, mz: 0.0 };
    let spin = SpinChain::new(n, params);
    let q0: nd::Array1<C64> = bumpy(2 * n);
    let rka = Rka::new(1e-4, 1e-10, &q0, spin).unwrap();
    let mut gs = GroundState::new(rka, n as f64).unwrap();
    let outcome = gs.relax();
    assert!(outcome.is_converged(), "{outcome:?}");
    let rho = utils::momentum_density_1d(gs.state(), 2);
    let peaks = utils::peak_momenta(&rho);
    assert!(peaks.iter().all(|k| *k != 0), "{peaks:?}");
}

#[test]
fn step_cap_reports_non_convergence() {
    let lattice = SpinLattice::new(4, SpinLatticeParams::default());
    let rka = Rka::new(1e-4, 1e-10, &bumpy(32), lattice).unwrap();
    let mut gs = GroundState::new(rka, 16.0).unwrap()
        .with_maxsteps(50).unwrap();
    let outcome = gs.relax();
    assert!(matches!(outcome, Relaxation::NonConverged { .. }));
    assert!(outcome.substeps() <= 50 + MAX_RETRIES);
    assert!((gs.norm() - 16.0).abs() < 1e-10);
    assert_eq!(gs.integrator().time(), 0.0);
}

#[test]
fn unreachable_accuracy_terminates() {
    let chain = Chain::new(4, ChainParams::default());
    let rka = Rka::new(1e-4, 1e-300, &bumpy(4), chain).unwrap();
    let mut gs = GroundState::new(rka, 4.0).unwrap()
        .with_maxsteps(2_000).unwrap();
    let outcome = gs.relax();
    assert!(!outcome.is_converged());
    assert!(outcome.substeps() <= 2_000 + MAX_RETRIES);
}

#[test]
fn relaxed_state_survives_persistence() {
    let chain = Chain::new(4, ChainParams { mu: 1.0, j: 1.0, u: 0.2 });
    let rka = Rka::new(1e-4, 1e-10, &bumpy(4), chain).unwrap();
    let mut gs = GroundState::new(rka, 2.0).unwrap();
    gs.relax();
    let mut buf: Vec<u8> = Vec::new();
    write_state(&mut buf, gs.mu(), gs.state()).unwrap();
    let (mu, q) = read_state(buf.as_slice()).unwrap();
    assert_eq!(mu, gs.mu());
    assert_eq!(&q, gs.state());
}

#[test]
fn ground_state_is_stationary_in_real_time() {
    let chain = Chain::new(6, ChainParams { mu: 1.0, j: 1.0, u: 0.0 });
    let rka = Rka::new(1e-4, 1e-11, &bumpy(6), chain).unwrap();
    let mut gs = GroundState::new(rka, 6.0).unwrap();
    assert!(gs.relax().is_converged());
    let densities: Vec<f64> = gs.state().iter().map(|qk| qk.norm_sqr()).collect();
    let mut rka = gs.into_inner();
    rka.advance(2.0, C64::from(1.0)).unwrap();
    assert!((rka.norm() - 6.0).abs() < 1e-6);
    rka.state().iter().zip(&densities)
        .for_each(|(qk, d)| assert!((qk.norm_sqr() - d).abs() < 1e-3));
    assert_eq!(rka.evaluator().components(), 1);
}
