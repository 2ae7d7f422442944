//! Miscellaneous tools for lattice state vectors.

use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rustfft as fft;
use crate::Arr1;

/// Total squared magnitude (particle number) of a state vector.
pub fn norm<S>(q: &Arr1<S>) -> f64
where S: nd::Data<Elem = C64>
{
    q.iter().map(|qk| qk.norm_sqr()).sum()
}

/// Rescale a state vector in place so that its [`norm`] equals `target`.
///
/// An all-zero vector cannot be rescaled and is left untouched; returns
/// `false` in that case.
pub fn renormalize<S>(q: &mut Arr1<S>, target: f64) -> bool
where S: nd::DataMut<Elem = C64>
{
    let n = norm(q);
    if n == 0.0 { return false; }
    let scale = (target / n).sqrt();
    q.map_inplace(|qk| { *qk *= scale; });
    true
}

/// Root-mean-square per-index difference between two state vectors.
///
/// *Panics if the arrays have unequal length*.
pub fn rms_diff<S, T>(a: &Arr1<S>, b: &Arr1<T>) -> f64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    assert_eq!(a.len(), b.len(), "rms_diff: unequal lengths");
    if a.is_empty() { return 0.0; }
    let sum: f64
        = nd::Zip::from(a).and(b)
        .fold(0.0, |acc, ak, bk| acc + (ak - bk).norm_sqr());
    (sum / a.len() as f64).sqrt()
}

/// Particle number held by each of the `ncomp` interleaved components.
///
/// *Panics if `ncomp` is zero*.
pub fn component_norms<S>(q: &Arr1<S>, ncomp: usize) -> Vec<f64>
where S: nd::Data<Elem = C64>
{
    assert!(ncomp > 0, "component_norms: ncomp must be non-zero");
    let mut norms = vec![0.0; ncomp];
    q.iter().enumerate()
        .for_each(|(i, qi)| { norms[i % ncomp] += qi.norm_sqr(); });
    norms
}

// pull out one interleaved component as its own array
fn component<S>(q: &Arr1<S>, c: usize, ncomp: usize) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    q.iter().skip(c).step_by(ncomp).copied().collect()
}

fn fft_inplace(f: &mut [C64], planner: &mut fft::FftPlanner<f64>) {
    let plan = planner.plan_fft_forward(f.len());
    plan.process(f);
}

/// Momentum-space density of a one-dimensional state with `ncomp` interleaved
/// components.
///
/// Row `c` of the returned array holds `|FFT(q_c)[k]|² / n` for component `c`,
/// where `n` is the number of sites, so that each row sums to that component's
/// particle number. Momenta are in FFT order (non-negative first).
///
/// *Panics if the length of `q` is not a multiple of `ncomp`*.
pub fn momentum_density_1d<S>(q: &Arr1<S>, ncomp: usize) -> nd::Array2<f64>
where S: nd::Data<Elem = C64>
{
    assert!(
        ncomp > 0 && q.len() % ncomp == 0,
        "momentum_density_1d: length {} is not a multiple of {ncomp}",
        q.len(),
    );
    let n = q.len() / ncomp;
    let mut planner = fft::FftPlanner::new();
    let mut rho: nd::Array2<f64> = nd::Array2::zeros((ncomp, n));
    for (c, mut row) in rho.axis_iter_mut(nd::Axis(0)).enumerate() {
        let mut f = component(q, c, ncomp).to_vec();
        fft_inplace(&mut f, &mut planner);
        row.iter_mut().zip(&f)
            .for_each(|(rk, fk)| { *rk = fk.norm_sqr() / n as f64; });
    }
    rho
}

/// Momentum-space density of a state on an `l × l` torus with `ncomp`
/// interleaved components.
///
/// The returned array has shape `(ncomp, l, l)`, indexed as `[c, ky, kx]`,
/// normalized like [`momentum_density_1d`].
///
/// *Panics if the length of `q` is not `ncomp * l²`*.
pub fn momentum_density_2d<S>(q: &Arr1<S>, l: usize, ncomp: usize)
    -> nd::Array3<f64>
where S: nd::Data<Elem = C64>
{
    assert!(
        ncomp > 0 && q.len() == ncomp * l * l,
        "momentum_density_2d: length {} does not match {ncomp} × {l}²",
        q.len(),
    );
    let sites = (l * l) as f64;
    let mut planner = fft::FftPlanner::new();
    let mut rho: nd::Array3<f64> = nd::Array3::zeros((ncomp, l, l));
    let mut buf: Vec<C64> = vec![C64::zero(); l];
    for c in 0..ncomp {
        let mut f: nd::Array2<C64>
            = nd::Array2::from_shape_fn((l, l), |(y, x)| q[ncomp * (x + l * y) + c]);
        // rows run along x
        for mut row in f.axis_iter_mut(nd::Axis(0)) {
            buf.iter_mut().zip(row.iter()).for_each(|(b, r)| { *b = *r; });
            fft_inplace(&mut buf, &mut planner);
            row.iter_mut().zip(&buf).for_each(|(r, b)| { *r = *b; });
        }
        for mut col in f.axis_iter_mut(nd::Axis(1)) {
            buf.iter_mut().zip(col.iter()).for_each(|(b, r)| { *b = *r; });
            fft_inplace(&mut buf, &mut planner);
            col.iter_mut().zip(&buf).for_each(|(r, b)| { *r = *b; });
        }
        rho.slice_mut(nd::s![c, .., ..])
            .zip_mut_with(&f, |rk, fk| { *rk = fk.norm_sqr() / sites; });
    }
    rho
}

/// Index of the largest value in each row, i.e. the condensate momentum of
/// each component of a [1D momentum density][momentum_density_1d].
pub fn peak_momenta(rho: &nd::Array2<f64>) -> Vec<usize> {
    rho.axis_iter(nd::Axis(0))
        .map(|row| {
            row.iter().enumerate()
                .fold((0, f64::NEG_INFINITY), |(kmax, vmax), (k, &v)| {
                    if v > vmax { (k, v) } else { (kmax, vmax) }
                })
                .0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renormalize_hits_target() {
        let mut q: nd::Array1<C64>
            = (0..9).map(|k| C64::new(k as f64, 1.0 - k as f64)).collect();
        assert!(renormalize(&mut q, 4.5));
        assert!((norm(&q) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn renormalize_skips_zero_vector() {
        let mut q: nd::Array1<C64> = nd::Array1::zeros(4);
        assert!(!renormalize(&mut q, 1.0));
        assert!(q.iter().all(|qk| *qk == C64::zero()));
    }

    #[test]
    fn rms_diff_of_shifted_vector() {
        let a: nd::Array1<C64> = nd::Array1::from_elem(5, C64::new(1.0, 0.0));
        let b: nd::Array1<C64> = nd::Array1::from_elem(5, C64::new(1.0, 2.0));
        assert!((rms_diff(&a, &b) - 2.0).abs() < 1e-14);
        assert_eq!(rms_diff(&a, &a), 0.0);
    }

    #[test]
    fn component_norms_split_interleaving() {
        let q = nd::array![
            C64::from(1.0), C64::from(2.0), C64::from(3.0), C64::from(4.0)];
        assert_eq!(component_norms(&q, 2), vec![10.0, 20.0]);
        assert_eq!(component_norms(&q, 1), vec![30.0]);
    }

    #[test]
    fn uniform_state_condenses_at_zero_momentum() {
        let q: nd::Array1<C64> = nd::Array1::from_elem(16, C64::new(0.5, 0.5));
        let rho = momentum_density_1d(&q, 2);
        assert_eq!(peak_momenta(&rho), vec![0, 0]);
        let total: f64 = rho.sum();
        assert!((total - norm(&q)).abs() < 1e-12);

        let rho2 = momentum_density_2d(&q, 2, 4);
        assert!((rho2[[0, 0, 0]] - norm(&q) / 4.0).abs() < 1e-12);
        assert!((rho2.sum() - norm(&q)).abs() < 1e-12);
    }

    #[test]
    fn plane_wave_peaks_at_its_momentum() {
        let n = 12;
        let k = 3;
        let q: nd::Array1<C64>
            = (0..n)
            .map(|x| C64::cis(std::f64::consts::TAU * (k * x) as f64 / n as f64))
            .collect();
        let rho = momentum_density_1d(&q, 1);
        assert_eq!(peak_momenta(&rho), vec![k]);
    }
}
