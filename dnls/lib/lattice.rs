//! Periodic neighbor maps for the supported lattice shapes.
//!
//! State vectors interleave the components of each site, so that the amplitude
//! of component `c` on site `s` lives at index `ncomp * s + c`. Neighbor maps
//! here work on *site* indices; use [`index`] and [`site_of`] to move between
//! the two.
//!
//! ```
//! use dnls::lattice::Ring;
//!
//! let ring = Ring::new(5);
//! assert_eq!(ring.left(0), 4);
//! assert_eq!(ring.right(4), 0);
//! assert!((0..5).all(|i| ring.left(ring.right(i)) == i));
//! ```

/// Wrap a possibly negative site offset onto `0..n`.
///
/// This is the mathematical modulo, not the truncating remainder, so
/// `wrap(-1, n) == n - 1`.
///
/// *Panics if `n` is zero*.
pub fn wrap(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

/// Position in the state vector of component `c` on site `s`.
pub fn index(s: usize, c: usize, ncomp: usize) -> usize { ncomp * s + c }

/// Inverse of [`index`]: the `(site, component)` pair stored at index `i`.
pub fn site_of(i: usize, ncomp: usize) -> (usize, usize) {
    (i / ncomp, i % ncomp)
}

/// A one-dimensional ring of `n` sites.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ring {
    n: usize,
}

impl Ring {
    /// *Panics if `n` is zero*.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "a ring needs at least one site");
        Self { n }
    }

    /// Number of sites.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.n }

    /// Site to the left of `s`, wrapping at 0.
    pub fn left(&self, s: usize) -> usize { wrap(s as isize - 1, self.n) }

    /// Site to the right of `s`, wrapping at `n - 1`.
    pub fn right(&self, s: usize) -> usize { wrap(s as isize + 1, self.n) }
}

/// A square `l × l` torus.
///
/// Sites are numbered row-major, `s = x + l * y`; `x` runs along the
/// horizontal axis and `y` along the vertical one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Torus {
    l: usize,
}

impl Torus {
    /// *Panics if `l` is zero*.
    pub fn new(l: usize) -> Self {
        assert!(l > 0, "a torus needs at least one site per side");
        Self { l }
    }

    /// Side length.
    pub fn side(&self) -> usize { self.l }

    /// Number of sites, `l²`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.l * self.l }

    /// Site number of the coordinates `(x, y)`.
    pub fn site(&self, x: usize, y: usize) -> usize { x + self.l * y }

    /// Coordinates `(x, y)` of site `s`.
    pub fn coords(&self, s: usize) -> (usize, usize) {
        (s % self.l, s / self.l)
    }

    fn shifted(&self, s: usize, dx: isize, dy: isize) -> usize {
        let (x, y) = self.coords(s);
        self.site(
            wrap(x as isize + dx, self.l),
            wrap(y as isize + dy, self.l),
        )
    }

    /// Neighbor at `x - 1`.
    pub fn left(&self, s: usize) -> usize { self.shifted(s, -1, 0) }

    /// Neighbor at `x + 1`.
    pub fn right(&self, s: usize) -> usize { self.shifted(s, 1, 0) }

    /// Neighbor at `y - 1`.
    pub fn down(&self, s: usize) -> usize { self.shifted(s, 0, -1) }

    /// Neighbor at `y + 1`.
    pub fn up(&self, s: usize) -> usize { self.shifted(s, 0, 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_mathematical_modulo() {
        assert_eq!(wrap(-1, 7), 6);
        assert_eq!(wrap(-8, 7), 6);
        assert_eq!(wrap(7, 7), 0);
        assert_eq!(wrap(3, 7), 3);
    }

    #[test]
    fn ring_wraps_both_ends() {
        for n in 1..10 {
            let ring = Ring::new(n);
            assert_eq!(ring.left(0), n - 1);
            assert_eq!(ring.right(n - 1), 0);
            for i in 0..n {
                assert_eq!(ring.left(ring.right(i)), i);
                assert_eq!(ring.right(ring.left(i)), i);
            }
        }
    }

    #[test]
    fn torus_neighbors_wrap() {
        let torus = Torus::new(4);
        assert_eq!(torus.left(torus.site(0, 2)), torus.site(3, 2));
        assert_eq!(torus.right(torus.site(3, 1)), torus.site(0, 1));
        assert_eq!(torus.down(torus.site(2, 0)), torus.site(2, 3));
        assert_eq!(torus.up(torus.site(1, 3)), torus.site(1, 0));
        for s in 0..torus.len() {
            assert_eq!(torus.left(torus.right(s)), s);
            assert_eq!(torus.down(torus.up(s)), s);
            let (x, y) = torus.coords(s);
            assert_eq!(torus.site(x, y), s);
        }
    }

    #[test]
    fn interleaving_round_trips() {
        for i in 0..20 {
            let (s, c) = site_of(i, 2);
            assert_eq!(index(s, c, 2), i);
        }
        assert_eq!(index(3, 1, 2), 7);
    }
}
