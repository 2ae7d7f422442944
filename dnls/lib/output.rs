//! Plain-text persistence of relaxed states.
//!
//! A state file holds the chemical potential on its first line, followed by a
//! single line of complex amplitudes, each written as `(<re>+<im>j)` or
//! `(<re>-<|im|>j)` and followed by a space. All numbers use scientific
//! notation with [`PRECISION`] fractional digits and a signed, at least
//! two-digit exponent, which is readable by e.g. Python's `complex`:
//! ```text
//! -2.000000000000000000e+00
//! (7.071067811865475727e-01+0.000000000000000000e+00j) (...)
//! ```
//!
//! ```
//! use ndarray as nd;
//! use num_complex::Complex64 as C64;
//! use dnls::output::{ read_state, write_state };
//!
//! let q = nd::array![C64::new(0.5, -1.25e-7), C64::new(-3.0, 2.0)];
//! let mut buf: Vec<u8> = Vec::new();
//! write_state(&mut buf, -1.5, &q).unwrap();
//! let (mu, q_read) = read_state(buf.as_slice()).unwrap();
//! assert_eq!(mu, -1.5);
//! assert_eq!(q_read, q);
//! ```

use std::io::{ self, BufRead, Write };
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{ Arr1, error::FormatError, rhs::SpinLatticeParams };

pub type FormatResult<T> = Result<T, FormatError>;

/// Number of fractional digits written for every number.
pub const PRECISION: usize = 18;

/// Format a number in scientific notation with [`PRECISION`] fractional
/// digits and a C-style exponent (`e+00`).
pub fn fmt_sci(x: f64) -> String {
    if !x.is_finite() { return format!("{x}"); }
    let s = format!("{:.*e}", PRECISION, x);
    match s.split_once('e') {
        Some((mant, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mant}e{sign}{:02}", exp.abs())
        },
        None => s,
    }
}

/// Format a single amplitude as `(<re>±<im>j)`.
pub fn fmt_complex(z: C64) -> String {
    if z.im.is_sign_negative() {
        format!("({}-{}j)", fmt_sci(z.re), fmt_sci(-z.im))
    } else {
        format!("({}+{}j)", fmt_sci(z.re), fmt_sci(z.im))
    }
}

/// Parse a single amplitude written by [`fmt_complex`].
pub fn parse_complex(tok: &str) -> FormatResult<C64> {
    let bad = || FormatError::BadAmplitude(tok.to_string());
    let body
        = tok.strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .and_then(|t| t.strip_suffix('j'))
        .ok_or_else(bad)?;
    // the separating sign is the last '+' or '-' not part of an exponent
    let split
        = body.char_indices()
        .skip(1)
        .filter(|(k, c)| {
            (*c == '+' || *c == '-')
                && !matches!(body.as_bytes()[k - 1], b'e' | b'E')
        })
        .map(|(k, _)| k)
        .last()
        .ok_or_else(bad)?;
    let (re, im) = body.split_at(split);
    let re: f64 = re.parse().map_err(|_| bad())?;
    let im: f64 = im.parse().map_err(|_| bad())?;
    Ok(C64::new(re, im))
}

/// Write a chemical potential and a state vector.
pub fn write_state<W, S>(mut w: W, mu: f64, q: &Arr1<S>) -> io::Result<()>
where
    W: Write,
    S: nd::Data<Elem = C64>,
{
    writeln!(w, "{}", fmt_sci(mu))?;
    for qk in q.iter() {
        write!(w, "{} ", fmt_complex(*qk))?;
    }
    writeln!(w)?;
    Ok(())
}

/// Read a chemical potential and a state vector written by [`write_state`].
///
/// Amplitudes may be spread over any number of lines after the first.
pub fn read_state<R>(r: R) -> FormatResult<(f64, nd::Array1<C64>)>
where R: BufRead
{
    let mut lines = r.lines();
    let mu_line = lines.next().ok_or(FormatError::MissingMu)??;
    let mu: f64
        = mu_line.trim().parse()
        .map_err(|_| FormatError::BadMu(mu_line.clone()))?;
    let mut q: Vec<C64> = Vec::new();
    for line in lines {
        for tok in line?.split_whitespace() {
            q.push(parse_complex(tok)?);
        }
    }
    Ok((mu, nd::Array1::from_vec(q)))
}

/// File name under which a 2D spin-lattice sweep point is stored, encoding the
/// density `n` (particles per site) and the model parameters.
pub fn state_file_name(n: f64, params: &SpinLatticeParams) -> String {
    format!(
        "n({:.6})_U({:.6})_tz({:.6})_tso({:.6})_Mz({:.6}).txt",
        n, params.u, params.tz, params.tso, params.mz,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_format_uses_signed_two_digit_exponent() {
        assert_eq!(fmt_sci(1.0), "1.000000000000000000e+00");
        assert_eq!(fmt_sci(-0.25), "-2.500000000000000000e-01");
        assert_eq!(fmt_sci(2f64.powi(-22)), "2.384185791015625000e-07");
        assert_eq!(fmt_sci(6.02e123), "6.020000000000000000e+123");
        assert_eq!(fmt_sci(0.0), "0.000000000000000000e+00");
    }

    #[test]
    fn complex_sign_is_not_doubled() {
        let z = C64::new(1.0, -2.0);
        assert_eq!(
            fmt_complex(z),
            "(1.000000000000000000e+00-2.000000000000000000e+00j)",
        );
        assert_eq!(parse_complex(&fmt_complex(z)).unwrap(), z);
    }

    #[test]
    fn state_round_trips() {
        let q: nd::Array1<C64>
            = (0..17)
            .map(|k| {
                let x = k as f64;
                C64::new((0.37 * x).sin() * 1e-3, -(1.1 * x).cos() * 1e5)
            })
            .collect();
        let mut buf: Vec<u8> = Vec::new();
        write_state(&mut buf, 0.123456789, &q).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        let (mu, q_read) = read_state(buf.as_slice()).unwrap();
        assert_eq!(mu, 0.123456789);
        q.iter().zip(&q_read)
            .for_each(|(a, b)| assert!((a - b).norm() <= 1e-15 * a.norm()));
    }

    #[test]
    fn malformed_input_is_reported() {
        assert!(matches!(read_state("".as_bytes()), Err(FormatError::MissingMu)));
        assert!(matches!(
            read_state("abc\n".as_bytes()),
            Err(FormatError::BadMu(_)),
        ));
        assert!(matches!(
            read_state("1.0\n(1.0+2.0) \n".as_bytes()),
            Err(FormatError::BadAmplitude(_)),
        ));
    }

    #[test]
    fn file_name_encodes_parameters() {
        let params = SpinLatticeParams {
            mu: 1.0, j: 1.0, tz: 0.1, u: 0.0, tso: 0.1, mz: -0.5,
        };
        assert_eq!(
            state_file_name(1.0, &params),
            "n(1.000000)_U(0.000000)_tz(0.100000)_tso(0.100000)_Mz(-0.500000).txt",
        );
    }
}
