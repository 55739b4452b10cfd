//! Orbital probability model for the electron cloud visualizer.
//! Hydrogen-like radial and angular factors, tuned for point-cloud brightness
//! rather than spectroscopic accuracy.

use serde::Serialize;
use std::f64::consts::PI;

/// Represents quantum numbers (n, l, m_l)
/// n: Principal quantum number (1, 2, 3, ...)
/// l: Azimuthal quantum number (0 to n-1)
/// m_l: Magnetic quantum number (-l to l)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuantumNumbers {
    pub n: u32,
    pub l: u32,
    pub m_l: i32,
}

impl QuantumNumbers {
    pub fn new(n: u32, l: u32, m_l: i32) -> Option<Self> {
        // Validate quantum numbers
        if n == 0 || l >= n || m_l.unsigned_abs() > l {
            return None;
        }
        Some(QuantumNumbers { n, l, m_l })
    }

    /// Builds a descriptor without range checks. Used by the static catalog,
    /// whose entries are valid by construction.
    pub const fn new_unchecked(n: u32, l: u32, m_l: i32) -> Self {
        QuantumNumbers { n, l, m_l }
    }
}

/// Length scale for the reduced radial coordinate. Visualization-tuned,
/// not the physical Bohr radius.
pub const RADIAL_SCALE: f64 = 0.65;

/// Outer shells are more diffuse, so their density gets boosted by n^2.5.
pub const N_BOOST_EXPONENT: f64 = 2.5;

/// Global brightness multiplier applied on top of the shell boost.
pub const INTENSITY_FACTOR: f64 = 4.0;

/// Which closed form `radial_part` uses for a given (n, l).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialForm {
    /// Exact hydrogen-like polynomial from the K..N table.
    Tabulated,
    /// Plain exp(-rho/2) decay. An approximation, not a solution.
    Fallback,
}

pub fn radial_form(n: u32, l: u32) -> RadialForm {
    match (n, l) {
        (1, _) => RadialForm::Tabulated,
        (2..=4, l) if l < n => RadialForm::Tabulated,
        _ => RadialForm::Fallback,
    }
}

/// Dimensionless radial profile R(n, l, r), unnormalized.
///
/// Each tabulated entry is `(n-l-1)! * rho^l * L^{2l+1}_{n-l-1}(rho) * exp(-rho/2)`
/// with `rho = 2 * RADIAL_SCALE * r / n`. Shells above N (and invalid l)
/// fall back to the bare exponential, see [`radial_form`].
pub fn radial_part(r: f64, n: u32, l: u32) -> f64 {
    let rho = 2.0 * RADIAL_SCALE * r / n.max(1) as f64;
    let decay = (-rho / 2.0).exp();

    let poly = match (n, l) {
        (1, _) => 1.0,
        (2, 0) => 2.0 - rho,
        (2, 1) => rho,
        (3, 0) => 6.0 - 6.0 * rho + rho * rho,
        (3, 1) => (4.0 - rho) * rho,
        (3, 2) => rho * rho,
        (4, 0) => 24.0 - 36.0 * rho + 12.0 * rho * rho - rho.powi(3),
        (4, 1) => (20.0 - 10.0 * rho + rho * rho) * rho,
        (4, 2) => (6.0 - rho) * rho * rho,
        (4, 3) => rho.powi(3),
        _ => 1.0,
    };

    poly * decay
}

/// Real spherical harmonic Y(l, m, theta, phi).
/// m > 0 -> cos(m phi) lobe, m < 0 -> sin(|m| phi) lobe, m = 0 -> Y_l0.
/// The Condon-Shortley phase comes from `associated_legendre`.
pub fn spherical_harmonic(theta: f64, phi: f64, l: u32, m_l: i32) -> f64 {
    let m_abs = m_l.unsigned_abs();
    if m_abs > l {
        return 0.0;
    }

    let norm = ((2 * l + 1) as f64 * factorial(l - m_abs)
        / (4.0 * PI * factorial(l + m_abs)))
    .sqrt();
    let legendre = associated_legendre(theta.cos(), l, m_l);

    match m_l {
        0 => norm * legendre,
        m if m > 0 => 2.0_f64.sqrt() * norm * legendre * (m as f64 * phi).cos(),
        _ => 2.0_f64.sqrt() * norm * legendre * (m_abs as f64 * phi).sin(),
    }
}

/// Boosted |psi|^2 at a point given in spherical coordinates.
///
/// This is NOT a normalized probability density and does not integrate to 1.
/// It carries the n^2.5 shell boost and [`INTENSITY_FACTOR`] so that it can be
/// compared directly against a uniform draw during rejection sampling.
/// Never interpret the value as an absolute probability.
pub fn probability_density(r: f64, theta: f64, phi: f64, qn: QuantumNumbers) -> f64 {
    let radial = radial_part(r, qn.n, qn.l);
    let angular = spherical_harmonic(theta, phi, qn.l, qn.m_l);

    let wavefunction = radial * angular;
    let n_boost = (qn.n as f64).powf(N_BOOST_EXPONENT);
    wavefunction * wavefunction * n_boost * INTENSITY_FACTOR
}

/// Calculate factorial of a u32 as a float
pub fn factorial(n: u32) -> f64 {
    (2..=n).map(|i| i as f64).product()
}

/// Double factorial n!! = n * (n-2) * (n-4) * ... * 1 or 2
pub fn double_factorial(n: u32) -> f64 {
    (1..=n).rev().step_by(2).map(|i| i as f64).product()
}

/// Associated Legendre polynomial P^|m|_l(x), Condon-Shortley phase included.
/// Returns 0 when |m| > l.
pub fn associated_legendre(x: f64, l: u32, m: i32) -> f64 {
    let m = m.unsigned_abs();
    if m > l {
        return 0.0;
    }

    let m_f = m as f64;

    // P^m_m = (-1)^m (2m-1)!! (1-x^2)^(m/2)
    let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
    let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();
    let pmm = sign * double_factorial(2 * m.max(1) - 1) * somx2.powi(m as i32);

    if l == m {
        return pmm;
    }

    let pm1m = x * (2.0 * m_f + 1.0) * pmm;

    if l == m + 1 {
        return pm1m;
    }

    // Recurrence relation
    let mut pmn = pmm;
    let mut pm1n = pm1m;

    for i in (m + 2)..=l {
        let i_f = i as f64;
        let pn = ((2.0 * i_f - 1.0) * x * pm1n - (i_f + m_f - 1.0) * pmn) / (i_f - m_f);
        pmn = pm1n;
        pm1n = pn;
    }

    pm1n
}
