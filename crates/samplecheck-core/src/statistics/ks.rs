//! Two-sample Kolmogorov-Smirnov test.
//!
//! The statistic is the largest vertical distance between the empirical
//! CDFs of two one-dimensional samples:
//!
//! ```text
//! D = sup_z |F_x(z) - F_y(z)|
//! ```
//!
//! ## p-values
//!
//! - `n * m < 10_000`: exact distribution of `D` under H0, by counting
//!   monotone lattice paths from (0, 0) to (m, n) that stay within a band
//!   around the diagonal and dividing by `C(n + m, m)`.
//! - otherwise: the asymptotic Kolmogorov distribution,
//!   `1 - K(D * sqrt(n m / (n + m)))` with
//!   `K(t) = 1 + 2 Σ_{k≥1} (-1)^k exp(-2 k² t²)`.
//!
//! ## Ties
//!
//! The exact distribution assumes continuous data. When a small-sample test
//! sees duplicated values, copies of both samples are jittered with
//! Uniform(-δ, δ) noise (δ = half the smallest gap between distinct values)
//! until the ties are gone. The jitter draws from a caller-supplied RNG so
//! results are reproducible.

use rand::Rng;

use crate::constants::{
    KS_D_TOLERANCE, KS_SUM_MAX_ITERATIONS, KS_SUM_TOLERANCE, LARGE_SAMPLE_PRODUCT,
    MAX_TIE_BREAK_ATTEMPTS,
};
use crate::error::{DataError, NumericalError, Result};

use super::binomial::binomial_coefficient_f64;

/// Minimum number of observations per sample.
const MIN_SAMPLE_SIZE: usize = 2;

/// How a KS p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PValueMethod {
    /// Exact lattice-path computation (`n * m < 10_000`).
    Exact,
    /// Asymptotic Kolmogorov distribution.
    Asymptotic,
}

impl std::fmt::Display for PValueMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PValueMethod::Exact => write!(f, "exact"),
            PValueMethod::Asymptotic => write!(f, "asymptotic"),
        }
    }
}

/// Outcome of a two-sample KS test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsOutcome {
    /// `D` computed on the samples as given.
    pub statistic: f64,
    /// p-value for H0: both samples come from the same distribution.
    pub p_value: f64,
    /// Exact or asymptotic.
    pub method: PValueMethod,
    /// Whether ties were jittered away before computing an exact p-value.
    pub ties_broken: bool,
}

/// Two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TwoSampleKs {
    /// Exact p-value is `P(D > d)` when strict, `P(D >= d)` otherwise.
    pub strict: bool,
}

impl Default for TwoSampleKs {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl TwoSampleKs {
    /// Create a test with the given boundary convention.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Test whether `x` and `y` come from the same continuous distribution.
    ///
    /// `rng` is only consumed when ties have to be broken. The reported
    /// statistic is always the one of the unjittered samples; with ties the
    /// exact p-value is computed from the jittered copies.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if either sample has fewer than 2 values.
    /// - `NonFinite` if a sample holds NaN or infinity.
    /// - `TiesUnresolved` if jitter fails to separate duplicated values.
    /// - `Convergence` if the asymptotic series does not converge.
    pub fn test<R: Rng + ?Sized>(&self, x: &[f64], y: &[f64], rng: &mut R) -> Result<KsOutcome> {
        check_sample(x)?;
        check_sample(y)?;

        let (n, m) = (x.len(), y.len());
        let statistic = statistic_unchecked(x, y);

        if (n as u64) * (m as u64) >= LARGE_SAMPLE_PRODUCT {
            let p_value = approximate_p(statistic, n, m)?;
            tracing::debug!(n, m, statistic, p_value, "asymptotic KS p-value");
            return Ok(KsOutcome {
                statistic,
                p_value,
                method: PValueMethod::Asymptotic,
                ties_broken: false,
            });
        }

        let (exact_statistic, ties_broken) = if has_ties(x, y) {
            let mut xa = x.to_vec();
            let mut ya = y.to_vec();
            break_ties(&mut xa, &mut ya, rng)?;
            (statistic_unchecked(&xa, &ya), true)
        } else {
            (statistic, false)
        };

        let p_value = exact_p(exact_statistic, n, m, self.strict);
        tracing::debug!(n, m, statistic, p_value, ties_broken, "exact KS p-value");

        Ok(KsOutcome {
            statistic,
            p_value,
            method: PValueMethod::Exact,
            ties_broken,
        })
    }
}

/// Two-sample KS statistic `D` in [0, 1].
///
/// # Errors
///
/// `InsufficientData` if either sample has fewer than 2 values, `NonFinite`
/// if a sample holds NaN or infinity.
pub fn ks_statistic(x: &[f64], y: &[f64]) -> Result<f64> {
    check_sample(x)?;
    check_sample(y)?;
    Ok(statistic_unchecked(x, y))
}

fn check_sample(sample: &[f64]) -> Result<()> {
    if sample.len() < MIN_SAMPLE_SIZE {
        return Err(DataError::InsufficientData {
            needed: MIN_SAMPLE_SIZE,
            actual: sample.len(),
        }
        .into());
    }
    if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
        return Err(DataError::NonFinite { index }.into());
    }
    Ok(())
}

fn statistic_unchecked(x: &[f64], y: &[f64]) -> f64 {
    let (n, m) = (x.len() as u64, y.len() as u64);
    integral_statistic(x, y) as f64 / (n * m) as f64
}

/// `n * m * D`, computed with integer steps so that ties are exact.
///
/// Walks both sorted samples like a merge. Every `x` value consumed adds `m`
/// to the running difference, every `y` value subtracts `n`; the supremum is
/// taken only after a whole run of equal values has been consumed.
fn integral_statistic(x: &[f64], y: &[f64]) -> i64 {
    let mut sx = x.to_vec();
    let mut sy = y.to_vec();
    sx.sort_by(f64::total_cmp);
    sy.sort_by(f64::total_cmp);

    let (n, m) = (sx.len(), sy.len());
    let (step_x, step_y) = (m as i64, n as i64);

    let mut rank_x = 0;
    let mut rank_y = 0;
    let mut cur: i64 = 0;
    let mut sup: i64 = 0;

    while rank_x < n && rank_y < m {
        let z = sx[rank_x].min(sy[rank_y]);
        while rank_x < n && sx[rank_x] == z {
            rank_x += 1;
            cur += step_x;
        }
        while rank_y < m && sy[rank_y] == z {
            rank_y += 1;
            cur -= step_y;
        }
        sup = sup.max(cur.abs());
    }
    sup
}

/// Exact p-value of `d` for sample sizes `n` and `m`.
///
/// Strict: `P(D > d)`, otherwise `P(D >= d)`.
pub fn exact_p(d: f64, n: usize, m: usize, strict: bool) -> f64 {
    let bound = integral_bound(d, n, m, strict);
    let inside = admissible_paths(m, n, bound, strict);
    let total = binomial_coefficient_f64((n + m) as u64, m as u64);
    (1.0 - inside / total).clamp(0.0, 1.0)
}

/// Integer band half-width `c` matching `d * n * m`.
///
/// Statistics within [`KS_D_TOLERANCE`] of a lattice value are snapped to
/// it. Strict tests count paths with `n m D <= c = floor(d n m)`, so the
/// complement is `P(D > d)`; non-strict tests count `n m D < c = ceil(d n m)`,
/// whose complement is `P(D >= d)`.
fn integral_bound(d: f64, n: usize, m: usize, strict: bool) -> i64 {
    let nm = ((n as u64) * (m as u64)) as f64;
    if strict {
        ((d + KS_D_TOLERANCE) * nm).floor() as i64
    } else {
        ((d - KS_D_TOLERANCE) * nm).ceil() as i64
    }
}

/// Number of monotone paths from (0, 0) to (`rows`, `cols`) whose every
/// cell `(i, j)` satisfies `|i * cols - j * rows| <= bound` (strict) or
/// `< bound` (non-strict).
///
/// Unwinds the recurrence one row at a time: while row `i` is computed,
/// `lag[j - 1]` still holds the count for `(i - 1, j)`.
fn admissible_paths(rows: usize, cols: usize, bound: i64, strict: bool) -> f64 {
    let (r, c) = (rows as i64, cols as i64);
    let inside = |i: i64, j: i64| -> f64 {
        let dist = (i * c - j * r).abs();
        let ok = if strict { dist <= bound } else { dist < bound };
        if ok {
            1.0
        } else {
            0.0
        }
    };

    let mut lag: Vec<f64> = (1..=c).map(|j| inside(0, j)).collect();
    let mut last = 0.0;
    for i in 1..=r {
        last = inside(i, 0);
        for j in 1..=c {
            let idx = (j - 1) as usize;
            lag[idx] = inside(i, j) * (last + lag[idx]);
            last = lag[idx];
        }
    }
    last
}

/// Asymptotic p-value of `d` for sample sizes `n` and `m`.
///
/// # Errors
///
/// `Convergence` if the Kolmogorov series needs more than
/// [`KS_SUM_MAX_ITERATIONS`] terms.
pub fn approximate_p(d: f64, n: usize, m: usize) -> Result<f64> {
    let (dn, dm) = (n as f64, m as f64);
    let t = d * ((dn * dm) / (dn + dm)).sqrt();
    let cdf = ks_sum(t, KS_SUM_TOLERANCE, KS_SUM_MAX_ITERATIONS)?;
    Ok((1.0 - cdf).clamp(0.0, 1.0))
}

/// Kolmogorov CDF `K(t) = 1 + 2 Σ_{k≥1} (-1)^k exp(-2 k² t²)`.
///
/// Summation stops once a term is at most `tolerance`. `K(0) = 0`.
///
/// # Errors
///
/// `Convergence` if `max_iterations` terms are reached first.
pub fn ks_sum(t: f64, tolerance: f64, max_iterations: u64) -> Result<f64> {
    if t == 0.0 {
        return Ok(0.0);
    }

    let x = -2.0 * t * t;
    let mut sign = -1.0;
    let mut i: u64 = 1;
    let mut partial_sum = 0.5;
    let mut delta = 1.0;
    while delta > tolerance && i < max_iterations {
        delta = (x * (i * i) as f64).exp();
        partial_sum += sign * delta;
        sign = -sign;
        i += 1;
    }
    if i == max_iterations {
        return Err(NumericalError::Convergence {
            iterations: max_iterations,
        }
        .into());
    }
    Ok(partial_sum * 2.0)
}

/// Whether the pooled values contain any duplicate.
fn has_ties(x: &[f64], y: &[f64]) -> bool {
    let mut pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    pooled.sort_by(f64::total_cmp);
    pooled.windows(2).any(|w| w[0] == w[1])
}

/// Jitter both samples in place until no pooled value repeats.
fn break_ties<R: Rng + ?Sized>(x: &mut [f64], y: &mut [f64], rng: &mut R) -> Result<()> {
    let mut distinct: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    // Smallest gap between distinct values, or 1 if everything is equal.
    let min_gap = distinct
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(1.0_f64, f64::min);
    let half_gap = (min_gap / 2.0).max(f64::MIN_POSITIVE);

    for attempt in 1..=MAX_TIE_BREAK_ATTEMPTS {
        for v in x.iter_mut().chain(y.iter_mut()) {
            *v += rng.random_range(-half_gap..half_gap);
        }
        if !has_ties(x, y) {
            tracing::debug!(attempt, half_gap, "KS ties broken by jitter");
            return Ok(());
        }
    }
    Err(NumericalError::TiesUnresolved {
        attempts: MAX_TIE_BREAK_ATTEMPTS,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::statistics::rng::stream_rng;

    #[test]
    fn test_separated_samples() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [6.0, 7.0, 8.0, 9.0, 10.0];
        let outcome = TwoSampleKs::default()
            .test(&x, &y, &mut stream_rng(1, 0))
            .unwrap();

        assert_eq!(outcome.statistic, 1.0);
        assert_eq!(outcome.method, PValueMethod::Exact);
        assert!(!outcome.ties_broken);
        assert!(outcome.p_value < 0.01, "p = {}", outcome.p_value);
    }

    #[test]
    fn test_separated_samples_non_strict() {
        // Only the two corner paths reach |D| = 1: P(D >= 1) = 2 / C(10, 5).
        let p = exact_p(1.0, 5, 5, false);
        assert!((p - 2.0 / 252.0).abs() < 1e-12, "p = {}", p);
        // Nothing exceeds the maximum.
        assert_eq!(exact_p(1.0, 5, 5, true), 0.0);
    }

    #[test]
    fn test_exact_p_zero_statistic() {
        // D >= 0 always holds.
        assert!((exact_p(0.0, 4, 6, false) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_p_two_by_two() {
        // Paths from (0,0) to (2,2): 6 in total. D = 1 for 2 of them,
        // D = 0.5 for the other 4.
        assert!((exact_p(0.5, 2, 2, false) - 1.0).abs() < 1e-12);
        assert!((exact_p(0.5, 2, 2, true) - 2.0 / 6.0).abs() < 1e-12);
        assert!((exact_p(1.0, 2, 2, false) - 2.0 / 6.0).abs() < 1e-12);
    }

    /// `n m D` for every arrangement of `n` x values and `m` y values.
    fn enumerate_statistics(n: usize, m: usize) -> Vec<i64> {
        (0u32..1 << (n + m))
            .filter(|mask| mask.count_ones() as usize == n)
            .map(|mask| {
                let (mut cur, mut sup) = (0i64, 0i64);
                for bit in 0..n + m {
                    if mask & (1 << bit) != 0 {
                        cur += m as i64;
                    } else {
                        cur -= n as i64;
                    }
                    sup = sup.max(cur.abs());
                }
                sup
            })
            .collect()
    }

    #[test]
    fn test_exact_p_matches_enumeration() {
        for n in 2..=6 {
            for m in 2..=6 {
                let all = enumerate_statistics(n, m);
                let total = all.len() as f64;
                let mut attained = all.clone();
                attained.sort_unstable();
                attained.dedup();

                for &k in &attained {
                    let d = k as f64 / (n * m) as f64;
                    let above = all.iter().filter(|&&s| s > k).count() as f64 / total;
                    let at_least = all.iter().filter(|&&s| s >= k).count() as f64 / total;

                    let strict = exact_p(d, n, m, true);
                    let non_strict = exact_p(d, n, m, false);
                    assert!(
                        (strict - above).abs() < 1e-12,
                        "n={n} m={m} d={d}: P(D > d) = {strict}, enumerated {above}"
                    );
                    assert!(
                        (non_strict - at_least).abs() < 1e-12,
                        "n={n} m={m} d={d}: P(D >= d) = {non_strict}, enumerated {at_least}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_exact_p_coprime_sizes() {
        // n = 2, m = 3: 10 paths, one with D = 1/3, so P(D > 1/3) = 0.9.
        assert!((exact_p(1.0 / 3.0, 2, 3, true) - 0.9).abs() < 1e-12);
        assert!((exact_p(1.0 / 3.0, 2, 3, false) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_statistic_known_value() {
        let x = [0.1, 0.4, 0.7];
        let y = [0.2, 0.3, 0.5, 0.6];
        // F_x - F_y peaks at z = 0.1 with 1/3.
        let d = ks_statistic(&x, &y).unwrap();
        assert!((d - 1.0 / 3.0).abs() < 1e-12, "d = {}", d);
    }

    #[test]
    fn test_statistic_handles_ties_across_samples() {
        let x = [1.0, 2.0, 2.0, 3.0];
        let y = [2.0, 2.0, 4.0, 5.0];
        // After z = 2: F_x = 3/4, F_y = 2/4.
        let d = ks_statistic(&x, &y).unwrap();
        assert!((d - 0.5).abs() < 1e-12, "d = {}", d);
    }

    #[test]
    fn test_identical_samples_have_zero_statistic() {
        let x = [1.0, 2.0, 3.0];
        assert_eq!(ks_statistic(&x, &x).unwrap(), 0.0);
    }

    #[test]
    fn test_ties_are_broken_reproducibly() {
        let x = [1.0, 1.0, 2.0, 3.0, 3.0];
        let y = [1.0, 2.0, 2.0, 4.0];
        let ks = TwoSampleKs::default();

        let a = ks.test(&x, &y, &mut stream_rng(9, 0)).unwrap();
        let b = ks.test(&x, &y, &mut stream_rng(9, 0)).unwrap();

        assert!(a.ties_broken);
        assert_eq!(a.p_value, b.p_value);
        assert!((0.0..=1.0).contains(&a.p_value));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let x = vec![1.0, 1.0, 2.0];
        let y = vec![1.0, 3.0, 3.0];
        let (x0, y0) = (x.clone(), y.clone());
        TwoSampleKs::default()
            .test(&x, &y, &mut stream_rng(3, 0))
            .unwrap();
        assert_eq!(x, x0);
        assert_eq!(y, y0);
    }

    #[test]
    fn test_large_samples_use_asymptotic_p() {
        let x: Vec<f64> = (0..200).map(|i| i as f64 / 200.0).collect();
        let y: Vec<f64> = (0..100).map(|i| (i as f64 + 0.5) / 100.0).collect();
        let outcome = TwoSampleKs::default()
            .test(&x, &y, &mut stream_rng(1, 0))
            .unwrap();
        assert_eq!(outcome.method, PValueMethod::Asymptotic);
        // Same distribution: nowhere near rejection.
        assert!(outcome.p_value > 0.5, "p = {}", outcome.p_value);
    }

    #[test]
    fn test_large_shifted_samples_reject() {
        let x: Vec<f64> = (0..150).map(|i| i as f64 / 150.0).collect();
        let y: Vec<f64> = (0..150).map(|i| 0.5 + i as f64 / 150.0).collect();
        let outcome = TwoSampleKs::default()
            .test(&x, &y, &mut stream_rng(1, 0))
            .unwrap();
        assert_eq!(outcome.method, PValueMethod::Asymptotic);
        assert!(outcome.p_value < 1e-10, "p = {}", outcome.p_value);
    }

    #[test]
    fn test_ks_sum_known_values() {
        assert_eq!(ks_sum(0.0, KS_SUM_TOLERANCE, KS_SUM_MAX_ITERATIONS).unwrap(), 0.0);
        // K(1.36) ≈ 0.95 is the classic 5% critical value.
        let k = ks_sum(1.36, KS_SUM_TOLERANCE, KS_SUM_MAX_ITERATIONS).unwrap();
        assert!((k - 0.9505).abs() < 1e-3, "K = {}", k);
    }

    #[test]
    fn test_ks_sum_iteration_cap() {
        let err = ks_sum(1e-4, KS_SUM_TOLERANCE, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_rejects_short_and_non_finite_samples() {
        let err = ks_statistic(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);

        let err = ks_statistic(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
