//! Binomial coefficients.
//!
//! Exact integer arithmetic while the result is guaranteed to fit a `u64`,
//! rounded floating-point products beyond that. Symmetry
//! `C(n, k) = C(n, n - k)` is always used to minimise the number of factors.

/// Below this `n` every `C(n, k)` fits in a `u64`.
const EXACT_LIMIT: u64 = 67;

/// Below this `n` the running product `result * i` cannot overflow.
const NAIVE_LIMIT: u64 = 62;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Exact `C(n, k)`, or `None` when `k > n` or the result overflows a `u64`.
pub fn binomial_coefficient(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return None;
    }
    let k = k.min(n - k);
    if k == 0 {
        return Some(1);
    }
    if k == 1 {
        return Some(n);
    }

    // C(n, k) = C(n-1, k-1) * n / k, built up one factor at a time.
    let mut result: u64 = 1;
    let mut i = n - k + 1;
    for j in 1..=k {
        if n < NAIVE_LIMIT {
            result = result * i / j;
        } else {
            // result * i is divisible by j; split out the gcd so the
            // intermediate product stays small.
            let d = gcd(i, j);
            result = (result / (j / d)).checked_mul(i / d)?;
        }
        i += 1;
    }
    Some(result)
}

/// `C(n, k)` as a float, exact where it fits in a `u64`.
///
/// Returns `0.0` when `k > n`.
pub fn binomial_coefficient_f64(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    if k == 0 {
        return 1.0;
    }
    if k == 1 {
        return n as f64;
    }
    if n < EXACT_LIMIT {
        if let Some(exact) = binomial_coefficient(n, k) {
            return exact as f64;
        }
    }

    let mut result = 1.0_f64;
    for i in 1..=k {
        result *= (n - k + i) as f64 / i as f64;
    }
    (result + 0.5).floor()
}
