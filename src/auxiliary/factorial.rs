//! Factorials, triangle coefficients and phase factors for angular-momentum algebra.
//!
//! Functions in this module taking arguments prefixed by `two_` expect *doubled* quantum numbers,
//! *i.e.* $`2j`$ rather than $`j`$, so that half-integral values can be handled exactly.

use std::sync::{PoisonError, RwLock};

use factorial::Factorial;
use lazy_static::lazy_static;

#[cfg(test)]
#[path = "factorial_tests.rs"]
mod factorial_tests;

lazy_static! {
    /// Process-wide memo table of $`\ln n!`$ indexed by $`n`$. The table only ever grows.
    static ref LOG_FACTORIALS: RwLock<Vec<f64>> = RwLock::new(vec![0.0]);
}

/// Returns $`\ln n!`$, extending the memo table if required.
///
/// # Arguments
///
/// * `n` - A non-negative integer.
///
/// # Returns
///
/// The natural logarithm of $`n!`$.
pub fn log_factorial(n: u32) -> f64 {
    let n = n as usize;
    {
        let table = LOG_FACTORIALS
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = table.get(n) {
            return *value;
        }
    }
    let mut table = LOG_FACTORIALS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    while table.len() <= n {
        let k = table.len();
        let previous = table[k - 1];
        table.push(previous + (k as f64).ln());
    }
    table[n]
}

/// Returns $`n!`$ as a floating-point number.
///
/// Values up to $`20!`$ are exact. Beyond that the value is recovered from [`log_factorial`], and
/// overflows to infinity for $`n > 170`$.
pub fn factorial(n: u32) -> f64 {
    match u64::from(n).checked_factorial() {
        Some(value) => value as f64,
        None => log_factorial(n).exp(),
    }
}

/// Returns $`\ln (n/2)!`$ for a doubled argument $`n`$.
///
/// # Returns
///
/// `None` if `two_n` is negative or odd, since the factorial is then undefined.
pub fn log_factorial_half(two_n: i32) -> Option<f64> {
    if two_n < 0 || two_n % 2 != 0 {
        None
    } else {
        Some(log_factorial((two_n / 2) as u32))
    }
}

/// Checks if three angular momenta satisfy the triangle condition
/// $`|a - b| \le c \le a + b`$ together with the requirement that $`a + b + c`$ be integral.
pub fn satisfies_triangle(two_a: u32, two_b: u32, two_c: u32) -> bool {
    (two_a + two_b + two_c) % 2 == 0
        && two_c <= two_a + two_b
        && two_a <= two_b + two_c
        && two_b <= two_c + two_a
}

/// Returns the logarithm of the triangle coefficient
///
/// ```math
/// \Delta(abc) = \frac{(a+b-c)!\,(a-b+c)!\,(-a+b+c)!}{(a+b+c+1)!}.
/// ```
///
/// # Returns
///
/// `None` if the triangle condition is violated.
pub fn log_triangle_coefficient(two_a: u32, two_b: u32, two_c: u32) -> Option<f64> {
    if !satisfies_triangle(two_a, two_b, two_c) {
        return None;
    }
    let (a, b, c) = (two_a as i32, two_b as i32, two_c as i32);
    Some(
        log_factorial_half(a + b - c)? + log_factorial_half(a - b + c)?
            + log_factorial_half(-a + b + c)?
            - log_factorial_half(a + b + c + 2)?,
    )
}

/// Returns the triangle coefficient $`\Delta(abc)`$, or exactly zero if the triangle condition is
/// violated.
pub fn triangle_coefficient(two_a: u32, two_b: u32, two_c: u32) -> f64 {
    log_triangle_coefficient(two_a, two_b, two_c)
        .map(f64::exp)
        .unwrap_or(0.0)
}

/// Returns $`(-1)^n`$.
#[inline]
pub fn phase(n: i32) -> f64 {
    if n.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}
