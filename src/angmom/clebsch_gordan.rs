//! Clebsch–Gordan coefficients $`\langle j_1 m_1 j_2 m_2 | j m \rangle`$ in the Condon–Shortley
//! phase convention.
//!
//! Coefficients are evaluated with Racah's formula in log-space and memoised in per-$`(j_1, j_2)`$
//! sparse tables. Each table is generated in full the first time any coefficient for its pair is
//! requested, off to the side of the cache, and then published into the cache with a single
//! write. Published tables are immutable and shared through [`Arc`]s, so readers never observe a
//! partially built table.

use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use log;

use crate::angmom::{
    is_valid_twice_m, twice_j, twice_j_couplings, twice_m, twice_m_values,
    NEGLIGIBLE_AMPLITUDE_THRESHOLD,
};
use crate::auxiliary::factorial::{
    log_factorial, log_factorial_half, log_triangle_coefficient, phase,
};

#[cfg(test)]
#[path = "clebsch_gordan_tests.rs"]
mod clebsch_gordan_tests;

lazy_static! {
    /// The process-wide Clebsch–Gordan cache used by [`clebsch_gordan`].
    static ref GLOBAL_CG_CACHE: ClebschGordanCache = ClebschGordanCache::new();
}

// ==================
// Struct definitions
// ==================

/// Key of a coefficient within the table of a fixed $`(j_1, j_2)`$ pair. All quantum numbers are
/// doubled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClebschGordanKey {
    pub two_m1: i32,
    pub two_m2: i32,
    pub two_j: u32,
    pub two_m: i32,
}

/// Sparse table of all non-negligible Clebsch–Gordan coefficients for a fixed $`(j_1, j_2)`$
/// pair.
#[derive(Clone, Debug)]
pub struct ClebschGordanTable {
    two_j1: u32,
    two_j2: u32,
    coefficients: HashMap<ClebschGordanKey, f64>,
}

impl ClebschGordanTable {
    /// Generates the full table for the doubled angular momenta `two_j1` and `two_j2` by sweeping
    /// every valid $`(j, m, m_1)`$ with $`m_2 = m - m_1`$. Coefficients whose magnitudes do not
    /// exceed [`NEGLIGIBLE_AMPLITUDE_THRESHOLD`] are not stored.
    pub fn generate(two_j1: u32, two_j2: u32) -> Self {
        let mut coefficients = HashMap::new();
        for two_j in twice_j_couplings(two_j1, two_j2) {
            for two_m in twice_m_values(two_j) {
                for two_m1 in twice_m_values(two_j1) {
                    let two_m2 = two_m - two_m1;
                    if !is_valid_twice_m(two_j2, two_m2) {
                        continue;
                    }
                    let value = racah_clebsch_gordan(two_j1, two_m1, two_j2, two_m2, two_j, two_m);
                    if value.abs() > NEGLIGIBLE_AMPLITUDE_THRESHOLD {
                        coefficients.insert(
                            ClebschGordanKey {
                                two_m1,
                                two_m2,
                                two_j,
                                two_m,
                            },
                            value,
                        );
                    }
                }
            }
        }
        log::debug!(
            "Generated Clebsch–Gordan table for (2j1, 2j2) = ({two_j1}, {two_j2}) with {} entries.",
            coefficients.len()
        );
        Self {
            two_j1,
            two_j2,
            coefficients,
        }
    }

    pub fn twice_j1(&self) -> u32 {
        self.two_j1
    }

    pub fn twice_j2(&self) -> u32 {
        self.two_j2
    }

    /// Returns the stored coefficient, or zero if none is stored for `key`.
    pub fn get(&self, key: &ClebschGordanKey) -> f64 {
        self.coefficients.get(key).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClebschGordanKey, &f64)> {
        self.coefficients.iter()
    }
}

/// A cache of [`ClebschGordanTable`]s keyed by doubled $`(j_1, j_2)`$ pairs.
///
/// The cache is safe to share between threads. Two threads requesting the same unseen pair may
/// both generate its table, but only the first published table is ever observed. Clearing the
/// cache only affects performance.
#[derive(Debug, Default)]
pub struct ClebschGordanCache {
    tables: RwLock<HashMap<(u32, u32), Arc<ClebschGordanTable>>>,
}

impl ClebschGordanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `(two_j1, two_j2)`, generating and publishing it if absent.
    pub fn table(&self, two_j1: u32, two_j2: u32) -> Arc<ClebschGordanTable> {
        {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(&(two_j1, two_j2)) {
                return Arc::clone(table);
            }
        }
        let table = Arc::new(ClebschGordanTable::generate(two_j1, two_j2));
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry((two_j1, two_j2)).or_insert(table))
    }

    /// Checks if the table for `(two_j1, two_j2)` has been published.
    pub fn contains(&self, two_j1: u32, two_j2: u32) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(two_j1, two_j2))
    }

    /// Returns the number of published tables.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every published table.
    pub fn clear(&self) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the Clebsch–Gordan coefficient $`\langle j_1 m_1 j_2 m_2 | j m \rangle`$, or exactly
    /// zero if any quantum number is invalid or any selection rule is violated.
    pub fn clebsch_gordan(&self, j1: f64, m1: f64, j2: f64, m2: f64, j: f64, m: f64) -> f64 {
        let (Some(two_j1), Some(two_j2), Some(two_j)) = (twice_j(j1), twice_j(j2), twice_j(j))
        else {
            return 0.0;
        };
        let (Some(two_m1), Some(two_m2), Some(two_m)) = (
            twice_m(two_j1, m1),
            twice_m(two_j2, m2),
            twice_m(two_j, m),
        ) else {
            return 0.0;
        };
        self.clebsch_gordan_twice(two_j1, two_m1, two_j2, two_m2, two_j, two_m)
    }

    /// Same as [`Self::clebsch_gordan`], but with doubled quantum numbers.
    pub fn clebsch_gordan_twice(
        &self,
        two_j1: u32,
        two_m1: i32,
        two_j2: u32,
        two_m2: i32,
        two_j: u32,
        two_m: i32,
    ) -> f64 {
        if !passes_selection_rules(two_j1, two_m1, two_j2, two_m2, two_j, two_m) {
            return 0.0;
        }
        self.table(two_j1, two_j2).get(&ClebschGordanKey {
            two_m1,
            two_m2,
            two_j,
            two_m,
        })
    }
}

// =========
// Functions
// =========

/// Returns the process-wide Clebsch–Gordan cache.
pub fn global_cache() -> &'static ClebschGordanCache {
    &GLOBAL_CG_CACHE
}

/// Returns the Clebsch–Gordan coefficient $`\langle j_1 m_1 j_2 m_2 | j m \rangle`$ using the
/// process-wide cache.
///
/// Invalid quantum numbers and violated selection rules yield exactly zero rather than an
/// error, so that callers can sum over ranges without pre-filtering.
pub fn clebsch_gordan(j1: f64, m1: f64, j2: f64, m2: f64, j: f64, m: f64) -> f64 {
    global_cache().clebsch_gordan(j1, m1, j2, m2, j, m)
}

/// Same as [`clebsch_gordan`], but with doubled quantum numbers.
pub(crate) fn clebsch_gordan_twice(
    two_j1: u32,
    two_m1: i32,
    two_j2: u32,
    two_m2: i32,
    two_j: u32,
    two_m: i32,
) -> f64 {
    global_cache().clebsch_gordan_twice(two_j1, two_m1, two_j2, two_m2, two_j, two_m)
}

/// Checks the validity of doubled projections and the selection rules $`m = m_1 + m_2`$,
/// $`|j_1 - j_2| \le j \le j_1 + j_2`$ with $`j_1 + j_2 + j`$ integral.
fn passes_selection_rules(
    two_j1: u32,
    two_m1: i32,
    two_j2: u32,
    two_m2: i32,
    two_j: u32,
    two_m: i32,
) -> bool {
    is_valid_twice_m(two_j1, two_m1)
        && is_valid_twice_m(two_j2, two_m2)
        && is_valid_twice_m(two_j, two_m)
        && two_m == two_m1 + two_m2
        && two_j >= two_j1.abs_diff(two_j2)
        && two_j <= two_j1 + two_j2
        && (two_j1 + two_j2 + two_j) % 2 == 0
}

/// Evaluates a Clebsch–Gordan coefficient directly, without consulting any cache.
///
/// The singlet coupling of two spin-halves and the maximal coupling
/// $`m_1 = j_1, m_2 = j_2, j = j_1 + j_2`$ are returned exactly. All other cases go through
/// [`racah_sum`].
pub fn racah_clebsch_gordan(
    two_j1: u32,
    two_m1: i32,
    two_j2: u32,
    two_m2: i32,
    two_j: u32,
    two_m: i32,
) -> f64 {
    if !passes_selection_rules(two_j1, two_m1, two_j2, two_m2, two_j, two_m) {
        return 0.0;
    }
    if two_j1 == 1 && two_j2 == 1 && two_j == 0 {
        return if two_m1 == 1 {
            FRAC_1_SQRT_2
        } else {
            -FRAC_1_SQRT_2
        };
    }
    if two_j == two_j1 + two_j2 && two_m1 == two_j1 as i32 && two_m2 == two_j2 as i32 {
        return 1.0;
    }
    racah_sum(two_j1, two_m1, two_j2, two_m2, two_j, two_m)
}

/// Evaluates Racah's formula
///
/// ```math
/// \langle j_1 m_1 j_2 m_2 | j m \rangle
///     = \sqrt{(2j+1)\,\Delta(j_1 j_2 j)
///       \,(j_1+m_1)!(j_1-m_1)!(j_2+m_2)!(j_2-m_2)!(j+m)!(j-m)!}
///       \sum_k \frac{(-1)^k}{k!\,(j_1+j_2-j-k)!\,(j_1-m_1-k)!\,(j_2+m_2-k)!
///       \,(j-j_2+m_1+k)!\,(j-j_1-m_2+k)!}
/// ```
///
/// in log-space, for arguments that already pass the selection rules. Non-finite terms are
/// skipped.
pub(crate) fn racah_sum(
    two_j1: u32,
    two_m1: i32,
    two_j2: u32,
    two_m2: i32,
    two_j: u32,
    two_m: i32,
) -> f64 {
    let (j1, j2, j) = (two_j1 as i32, two_j2 as i32, two_j as i32);
    let (m1, m2, m) = (two_m1, two_m2, two_m);

    let Some(log_delta) = log_triangle_coefficient(two_j1, two_j2, two_j) else {
        return 0.0;
    };
    let log_numerator = [j1 + m1, j1 - m1, j2 + m2, j2 - m2, j + m, j - m]
        .into_iter()
        .map(log_factorial_half)
        .sum::<Option<f64>>();
    let Some(log_numerator) = log_numerator else {
        return 0.0;
    };
    let log_prefactor = 0.5 * (f64::from(j + 1).ln() + log_delta + log_numerator);

    // All bounds are halves of even doubled quantities once the selection rules hold.
    let k_min = 0.max((j2 - j - m1) / 2).max((j1 - j + m2) / 2);
    let k_max = ((j1 + j2 - j) / 2).min((j1 - m1) / 2).min((j2 + m2) / 2);

    (k_min..=k_max)
        .filter_map(|k| {
            let log_denominator = [
                j1 + j2 - j - 2 * k,
                j1 - m1 - 2 * k,
                j2 + m2 - 2 * k,
                j - j2 + m1 + 2 * k,
                j - j1 - m2 + 2 * k,
            ]
            .into_iter()
            .map(log_factorial_half)
            .sum::<Option<f64>>()?
                + log_factorial(k as u32);
            let term = phase(k) * (log_prefactor - log_denominator).exp();
            term.is_finite().then_some(term)
        })
        .sum()
}
