//! Wigner $`3j`$, $`6j`$ and $`9j`$ symbols and Racah $`W`$ coefficients.
//!
//! Like Clebsch–Gordan coefficients, these evaluate to exactly zero whenever a quantum number is
//! invalid or a selection rule or triangle condition is violated.

use std::fmt;

use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use crate::angmom::clebsch_gordan::clebsch_gordan_twice;
use crate::angmom::{
    half, is_valid_twice_m, twice_j, twice_m, validate_j, validate_jm, AngularMomentumError,
};
use crate::auxiliary::factorial::{
    log_factorial, log_triangle_coefficient, phase, satisfies_triangle,
};
use crate::auxiliary::format::nice_half;

#[cfg(test)]
#[path = "wigner_tests.rs"]
mod wigner_tests;

// =========
// Wigner 3j
// =========

/// Evaluates the Wigner $`3j`$ symbol
///
/// ```math
/// \begin{pmatrix} j_1 & j_2 & j_3 \\ m_1 & m_2 & m_3 \end{pmatrix}
///     = \frac{(-1)^{j_1 - j_2 - m_3}}{\sqrt{2j_3 + 1}}
///       \langle j_1 m_1 j_2 m_2 | j_3, -m_3 \rangle.
/// ```
///
/// Note the sign of $`m_3`$ in the Clebsch–Gordan coefficient.
pub fn wigner_3j(j1: f64, j2: f64, j3: f64, m1: f64, m2: f64, m3: f64) -> f64 {
    let (Some(two_j1), Some(two_j2), Some(two_j3)) = (twice_j(j1), twice_j(j2), twice_j(j3)) else {
        return 0.0;
    };
    let (Some(two_m1), Some(two_m2), Some(two_m3)) = (
        twice_m(two_j1, m1),
        twice_m(two_j2, m2),
        twice_m(two_j3, m3),
    ) else {
        return 0.0;
    };
    wigner_3j_twice([two_j1, two_j2, two_j3], [two_m1, two_m2, two_m3])
}

fn wigner_3j_twice(two_j: [u32; 3], two_m: [i32; 3]) -> f64 {
    let [two_j1, two_j2, two_j3] = two_j;
    let [two_m1, two_m2, two_m3] = two_m;
    if !two_j.iter().zip(two_m.iter()).all(|(j, m)| is_valid_twice_m(*j, *m))
        || two_m1 + two_m2 + two_m3 != 0
        || !satisfies_triangle(two_j1, two_j2, two_j3)
    {
        return 0.0;
    }
    let cg = clebsch_gordan_twice(two_j1, two_m1, two_j2, two_m2, two_j3, -two_m3);
    if cg == 0.0 {
        return 0.0;
    }
    let sign = phase((two_j1 as i32 - two_j2 as i32 - two_m3) / 2);
    sign * cg / f64::from(two_j3 + 1).sqrt()
}

/// A Wigner $`3j`$ symbol with validated, doubled quantum numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wigner3jSymbol {
    two_j: [u32; 3],
    two_m: [i32; 3],
}

impl Wigner3jSymbol {
    /// Constructs a $`3j`$ symbol.
    ///
    /// # Errors
    ///
    /// Errors if any $`j`$ is invalid or any $`m`$ is not a projection of its $`j`$. Selection
    /// rules are not errors; they make [`Self::value`] vanish.
    pub fn new(
        j1: f64,
        j2: f64,
        j3: f64,
        m1: f64,
        m2: f64,
        m3: f64,
    ) -> Result<Self, AngularMomentumError> {
        let (two_j1, two_m1) = validate_jm(j1, m1)?;
        let (two_j2, two_m2) = validate_jm(j2, m2)?;
        let (two_j3, two_m3) = validate_jm(j3, m3)?;
        Ok(Self {
            two_j: [two_j1, two_j2, two_j3],
            two_m: [two_m1, two_m2, two_m3],
        })
    }

    pub fn j(&self) -> [f64; 3] {
        self.two_j.map(|two_j| half(two_j as i32))
    }

    pub fn m(&self) -> [f64; 3] {
        self.two_m.map(half)
    }

    /// Evaluates the symbol.
    pub fn value(&self) -> f64 {
        wigner_3j_twice(self.two_j, self.two_m)
    }

    /// Returns the symbol obtained by applying `symmetry` to the columns of this one.
    pub fn transform(&self, symmetry: &Wigner3jSymmetry) -> Self {
        let p = symmetry.permutation;
        let sign = if symmetry.reverse_signs { -1 } else { 1 };
        Self {
            two_j: [self.two_j[p[0]], self.two_j[p[1]], self.two_j[p[2]]],
            two_m: [
                sign * self.two_m[p[0]],
                sign * self.two_m[p[1]],
                sign * self.two_m[p[2]],
            ],
        }
    }

    /// Returns the factor $`\pm 1`$ relating this symbol to its image under `symmetry`, equal to
    /// $`(-1)^{j_1 + j_2 + j_3}`$ once for an odd permutation and once for a sign reversal.
    ///
    /// If $`j_1 + j_2 + j_3`$ is not integral the symbol vanishes, and the factor is taken to be
    /// unity.
    pub fn phase(&self, symmetry: &Wigner3jSymmetry) -> f64 {
        let two_sum: u32 = self.two_j.iter().sum();
        if two_sum % 2 != 0 {
            return 1.0;
        }
        let flips = i32::from(symmetry.is_odd()) + i32::from(symmetry.reverse_signs);
        phase(flips * (two_sum / 2) as i32)
    }

    /// Evaluates the symbol by recomputing its image under `symmetry` and applying the known
    /// phase. This must agree with [`Self::value`].
    pub fn value_via(&self, symmetry: &Wigner3jSymmetry) -> f64 {
        self.phase(symmetry) * self.transform(symmetry).value()
    }
}

impl fmt::Display for Wigner3jSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} {} {}; {} {} {})",
            nice_half(self.two_j[0] as i32),
            nice_half(self.two_j[1] as i32),
            nice_half(self.two_j[2] as i32),
            nice_half(self.two_m[0]),
            nice_half(self.two_m[1]),
            nice_half(self.two_m[2]),
        )
    }
}

/// One of the twelve classical symmetry operations of the $`3j`$ symbol: a permutation of the
/// three columns, optionally combined with a reversal of the signs of all $`m`$.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wigner3jSymmetry {
    /// Column `i` of the image is column `permutation[i]` of the untransformed symbol.
    pub permutation: [usize; 3],

    /// Boolean indicating if all $`m`$ are negated.
    pub reverse_signs: bool,
}

impl Wigner3jSymmetry {
    /// Returns all twelve symmetry operations, starting with the identity.
    pub fn all() -> Vec<Self> {
        [false, true]
            .into_iter()
            .cartesian_product((0..3).permutations(3))
            .map(|(reverse_signs, perm)| Self {
                permutation: [perm[0], perm[1], perm[2]],
                reverse_signs,
            })
            .collect()
    }

    /// Checks if the permutation is odd.
    pub fn is_odd(&self) -> bool {
        let p = self.permutation;
        let inversions = [(0, 1), (0, 2), (1, 2)]
            .into_iter()
            .filter(|&(a, b)| p[a] > p[b])
            .count();
        inversions % 2 == 1
    }
}

// =========
// Wigner 6j
// =========

/// Evaluates the Wigner $`6j`$ symbol
///
/// ```math
/// \begin{Bmatrix} j_1 & j_2 & j_3 \\ l_1 & l_2 & l_3 \end{Bmatrix}
///     = \sqrt{\Delta(j_1 j_2 j_3)\Delta(j_1 l_2 l_3)\Delta(l_1 j_2 l_3)\Delta(l_1 l_2 j_3)}
///       \sum_t \frac{(-1)^t (t+1)!}{\prod_{k=1}^{4} (t - \alpha_k)!
///       \prod_{k=1}^{3} (\beta_k - t)!}
/// ```
///
/// with $`\alpha_k`$ the four triad sums and $`\beta_k`$ the three pairing sums, by Racah's
/// formula. The sum is accumulated in log-space relative to its largest term.
pub fn wigner_6j(j1: f64, j2: f64, j3: f64, l1: f64, l2: f64, l3: f64) -> f64 {
    let twos = [j1, j2, j3, l1, l2, l3].map(twice_j);
    let [Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)] = twos else {
        return 0.0;
    };
    wigner_6j_twice(a, b, c, d, e, f)
}

pub(crate) fn wigner_6j_twice(a: u32, b: u32, c: u32, d: u32, e: u32, f: u32) -> f64 {
    let triads = [(a, b, c), (a, e, f), (d, b, f), (d, e, c)];
    let log_deltas = triads
        .iter()
        .map(|&(x, y, z)| log_triangle_coefficient(x, y, z))
        .sum::<Option<f64>>();
    let Some(log_deltas) = log_deltas else {
        return 0.0;
    };

    // Doubled triad and pairing sums are even once every triad passes.
    let alphas = triads.map(|(x, y, z)| ((x + y + z) / 2) as i32);
    let betas = [a + b + d + e, a + c + d + f, b + c + e + f].map(|s| (s / 2) as i32);
    let Some(&t_min) = alphas.iter().max() else {
        return 0.0;
    };
    let Some(&t_max) = betas.iter().min() else {
        return 0.0;
    };

    let terms = (t_min..=t_max)
        .filter_map(|t| {
            let log_denominator = alphas
                .iter()
                .map(|alpha| log_factorial((t - alpha) as u32))
                .chain(betas.iter().map(|beta| log_factorial((beta - t) as u32)))
                .sum::<f64>();
            let log_term = log_factorial((t + 1) as u32) - log_denominator;
            log_term.is_finite().then_some((phase(t), log_term))
        })
        .collect_vec();
    let Some(log_max) = terms
        .iter()
        .map(|(_, log_term)| *log_term)
        .reduce(f64::max)
    else {
        return 0.0;
    };
    let scaled_sum = terms
        .iter()
        .map(|(sign, log_term)| sign * (log_term - log_max).exp())
        .sum::<f64>();
    scaled_sum * (log_max + 0.5 * log_deltas).exp()
}

/// Evaluates the Racah coefficient
/// $`W(abcd; ef) = (-1)^{a+b+c+d} \begin{Bmatrix} a & b & e \\ d & c & f \end{Bmatrix}`$.
pub fn racah_w(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> f64 {
    let twos = [a, b, c, d, e, f].map(twice_j);
    let [Some(ta), Some(tb), Some(tc), Some(td), Some(te), Some(tf)] = twos else {
        return 0.0;
    };
    let six_j = wigner_6j_twice(ta, tb, te, td, tc, tf);
    if six_j == 0.0 {
        return 0.0;
    }
    phase(((ta + tb + tc + td) / 2) as i32) * six_j
}

// =========
// Wigner 9j
// =========

/// Evaluates the Wigner $`9j`$ symbol. This is not implemented and always returns zero; the
/// arguments are validated and otherwise ignored.
#[allow(clippy::too_many_arguments)]
pub fn wigner_9j(
    j1: f64,
    j2: f64,
    j3: f64,
    j4: f64,
    j5: f64,
    j6: f64,
    j7: f64,
    j8: f64,
    j9: f64,
) -> f64 {
    let all_valid = [j1, j2, j3, j4, j5, j6, j7, j8, j9]
        .into_iter()
        .all(|j| validate_j(j).is_ok());
    log::warn!(
        "Wigner 9j symbols are not implemented; returning zero for {{{j1} {j2} {j3}; {j4} {j5} {j6}; {j7} {j8} {j9}}} (valid arguments: {all_valid})."
    );
    0.0
}
