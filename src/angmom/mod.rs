//! Angular-momentum eigenstates, operators, coupling and recoupling coefficients.
//!
//! # Quantum numbers
//!
//! Public functions accept $`j`$ and $`m`$ as floating-point numbers. These are validated and
//! converted once into *doubled* integers `two_j: u32` and `two_m: i32`, in terms of which all
//! parity, range and triangle checks are exact.
//!
//! # Basis convention
//!
//! For a $`(2j+1)`$-dimensional vector of fixed $`j`$, the component with magnetic quantum number
//! $`m`$ lives at index $`j - m`$, so that $`m = +j`$ is at index `0` and $`m = -j`$ at the last
//! index. Every state constructor, operator matrix and coupling routine in this module goes
//! through [`basis_index`] and [`m_from_index`].

use std::error::Error;
use std::fmt;

use crate::operator::OperatorError;
use crate::state::StateError;

pub mod clebsch_gordan;
pub mod coupling;
pub mod eigenstate;
pub mod metadata;
pub mod multi_coupling;
pub mod rotation;
pub mod wigner;

#[cfg(test)]
#[path = "angmom_tests.rs"]
mod angmom_tests;

/// Tolerance for a doubled quantum number to be recognised as an integer.
pub const QUANTUM_NUMBER_TOLERANCE: f64 = 1e-10;

/// Threshold below which a norm is considered zero, and above which a total-$`J`$ component is
/// considered present in an analysis.
pub const ZERO_NORM_THRESHOLD: f64 = 1e-10;

/// Threshold below which an amplitude or a coefficient is considered negligible.
pub const NEGLIGIBLE_AMPLITUDE_THRESHOLD: f64 = 1e-12;

// =================
// Error definitions
// =================

/// Hard validation errors raised by angular-momentum constructions.
///
/// Out-of-domain coupling coefficients are *not* errors: they evaluate to exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub enum AngularMomentumError {
    /// The value is not a non-negative integer or half-integer.
    InvalidJ(f64),

    /// The magnetic quantum number is not one of $`-j, -j+1, \ldots, j`$.
    InvalidM { j: f64, m: f64 },

    /// A state does not have the dimension $`2j+1`$ expected for the claimed $`j`$, or a composite
    /// state does not have the dimension expected for its constituents.
    DimensionMismatch {
        j: f64,
        expected: usize,
        found: usize,
    },

    /// An operation requiring angular-momentum metadata was given a state without any.
    MissingMetadata,

    /// A composite state contains no total-$`J`$ component above the zero-norm threshold.
    EmptyComposite,

    State(StateError),

    Operator(OperatorError),
}

impl fmt::Display for AngularMomentumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidJ(j) => write!(
                f,
                "Angular momentum error: j = {j} is not a non-negative integer or half-integer."
            ),
            Self::InvalidM { j, m } => write!(
                f,
                "Angular momentum error: m = {m} is not a valid projection for j = {j}."
            ),
            Self::DimensionMismatch { j, expected, found } => write!(
                f,
                "Angular momentum error: dimension {found} found where {expected} is expected for j = {j}."
            ),
            Self::MissingMetadata => write!(
                f,
                "Angular momentum error: state carries no angular-momentum metadata."
            ),
            Self::EmptyComposite => write!(
                f,
                "Angular momentum error: composite state contains no non-negligible J component."
            ),
            Self::State(err) => write!(f, "Angular momentum error: {err}"),
            Self::Operator(err) => write!(f, "Angular momentum error: {err}"),
        }
    }
}

impl Error for AngularMomentumError {}

impl From<StateError> for AngularMomentumError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

impl From<OperatorError> for AngularMomentumError {
    fn from(err: OperatorError) -> Self {
        Self::Operator(err)
    }
}

// =========
// Functions
// =========

/// Converts a floating-point value into a doubled integer if $`2x`$ is integral within
/// [`QUANTUM_NUMBER_TOLERANCE`].
fn to_twice(x: f64) -> Option<i32> {
    if !x.is_finite() {
        return None;
    }
    let twice = 2.0 * x;
    let rounded = twice.round();
    if (twice - rounded).abs() < QUANTUM_NUMBER_TOLERANCE && rounded.abs() < f64::from(i32::MAX) {
        Some(rounded as i32)
    } else {
        None
    }
}

/// Returns $`2j`$ if `j` is a non-negative integer or half-integer.
pub fn twice_j(j: f64) -> Option<u32> {
    to_twice(j).and_then(|two_j| u32::try_from(two_j).ok())
}

/// Returns $`2m`$ if `m` is one of $`-j, -j+1, \ldots, j`$ for the doubled angular momentum
/// `two_j`.
pub fn twice_m(two_j: u32, m: f64) -> Option<i32> {
    to_twice(m).filter(|two_m| is_valid_twice_m(two_j, *two_m))
}

/// Checks if a doubled projection belongs to the set of projections of a doubled angular
/// momentum. Both range and parity are checked.
pub fn is_valid_twice_m(two_j: u32, two_m: i32) -> bool {
    let two_j = two_j as i32;
    two_m.abs() <= two_j && (two_j - two_m).rem_euclid(2) == 0
}

/// Validates `j`, returning $`2j`$.
pub fn validate_j(j: f64) -> Result<u32, AngularMomentumError> {
    twice_j(j).ok_or(AngularMomentumError::InvalidJ(j))
}

/// Validates `m` against `j`, returning $`(2j, 2m)`$.
pub fn validate_jm(j: f64, m: f64) -> Result<(u32, i32), AngularMomentumError> {
    let two_j = validate_j(j)?;
    let two_m = twice_m(two_j, m).ok_or(AngularMomentumError::InvalidM { j, m })?;
    Ok((two_j, two_m))
}

/// Returns the dimension $`2j+1`$ of the eigenspace of a doubled angular momentum.
#[inline]
pub fn dimension(two_j: u32) -> usize {
    two_j as usize + 1
}

/// Returns the basis index $`j - m`$ of the component with projection $`m`$.
#[inline]
pub fn basis_index(two_j: u32, two_m: i32) -> usize {
    ((two_j as i32 - two_m) / 2) as usize
}

/// Returns the doubled projection $`2m`$ stored at basis index `index`.
#[inline]
pub fn m_from_index(two_j: u32, index: usize) -> i32 {
    two_j as i32 - 2 * index as i32
}

/// Returns the doubled projections $`2j, 2j-2, \ldots, -2j`$ in basis order.
pub fn twice_m_values(two_j: u32) -> impl DoubleEndedIterator<Item = i32> + Clone {
    let two_j = two_j as i32;
    (0..=two_j).map(move |i| two_j - 2 * i)
}

/// Returns the doubled total angular momenta allowed by the triangle inequality when coupling
/// `two_j1` and `two_j2`, in *descending* order from $`j_1 + j_2`$ to $`|j_1 - j_2|`$.
pub fn twice_j_couplings(two_j1: u32, two_j2: u32) -> impl Iterator<Item = u32> + Clone {
    let two_j_min = two_j1.abs_diff(two_j2);
    let two_j_max = two_j1 + two_j2;
    (0..=(two_j_max - two_j_min) / 2).map(move |i| two_j_max - 2 * i)
}

/// Converts a doubled quantum number back into its floating-point value.
#[inline]
pub fn half(two_x: i32) -> f64 {
    f64::from(two_x) / 2.0
}
