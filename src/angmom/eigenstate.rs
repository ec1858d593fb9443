//! Angular-momentum eigenstates $`|jm\rangle`$ and the operators $`\hat{J}_\pm`$,
//! $`\hat{J}_x`$, $`\hat{J}_y`$, $`\hat{J}_z`$ and $`\hat{J}^2`$.

use ndarray::Array2;
use num_complex::Complex;

use crate::angmom::metadata::AngularMomentumMetadata;
use crate::angmom::{
    basis_index, dimension, half, twice_m_values, validate_j, validate_jm, AngularMomentumError,
};
use crate::auxiliary::format::nice_half;
use crate::operator::Operator;
use crate::state::QuantumState;

#[cfg(test)]
#[path = "eigenstate_tests.rs"]
mod eigenstate_tests;

type C128 = Complex<f64>;

/// Constructs the normalised eigenstate $`|jm\rangle`$ in the $`(2j+1)`$-dimensional eigenspace
/// of $`j`$, carrying single-step metadata.
///
/// # Errors
///
/// Errors if `j` is not a non-negative integer or half-integer, or if `m` is not one of its
/// projections.
pub fn create_eigenstate(j: f64, m: f64) -> Result<QuantumState, AngularMomentumError> {
    let (two_j, two_m) = validate_jm(j, m)?;
    create_eigenstate_twice(two_j, two_m)
}

/// Same as [`create_eigenstate`], but with already validated doubled quantum numbers.
pub(crate) fn create_eigenstate_twice(
    two_j: u32,
    two_m: i32,
) -> Result<QuantumState, AngularMomentumError> {
    let state = QuantumState::basis(dimension(two_j), basis_index(two_j, two_m))?
        .with_metadata(AngularMomentumMetadata::single(two_j))
        .with_label(&format!(
            "|{}, {}⟩",
            nice_half(two_j as i32),
            nice_half(two_m)
        ));
    Ok(state)
}

/// Returns the matrix element $`\langle j, m \pm 1 | \hat{J}_\pm | j m \rangle
/// = \sqrt{j(j+1) - m(m \pm 1)}`$.
fn ladder_element(two_j: u32, two_m: i32, raising: bool) -> f64 {
    let j = half(two_j as i32);
    let m = half(two_m);
    let mdash = if raising { m + 1.0 } else { m - 1.0 };
    (j * (j + 1.0) - m * mdash).max(0.0).sqrt()
}

/// Builds the matrix of a ladder operator. The single non-zero element in each column maps the
/// basis index of $`m`$ to that of $`m \pm 1`$; the extremal state is annihilated by omission.
fn ladder_operator(two_j: u32, raising: bool) -> Result<Operator, AngularMomentumError> {
    let dim = dimension(two_j);
    let mut matrix = Array2::<C128>::zeros((dim, dim));
    for two_m in twice_m_values(two_j) {
        let two_mdash = if raising { two_m + 2 } else { two_m - 2 };
        if two_mdash.abs() > two_j as i32 {
            continue;
        }
        matrix[(basis_index(two_j, two_mdash), basis_index(two_j, two_m))] =
            C128::new(ladder_element(two_j, two_m, raising), 0.0);
    }
    Ok(Operator::new(matrix)?)
}

/// Constructs the raising operator $`\hat{J}_+`$ for angular momentum `j`.
pub fn create_raising_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    ladder_operator(validate_j(j)?, true)
}

/// Constructs the lowering operator $`\hat{J}_-`$ for angular momentum `j`.
pub fn create_lowering_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    ladder_operator(validate_j(j)?, false)
}

/// Constructs the diagonal operator $`\hat{J}_z`$ for angular momentum `j`.
pub fn create_z_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    let two_j = validate_j(j)?;
    let dim = dimension(two_j);
    let mut matrix = Array2::<C128>::zeros((dim, dim));
    for two_m in twice_m_values(two_j) {
        let i = basis_index(two_j, two_m);
        matrix[(i, i)] = C128::new(half(two_m), 0.0);
    }
    Ok(Operator::new(matrix)?)
}

/// Constructs $`\hat{J}_x = (\hat{J}_+ + \hat{J}_-)/2`$.
pub fn create_x_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    let jp = create_raising_operator(j)?;
    let jm = create_lowering_operator(j)?;
    Ok(jp.add(&jm)?.scale(C128::new(0.5, 0.0)))
}

/// Constructs $`\hat{J}_y = (\hat{J}_+ - \hat{J}_-)/(2i)`$.
pub fn create_y_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    let jp = create_raising_operator(j)?;
    let jm = create_lowering_operator(j)?;
    Ok(jp.sub(&jm)?.scale(C128::new(0.0, -0.5)))
}

/// Constructs $`\hat{J}^2`$ directly as the diagonal matrix $`j(j+1)\mathbf{1}`$.
pub fn create_total_j_squared_operator(j: f64) -> Result<Operator, AngularMomentumError> {
    let two_j = validate_j(j)?;
    let jj = half(two_j as i32);
    Ok(Operator::identity(dimension(two_j)).scale(C128::new(jj * (jj + 1.0), 0.0)))
}

/// Constructs $`\hat{J}^2 = \hat{J}_+\hat{J}_- + \hat{J}_z^2 - \hat{J}_z`$ from the ladder and
/// $`z`$ operators. This must agree with [`create_total_j_squared_operator`].
pub fn create_total_j_squared_operator_from_ladders(
    j: f64,
) -> Result<Operator, AngularMomentumError> {
    let jp = create_raising_operator(j)?;
    let jm = create_lowering_operator(j)?;
    let jz = create_z_operator(j)?;
    Ok(jp.compose(&jm)?.add(&jz.compose(&jz)?)?.sub(&jz)?)
}

/// Checks that a state has the dimension $`2j+1`$ expected for `two_j`.
pub(crate) fn check_dimension(
    state: &QuantumState,
    two_j: u32,
) -> Result<(), AngularMomentumError> {
    if state.dim() != dimension(two_j) {
        Err(AngularMomentumError::DimensionMismatch {
            j: half(two_j as i32),
            expected: dimension(two_j),
            found: state.dim(),
        })
    } else {
        Ok(())
    }
}
