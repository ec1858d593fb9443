//! Rotation operators $`\hat{R}(\alpha, \beta, \gamma)`$ and $`\hat{R}(\phi\hat{\mathbf{n}})`$,
//! spin-coherent states, and closed-form Wigner rotation matrices.

use nalgebra::Vector3;
use ndarray::Array2;
use num_complex::Complex;

use crate::angmom::eigenstate::{
    create_eigenstate_twice, create_x_operator, create_y_operator, create_z_operator,
};
use crate::angmom::metadata::AngularMomentumMetadata;
use crate::angmom::{
    basis_index, dimension, half, twice_m_values, validate_j, validate_jm, AngularMomentumError,
    ZERO_NORM_THRESHOLD,
};
use crate::auxiliary::factorial::{log_factorial, log_factorial_half, phase};
use crate::auxiliary::format::nice_half;
use crate::operator::{Operator, OperatorError};
use crate::state::QuantumState;

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod rotation_tests;

type C128 = Complex<f64>;

/// Returns $`e^{-i\theta\hat{A}}`$.
fn exp_minus_i(generator: &Operator, theta: f64) -> Operator {
    generator.scale(C128::new(0.0, -theta)).expm()
}

/// Constructs the rotation operator
///
/// ```math
/// \hat{R}(\alpha, \beta, \gamma)
///     = e^{-i\alpha\hat{J}_z} e^{-i\beta\hat{J}_y} e^{-i\gamma\hat{J}_z}
/// ```
///
/// through matrix exponentials of the angular-momentum generators.
///
/// # Arguments
///
/// * `j` - The angular momentum whose $`(2j+1)`$-dimensional eigenspace is acted upon.
/// * `alpha`, `beta`, `gamma` - Euler angles in radians, in the $`z-y-z`$ convention.
///
/// # Returns
///
/// The rotation operator, or an error if `j` is invalid.
pub fn create_rotation_operator(
    j: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Result<Operator, AngularMomentumError> {
    let jz = create_z_operator(j)?;
    let jy = create_y_operator(j)?;
    let rot = exp_minus_i(&jz, alpha)
        .compose(&exp_minus_i(&jy, beta))?
        .compose(&exp_minus_i(&jz, gamma))?;
    Ok(rot)
}

/// Constructs the rotation operator $`e^{-i\phi\,\hat{\mathbf{n}}\cdot\hat{\mathbf{J}}}`$ for a
/// rotation by `angle` about `axis`.
///
/// # Arguments
///
/// * `j` - The angular momentum.
/// * `angle` - The angle $`\phi`$ of the rotation in radians. A positive rotation is an
/// anticlockwise rotation when looking down `axis`.
/// * `axis` - A space-fixed vector defining the axis of rotation. The supplied vector will be
/// normalised.
///
/// # Errors
///
/// Errors if `j` is invalid or if `axis` has a vanishing norm.
pub fn create_angle_axis_rotation_operator(
    j: f64,
    angle: f64,
    axis: &Vector3<f64>,
) -> Result<Operator, AngularMomentumError> {
    if axis.norm() < ZERO_NORM_THRESHOLD {
        return Err(OperatorError(format!(
            "Unable to define a rotation about the vanishing axis {axis:?}."
        ))
        .into());
    }
    let n = axis.normalize();
    let generator = create_x_operator(j)?
        .scale(C128::new(n.x, 0.0))
        .add(&create_y_operator(j)?.scale(C128::new(n.y, 0.0)))?
        .add(&create_z_operator(j)?.scale(C128::new(n.z, 0.0)))?;
    Ok(exp_minus_i(&generator, angle))
}

/// Constructs the spin-coherent state $`\hat{R}(\phi, \theta, 0)|jj\rangle`$, whose angular
/// momentum points along $`(\sin\theta\cos\phi, \sin\theta\sin\phi, \cos\theta)`$.
pub fn create_coherent_state(
    j: f64,
    theta: f64,
    phi: f64,
) -> Result<QuantumState, AngularMomentumError> {
    let two_j = validate_j(j)?;
    let highest = create_eigenstate_twice(two_j, two_j as i32)?;
    let rot = create_rotation_operator(j, phi, theta, 0.0)?;
    let state = rot
        .apply(&highest)?
        .with_metadata(AngularMomentumMetadata::single(two_j))
        .with_label(&format!(
            "|{}; θ = {theta:.4}, φ = {phi:.4}⟩",
            nice_half(two_j as i32)
        ));
    Ok(state)
}

/// Evaluates Wigner's small-$`d`$ matrix element
///
/// ```math
/// d^{(j)}_{m'm}(\beta) = \sum_s (-1)^{m'-m+s}
///     \frac{\sqrt{(j+m')!(j-m')!(j+m)!(j-m)!}}{(j+m-s)!\,s!\,(m'-m+s)!\,(j-m'-s)!}
///     \left(\cos\tfrac{\beta}{2}\right)^{2j+m-m'-2s}
///     \left(\sin\tfrac{\beta}{2}\right)^{m'-m+2s}.
/// ```
///
/// # Errors
///
/// Errors if `j` is invalid, or if `mdash` or `m` is not a projection of `j`.
pub fn wigner_small_d(j: f64, mdash: f64, m: f64, beta: f64) -> Result<f64, AngularMomentumError> {
    let (two_j, two_mdash) = validate_jm(j, mdash)?;
    let (_, two_m) = validate_jm(j, m)?;
    Ok(small_d_twice(two_j, two_mdash, two_m, beta))
}

fn small_d_twice(two_j: u32, two_mdash: i32, two_m: i32, beta: f64) -> f64 {
    let tj = two_j as i32;
    let log_prefactor = 0.5
        * [tj + two_mdash, tj - two_mdash, tj + two_m, tj - two_m]
            .into_iter()
            .filter_map(log_factorial_half)
            .sum::<f64>();

    // Integral once the projections are valid for the same j.
    let jpm = (tj + two_m) / 2;
    let jmmdash = (tj - two_mdash) / 2;
    let mdash_minus_m = (two_mdash - two_m) / 2;

    let (c, s) = ((beta / 2.0).cos(), (beta / 2.0).sin());
    let s_min = 0.max(-mdash_minus_m);
    let s_max = jpm.min(jmmdash);
    (s_min..=s_max)
        .map(|k| {
            let log_denominator = log_factorial((jpm - k) as u32)
                + log_factorial(k as u32)
                + log_factorial((mdash_minus_m + k) as u32)
                + log_factorial((jmmdash - k) as u32);
            phase(mdash_minus_m + k)
                * (log_prefactor - log_denominator).exp()
                * c.powi(tj - mdash_minus_m - 2 * k)
                * s.powi(mdash_minus_m + 2 * k)
        })
        .sum()
}

/// Constructs the Wigner rotation matrix $`\mathbf{D}^{(j)}(\alpha, \beta, \gamma)`$ in closed
/// form, with elements
///
/// ```math
/// D^{(j)}_{m'm}(\alpha, \beta, \gamma) = e^{-i\alpha m'} d^{(j)}_{m'm}(\beta) e^{-i\gamma m}
/// ```
///
/// placed at basis indices $`(j - m', j - m)`$. This agrees with [`create_rotation_operator`].
pub fn wigner_d_matrix(
    j: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Result<Operator, AngularMomentumError> {
    let two_j = validate_j(j)?;
    let dim = dimension(two_j);
    let mut dmat = Array2::<C128>::zeros((dim, dim));
    for two_mdash in twice_m_values(two_j) {
        for two_m in twice_m_values(two_j) {
            let d = small_d_twice(two_j, two_mdash, two_m, beta);
            let phase_angle = -alpha * half(two_mdash) - gamma * half(two_m);
            dmat[(basis_index(two_j, two_mdash), basis_index(two_j, two_m))] =
                C128::from_polar(d, phase_angle);
        }
    }
    Ok(Operator::new(dmat)?)
}
