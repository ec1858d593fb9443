//! Square matrix operators acting on [`QuantumState`]s.

use std::error::Error;
use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex;
use num_traits::{One, Zero};

use crate::state::QuantumState;

#[cfg(test)]
#[path = "operator_tests.rs"]
mod operator_tests;

type C128 = Complex<f64>;

/// Maximum number of Taylor terms used by [`Operator::expm`] after scaling.
const EXPM_MAX_TERMS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorError(pub String);

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Operator error: {}", self.0)
    }
}

impl Error for OperatorError {}

/// Structure to manage a linear operator on a finite-dimensional Hilbert space, represented by a
/// square complex matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    matrix: Array2<C128>,
}

impl Operator {
    /// Constructs an operator from a square matrix.
    pub fn new(matrix: Array2<C128>) -> Result<Self, OperatorError> {
        let (nrows, ncols) = matrix.dim();
        if nrows != ncols {
            return Err(OperatorError(format!(
                "Operator matrix must be square, but has shape {nrows} × {ncols}."
            )));
        }
        Ok(Self { matrix })
    }

    pub fn zeros(dim: usize) -> Self {
        Self {
            matrix: Array2::zeros((dim, dim)),
        }
    }

    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: Array2::eye(dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Array2<C128> {
        &self.matrix
    }

    /// Applies this operator to a state.
    ///
    /// The resulting state carries no metadata, since an arbitrary operator need not preserve
    /// the block structure of its input.
    ///
    /// # Errors
    ///
    /// Errors if the dimension of the state does not match that of the operator.
    pub fn apply(&self, state: &QuantumState) -> Result<QuantumState, OperatorError> {
        if state.dim() != self.dim() {
            return Err(OperatorError(format!(
                "Operator of dimension {} cannot act on a state of dimension {}.",
                self.dim(),
                state.dim()
            )));
        }
        let result: Array1<C128> = self.matrix.dot(&state.amplitudes());
        Ok(QuantumState::new(result))
    }

    /// Returns the composition $`\hat{A}\hat{B}`$ where $`\hat{A}`$ is `self` and $`\hat{B}`$ is
    /// `other`, *i.e.* $`\hat{B}`$ acts first.
    pub fn compose(&self, other: &Self) -> Result<Self, OperatorError> {
        self.check_dim(other, "compose")?;
        Ok(Self {
            matrix: self.matrix.dot(&other.matrix),
        })
    }

    /// Returns the Hermitian adjoint of this operator.
    pub fn adjoint(&self) -> Self {
        Self {
            matrix: self.matrix.t().mapv(|x| x.conj()),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self, OperatorError> {
        self.check_dim(other, "add")?;
        Ok(Self {
            matrix: &self.matrix + &other.matrix,
        })
    }

    pub fn sub(&self, other: &Self) -> Result<Self, OperatorError> {
        self.check_dim(other, "subtract")?;
        Ok(Self {
            matrix: &self.matrix - &other.matrix,
        })
    }

    pub fn scale(&self, factor: C128) -> Self {
        Self {
            matrix: self.matrix.mapv(|x| x * factor),
        }
    }

    /// Returns the commutator $`[\hat{A}, \hat{B}] = \hat{A}\hat{B} - \hat{B}\hat{A}`$.
    pub fn commutator(&self, other: &Self) -> Result<Self, OperatorError> {
        self.compose(other)?.sub(&other.compose(self)?)
    }

    /// Returns the expectation value $`\langle\psi|\hat{A}|\psi\rangle`$.
    pub fn expectation(&self, state: &QuantumState) -> Result<C128, OperatorError> {
        let image = self.apply(state)?;
        state
            .inner(&image)
            .map_err(|err| OperatorError(err.to_string()))
    }

    /// Checks if the operator is Hermitian, element-wise within `thresh`.
    pub fn is_hermitian(&self, thresh: f64) -> bool {
        let adjoint = self.adjoint();
        self.matrix
            .iter()
            .zip(adjoint.matrix.iter())
            .all(|(a, b)| (a - b).norm() <= thresh)
    }

    /// Returns the matrix exponential $`e^{\hat{A}}`$.
    ///
    /// The matrix is scaled by $`2^{-s}`$ such that its infinity norm is at most $`1/2`$, the
    /// exponential of the scaled matrix is summed as a Taylor series, and the result is squared
    /// $`s`$ times.
    pub fn expm(&self) -> Self {
        let dim = self.dim();
        let inf_norm = self
            .matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|x| x.norm()).sum::<f64>())
            .fold(0.0, f64::max);
        let squarings = if inf_norm > 0.5 {
            (inf_norm / 0.5).log2().ceil() as i32
        } else {
            0
        };
        let scale = C128::new(2f64.powi(-squarings), 0.0);
        let scaled = self.matrix.mapv(|x| x * scale);

        let mut result = Array2::<C128>::eye(dim);
        let mut term = Array2::<C128>::eye(dim);
        for k in 1..=EXPM_MAX_TERMS {
            term = term.dot(&scaled).mapv(|x| x / C128::new(k as f64, 0.0));
            result = result + &term;
            let term_norm = term.iter().map(|x| x.norm()).fold(0.0, f64::max);
            if term_norm < f64::EPSILON * 1e-3 {
                break;
            }
        }
        for _ in 0..squarings {
            result = result.dot(&result);
        }
        Self { matrix: result }
    }

    fn check_dim(&self, other: &Self, action: &str) -> Result<(), OperatorError> {
        if self.dim() != other.dim() {
            Err(OperatorError(format!(
                "Unable to {action} operators of dimensions {} and {}.",
                self.dim(),
                other.dim()
            )))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.matrix.rows() {
            let entries = row
                .iter()
                .map(|x| {
                    if x.is_zero() {
                        format!("{:>17}", "0")
                    } else if *x == C128::one() {
                        format!("{:>17}", "1")
                    } else {
                        format!("{:+8.4}{:+8.4}i", x.re, x.im)
                    }
                })
                .collect::<Vec<_>>();
            writeln!(f, "{}", entries.join(" "))?;
        }
        Ok(())
    }
}
