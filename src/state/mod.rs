//! Fixed-dimension complex state vectors.

use std::error::Error;
use std::fmt;

use approx;
use itertools::Itertools;
use ndarray::{Array1, ArrayView1};
use num_complex::Complex;
use num_traits::Zero;

use crate::angmom::metadata::AngularMomentumMetadata;


type C128 = Complex<f64>;

// ==================
// Struct definitions
// ==================

#[derive(Debug, Clone, PartialEq)]
pub struct StateError(pub String);

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "State error: {}", self.0)
    }
}

impl Error for StateError {}

/// Structure to manage an immutable state vector in a finite-dimensional Hilbert space.
///
/// Every transformation returns a new state; the amplitude array of an existing state is never
/// modified after construction.
#[derive(Debug, Clone)]
pub struct QuantumState {
    /// The complex amplitudes of the state in the chosen basis.
    amplitudes: Array1<C128>,

    /// Optional angular-momentum metadata describing how the amplitudes are organised into
    /// total-$`J`$ blocks.
    metadata: Option<AngularMomentumMetadata>,

    /// Optional human-readable label, for display only.
    label: Option<String>,
}

impl QuantumState {
    /// Constructs a new state from an amplitude array, without metadata or label.
    pub fn new(amplitudes: Array1<C128>) -> Self {
        Self {
            amplitudes,
            metadata: None,
            label: None,
        }
    }

    /// Constructs a new state from a vector of amplitudes.
    pub fn from_vec(amplitudes: Vec<C128>) -> Self {
        Self::new(Array1::from_vec(amplitudes))
    }

    /// Constructs the zero vector of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self::new(Array1::zeros(dim))
    }

    /// Constructs the unit basis vector with a single `1` at `index`.
    pub fn basis(dim: usize, index: usize) -> Result<Self, StateError> {
        if index >= dim {
            return Err(StateError(format!(
                "Basis index {index} is out of bounds for dimension {dim}."
            )));
        }
        let mut amplitudes = Array1::<C128>::zeros(dim);
        amplitudes[index] = C128::new(1.0, 0.0);
        Ok(Self::new(amplitudes))
    }

    /// Returns a copy of this state carrying the given metadata.
    pub fn with_metadata(mut self, metadata: AngularMomentumMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns a copy of this state without any metadata.
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    /// Returns a copy of this state carrying the given label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> ArrayView1<C128> {
        self.amplitudes.view()
    }

    pub fn metadata(&self) -> Option<&AngularMomentumMetadata> {
        self.metadata.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the amplitude at `index`.
    pub fn amplitude(&self, index: usize) -> Result<C128, StateError> {
        self.amplitudes.get(index).copied().ok_or_else(|| {
            StateError(format!(
                "Index {index} is out of bounds for a state of dimension {}.",
                self.dim()
            ))
        })
    }

    /// Returns a new state identical to this one except for the amplitude at `index`.
    ///
    /// The metadata of the original state is dropped, since it can no longer be guaranteed to
    /// describe the modified amplitudes.
    pub fn with_amplitude(&self, index: usize, value: C128) -> Result<Self, StateError> {
        if index >= self.dim() {
            return Err(StateError(format!(
                "Index {index} is out of bounds for a state of dimension {}.",
                self.dim()
            )));
        }
        let mut amplitudes = self.amplitudes.clone();
        amplitudes[index] = value;
        Ok(Self {
            amplitudes,
            metadata: None,
            label: self.label.clone(),
        })
    }

    /// Returns the Euclidean norm of the state.
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Returns a normalised copy of this state.
    ///
    /// # Errors
    ///
    /// Errors if the norm of the state is below `thresh`.
    pub fn normalise(&self, thresh: f64) -> Result<Self, StateError> {
        let norm = self.norm();
        if norm < thresh {
            return Err(StateError(format!(
                "Unable to normalise a state with norm {norm:.3e}."
            )));
        }
        Ok(Self {
            amplitudes: self.amplitudes.mapv(|a| a / norm),
            metadata: self.metadata.clone(),
            label: self.label.clone(),
        })
    }

    /// Returns the inner product $`\langle \mathrm{self} | \mathrm{other} \rangle`$.
    pub fn inner(&self, other: &Self) -> Result<C128, StateError> {
        if self.dim() != other.dim() {
            return Err(StateError(format!(
                "Inner product between states of dimensions {} and {} is undefined.",
                self.dim(),
                other.dim()
            )));
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .fold(C128::zero(), |acc, x| acc + x))
    }

    /// Returns the tensor product $`|\mathrm{self}\rangle \otimes |\mathrm{other}\rangle`$ whose
    /// amplitude at `i * other.dim() + k` is `self[i] * other[k]`.
    pub fn tensor_product(&self, other: &Self) -> Self {
        let amplitudes = self
            .amplitudes
            .iter()
            .cartesian_product(other.amplitudes.iter())
            .map(|(a, b)| a * b)
            .collect::<Array1<_>>();
        Self::new(amplitudes)
    }

    /// Returns a copy of this state with every amplitude multiplied by `factor`.
    pub fn scale(&self, factor: C128) -> Self {
        Self {
            amplitudes: self.amplitudes.mapv(|a| a * factor),
            metadata: self.metadata.clone(),
            label: self.label.clone(),
        }
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label.as_ref() {
            write!(f, "{label}: ")?;
        }
        write!(
            f,
            "[{}]",
            self.amplitudes
                .iter()
                .map(|a| format!("{:+.6}{:+.6}i", a.re, a.im))
                .join(", ")
        )
    }
}

impl approx::AbsDiffEq for QuantumState {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        <f64 as approx::AbsDiffEq>::default_epsilon()
    }

    /// Two states are equal within `epsilon` if they have the same dimension and every pair of
    /// corresponding amplitudes differs in modulus by at most `epsilon`. Metadata and labels are
    /// not compared.
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dim() == other.dim()
            && self
                .amplitudes
                .iter()
                .zip(other.amplitudes.iter())
                .all(|(a, b)| (a - b).norm() <= epsilon)
    }
}

impl PartialEq for QuantumState {
    fn eq(&self, other: &Self) -> bool {
        self.amplitudes == other.amplitudes
    }
}
