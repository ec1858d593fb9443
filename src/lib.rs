//! # QAngMom: A Program for Quantum Angular Momentum Coupling
//!
//! QAngMom is a program for the coupling of **Q**uantum **Ang**ular **Mom**enta written in Rust
//! with the following capabilities:
//! - construction of angular-momentum eigenstates $`|j, m\rangle`$ and the operators
//!   $`\hat{J}_z`$, $`\hat{J}_\pm`$, $`\hat{J}_x`$, $`\hat{J}_y`$ and $`\hat{J}^2`$,
//! - evaluation of Clebsch–Gordan coefficients in the Condon–Shortley phase convention, backed
//!   by a shared thread-safe cache,
//! - coupling of two angular momenta into the total-angular-momentum basis, together with the
//!   extraction and analysis of definite-$`J`$ components,
//! - sequential coupling of many spins with a record of every coupling step,
//! - evaluation of Wigner $`3j`$ and $`6j`$ symbols and Racah $`W`$ coefficients, and
//! - construction of rotation operators, Wigner $`D`$-matrices and spin-coherent states.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions. For more explanation, please consult this documentation.
//!
//! The compiled `qangmom` binary reads a YAML configuration file, for example
//!
//! ```yaml
//! spin_coupling:
//!   spins:
//!     - j: 0.5
//!       m: 0.5
//!     - j: 0.5
//!       m: -0.5
//!   write_amplitudes: true
//! ```
//!
//! and is invoked as `qangmom -c config.yml -o output.out`.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod angmom;
pub mod auxiliary;
pub mod drivers;
pub mod interfaces;
pub mod io;
pub mod operator;
pub mod state;
