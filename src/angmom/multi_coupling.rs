//! Sequential coupling of more than two angular momenta.
//!
//! Each new constituent is coupled to the running state after the running state has been reduced
//! to its dominant total-$`J`$ component. Only the dominant channel is carried forward; the other
//! channels are discarded at every reduction. This is not a complete multi-channel recoupling,
//! which would require tracking every surviving branch of the coupling tree.

use std::fmt;

use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use crate::angmom::coupling::{analyze, couple, extract_component};
use crate::angmom::eigenstate::create_eigenstate_twice;
use crate::angmom::{half, twice_j_couplings, validate_jm, AngularMomentumError};
use crate::auxiliary::format::nice_half;
use crate::state::QuantumState;

#[cfg(test)]
#[path = "multi_coupling_tests.rs"]
mod multi_coupling_tests;

// ==================
// Struct definitions
// ==================

/// An angular-momentum eigenstate $`|jm\rangle`$ added to a [`MultiSpinCoupler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinConstituent {
    pub two_j: u32,
    pub two_m: i32,
}

impl SpinConstituent {
    pub fn j(&self) -> f64 {
        half(self.two_j as i32)
    }

    pub fn m(&self) -> f64 {
        half(self.two_m)
    }
}

impl fmt::Display for SpinConstituent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}, {}⟩",
            nice_half(self.two_j as i32),
            nice_half(self.two_m)
        )
    }
}

/// A record of one addition to a [`MultiSpinCoupler`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingStep {
    /// The constituent that was added.
    pub added: SpinConstituent,

    /// Twice the total angular momentum of the running state that the constituent was coupled
    /// to, after any reduction to the dominant component.
    pub two_j_coupled: u32,

    /// Twice the available total angular momenta before the addition, in descending order.
    pub two_j_before: Vec<u32>,

    /// Twice the available total angular momenta after the addition, in descending order.
    pub two_j_after: Vec<u32>,
}

impl CouplingStep {
    pub fn j_before(&self) -> Vec<f64> {
        self.two_j_before
            .iter()
            .map(|two_j| half(*two_j as i32))
            .collect()
    }

    pub fn j_after(&self) -> Vec<f64> {
        self.two_j_after
            .iter()
            .map(|two_j| half(*two_j as i32))
            .collect()
    }
}

impl fmt::Display for CouplingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_js = |two_js: &[u32]| {
            two_js
                .iter()
                .map(|two_j| nice_half(*two_j as i32))
                .join(", ")
        };
        write!(
            f,
            "J ∈ {{{}}} → J = {} ⊗ {} → J ∈ {{{}}}",
            fmt_js(&self.two_j_before),
            nice_half(self.two_j_coupled as i32),
            self.added,
            fmt_js(&self.two_j_after)
        )
    }
}

/// Structure to couple angular-momentum eigenstates one at a time.
#[derive(Clone, Debug)]
pub struct MultiSpinCoupler {
    /// The constituents in the order in which they were added.
    constituents: Vec<SpinConstituent>,

    /// The history of additions after the first constituent.
    steps: Vec<CouplingStep>,

    /// The running state.
    state: QuantumState,

    /// Twice the total angular momenta currently available, in descending order.
    available_two_j: Vec<u32>,
}

impl MultiSpinCoupler {
    /// Starts a coupling sequence from the eigenstate $`|jm\rangle`$.
    pub fn new(j: f64, m: f64) -> Result<Self, AngularMomentumError> {
        let (two_j, two_m) = validate_jm(j, m)?;
        Ok(Self {
            constituents: vec![SpinConstituent { two_j, two_m }],
            steps: vec![],
            state: create_eigenstate_twice(two_j, two_m)?,
            available_two_j: vec![two_j],
        })
    }

    /// Couples the eigenstate $`|jm\rangle`$ to the running state.
    ///
    /// If the running state is already composite, it is first reduced to its dominant total-$`J`$
    /// component. On error, the coupler is left unchanged.
    pub fn add_spin(&mut self, j: f64, m: f64) -> Result<&mut Self, AngularMomentumError> {
        let (two_j, two_m) = validate_jm(j, m)?;
        let added = create_eigenstate_twice(two_j, two_m)?;

        let (base, base_two_j) = if self.constituents.len() == 1 {
            (self.state.clone(), self.constituents[0].two_j)
        } else {
            let analysis = analyze(&self.state)?;
            let dominant_two_j = analysis.dominant_two_j;
            if !analysis.is_pure {
                log::warn!(
                    "Reducing to the dominant J = {} component discards J ∈ {{{}}}.",
                    nice_half(dominant_two_j as i32),
                    analysis
                        .components
                        .iter()
                        .filter(|component| {
                            component.is_present && component.two_j != dominant_two_j
                        })
                        .map(|component| nice_half(component.two_j as i32))
                        .join(", ")
                );
            }
            let pure = extract_component(&self.state, half(dominant_two_j as i32))?
                .ok_or(AngularMomentumError::EmptyComposite)?;
            log::debug!(
                "Reduced the running state to its dominant J = {} component.",
                nice_half(dominant_two_j as i32)
            );
            (pure, dominant_two_j)
        };

        let coupled = couple(&base, half(base_two_j as i32), &added, j)?;
        let present = coupled
            .metadata()
            .map(|metadata| metadata.j_components().keys().copied().collect_vec())
            .unwrap_or_default();
        let two_j_after = twice_j_couplings(base_two_j, two_j)
            .filter(|two_j_new| present.contains(two_j_new))
            .collect_vec();

        let step = CouplingStep {
            added: SpinConstituent { two_j, two_m },
            two_j_coupled: base_two_j,
            two_j_before: self.available_two_j.clone(),
            two_j_after: two_j_after.clone(),
        };
        log::debug!("Coupling step {}: {step}", self.steps.len() + 1);

        self.constituents.push(step.added);
        self.steps.push(step);
        self.state = coupled;
        self.available_two_j = two_j_after;
        Ok(self)
    }

    pub fn constituents(&self) -> &[SpinConstituent] {
        &self.constituents
    }

    pub fn steps(&self) -> &[CouplingStep] {
        &self.steps
    }

    pub fn state(&self) -> &QuantumState {
        &self.state
    }

    pub fn dim(&self) -> usize {
        self.state.dim()
    }

    pub fn norm(&self) -> f64 {
        self.state.norm()
    }

    /// Returns the total angular momenta admissible at the junction of all constituents so far,
    /// in descending order.
    pub fn valid_intertwiners(&self) -> Vec<f64> {
        self.available_two_j
            .iter()
            .map(|two_j| half(*two_j as i32))
            .collect()
    }
}
