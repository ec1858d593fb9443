//! Driver for the sequential coupling of several angular-momentum eigenstates.

use std::fmt;

use anyhow::{self, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use crate::angmom::coupling::{analyze, ComponentAnalysis, CouplingAnalysis};
use crate::angmom::multi_coupling::{CouplingStep, MultiSpinCoupler};
use crate::angmom::validate_jm;
use crate::auxiliary::format::{
    log_subtitle, log_title, nice_bool, nice_half, qangmom_output, qangmom_warn, write_subtitle,
    QAngMomOutput,
};
use crate::drivers::QAngMomDriver;
use crate::io::write_qangmom_yaml;

#[cfg(test)]
#[path = "spin_coupling_tests.rs"]
mod spin_coupling_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// An angular-momentum eigenstate $`|jm\rangle`$ to be added to a coupling sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinDefinition {
    /// The angular momentum $`j`$.
    pub j: f64,

    /// The projection $`m`$.
    pub m: f64,
}

impl SpinDefinition {
    pub fn new(j: f64, m: f64) -> Self {
        Self { j, m }
    }
}

impl fmt::Display for SpinDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match validate_jm(self.j, self.m) {
            Ok((two_j, two_m)) => write!(f, "|{}, {}⟩", nice_half(two_j as i32), nice_half(two_m)),
            Err(_) => write!(f, "|{}, {}⟩ (invalid)", self.j, self.m),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A structure containing control parameters for multi-spin coupling.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SpinCouplingParams {
    /// The eigenstates to be coupled, in the order in which they are added.
    #[builder(setter(custom))]
    pub spins: Vec<SpinDefinition>,

    /// Boolean indicating if the coupling-step history is to be written to the output.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub write_history: bool,

    /// Boolean indicating if the amplitudes of the final state are to be written to the output.
    #[builder(default = "false")]
    #[serde(default)]
    pub write_amplitudes: bool,

    /// Optional name for saving a summary of the result as a YAML file. If `None`, the result will
    /// not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<String>,
}

impl SpinCouplingParams {
    /// Returns a builder to construct a [`SpinCouplingParams`] structure.
    pub fn builder() -> SpinCouplingParamsBuilder {
        SpinCouplingParamsBuilder::default()
    }
}

impl SpinCouplingParamsBuilder {
    pub fn spins(&mut self, spins: &[SpinDefinition]) -> &mut Self {
        self.spins = Some(spins.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        match self.spins.as_ref() {
            Some(spins) if spins.is_empty() => {
                Err("At least one spin must be specified for coupling.".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SpinCouplingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Spins to couple: {}",
            self.spins.iter().map(|spin| spin.to_string()).join(" ⊗ ")
        )?;
        writeln!(f, "Report coupling history: {}", nice_bool(self.write_history))?;
        writeln!(
            f,
            "Report final amplitudes: {}",
            nice_bool(self.write_amplitudes)
        )?;
        writeln!(
            f,
            "Save multi-spin coupling summary to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{name}.yml")
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A serialisable summary of a multi-spin coupling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinCouplingSummary {
    /// The coupled eigenstates, in order.
    pub constituents: Vec<SpinDefinition>,

    /// The coupling steps after the first constituent.
    pub steps: Vec<CouplingStep>,

    /// The dimension of the final state.
    pub dimension: usize,

    /// The norm of the final state.
    pub norm: f64,

    /// The total angular momentum of the dominant component of the final state.
    pub dominant_j: f64,

    /// The total angular momenta admissible at the junction of all constituents.
    pub valid_intertwiners: Vec<f64>,

    /// The total-$`J`$ decomposition of the final state.
    pub components: Vec<ComponentAnalysis>,
}

/// A structure to contain multi-spin coupling results.
#[derive(Clone, Builder, Debug)]
pub struct SpinCouplingResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: SpinCouplingParams,

    /// The coupler holding the final state and its history.
    pub coupler: MultiSpinCoupler,

    /// The total-$`J`$ decomposition of the final state.
    pub analysis: CouplingAnalysis,
}

impl SpinCouplingResult {
    /// Returns a builder to construct a [`SpinCouplingResult`] structure.
    fn builder() -> SpinCouplingResultBuilder {
        SpinCouplingResultBuilder::default()
    }

    /// Returns a serialisable summary of the result.
    pub fn summary(&self) -> SpinCouplingSummary {
        SpinCouplingSummary {
            constituents: self
                .coupler
                .constituents()
                .iter()
                .map(|constituent| SpinDefinition::new(constituent.j(), constituent.m()))
                .collect(),
            steps: self.coupler.steps().to_vec(),
            dimension: self.coupler.dim(),
            norm: self.coupler.norm(),
            dominant_j: self.analysis.dominant_j(),
            valid_intertwiners: self.coupler.valid_intertwiners(),
            components: self.analysis.components.clone(),
        }
    }

    /// Writes the coupling steps in a nicely formatted table.
    fn write_history(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Coupling history")?;
        writeln!(f, "{}", "┈".repeat(60))?;
        writeln!(
            f,
            "{:>3}  {:>10}  {:>8}  {:>14}  {:>14}",
            "#", "Added", "Coupled", "J before", "J after"
        )?;
        writeln!(f, "{}", "┈".repeat(60))?;
        let fmt_js = |two_js: &[u32]| {
            two_js
                .iter()
                .map(|two_j| nice_half(*two_j as i32))
                .join(",")
        };
        for (i, step) in self.coupler.steps().iter().enumerate() {
            writeln!(
                f,
                "{:>3}  {:>10}  {:>8}  {:>14}  {:>14}",
                i + 1,
                step.added.to_string(),
                nice_half(step.two_j_coupled as i32),
                fmt_js(&step.two_j_before),
                fmt_js(&step.two_j_after)
            )?;
        }
        writeln!(f, "{}", "┈".repeat(60))?;
        writeln!(f)?;
        Ok(())
    }

    /// Writes the amplitudes of the final state, grouped by total-$`J`$ block.
    fn write_amplitudes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Final amplitudes")?;
        let state = self.coupler.state();
        let amplitudes = state.amplitudes();
        match state.metadata() {
            Some(metadata) if metadata.is_composite() => {
                for component in metadata.j_components().values() {
                    writeln!(f, "J = {}:", nice_half(component.two_j as i32))?;
                    for (i, index) in component.range().enumerate() {
                        let two_m = component.two_j as i32 - 2 * i as i32;
                        let amp = amplitudes[index];
                        writeln!(
                            f,
                            "  M = {:>5}: {:+.8} {:+.8}i",
                            nice_half(two_m),
                            amp.re,
                            amp.im
                        )?;
                    }
                }
            }
            _ => {
                for (i, amp) in amplitudes.iter().enumerate() {
                    writeln!(f, "  [{i:>3}]: {:+.8} {:+.8}i", amp.re, amp.im)?;
                }
            }
        }
        writeln!(f)?;
        Ok(())
    }
}

impl fmt::Display for SpinCouplingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameters.write_history && !self.coupler.steps().is_empty() {
            self.write_history(f)?;
        }
        writeln!(
            f,
            "Constituents: {}",
            self.coupler
                .constituents()
                .iter()
                .map(|constituent| constituent.to_string())
                .join(" ⊗ ")
        )?;
        writeln!(f, "Final dimension: {}", self.coupler.dim())?;
        writeln!(f, "Final norm: {:.10}", self.coupler.norm())?;
        writeln!(
            f,
            "Valid intertwiners: J ∈ {{{}}}",
            self.coupler
                .valid_intertwiners()
                .iter()
                .map(|j| nice_half((2.0 * j).round() as i32))
                .join(", ")
        )?;
        writeln!(f)?;
        write!(f, "{}", self.analysis)?;
        writeln!(f)?;
        if self.parameters.write_amplitudes {
            self.write_amplitudes(f)?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for multi-spin coupling.
#[derive(Clone, Builder)]
pub struct SpinCouplingDriver<'a> {
    /// The control parameters for multi-spin coupling.
    parameters: &'a SpinCouplingParams,

    /// The result of the multi-spin coupling.
    #[builder(setter(skip), default = "None")]
    result: Option<SpinCouplingResult>,
}

impl<'a> SpinCouplingDriver<'a> {
    /// Returns a builder to construct a [`SpinCouplingDriver`] structure.
    pub fn builder() -> SpinCouplingDriverBuilder<'a> {
        SpinCouplingDriverBuilder::default()
    }

    /// Executes multi-spin coupling.
    fn couple_spins(&mut self) -> Result<(), anyhow::Error> {
        log_title("Multi-Spin Coupling");
        qangmom_output!("");
        let params = self.parameters;
        params.log_output_display();

        let (first, rest) = params
            .spins
            .split_first()
            .ok_or_else(|| format_err!("No spins have been specified for coupling."))?;
        let mut coupler = MultiSpinCoupler::new(first.j, first.m)?;
        log::debug!("Starting multi-spin coupling from {first}.");
        for spin in rest.iter() {
            coupler.add_spin(spin.j, spin.m)?;
        }
        let n_reductions = coupler
            .steps()
            .iter()
            .skip(1)
            .filter(|step| step.two_j_before.len() > 1)
            .count();
        if n_reductions > 0 {
            qangmom_warn!(
                "{n_reductions} reduction(s) to a dominant J component discarded other J channels."
            );
        }
        let analysis = analyze(coupler.state())?;

        log_subtitle("Multi-spin coupling result");
        qangmom_output!("");
        let result = SpinCouplingResult::builder()
            .parameters(params.clone())
            .coupler(coupler)
            .analysis(analysis)
            .build()
            .map_err(|err| format_err!(err))?;
        result.log_output_display();

        if let Some(name) = params.result_save_name.as_ref() {
            write_qangmom_yaml(name, &result.summary())?;
            qangmom_output!("Multi-spin coupling summary saved as {name}.yml.");
            qangmom_output!("");
        }
        self.result = Some(result);
        Ok(())
    }
}

impl QAngMomDriver for SpinCouplingDriver<'_> {
    type Outcome = SpinCouplingResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No multi-spin coupling results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.couple_spins()
    }
}
