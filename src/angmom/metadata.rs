//! Angular-momentum metadata describing the total-$`J`$ block structure of a state.

use std::fmt;
use std::ops::Range;
use std::time::SystemTime;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::angmom::{dimension, half, twice_j_couplings};
use crate::auxiliary::format::{nice_bool, nice_half};

// ==================
// Struct definitions
// ==================

/// A record in the coupling history of a state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CouplingRecord {
    /// The state was created directly as an eigenstate of a single angular momentum.
    Single {
        two_j: u32,
        timestamp: SystemTime,
    },

    /// The state was obtained by coupling two angular momenta, giving rise to the total angular
    /// momenta `two_result_j` (in ascending order).
    Coupling {
        two_j1: u32,
        two_j2: u32,
        two_result_j: Vec<u32>,
        timestamp: SystemTime,
    },
}

impl CouplingRecord {
    fn single(two_j: u32) -> Self {
        Self::Single {
            two_j,
            timestamp: SystemTime::now(),
        }
    }

    fn coupling(two_j1: u32, two_j2: u32) -> Self {
        let mut two_result_j = twice_j_couplings(two_j1, two_j2).collect_vec();
        two_result_j.reverse();
        Self::Coupling {
            two_j1,
            two_j2,
            two_result_j,
            timestamp: SystemTime::now(),
        }
    }

    /// Returns the total angular momenta resulting from this record.
    pub fn result_j(&self) -> Vec<f64> {
        match self {
            Self::Single { two_j, .. } => vec![half(*two_j as i32)],
            Self::Coupling { two_result_j, .. } => {
                two_result_j.iter().map(|two_j| half(*two_j as i32)).collect()
            }
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        match self {
            Self::Single { timestamp, .. } | Self::Coupling { timestamp, .. } => *timestamp,
        }
    }
}

impl fmt::Display for CouplingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { two_j, .. } => write!(f, "single j = {}", nice_half(*two_j as i32)),
            Self::Coupling {
                two_j1,
                two_j2,
                two_result_j,
                ..
            } => write!(
                f,
                "{} ⊗ {} → J ∈ {{{}}}",
                nice_half(*two_j1 as i32),
                nice_half(*two_j2 as i32),
                two_result_j
                    .iter()
                    .map(|two_j| nice_half(*two_j as i32))
                    .join(", ")
            ),
        }
    }
}

/// The location of a total-$`J`$ block inside a flat amplitude array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JComponent {
    /// Twice the total angular momentum of the block.
    pub two_j: u32,

    /// The index of the first amplitude of the block, which is that of $`M = +J`$.
    pub start_index: usize,

    /// The number of amplitudes in the block, $`2J+1`$.
    pub dimension: usize,
}

impl JComponent {
    pub fn new(two_j: u32, start_index: usize) -> Self {
        Self {
            two_j,
            start_index,
            dimension: dimension(two_j),
        }
    }

    pub fn j(&self) -> f64 {
        half(self.two_j as i32)
    }

    /// Returns the index range of the block.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.start_index + self.dimension
    }
}

/// Typed angular-momentum metadata attached to a state.
///
/// Metadata is never mutated once attached. Coupling and extraction create fresh metadata for
/// the states they return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngularMomentumMetadata {
    /// Twice the maximal total angular momentum reachable by the coupling that produced the
    /// state. This is informational only.
    two_total_j: u32,

    /// The ordered, append-only history of how the state came about.
    coupling_history: Vec<CouplingRecord>,

    /// The total-$`J`$ blocks present in the state with at least one non-negligible amplitude,
    /// keyed by twice their $`J`$ and ordered from the largest $`J`$ to the smallest.
    j_components: IndexMap<u32, JComponent>,

    /// Boolean indicating if any coupling record exists.
    is_composite: bool,
}

impl AngularMomentumMetadata {
    /// Constructs metadata for a state lying entirely in a single $`j`$ eigenspace.
    pub fn single(two_j: u32) -> Self {
        let mut j_components = IndexMap::new();
        j_components.insert(two_j, JComponent::new(two_j, 0));
        Self {
            two_total_j: two_j,
            coupling_history: vec![CouplingRecord::single(two_j)],
            j_components,
            is_composite: false,
        }
    }

    /// Constructs metadata for a state obtained by coupling two angular momenta.
    ///
    /// # Arguments
    ///
    /// * `two_j1`, `two_j2` - The doubled angular momenta being coupled.
    /// * `first`, `second` - The metadata of the two input states, if any, whose histories are
    /// concatenated in this order ahead of the new coupling record.
    /// * `j_components` - The blocks found to be present in the coupled amplitudes, in descending
    /// $`J`$ order.
    pub fn coupled(
        two_j1: u32,
        two_j2: u32,
        first: Option<&Self>,
        second: Option<&Self>,
        j_components: IndexMap<u32, JComponent>,
    ) -> Self {
        let coupling_history = first
            .into_iter()
            .chain(second)
            .flat_map(|metadata| metadata.coupling_history.iter().cloned())
            .chain(std::iter::once(CouplingRecord::coupling(two_j1, two_j2)))
            .collect_vec();
        Self {
            two_total_j: two_j1 + two_j2,
            coupling_history,
            j_components,
            is_composite: true,
        }
    }

    pub fn total_j(&self) -> f64 {
        half(self.two_total_j as i32)
    }

    pub fn twice_total_j(&self) -> u32 {
        self.two_total_j
    }

    /// Returns $`[-J_{\mathrm{total}}, J_{\mathrm{total}}]`$.
    pub fn m_range(&self) -> (f64, f64) {
        (-self.total_j(), self.total_j())
    }

    pub fn coupling_history(&self) -> &[CouplingRecord] {
        &self.coupling_history
    }

    pub fn j_components(&self) -> &IndexMap<u32, JComponent> {
        &self.j_components
    }

    /// Returns the block for the doubled total angular momentum `two_j`, if present.
    pub fn j_component(&self, two_j: u32) -> Option<&JComponent> {
        self.j_components.get(&two_j)
    }

    /// Returns the present total angular momenta in descending order.
    pub fn present_j(&self) -> Vec<f64> {
        self.j_components
            .keys()
            .map(|two_j| half(*two_j as i32))
            .collect()
    }

    pub fn is_composite(&self) -> bool {
        self.is_composite
    }
}

impl fmt::Display for AngularMomentumMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total J: {} (M ∈ [-{}, {}])",
            nice_half(self.two_total_j as i32),
            nice_half(self.two_total_j as i32),
            nice_half(self.two_total_j as i32)
        )?;
        writeln!(
            f,
            "Composite: {}",
            nice_bool(self.is_composite)
        )?;
        writeln!(f, "J components:")?;
        for component in self.j_components.values() {
            writeln!(
                f,
                "  J = {:>4}: indices {:>3}..{:<3}",
                nice_half(component.two_j as i32),
                component.range().start,
                component.range().end
            )?;
        }
        writeln!(f, "Coupling history:")?;
        for (i, record) in self.coupling_history.iter().enumerate() {
            writeln!(f, "  {i:>2}. {record}")?;
        }
        Ok(())
    }
}
