//! Coupling of two angular momenta into total-$`J`$ blocks, and the inverse decomposition.
//!
//! A state obtained by coupling $`j_1`$ and $`j_2`$ lives in a flat amplitude array made up of
//! concatenated total-$`J`$ blocks. The blocks run from $`J = j_1 + j_2`$ down to
//! $`J = |j_1 - j_2|`$, and within each block $`M`$ runs from $`+J`$ down to $`-J`$. This is the
//! single-$`j`$ basis convention generalised across blocks, and it is produced by
//! [`coupled_layout`].

use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use log;
use ndarray::{s, Array1, ArrayView1};
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::angmom::clebsch_gordan::clebsch_gordan_twice;
use crate::angmom::eigenstate::check_dimension;
use crate::angmom::metadata::{AngularMomentumMetadata, JComponent};
use crate::angmom::{
    basis_index, dimension, half, is_valid_twice_m, m_from_index, twice_j_couplings,
    twice_m_values, validate_j, AngularMomentumError, NEGLIGIBLE_AMPLITUDE_THRESHOLD,
    ZERO_NORM_THRESHOLD,
};
use crate::auxiliary::format::{nice_bool, nice_half, write_subtitle};
use crate::state::QuantumState;

#[cfg(test)]
#[path = "coupling_tests.rs"]
mod coupling_tests;

type C128 = Complex<f64>;

// ==================
// Struct definitions
// ==================

/// The weight of a single total-$`J`$ block in a composite state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentAnalysis {
    /// Twice the total angular momentum of the block.
    pub two_j: u32,

    /// The norm of the amplitudes in the block.
    pub magnitude: f64,

    /// Boolean indicating if `magnitude` exceeds [`ZERO_NORM_THRESHOLD`].
    pub is_present: bool,
}

impl ComponentAnalysis {
    pub fn j(&self) -> f64 {
        half(self.two_j as i32)
    }
}

/// The total-$`J`$ decomposition of a composite state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CouplingAnalysis {
    /// The analysed blocks, in descending $`J`$ order.
    pub components: Vec<ComponentAnalysis>,

    /// Twice the total angular momentum of the block with the largest magnitude. Ties are
    /// resolved in favour of the larger $`J`$.
    pub dominant_two_j: u32,

    /// Boolean indicating if exactly one block is present.
    pub is_pure: bool,
}

/// Returns `true` if `best` stays dominant over `other`. Magnitudes within
/// [`ZERO_NORM_THRESHOLD`] of each other tie, and ties go to the larger $`J`$.
fn dominates(best: &ComponentAnalysis, other: &ComponentAnalysis) -> bool {
    if (best.magnitude - other.magnitude).abs() <= ZERO_NORM_THRESHOLD {
        best.two_j >= other.two_j
    } else {
        best.magnitude > other.magnitude
    }
}

impl CouplingAnalysis {
    pub fn dominant_j(&self) -> f64 {
        half(self.dominant_two_j as i32)
    }

    /// Returns the present total angular momenta in descending order.
    pub fn present_j(&self) -> Vec<f64> {
        self.components
            .iter()
            .filter(|component| component.is_present)
            .map(ComponentAnalysis::j)
            .collect()
    }

    fn from_components(components: Vec<ComponentAnalysis>) -> Result<Self, AngularMomentumError> {
        let dominant = components
            .iter()
            .filter(|component| component.is_present)
            .fold(None::<&ComponentAnalysis>, |best, component| match best {
                Some(best) if dominates(best, component) => Some(best),
                _ => Some(component),
            })
            .ok_or(AngularMomentumError::EmptyComposite)?;
        let dominant_two_j = dominant.two_j;
        let is_pure = components
            .iter()
            .filter(|component| component.is_present)
            .count()
            == 1;
        Ok(Self {
            components,
            dominant_two_j,
            is_pure,
        })
    }
}

impl fmt::Display for CouplingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Total-J decomposition")?;
        writeln!(f, "{:>6}  {:>14}  {:>7}", "J", "Magnitude", "Present")?;
        for component in self.components.iter() {
            writeln!(
                f,
                "{:>6}  {:>14.8e}  {:>7}",
                nice_half(component.two_j as i32),
                component.magnitude,
                nice_bool(component.is_present)
            )?;
        }
        writeln!(f, "Dominant J: {}", nice_half(self.dominant_two_j as i32))?;
        writeln!(f, "Pure: {}", nice_bool(self.is_pure))?;
        Ok(())
    }
}

// =========
// Functions
// =========

/// Returns every total-$`J`$ block produced by coupling `two_j1` and `two_j2`, whether or not it
/// ends up populated, in the order in which the blocks are laid out. The blocks tile
/// `0..(2j_1+1)(2j_2+1)` without gaps.
pub fn coupled_layout(two_j1: u32, two_j2: u32) -> Vec<JComponent> {
    twice_j_couplings(two_j1, two_j2)
        .scan(0, |start, two_j| {
            let component = JComponent::new(two_j, *start);
            *start += component.dimension;
            Some(component)
        })
        .collect()
}

fn layout_dimension(layout: &[JComponent]) -> usize {
    layout.iter().map(|component| component.dimension).sum()
}

fn check_composite_dimension(
    state: &QuantumState,
    two_j1: u32,
    two_j2: u32,
    layout: &[JComponent],
) -> Result<(), AngularMomentumError> {
    let expected = layout_dimension(layout);
    if state.dim() != expected {
        Err(AngularMomentumError::DimensionMismatch {
            j: half((two_j1 + two_j2) as i32),
            expected,
            found: state.dim(),
        })
    } else {
        Ok(())
    }
}

fn block_norm(amplitudes: ArrayView1<C128>, component: &JComponent) -> f64 {
    amplitudes
        .slice(s![component.range()])
        .iter()
        .map(|x| x.norm_sqr())
        .sum::<f64>()
        .sqrt()
}

/// Selects the blocks of `layout` with at least one non-negligible amplitude.
fn present_components(
    amplitudes: ArrayView1<C128>,
    layout: &[JComponent],
) -> IndexMap<u32, JComponent> {
    layout
        .iter()
        .filter(|component| {
            amplitudes
                .slice(s![component.range()])
                .iter()
                .any(|x| x.norm() > NEGLIGIBLE_AMPLITUDE_THRESHOLD)
        })
        .map(|component| (component.two_j, *component))
        .collect()
}

/// Builds a `|J, M⟩` label from the amplitude with the largest magnitude.
fn dominant_label(amplitudes: ArrayView1<C128>, layout: &[JComponent]) -> Option<String> {
    let index = amplitudes
        .iter()
        .position_max_by(|a, b| a.norm().total_cmp(&b.norm()))?;
    let component = layout
        .iter()
        .find(|component| component.range().contains(&index))?;
    let two_m = m_from_index(component.two_j, index - component.start_index);
    Some(format!(
        "|{}, {}⟩",
        nice_half(component.two_j as i32),
        nice_half(two_m)
    ))
}

/// Transforms product-basis amplitudes $`c_{m_1 m_2}`$ (indexed by
/// $`\mathrm{idx}(j_1, m_1)\,(2j_2+1) + \mathrm{idx}(j_2, m_2)`$) into coupled-basis amplitudes
/// $`\sum_{m_1} c_{m_1, M-m_1} \langle j_1 m_1 j_2 M-m_1 | J M \rangle`$.
fn product_to_coupled<F>(two_j1: u32, two_j2: u32, layout: &[JComponent], product: F) -> Array1<C128>
where
    F: Fn(usize, usize) -> C128,
{
    let mut coupled = Array1::<C128>::zeros(layout_dimension(layout));
    for component in layout.iter() {
        let two_j = component.two_j;
        for two_m in twice_m_values(two_j) {
            let amplitude = twice_m_values(two_j1)
                .filter(|two_m1| is_valid_twice_m(two_j2, two_m - two_m1))
                .fold(C128::zero(), |acc, two_m1| {
                    let two_m2 = two_m - two_m1;
                    let cg = clebsch_gordan_twice(two_j1, two_m1, two_j2, two_m2, two_j, two_m);
                    if cg == 0.0 {
                        acc
                    } else {
                        acc + product(basis_index(two_j1, two_m1), basis_index(two_j2, two_m2))
                            * cg
                    }
                });
            coupled[component.start_index + basis_index(two_j, two_m)] = amplitude;
        }
    }
    coupled
}

/// Couples two angular-momentum states into a composite state in the total-$`J`$ basis.
///
/// # Arguments
///
/// * `state_a` - A state of dimension $`2j_1+1`$.
/// * `j1` - The angular momentum of `state_a`.
/// * `state_b` - A state of dimension $`2j_2+1`$.
/// * `j2` - The angular momentum of `state_b`.
///
/// # Returns
///
/// The normalised composite state, laid out as in [`coupled_layout`], whose metadata lists only
/// the blocks with at least one non-negligible amplitude and whose coupling history is that of
/// `state_a` followed by that of `state_b` followed by the new coupling.
///
/// # Errors
///
/// Errors if either angular momentum is invalid, if either state has the wrong dimension, or if
/// the coupled amplitudes vanish.
pub fn couple(
    state_a: &QuantumState,
    j1: f64,
    state_b: &QuantumState,
    j2: f64,
) -> Result<QuantumState, AngularMomentumError> {
    let two_j1 = validate_j(j1)?;
    let two_j2 = validate_j(j2)?;
    check_dimension(state_a, two_j1)?;
    check_dimension(state_b, two_j2)?;

    let layout = coupled_layout(two_j1, two_j2);
    let a = state_a.amplitudes();
    let b = state_b.amplitudes();
    let coupled = product_to_coupled(two_j1, two_j2, &layout, |i1, i2| a[i1] * b[i2]);
    let normalised = QuantumState::new(coupled).normalise(ZERO_NORM_THRESHOLD)?;

    let j_components = present_components(normalised.amplitudes(), &layout);
    log::debug!(
        "Coupled j1 = {} and j2 = {} into a {}-dimensional state with J ∈ {{{}}}.",
        nice_half(two_j1 as i32),
        nice_half(two_j2 as i32),
        normalised.dim(),
        j_components
            .keys()
            .map(|two_j| nice_half(*two_j as i32))
            .join(", ")
    );
    let label = dominant_label(normalised.amplitudes(), &layout);
    let metadata = AngularMomentumMetadata::coupled(
        two_j1,
        two_j2,
        state_a.metadata(),
        state_b.metadata(),
        j_components,
    );
    let state = normalised.with_metadata(metadata);
    Ok(match label {
        Some(label) => state.with_label(&label),
        None => state,
    })
}

/// Slices out and normalises a block, or returns `None` if the block is numerically zero.
fn extract_block(
    state: &QuantumState,
    component: &JComponent,
) -> Result<Option<QuantumState>, AngularMomentumError> {
    if component.range().end > state.dim() {
        return Err(AngularMomentumError::DimensionMismatch {
            j: component.j(),
            expected: component.range().end,
            found: state.dim(),
        });
    }
    let amplitudes = state.amplitudes();
    if block_norm(amplitudes, component) < ZERO_NORM_THRESHOLD {
        return Ok(None);
    }
    let block = amplitudes.slice(s![component.range()]).to_owned();
    let single = [JComponent::new(component.two_j, 0)];
    let label = dominant_label(block.view(), &single);
    let extracted = QuantumState::new(block)
        .normalise(ZERO_NORM_THRESHOLD)?
        .with_metadata(AngularMomentumMetadata::single(component.two_j));
    Ok(Some(match label {
        Some(label) => extracted.with_label(&label),
        None => extracted,
    }))
}

/// Extracts the pure total-$`J`$ component of a state carrying angular-momentum metadata.
///
/// # Returns
///
/// The normalised component as a fresh, non-composite eigenstate of `target_j`, or `None` if the
/// block is not listed in the metadata or is numerically zero.
///
/// # Errors
///
/// Errors if `target_j` is invalid or if `state` carries no metadata, in which case
/// [`extract_component_with_origin`] should be used instead.
pub fn extract_component(
    state: &QuantumState,
    target_j: f64,
) -> Result<Option<QuantumState>, AngularMomentumError> {
    let two_j = validate_j(target_j)?;
    let metadata = state
        .metadata()
        .ok_or(AngularMomentumError::MissingMetadata)?;
    match metadata.j_component(two_j) {
        Some(component) => extract_block(state, component),
        None => Ok(None),
    }
}

/// Extracts the pure total-$`J`$ component of a state known to result from coupling `j1` and
/// `j2`, locating the block from [`coupled_layout`] instead of from metadata.
pub fn extract_component_with_origin(
    state: &QuantumState,
    target_j: f64,
    j1: f64,
    j2: f64,
) -> Result<Option<QuantumState>, AngularMomentumError> {
    let two_j = validate_j(target_j)?;
    let two_j1 = validate_j(j1)?;
    let two_j2 = validate_j(j2)?;
    let layout = coupled_layout(two_j1, two_j2);
    check_composite_dimension(state, two_j1, two_j2, &layout)?;
    match layout.iter().find(|component| component.two_j == two_j) {
        Some(component) => extract_block(state, component),
        None => Ok(None),
    }
}

fn analyze_components<'a, I>(state: &QuantumState, components: I) -> Vec<ComponentAnalysis>
where
    I: Iterator<Item = &'a JComponent>,
{
    let amplitudes = state.amplitudes();
    components
        .map(|component| {
            let magnitude = block_norm(amplitudes, component);
            ComponentAnalysis {
                two_j: component.two_j,
                magnitude,
                is_present: magnitude > ZERO_NORM_THRESHOLD,
            }
        })
        .collect()
}

/// Analyses the total-$`J`$ blocks listed in the metadata of `state`.
///
/// # Errors
///
/// Errors if `state` carries no metadata, if a listed block does not fit inside `state`, or if no
/// block is present.
pub fn analyze(state: &QuantumState) -> Result<CouplingAnalysis, AngularMomentumError> {
    let metadata = state
        .metadata()
        .ok_or(AngularMomentumError::MissingMetadata)?;
    if let Some(component) = metadata
        .j_components()
        .values()
        .find(|component| component.range().end > state.dim())
    {
        return Err(AngularMomentumError::DimensionMismatch {
            j: component.j(),
            expected: component.range().end,
            found: state.dim(),
        });
    }
    CouplingAnalysis::from_components(analyze_components(
        state,
        metadata.j_components().values(),
    ))
}

/// Analyses every total-$`J`$ block allowed by coupling `j1` and `j2`.
pub fn analyze_with_origin(
    state: &QuantumState,
    j1: f64,
    j2: f64,
) -> Result<CouplingAnalysis, AngularMomentumError> {
    let two_j1 = validate_j(j1)?;
    let two_j2 = validate_j(j2)?;
    let layout = coupled_layout(two_j1, two_j2);
    check_composite_dimension(state, two_j1, two_j2, &layout)?;
    CouplingAnalysis::from_components(analyze_components(state, layout.iter()))
}

/// Expands a coupled-basis state obtained from `j1` and `j2` into the uncoupled product basis,
/// where the amplitude of $`|j_1 m_1\rangle|j_2 m_2\rangle`$ is at index
/// $`\mathrm{idx}(j_1, m_1)\,(2j_2+1) + \mathrm{idx}(j_2, m_2)`$.
///
/// The returned state carries no metadata.
pub fn to_product_basis(
    composite: &QuantumState,
    j1: f64,
    j2: f64,
) -> Result<QuantumState, AngularMomentumError> {
    let two_j1 = validate_j(j1)?;
    let two_j2 = validate_j(j2)?;
    let layout = coupled_layout(two_j1, two_j2);
    check_composite_dimension(composite, two_j1, two_j2, &layout)?;

    let dim2 = dimension(two_j2);
    let coupled = composite.amplitudes();
    let mut product = Array1::<C128>::zeros(dimension(two_j1) * dim2);
    for component in layout.iter() {
        let two_j = component.two_j;
        for two_m in twice_m_values(two_j) {
            let amplitude = coupled[component.start_index + basis_index(two_j, two_m)];
            if amplitude.is_zero() {
                continue;
            }
            for two_m1 in twice_m_values(two_j1) {
                let two_m2 = two_m - two_m1;
                if !is_valid_twice_m(two_j2, two_m2) {
                    continue;
                }
                let cg = clebsch_gordan_twice(two_j1, two_m1, two_j2, two_m2, two_j, two_m);
                product[basis_index(two_j1, two_m1) * dim2 + basis_index(two_j2, two_m2)] +=
                    amplitude * cg;
            }
        }
    }
    Ok(QuantumState::new(product))
}

/// Transforms an arbitrary, possibly entangled, product-basis state of `j1` and `j2` into the
/// coupled basis. This is the inverse of [`to_product_basis`] and preserves the norm.
///
/// The returned state carries coupling metadata with no history from either constituent.
pub fn from_product_basis(
    product: &QuantumState,
    j1: f64,
    j2: f64,
) -> Result<QuantumState, AngularMomentumError> {
    let two_j1 = validate_j(j1)?;
    let two_j2 = validate_j(j2)?;
    let dim2 = dimension(two_j2);
    let expected = dimension(two_j1) * dim2;
    if product.dim() != expected {
        return Err(AngularMomentumError::DimensionMismatch {
            j: half((two_j1 + two_j2) as i32),
            expected,
            found: product.dim(),
        });
    }

    let layout = coupled_layout(two_j1, two_j2);
    let c = product.amplitudes();
    let coupled = product_to_coupled(two_j1, two_j2, &layout, |i1, i2| c[i1 * dim2 + i2]);
    let j_components = present_components(coupled.view(), &layout);
    let label = dominant_label(coupled.view(), &layout);
    let state = QuantumState::new(coupled).with_metadata(AngularMomentumMetadata::coupled(
        two_j1,
        two_j2,
        None,
        None,
        j_components,
    ));
    Ok(match label {
        Some(label) => state.with_label(&label),
        None => state,
    })
}
