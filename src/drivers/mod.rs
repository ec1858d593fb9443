//! Drivers to carry out QAngMom functionalities.

use anyhow;

pub mod spin_coupling;

// =================
// Trait definitions
// =================

/// Trait defining behaviours of `QAngMom` drivers.
pub trait QAngMomDriver {
    /// The type of the successful outcome when executing the driver.
    type Outcome;

    /// Executes the driver and stores the result internally.
    fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Returns the result of the driver execution.
    fn result(&self) -> Result<&Self::Outcome, anyhow::Error>;
}
