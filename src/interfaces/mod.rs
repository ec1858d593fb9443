//! Interfaces between QAngMom and its users.

pub mod cli;
pub mod input;

/// Trait for handling a section of the input.
pub trait InputHandle {
    /// Handles the input section and runs appropriate calculations.
    fn handle(&self) -> Result<(), anyhow::Error>;
}
