//! YAML input describing QAngMom calculations.

use anyhow::{self, format_err};
use serde::{Deserialize, Serialize};

use crate::drivers::spin_coupling::{SpinCouplingDriver, SpinCouplingParams};
use crate::drivers::QAngMomDriver;
use crate::interfaces::InputHandle;


/// A structure containing `QAngMom` input parameters which can be serialised into and
/// deserialised from a YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Input {
    /// Parameters for multi-spin coupling. If `None`, no multi-spin coupling will be
    /// performed.
    ///
    /// # Default
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub spin_coupling: Option<SpinCouplingParams>,
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        let params = self
            .spin_coupling
            .as_ref()
            .ok_or_else(|| format_err!("No calculations have been specified in the input."))?;
        let mut driver = SpinCouplingDriver::builder()
            .parameters(params)
            .build()
            .map_err(|err| format_err!(err))?;
        driver.run()
    }
}
