//! Command-line interface of the `qangmom` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::auxiliary::format::qangmom_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted QAngMom heading to the `qangmom-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    qangmom_output!("╭───────────────────────────────────────────────────────────────────────────╮");
    qangmom_output!("│                                                                           │");
    qangmom_output!("│   QAngMom: angular-momentum coupling, Clebsch–Gordan coefficients and     │");
    qangmom_output!("│            Wigner 3j/6j symbols                                           │");
    qangmom_output!("│                                                                           │");
    qangmom_output!("│{:>74} │", version);
    qangmom_output!("╰───────────────────────────────────────────────────────────────────────────╯");
    qangmom_output!("");
}

/// Command-line arguments of the `qangmom` binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// A YAML configuration file describing the calculations to be run.
    #[arg(short, long)]
    pub config: PathBuf,

    /// An optional file to which the output is also written.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increases the verbosity of the diagnostic log on standard error. May be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
