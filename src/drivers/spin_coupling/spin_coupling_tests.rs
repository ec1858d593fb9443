use std::env;

use approx;

use crate::drivers::spin_coupling::{
    SpinCouplingDriver, SpinCouplingParams, SpinCouplingSummary, SpinDefinition,
};
use crate::drivers::QAngMomDriver;
use crate::io::read_qangmom_yaml;

#[test]
fn test_drivers_spin_coupling_params_builder() {
    let params = SpinCouplingParams::builder()
        .spins(&[SpinDefinition::new(0.5, 0.5), SpinDefinition::new(1.0, -1.0)])
        .build()
        .unwrap();
    assert_eq!(params.spins.len(), 2);
    assert!(params.write_history);
    assert!(!params.write_amplitudes);
    assert!(params.result_save_name.is_none());

    assert!(SpinCouplingParams::builder().spins(&[]).build().is_err());
    assert!(SpinCouplingParams::builder().build().is_err());
}

#[test]
fn test_drivers_spin_coupling_params_yaml_defaults() {
    let params: SpinCouplingParams = serde_yaml::from_str(
        "spins:\n  - j: 0.5\n    m: 0.5\n  - j: 0.5\n    m: -0.5\nwrite_amplitudes: true\n",
    )
    .unwrap();
    assert_eq!(params.spins[1], SpinDefinition::new(0.5, -0.5));
    assert!(params.write_history);
    assert!(params.write_amplitudes);
    assert!(params.result_save_name.is_none());
}

#[test]
fn test_drivers_spin_coupling_three_spin_halves() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = SpinCouplingParams::builder()
        .spins(&[
            SpinDefinition::new(0.5, 0.5),
            SpinDefinition::new(0.5, -0.5),
            SpinDefinition::new(0.5, 0.5),
        ])
        .write_amplitudes(true)
        .build()
        .unwrap();
    let mut driver = SpinCouplingDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    driver.run().unwrap();
    let result = driver.result().unwrap();
    let summary = result.summary();
    assert_eq!(summary.constituents.len(), 3);
    assert_eq!(summary.steps.len(), 2);
    assert_eq!(summary.dimension, 6);
    approx::assert_relative_eq!(summary.norm, 1.0, epsilon = 1e-10);
    approx::assert_relative_eq!(summary.dominant_j, 1.5);
    assert_eq!(summary.valid_intertwiners, vec![1.5, 0.5]);

    let output = result.to_string();
    assert!(output.contains("Coupling history"));
    assert!(output.contains("Final amplitudes"));
    assert!(output.contains("Valid intertwiners: J ∈ {3/2, 1/2}"));
}

#[test]
fn test_drivers_spin_coupling_single_spin() {
    let params = SpinCouplingParams::builder()
        .spins(&[SpinDefinition::new(2.0, 1.0)])
        .build()
        .unwrap();
    let mut driver = SpinCouplingDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    driver.run().unwrap();
    let summary = driver.result().unwrap().summary();
    assert!(summary.steps.is_empty());
    assert_eq!(summary.dimension, 5);
    assert_eq!(summary.valid_intertwiners, vec![2.0]);
    assert!(!driver.result().unwrap().to_string().contains("Coupling history"));
}

#[test]
fn test_drivers_spin_coupling_invalid_spin() {
    let params = SpinCouplingParams::builder()
        .spins(&[SpinDefinition::new(0.5, 0.5), SpinDefinition::new(1.0, 0.5)])
        .build()
        .unwrap();
    let mut driver = SpinCouplingDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_spin_coupling_save_summary() {
    let name = env::temp_dir().join(format!("qangmom_spin_coupling_{}", std::process::id()));
    let params = SpinCouplingParams::builder()
        .spins(&[
            SpinDefinition::new(1.0, 1.0),
            SpinDefinition::new(0.5, -0.5),
            SpinDefinition::new(1.5, 0.5),
        ])
        .result_save_name(Some(name.to_string_lossy().to_string()))
        .build()
        .unwrap();
    let mut driver = SpinCouplingDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    driver.run().unwrap();
    let summary = driver.result().unwrap().summary();

    let path = name.with_extension("yml");
    let read: SpinCouplingSummary = read_qangmom_yaml(&path).unwrap();
    assert_eq!(read.constituents, summary.constituents);
    assert_eq!(read.steps, summary.steps);
    assert_eq!(read.valid_intertwiners, summary.valid_intertwiners);
    approx::assert_relative_eq!(read.norm, summary.norm, epsilon = 1e-12);
    std::fs::remove_file(path).unwrap();
}
