use approx;
use num_complex::Complex;

use qangmom::angmom::clebsch_gordan::clebsch_gordan;
use qangmom::angmom::coupling::{
    analyze, couple, extract_component, from_product_basis, to_product_basis,
};
use qangmom::angmom::eigenstate::{create_eigenstate, create_total_j_squared_operator};
use qangmom::angmom::multi_coupling::MultiSpinCoupler;
use qangmom::angmom::wigner::{wigner_3j, wigner_6j};
use qangmom::drivers::spin_coupling::{SpinCouplingDriver, SpinCouplingParams};
use qangmom::drivers::QAngMomDriver;

#[test]
fn test_integration_two_spin_halves_singlet_triplet() {
    let up = create_eigenstate(0.5, 0.5).unwrap();
    let down = create_eigenstate(0.5, -0.5).unwrap();
    let composite = couple(&up, 0.5, &down, 0.5).unwrap();
    assert_eq!(composite.dim(), 4);

    let amps = composite.amplitudes();
    let s = 0.5f64.sqrt();
    approx::assert_relative_eq!(amps[1].re, s, epsilon = 1e-12);
    approx::assert_relative_eq!(amps[3].re, s, epsilon = 1e-12);
    approx::assert_relative_eq!(amps[0].norm(), 0.0, epsilon = 1e-12);
    approx::assert_relative_eq!(amps[2].norm(), 0.0, epsilon = 1e-12);

    let analysis = analyze(&composite).unwrap();
    assert!(!analysis.is_pure);
    approx::assert_relative_eq!(analysis.dominant_j(), 1.0);

    let triplet = extract_component(&composite, 1.0).unwrap().unwrap();
    let j2 = create_total_j_squared_operator(1.0).unwrap();
    approx::assert_relative_eq!(j2.expectation(&triplet).unwrap().re, 2.0, epsilon = 1e-12);
    let singlet = extract_component(&composite, 0.0).unwrap().unwrap();
    assert_eq!(singlet.dim(), 1);
    assert!(extract_component(&composite, 2.0).unwrap().is_none());
}

#[test]
fn test_integration_product_basis_round_trip() {
    let a = create_eigenstate(1.0, 0.0).unwrap();
    let b = create_eigenstate(0.5, 0.5).unwrap();
    let composite = couple(&a, 1.0, &b, 0.5).unwrap();
    let product = to_product_basis(&composite, 1.0, 0.5).unwrap();
    let expected = a.tensor_product(&b);
    product
        .amplitudes()
        .iter()
        .zip(expected.amplitudes().iter())
        .for_each(|(x, y)| approx::assert_relative_eq!((x - y).norm(), 0.0, epsilon = 1e-12));

    let back = from_product_basis(&product, 1.0, 0.5).unwrap();
    back.amplitudes()
        .iter()
        .zip(composite.amplitudes().iter())
        .for_each(|(x, y)| approx::assert_relative_eq!((x - y).norm(), 0.0, epsilon = 1e-12));
}

#[test]
fn test_integration_multi_spin_coupling() {
    let mut coupler = MultiSpinCoupler::new(0.5, 0.5).unwrap();
    coupler
        .add_spin(0.5, 0.5)
        .unwrap()
        .add_spin(0.5, 0.5)
        .unwrap()
        .add_spin(0.5, 0.5)
        .unwrap();
    assert_eq!(coupler.constituents().len(), 4);
    assert_eq!(coupler.steps().len(), 3);
    approx::assert_relative_eq!(coupler.norm(), 1.0, epsilon = 1e-12);

    // All spins aligned: only the stretched J = 2, M = 2 state survives.
    let amp = coupler.state().amplitudes()[0];
    approx::assert_relative_eq!((amp - Complex::new(1.0, 0.0)).norm(), 0.0, epsilon = 1e-12);
    let analysis = analyze(coupler.state()).unwrap();
    assert!(analysis.is_pure);
    approx::assert_relative_eq!(analysis.dominant_j(), 2.0);
}

#[test]
fn test_integration_spin_coupling_driver_from_yaml() {
    let yaml = r#"
spins:
  - j: 0.5
    m: 0.5
  - j: 0.5
    m: -0.5
  - j: 0.5
    m: 0.5
write_amplitudes: true
"#;
    let params: SpinCouplingParams = serde_yaml::from_str(yaml).unwrap();
    let mut driver = SpinCouplingDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_ok());
    let result = driver.result().unwrap();
    assert_eq!(result.coupler.dim(), 6);
    assert_eq!(result.coupler.valid_intertwiners(), vec![1.5, 0.5]);
    let summary = result.summary();
    approx::assert_relative_eq!(summary.norm, 1.0, epsilon = 1e-12);
}

#[test]
fn test_integration_coefficient_spot_values() {
    approx::assert_relative_eq!(
        clebsch_gordan(0.5, 0.5, 0.5, -0.5, 0.0, 0.0),
        0.5f64.sqrt(),
        epsilon = 1e-12
    );
    approx::assert_relative_eq!(
        clebsch_gordan(1.0, 1.0, 1.0, -1.0, 0.0, 0.0),
        (1.0f64 / 3.0).sqrt(),
        epsilon = 1e-12
    );
    approx::assert_relative_eq!(
        wigner_3j(0.5, 0.5, 1.0, 0.5, -0.5, 0.0),
        (1.0f64 / 6.0).sqrt(),
        epsilon = 1e-12
    );
    approx::assert_relative_eq!(
        wigner_6j(0.5, 0.5, 1.0, 0.5, 0.5, 0.0),
        0.5,
        epsilon = 1e-12
    );
}
