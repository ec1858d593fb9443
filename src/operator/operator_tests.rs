use approx;
use ndarray::array;
use num_complex::Complex;

use crate::operator::Operator;
use crate::state::QuantumState;

type C128 = Complex<f64>;

fn c(re: f64, im: f64) -> C128 {
    C128::new(re, im)
}

#[test]
fn test_operator_rejects_non_square() {
    assert!(Operator::new(ndarray::Array2::<C128>::zeros((2, 3))).is_err());
}

#[test]
fn test_operator_apply() {
    let op = Operator::new(array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
        .unwrap();
    let s = QuantumState::basis(2, 0).unwrap();
    let t = op.apply(&s).unwrap();
    assert_eq!(t, QuantumState::basis(2, 1).unwrap());
    assert!(op.apply(&QuantumState::zeros(3)).is_err());
}

#[test]
fn test_operator_compose_adjoint() {
    let a = Operator::new(array![[c(1.0, 0.0), c(0.0, 2.0)], [c(0.0, 0.0), c(3.0, 0.0)]])
        .unwrap();
    let b = Operator::new(array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
        .unwrap();
    let ab = a.compose(&b).unwrap();
    assert_eq!(
        ab.matrix(),
        &array![[c(0.0, 2.0), c(1.0, 0.0)], [c(3.0, 0.0), c(0.0, 0.0)]]
    );
    let ad = a.adjoint();
    assert_eq!(
        ad.matrix(),
        &array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, -2.0), c(3.0, 0.0)]]
    );
    assert!(!a.is_hermitian(1e-12));
    assert!(b.is_hermitian(1e-12));
    assert!(a.compose(&Operator::identity(3)).is_err());
}

#[test]
fn test_operator_commutator_of_pauli_matrices() {
    let sx = Operator::new(array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
        .unwrap();
    let sy = Operator::new(array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]])
        .unwrap();
    let sz = Operator::new(array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]])
        .unwrap();
    let comm = sx.commutator(&sy).unwrap();
    let expected = sz.scale(c(0.0, 2.0));
    for (x, y) in comm.matrix().iter().zip(expected.matrix().iter()) {
        approx::assert_abs_diff_eq!((x - y).norm(), 0.0, epsilon = 1e-14);
    }
}

#[test]
fn test_operator_expm_diagonal() {
    let op = Operator::new(array![[c(2.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, -3.0)]])
        .unwrap();
    let e = op.expm();
    approx::assert_relative_eq!(e.matrix()[(0, 0)].re, 2f64.exp(), max_relative = 1e-12);
    approx::assert_abs_diff_eq!(e.matrix()[(0, 1)].norm(), 0.0, epsilon = 1e-14);
    approx::assert_relative_eq!(e.matrix()[(1, 1)].re, (-3f64).cos(), epsilon = 1e-12);
    approx::assert_relative_eq!(e.matrix()[(1, 1)].im, (-3f64).sin(), epsilon = 1e-12);
}

#[test]
fn test_operator_expm_rotation_generator() {
    // exp(θ [[0, -1], [1, 0]]) is a rotation by θ.
    let theta = 2.7;
    let op = Operator::new(array![
        [c(0.0, 0.0), c(-theta, 0.0)],
        [c(theta, 0.0), c(0.0, 0.0)]
    ])
    .unwrap();
    let e = op.expm();
    approx::assert_relative_eq!(e.matrix()[(0, 0)].re, theta.cos(), epsilon = 1e-12);
    approx::assert_relative_eq!(e.matrix()[(0, 1)].re, -theta.sin(), epsilon = 1e-12);
    approx::assert_relative_eq!(e.matrix()[(1, 0)].re, theta.sin(), epsilon = 1e-12);
    approx::assert_relative_eq!(e.matrix()[(1, 1)].re, theta.cos(), epsilon = 1e-12);
}

#[test]
fn test_operator_expectation() {
    let sz = Operator::new(array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]])
        .unwrap();
    let s = QuantumState::new(array![c(0.6, 0.0), c(0.0, 0.8)]);
    let ev = sz.expectation(&s).unwrap();
    approx::assert_relative_eq!(ev.re, 0.36 - 0.64, epsilon = 1e-14);
    approx::assert_abs_diff_eq!(ev.im, 0.0, epsilon = 1e-14);
}
