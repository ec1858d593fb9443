use itertools::Itertools;

use crate::angmom::{
    basis_index, dimension, half, is_valid_twice_m, m_from_index, twice_j, twice_j_couplings,
    twice_m, twice_m_values, validate_j, validate_jm, AngularMomentumError,
};

#[test]
fn test_angmom_twice_j_validation() {
    assert_eq!(twice_j(0.0), Some(0));
    assert_eq!(twice_j(0.5), Some(1));
    assert_eq!(twice_j(3.5), Some(7));
    assert_eq!(twice_j(2.0 + 1e-12), Some(4));
    assert_eq!(twice_j(-0.5), None);
    assert_eq!(twice_j(0.3), None);
    assert_eq!(twice_j(f64::NAN), None);
    assert_eq!(twice_j(f64::INFINITY), None);
    assert!(matches!(validate_j(1.25), Err(AngularMomentumError::InvalidJ(_))));
}

#[test]
fn test_angmom_twice_m_membership() {
    // m must share the parity of j, not just lie in range.
    assert_eq!(twice_m(2, 0.0), Some(0));
    assert_eq!(twice_m(2, 0.5), None);
    assert_eq!(twice_m(1, 0.5), Some(1));
    assert_eq!(twice_m(1, 0.0), None);
    assert_eq!(twice_m(1, 1.5), None);
    assert!(is_valid_twice_m(3, -3));
    assert!(!is_valid_twice_m(3, -5));
    assert!(matches!(
        validate_jm(1.0, 0.5),
        Err(AngularMomentumError::InvalidM { .. })
    ));
    assert_eq!(validate_jm(1.5, -0.5), Ok((3, -1)));
}

#[test]
fn test_angmom_basis_index_convention() {
    // j = 1/2: m = 1/2 -> 0, m = -1/2 -> 1
    assert_eq!(basis_index(1, 1), 0);
    assert_eq!(basis_index(1, -1), 1);
    // j = 1: m = 1, 0, -1 -> 0, 1, 2
    assert_eq!(basis_index(2, 2), 0);
    assert_eq!(basis_index(2, 0), 1);
    assert_eq!(basis_index(2, -2), 2);
    for two_j in 0..8 {
        assert_eq!(twice_m_values(two_j).count(), dimension(two_j));
        for (index, two_m) in twice_m_values(two_j).enumerate() {
            assert_eq!(basis_index(two_j, two_m), index);
            assert_eq!(m_from_index(two_j, index), two_m);
            // dim - 1 - (j + m)
            let alternative = dimension(two_j) as i32 - 1 - (two_j as i32 + two_m) / 2;
            assert_eq!(index as i32, alternative);
        }
    }
}

#[test]
fn test_angmom_triangle_range_descending() {
    assert_eq!(twice_j_couplings(1, 1).collect_vec(), vec![2, 0]);
    assert_eq!(twice_j_couplings(2, 1).collect_vec(), vec![3, 1]);
    assert_eq!(twice_j_couplings(4, 2).collect_vec(), vec![6, 4, 2]);
    assert_eq!(twice_j_couplings(0, 3).collect_vec(), vec![3]);
    let total: usize = twice_j_couplings(3, 4).map(dimension).sum();
    assert_eq!(total, dimension(3) * dimension(4));
}

#[test]
fn test_angmom_half() {
    assert_eq!(half(3), 1.5);
    assert_eq!(half(-4), -2.0);
}
