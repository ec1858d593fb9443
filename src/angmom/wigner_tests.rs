use approx;
use proptest::prelude::*;

use crate::angmom::clebsch_gordan::clebsch_gordan;
use crate::angmom::wigner::{
    racah_w, wigner_3j, wigner_6j, wigner_9j, Wigner3jSymbol, Wigner3jSymmetry,
};
use crate::angmom::{half, twice_j_couplings, twice_m_values};

#[test]
fn test_wigner_3j_known_values() {
    approx::assert_relative_eq!(
        wigner_3j(1.0, 1.0, 2.0, 0.0, 0.0, 0.0),
        (2.0f64 / 15.0).sqrt(),
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_3j(0.5, 0.5, 1.0, 0.5, -0.5, 0.0),
        1.0 / 6.0f64.sqrt(),
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_3j(0.5, 0.5, 0.0, 0.5, -0.5, 0.0),
        std::f64::consts::FRAC_1_SQRT_2,
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_3j(1.0, 1.0, 0.0, 1.0, -1.0, 0.0),
        1.0 / 3.0f64.sqrt(),
        epsilon = 1e-14
    );
    // (j j 0; m -m 0) = (-1)^(j-m)/sqrt(2j+1)
    approx::assert_relative_eq!(
        wigner_3j(1.5, 1.5, 0.0, 0.5, -0.5, 0.0),
        -0.5,
        epsilon = 1e-14
    );
}

#[test]
fn test_wigner_3j_selection_rules() {
    assert_eq!(wigner_3j(1.0, 1.0, 2.0, 1.0, 0.0, 0.0), 0.0);
    assert_eq!(wigner_3j(1.0, 1.0, 3.0, 0.0, 0.0, 0.0), 0.0);
    assert_eq!(wigner_3j(0.5, 0.5, 0.5, 0.5, -0.5, 0.0), 0.0);
    assert_eq!(wigner_3j(1.0, 0.3, 1.0, 0.0, 0.0, 0.0), 0.0);
    // Odd j1 + j2 + j3 with all m = 0.
    assert_eq!(wigner_3j(1.0, 1.0, 1.0, 0.0, 0.0, 0.0), 0.0);
}

#[test]
fn test_wigner_3j_relation_to_clebsch_gordan() {
    let (j1, j2, j3) = (1.5, 1.0, 1.5);
    for two_m1 in twice_m_values(3) {
        for two_m2 in twice_m_values(2) {
            let (m1, m2) = (half(two_m1), half(two_m2));
            let m = m1 + m2;
            if m.abs() > j3 {
                continue;
            }
            let sign = if ((j1 - j2 + m) as i32).rem_euclid(2) == 0 {
                1.0
            } else {
                -1.0
            };
            approx::assert_relative_eq!(
                clebsch_gordan(j1, m1, j2, m2, j3, m),
                sign * (2.0 * j3 + 1.0).sqrt() * wigner_3j(j1, j2, j3, m1, m2, -m),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn test_wigner_3j_orthogonality() {
    let (two_j1, two_j2): (u32, u32) = (3, 2);
    let js = twice_j_couplings(two_j1, two_j2).collect::<Vec<_>>();
    for &two_j3 in js.iter() {
        for &two_j3dash in js.iter() {
            let two_m3 = 1;
            let sum: f64 = twice_m_values(two_j1)
                .flat_map(|two_m1| twice_m_values(two_j2).map(move |two_m2| (two_m1, two_m2)))
                .map(|(two_m1, two_m2)| {
                    let args = |two_j3: u32| {
                        wigner_3j(
                            half(two_j1 as i32),
                            half(two_j2 as i32),
                            half(two_j3 as i32),
                            half(two_m1),
                            half(two_m2),
                            half(two_m3),
                        )
                    };
                    f64::from(two_j3 + 1) * args(two_j3) * args(two_j3dash)
                })
                .sum();
            let expected = if two_j3 == two_j3dash { 1.0 } else { 0.0 };
            approx::assert_abs_diff_eq!(sum, expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_wigner_3j_symmetry_operations() {
    let symmetries = Wigner3jSymmetry::all();
    assert_eq!(symmetries.len(), 12);
    assert_eq!(symmetries[0].permutation, [0, 1, 2]);
    assert!(!symmetries[0].reverse_signs);
    assert_eq!(symmetries.iter().filter(|s| s.is_odd()).count(), 6);

    let symbol = Wigner3jSymbol::new(1.0, 1.5, 0.5, -1.0, 0.5, 0.5).unwrap();
    let value = symbol.value();
    assert!(value.abs() > 1e-3);
    for symmetry in symmetries.iter() {
        approx::assert_relative_eq!(symbol.value_via(symmetry), value, epsilon = 1e-12);
    }

    // Odd permutations and sign reversal pick up (-1)^(j1+j2+j3).
    let odd = Wigner3jSymbol::new(1.0, 1.0, 1.0, 1.0, -1.0, 0.0).unwrap();
    let swap = Wigner3jSymmetry {
        permutation: [1, 0, 2],
        reverse_signs: false,
    };
    approx::assert_relative_eq!(
        odd.transform(&swap).value(),
        -odd.value(),
        epsilon = 1e-14
    );
    let cyclic = Wigner3jSymmetry {
        permutation: [1, 2, 0],
        reverse_signs: false,
    };
    approx::assert_relative_eq!(
        odd.transform(&cyclic).value(),
        odd.value(),
        epsilon = 1e-14
    );
    assert!(Wigner3jSymbol::new(1.0, 1.0, 1.0, 0.5, 0.0, 0.0).is_err());
}

proptest! {
    #[test]
    fn test_wigner_3j_symmetry_invariance(
        two_j1 in 0u32..7,
        two_j2 in 0u32..7,
        raw_j3 in 0u32..8,
        raw_m1 in 0u32..8,
        raw_m2 in 0u32..8,
    ) {
        let js = twice_j_couplings(two_j1, two_j2).collect::<Vec<_>>();
        let two_j3 = js[raw_j3 as usize % js.len()];
        let two_m1 = two_j1 as i32 - 2 * (raw_m1 % (two_j1 + 1)) as i32;
        let two_m2 = two_j2 as i32 - 2 * (raw_m2 % (two_j2 + 1)) as i32;
        let two_m3 = -(two_m1 + two_m2);
        prop_assume!(two_m3.abs() <= two_j3 as i32);
        let symbol = Wigner3jSymbol::new(
            half(two_j1 as i32), half(two_j2 as i32), half(two_j3 as i32),
            half(two_m1), half(two_m2), half(two_m3),
        ).unwrap();
        let value = symbol.value();
        for symmetry in Wigner3jSymmetry::all() {
            prop_assert!((symbol.value_via(&symmetry) - value).abs() < 1e-12);
        }
    }
}

#[test]
fn test_wigner_6j_known_values() {
    approx::assert_relative_eq!(
        wigner_6j(0.5, 0.5, 1.0, 0.5, 0.5, 0.0),
        0.5,
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_6j(1.0, 1.0, 2.0, 1.0, 1.0, 0.0),
        1.0 / 3.0,
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_6j(1.0, 1.0, 1.0, 1.0, 1.0, 1.0),
        1.0 / 6.0,
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(
        wigner_6j(0.5, 0.5, 0.0, 0.5, 0.5, 1.0),
        0.5,
        epsilon = 1e-14
    );
    // {a b c; b a 0} = (-1)^(a+b+c)/sqrt((2a+1)(2b+1))
    for (a, b, c) in [(1.5, 1.0, 0.5), (2.0, 1.0, 2.0), (2.5, 1.5, 3.0)] {
        let sign = if ((a + b + c) as i32) % 2 == 0 { 1.0 } else { -1.0 };
        approx::assert_relative_eq!(
            wigner_6j(a, b, c, b, a, 0.0),
            sign / ((2.0 * a + 1.0) * (2.0 * b + 1.0)).sqrt(),
            epsilon = 1e-13
        );
    }
}

#[test]
fn test_wigner_6j_triangle_violations() {
    assert_eq!(wigner_6j(0.5, 0.5, 2.0, 0.5, 0.5, 0.0), 0.0);
    assert_eq!(wigner_6j(1.0, 1.0, 1.0, 1.0, 1.0, 3.0), 0.0);
    assert_eq!(wigner_6j(1.0, 1.0, 1.0, 0.5, 1.0, 1.0), 0.0);
    assert_eq!(wigner_6j(1.0, -1.0, 1.0, 1.0, 1.0, 1.0), 0.0);
}

#[test]
fn test_wigner_6j_tetrahedral_symmetry() {
    let (a, b, c, d, e, f) = (1.5, 2.0, 2.5, 1.0, 1.5, 2.0);
    let value = wigner_6j(a, b, c, d, e, f);
    assert!(value.abs() > 1e-3);
    for permuted in [
        wigner_6j(b, a, c, e, d, f),
        wigner_6j(a, c, b, d, f, e),
        wigner_6j(c, b, a, f, e, d),
        wigner_6j(d, e, c, a, b, f),
        wigner_6j(a, e, f, d, b, c),
    ] {
        approx::assert_relative_eq!(permuted, value, epsilon = 1e-13);
    }
}

fn assert_6j_orthogonality(j1: f64, j2: f64, j4: f64, j5: f64, thresh: f64) {
    let j6s = (0..=40)
        .map(half)
        .filter(|&j6| {
            (0..=40).any(|two_x| wigner_6j(j1, j2, half(two_x), j4, j5, j6) != 0.0)
        })
        .collect::<Vec<_>>();
    assert!(!j6s.is_empty());
    for &j6 in j6s.iter() {
        for &j6dash in j6s.iter() {
            let sum: f64 = (0..=40)
                .map(|two_x| {
                    let x = half(two_x);
                    (2.0 * x + 1.0)
                        * wigner_6j(j1, j2, x, j4, j5, j6)
                        * wigner_6j(j1, j2, x, j4, j5, j6dash)
                })
                .sum();
            let expected = if j6 == j6dash {
                1.0 / (2.0 * j6 + 1.0)
            } else {
                0.0
            };
            approx::assert_abs_diff_eq!(sum, expected, epsilon = thresh);
        }
    }
}

#[test]
fn test_wigner_6j_orthogonality() {
    assert_6j_orthogonality(1.0, 1.0, 1.0, 1.0, 1e-12);
    assert_6j_orthogonality(1.5, 1.0, 0.5, 2.0, 1e-12);
    assert_6j_orthogonality(0.5, 0.5, 0.5, 0.5, 1e-12);
}

#[test]
fn test_wigner_6j_orthogonality_larger_j() {
    assert_6j_orthogonality(8.0, 7.5, 6.0, 8.5, 1e-9);
}

#[test]
fn test_racah_w() {
    approx::assert_relative_eq!(
        racah_w(1.0, 1.0, 1.0, 1.0, 1.0, 1.0),
        1.0 / 6.0,
        epsilon = 1e-14
    );
    let (a, b, c, d, e, f) = (1.0, 0.5, 1.0, 0.5, 0.5, 1.0);
    approx::assert_relative_eq!(racah_w(a, b, c, d, e, f), 1.0 / 3.0, epsilon = 1e-14);
    let (a, b, c, d, e, f) = (1.0, 1.0, 1.0, 0.0, 1.0, 1.0);
    approx::assert_relative_eq!(
        racah_w(a, b, c, d, e, f),
        -wigner_6j(a, b, e, d, c, f),
        epsilon = 1e-14
    );
    assert_eq!(racah_w(1.0, 1.0, 1.0, 1.0, 3.0, 1.0), 0.0);
}

#[test]
fn test_wigner_9j_stub() {
    assert_eq!(
        wigner_9j(0.5, 0.5, 1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 0.0),
        0.0
    );
}
