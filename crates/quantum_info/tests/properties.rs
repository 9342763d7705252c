// This code is part of Qobs.
//
// (C) Copyright Qobs Developers 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Algebraic properties every operator built by parsing or arithmetic should satisfy.

use approx::assert_abs_diff_eq;
use num_complex::Complex64;

use qobs_circuit::c64;
use qobs_quantum_info::{
    parse_bitstring, FermionOperator, Pauli, PauliOperator, PauliString, PauliTerm, Side,
};

const TOL: f64 = 1e-10;

fn op(text: &str) -> PauliOperator {
    text.parse().unwrap()
}

fn samples() -> Vec<PauliOperator> {
    let a = op("0.5 X0 Z1 - (0,1.2) Y2 + 3");
    let b = op("Z0 Z1 + 0.25 X2 - 1e-3 Y0 Y1 Y2");
    let c = op("(1.5,-0.5) Y1 - 2 X0");
    vec![
        a.clone(),
        b.clone(),
        c.clone(),
        &a * &b,
        &(&b - &c) * Complex64::new(0.3, 0.7),
        &(&a + &c) * &(&b * &c),
        PauliOperator::zero(),
        PauliOperator::identity(),
    ]
}

#[test]
fn display_round_trips() {
    for sample in samples() {
        let text = sample.to_string();
        let back: PauliOperator = text.parse().unwrap();
        assert!(back.is_close(&sample, TOL), "{text}");
    }
    let fermion: FermionOperator = "(0.5,1) 3^ 2^ 1 0 - 0.25 2^ 1 + 4.0".parse().unwrap();
    let back: FermionOperator = fermion.to_string().parse().unwrap();
    assert!(back.is_close(&fermion, TOL));
    let zero = FermionOperator::zero();
    assert!(zero.to_string().parse::<FermionOperator>().unwrap().is_zero());
}

#[test]
fn addition_commutes_and_associates() {
    let ops = samples();
    for a in &ops {
        for b in &ops {
            assert!((a + b).is_close(&(b + a), TOL));
            for c in &ops {
                assert!((&(a + b) + c).is_close(&(a + &(b + c)), TOL));
            }
        }
    }
}

#[test]
fn composition_associates() {
    let ops = samples();
    for a in &ops {
        for b in &ops {
            for c in &ops[..3] {
                assert!((&(a * b) * c).is_close(&(a * &(b * c)), 1e-8));
            }
        }
    }
}

#[test]
fn merging_sums_coefficients() {
    let merged = op("0.25 X0 Y3") + op("(0.5,1) Y3 X0");
    assert_eq!(merged.n_terms(), 1);
    let key = PauliString::from_sites([(3, Pauli::Y), (0, Pauli::X)]).unwrap();
    assert_abs_diff_eq!(merged.get(&key).unwrap(), c64!(0.75, 1));

    let cancelled = op("0.25 X0 Y3") + op("-0.25 Y3 X0");
    assert_eq!(cancelled.n_terms(), 0);
    let below_tolerance = op("X0") - op("0.9999999999999 X0");
    assert_eq!(below_tolerance.n_terms(), 0);
}

#[test]
fn scalar_identities() {
    for sample in samples() {
        assert!((&sample * 1.0).is_close(&sample, TOL));
        assert!((&sample * c64!(0, 0)).is_zero());
        assert!((&sample - &sample).is_zero());
        assert!(sample.adjoint().adjoint().is_close(&sample, TOL));
    }
}

#[test]
fn single_qubit_products() {
    let i = c64!(0, 1);
    let cases = [
        ("X0", "X0", PauliOperator::identity()),
        ("Y0", "Y0", PauliOperator::identity()),
        ("Z0", "Z0", PauliOperator::identity()),
        ("X0", "Y0", op("Z0") * i),
        ("Y0", "Z0", op("X0") * i),
        ("Z0", "X0", op("Y0") * i),
        ("Y0", "X0", op("Z0") * -i),
        ("Z0", "Y0", op("X0") * -i),
        ("X0", "Z0", op("Y0") * -i),
    ];
    for (left, right, expected) in cases {
        assert!((op(left) * op(right)).is_close(&expected, TOL), "{left} * {right}");
    }
}

#[test]
fn commutation_rules() {
    assert!(op("X0").commutes(&op("Y1")));
    assert!(op("Z3").commutes(&op("X0")));
    assert!(!op("X0").commutes(&op("Z0")));
    assert!(op("X0 Z1").commutes(&op("Z0 X1")));
    let a = PauliTerm::new([(0, Pauli::X), (1, Pauli::Y)], c64!(1, 0)).unwrap();
    let b = PauliTerm::new([(1, Pauli::Z), (2, Pauli::Y)], c64!(1, 0)).unwrap();
    assert!(!a.commutes(&b));
    // Commuting terms satisfy AB = BA as operators.
    let (x, y) = (op("X0 Z1"), op("Z0 X1"));
    assert!((&x * &y).is_close(&(&y * &x), TOL));
}

#[test]
fn symplectic_encoding() {
    let sample = op("Y2 + 0.5 X0 Z1").with_num_qubits(4);
    let first = sample.to_binary_vectors().collect::<Vec<_>>();
    let second = sample.to_binary_vectors().collect::<Vec<_>>();
    assert_eq!(first, second);
    for vector in &first {
        assert_eq!(vector.x.len(), 4);
        assert_eq!(vector.z.len(), 4);
    }
    let y = first.iter().find(|vector| vector.coeff == c64!(1, 0)).unwrap();
    assert!(y.x[2] && y.z[2]);
    assert_eq!(y.x.iter().filter(|bit| **bit).count(), 1);
}

#[test]
fn basis_action() {
    let z = PauliTerm::new([(0, Pauli::Z)], c64!(1, 0)).unwrap();
    let x = PauliTerm::new([(0, Pauli::X)], c64!(1, 0)).unwrap();
    let zero = parse_bitstring("0").unwrap();
    let one = parse_bitstring("1").unwrap();
    assert_eq!(z.act(&zero, Side::Ket).unwrap(), (zero.clone(), c64!(1, 0)));
    assert_eq!(z.act(&one, Side::Ket).unwrap(), (one.clone(), c64!(-1, 0)));
    assert_eq!(x.act(&zero, Side::Ket).unwrap(), (one.clone(), c64!(1, 0)));
    assert_eq!(x.act(&one, Side::Bra).unwrap(), (zero, c64!(1, 0)));
}

#[test]
fn squaring_a_pauli_string_gives_identity() {
    let square = op("1.0 X0 X1") * op("1.0 X0 X1");
    assert_eq!(square.n_terms(), 1);
    assert_eq!(square.n_bits(), 0);
    assert_abs_diff_eq!(square.identity_coefficient(), c64!(1, 0));
    assert!(square.iter().all(|term| term.paulis.is_identity()));
}

#[test]
fn ir_round_trip() {
    for sample in samples() {
        let back = PauliOperator::from_ir(&sample.to_ir()).unwrap();
        assert!(back.is_close(&sample, TOL));
    }
}

#[test]
fn jordan_wigner_preserves_products() {
    let a: FermionOperator = "(0.5,0.5) 1^ 0 - 2.0 2^ 2 + 0.1".parse().unwrap();
    let b: FermionOperator = "0^ 1 + 0.5 3^ 1^ 2 0".parse().unwrap();
    let left = (&a * &b).jordan_wigner();
    let right = &a.jordan_wigner() * &b.jordan_wigner();
    assert!(left.is_close(&right, TOL));
    let sum = (&a + &b).jordan_wigner();
    assert!(sum.is_close(&(&a.jordan_wigner() + &b.jordan_wigner()), TOL));
}
