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

//! Binary (symplectic) encoding of Pauli operators.
//!
//! Each term becomes a pair of bit vectors over `[0, n_bits)`: `X -> (1, 0)`, `Z -> (0, 1)`,
//! `Y -> (1, 1)` and the implicit identity `(0, 0)`.  Variables are not encoded: a symbolic term
//! contributes its numeric coefficient.

use std::collections::btree_map;

use itertools::{EitherOrBoth, Itertools};
use ndarray::Array2;
use num_complex::Complex64;

use super::{Pauli, PauliOperator, PauliString, TermKey};

/// The symplectic encoding of one term.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryVector {
    pub x: Vec<bool>,
    pub z: Vec<bool>,
    pub coeff: Complex64,
}

/// Iterator over the [BinaryVector]s of a [PauliOperator], created by
/// [PauliOperator::to_binary_vectors].  Every vector has the width of the operator it came from.
pub struct BinaryVectors<'a> {
    terms: btree_map::Iter<'a, TermKey, Complex64>,
    width: usize,
}

impl Iterator for BinaryVectors<'_> {
    type Item = BinaryVector;

    fn next(&mut self) -> Option<Self::Item> {
        let ((paulis, _), coeff) = self.terms.next()?;
        let mut x = vec![false; self.width];
        let mut z = vec![false; self.width];
        for (site, pauli) in paulis.iter() {
            x[site as usize] = pauli.has_x_component();
            z[site as usize] = pauli.has_z_component();
        }
        Some(BinaryVector {
            x,
            z,
            coeff: *coeff,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.terms.size_hint()
    }
}
impl ExactSizeIterator for BinaryVectors<'_> {}
impl ::std::iter::FusedIterator for BinaryVectors<'_> {}

impl PauliOperator {
    /// Encode each term, in iteration order, as `(x, z, coeff)` of width [n_bits][Self::n_bits].
    pub fn to_binary_vectors(&self) -> BinaryVectors<'_> {
        BinaryVectors {
            terms: self.terms.iter(),
            width: self.n_bits(),
        }
    }

    /// The same encoding as [to_binary_vectors][Self::to_binary_vectors], as `(x, z)` matrices
    /// with one row per term, and the coefficients.
    pub fn to_binary_matrix(&self) -> (Array2<bool>, Array2<bool>, Vec<Complex64>) {
        let shape = (self.n_terms(), self.n_bits());
        let mut x = Array2::from_elem(shape, false);
        let mut z = Array2::from_elem(shape, false);
        let mut coeffs = Vec::with_capacity(self.n_terms());
        for (row, ((paulis, _), coeff)) in self.terms.iter().enumerate() {
            for (site, pauli) in paulis.iter() {
                x[[row, site as usize]] = pauli.has_x_component();
                z[[row, site as usize]] = pauli.has_z_component();
            }
            coeffs.push(*coeff);
        }
        (x, z, coeffs)
    }

    /// Rebuild an operator from symplectic vectors.  Vectors of unequal length are padded with
    /// identity; the declared width is the longest vector seen.
    pub fn from_binary_vectors(vectors: impl IntoIterator<Item = BinaryVector>) -> PauliOperator {
        let mut out = PauliOperator::zero();
        let mut width = 0;
        for vector in vectors {
            width = width.max(vector.x.len()).max(vector.z.len());
            let paulis = vector
                .x
                .iter()
                .zip_longest(vector.z.iter())
                .enumerate()
                .filter_map(|(site, bits)| {
                    let (x, z) = match bits {
                        EitherOrBoth::Both(x, z) => (*x, *z),
                        EitherOrBoth::Left(x) => (*x, false),
                        EitherOrBoth::Right(z) => (false, *z),
                    };
                    Pauli::from_symplectic(x, z).map(|pauli| (site as u32, pauli))
                })
                .collect();
            out.accumulate(PauliString(paulis), vector.coeff);
        }
        out.prune();
        out.num_qubits = width as u32;
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use qobs_circuit::c64;

    #[test]
    fn vectors_are_padded_to_width() {
        let op: PauliOperator = "0.5 X0 Y2 - Z1".parse().unwrap();
        let vectors = op.with_num_qubits(4).to_binary_vectors().collect::<Vec<_>>();
        assert_eq!(
            vectors,
            vec![
                BinaryVector {
                    x: vec![true, false, true, false],
                    z: vec![false, false, true, false],
                    coeff: c64!(0.5, 0),
                },
                BinaryVector {
                    x: vec![false, false, false, false],
                    z: vec![false, true, false, false],
                    coeff: c64!(-1, 0),
                },
            ]
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let op: PauliOperator = "Y3 + X0 Z1".parse().unwrap();
        let first = op.to_binary_vectors().collect::<Vec<_>>();
        let second = op.to_binary_vectors().collect::<Vec<_>>();
        assert_eq!(first, second);
        let y = first.iter().find(|v| v.x[3]).unwrap();
        assert!(y.z[3]);
        assert_eq!(op.to_binary_vectors().len(), 2);
    }

    #[test]
    fn matrix_matches_vectors() {
        let op: PauliOperator = "X0 Z1 + (0,2) Y1 + 3".parse().unwrap();
        let (x, z, coeffs) = op.to_binary_matrix();
        assert_eq!(x.shape(), &[3, 2]);
        for (row, vector) in op.to_binary_vectors().enumerate() {
            assert_eq!(x.row(row).to_vec(), vector.x);
            assert_eq!(z.row(row).to_vec(), vector.z);
            assert_eq!(coeffs[row], vector.coeff);
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let op: PauliOperator = "0.5 X0 Y2 - Z1 + 2 I".parse().unwrap();
        let decoded = PauliOperator::from_binary_vectors(op.to_binary_vectors());
        assert_eq!(decoded.n_bits(), op.n_bits());
        assert!(decoded.is_close(&op, 1e-12));

        let ragged = PauliOperator::from_binary_vectors([BinaryVector {
            x: vec![true],
            z: vec![false, false, true],
            coeff: c64!(1, 0),
        }]);
        assert_eq!(ragged, "X0 Z2".parse::<PauliOperator>().unwrap().with_num_qubits(3));
    }
}
