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

//! Action of Pauli terms on computational-basis states.
//!
//! The ket action is the column action `P|b⟩`, so `Y|0⟩ = i|1⟩` and `Y|1⟩ = -i|0⟩`.  The bra
//! action is the row action `⟨b|P`, so `⟨0|Y = -i⟨1|` and `⟨1|Y = i⟨0|`.  `X` and `Z` act the
//! same way on both sides.  The term coefficient multiplies the result unconjugated on both sides.
//! Variables on a symbolic term are not applied; only the numeric coefficient is.

use num_complex::Complex64;

use qobs_circuit::util::mul_i_pow;

use super::{Pauli, PauliOperator, PauliTerm, PauliTermView};
use crate::error::ObservableError;

/// Which side of the operator the basis state is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Ket,
    Bra,
}

impl PauliTermView<'_> {
    /// Apply the term to a basis state, giving the new basis state and its amplitude.
    ///
    /// Bit `k` of `state` is the value of site `k`.  A term acting on a site at or past the end
    /// of `state` is an error.
    pub fn act(&self, state: &[bool], side: Side) -> Result<(Vec<bool>, Complex64), ObservableError> {
        let mut out = state.to_vec();
        let mut phase = 0u8;
        for (site, pauli) in self.paulis.iter() {
            let Some(bit) = out.get_mut(site as usize) else {
                return Err(ObservableError::BasisState {
                    site,
                    len: state.len(),
                });
            };
            phase += match (pauli, side, *bit) {
                (Pauli::X, _, _) => 0,
                (Pauli::Z, _, false) => 0,
                (Pauli::Z, _, true) => 2,
                (Pauli::Y, Side::Ket, false) | (Pauli::Y, Side::Bra, true) => 1,
                (Pauli::Y, Side::Ket, true) | (Pauli::Y, Side::Bra, false) => 3,
            };
            phase %= 4;
            if pauli.has_x_component() {
                *bit = !*bit;
            }
        }
        Ok((out, mul_i_pow(self.coeff, phase)))
    }
}

impl PauliTerm {
    pub fn act(&self, state: &[bool], side: Side) -> Result<(Vec<bool>, Complex64), ObservableError> {
        self.view().act(state, side)
    }
}

impl PauliOperator {
    /// Apply every term to the ket `|state⟩`.  The output has one `(state, amplitude)` pair per
    /// term, in iteration order; pairs are not merged.
    pub fn compute_action_on_ket(
        &self,
        state: &[bool],
    ) -> Result<Vec<(Vec<bool>, Complex64)>, ObservableError> {
        self.iter().map(|term| term.act(state, Side::Ket)).collect()
    }

    /// Apply every term to the bra `⟨state|`.  See [compute_action_on_ket][Self::compute_action_on_ket].
    pub fn compute_action_on_bra(
        &self,
        state: &[bool],
    ) -> Result<Vec<(Vec<bool>, Complex64)>, ObservableError> {
        self.iter().map(|term| term.act(state, Side::Bra)).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::parse_bitstring;
    use qobs_circuit::c64;
    use qobs_circuit::util::{IM, M_IM};

    fn term(text: &str) -> PauliTerm {
        let op: PauliOperator = text.parse().unwrap();
        let term = op.iter().next().unwrap().to_term();
        term
    }

    fn bits(text: &str) -> Vec<bool> {
        parse_bitstring(text).unwrap()
    }

    #[test]
    fn z_and_x_on_kets() {
        assert_eq!(term("Z0").act(&bits("0"), Side::Ket), Ok((bits("0"), c64!(1, 0))));
        assert_eq!(term("Z0").act(&bits("1"), Side::Ket), Ok((bits("1"), c64!(-1, 0))));
        assert_eq!(term("X0").act(&bits("0"), Side::Ket), Ok((bits("1"), c64!(1, 0))));
        assert_eq!(
            term("2 X0 Z2").act(&bits("001"), Side::Ket),
            Ok((bits("101"), c64!(-2, 0)))
        );
    }

    // Y = [[0, -i], [i, 0]].  Column action picks columns, row action picks rows.
    #[test]
    fn y_matches_its_matrix() {
        let y = term("Y0");
        assert_eq!(y.act(&bits("0"), Side::Ket), Ok((bits("1"), IM)));
        assert_eq!(y.act(&bits("1"), Side::Ket), Ok((bits("0"), M_IM)));
        assert_eq!(y.act(&bits("0"), Side::Bra), Ok((bits("1"), M_IM)));
        assert_eq!(y.act(&bits("1"), Side::Bra), Ok((bits("0"), IM)));
    }

    #[test]
    fn bra_and_ket_agree_on_matrix_elements() {
        // ⟨a|P|b⟩ computed from either side must match.
        let p = term("(0.5,0.25) Y0 X1 Z2");
        for b in ["000", "011", "101", "110"] {
            let (a, from_ket) = p.act(&bits(b), Side::Ket).unwrap();
            let (back, from_bra) = p.act(&a, Side::Bra).unwrap();
            assert_eq!(back, bits(b));
            assert_eq!(from_ket, from_bra);
        }
    }

    #[test]
    fn operator_action_lists_every_term() {
        let op: PauliOperator = "X0 + Z0 + (0,1) I".parse().unwrap();
        let out = op.compute_action_on_ket(&bits("1")).unwrap();
        assert_eq!(
            out,
            vec![
                (bits("1"), c64!(0, 1)),
                (bits("1"), c64!(-1, 0)),
                (bits("0"), c64!(1, 0)),
            ]
        );
        assert_eq!(op.compute_action_on_bra(&bits("1")).unwrap().len(), 3);
    }

    #[test]
    fn symbolic_terms_act_with_their_numeric_part() {
        let op: PauliOperator = "0.5 theta X0".parse().unwrap();
        assert_eq!(
            op.compute_action_on_ket(&bits("0")).unwrap(),
            vec![(bits("1"), c64!(0.5, 0))]
        );
    }

    #[test]
    fn short_state_is_an_error() {
        assert_eq!(
            term("X3").act(&bits("01"), Side::Ket),
            Err(ObservableError::BasisState { site: 3, len: 2 })
        );
    }
}
