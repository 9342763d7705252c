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

//! The Jordan–Wigner mapping from fermionic modes to qubits.
//!
//! Mode `j` maps to qubit `j`, with
//!
//! ```text
//! a†_j = ½ (X_j - i Y_j) Z_{j-1} ... Z_0
//! a_j  = ½ (X_j + i Y_j) Z_{j-1} ... Z_0
//! ```

use num_complex::Complex64;
use smallvec::SmallVec;

use super::{FermionOperator, Ladder};
use crate::pauli::{Pauli, PauliOperator, PauliString};

/// The qubit image of a single ladder operator.
fn ladder_image(ladder: Ladder, tolerance: f64) -> PauliOperator {
    let parity = (0..ladder.mode).map(|site| (site, Pauli::Z));
    let with = |pauli: Pauli| {
        let mut sites: SmallVec<[(u32, Pauli); 4]> = parity.clone().collect();
        sites.push((ladder.mode, pauli));
        PauliString(sites)
    };
    let y_coeff = if ladder.dagger {
        Complex64::new(0.0, -0.5)
    } else {
        Complex64::new(0.0, 0.5)
    };
    let mut out = PauliOperator::zero().with_tolerance(tolerance);
    out.accumulate(with(Pauli::X), Complex64::new(0.5, 0.0));
    out.accumulate(with(Pauli::Y), y_coeff);
    out.prune();
    out
}

impl FermionOperator {
    /// Map to a qubit operator on [n_bits][Self::n_bits] qubits.
    pub fn jordan_wigner(&self) -> PauliOperator {
        let mut out = PauliOperator::zero()
            .with_tolerance(self.tolerance)
            .with_num_qubits(self.n_bits() as u32);
        for term in self.iter() {
            let mut product = PauliOperator::zero().with_tolerance(self.tolerance);
            product.accumulate(PauliString::identity(), term.coeff);
            for ladder in term.ladders.iter() {
                product = product.expand_product(&ladder_image(ladder, self.tolerance));
            }
            out += &product;
        }
        tracing::debug!(
            fermion_terms = self.n_terms(),
            pauli_terms = out.n_terms(),
            "Jordan-Wigner transform"
        );
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use qobs_circuit::c64;

    fn pauli(text: &str) -> PauliOperator {
        text.parse().unwrap()
    }

    #[test]
    fn number_operator() {
        let n0: FermionOperator = "0^ 0".parse().unwrap();
        assert!(n0.jordan_wigner().is_close(&pauli("0.5 I - 0.5 Z0"), 1e-12));
        let n2: FermionOperator = "2^ 2".parse().unwrap();
        let qubits = n2.jordan_wigner();
        assert!(qubits.is_close(&pauli("0.5 I - 0.5 Z2"), 1e-12));
        assert_eq!(qubits.n_bits(), 3);
    }

    #[test]
    fn hopping_term() {
        // a†_1 a_0 + a†_0 a_1 = ½ (X0 X1 + Y0 Y1)
        let hop: FermionOperator = "1^ 0 + 0^ 1".parse().unwrap();
        assert!(hop
            .jordan_wigner()
            .is_close(&pauli("0.5 X0 X1 + 0.5 Y0 Y1"), 1e-12));
    }

    #[test]
    fn mapping_is_an_algebra_homomorphism() {
        let left: FermionOperator = "(0.5,1) 2^ 0 + 1.5 1^".parse().unwrap();
        let right: FermionOperator = "0^ 1 - 2.0 2".parse().unwrap();
        let fermion_product = (&left * &right).jordan_wigner();
        let qubit_product = &left.jordan_wigner() * &right.jordan_wigner();
        assert!(fermion_product.is_close(&qubit_product, 1e-12));
        assert!(FermionOperator::scalar(c64!(2, 0))
            .unwrap()
            .jordan_wigner()
            .is_close(&PauliOperator::scalar(c64!(2, 0)).unwrap(), 1e-12));
    }
}
