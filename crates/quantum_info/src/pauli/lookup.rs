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

//! Single-site Pauli product table.

use super::Pauli;

/// The product `left · right` of two single-site Paulis, as the power of `i` that multiplies the
/// result and the resulting Pauli (`None` for the identity).
///
/// The cyclic products `X·Y`, `Y·Z` and `Z·X` carry `i`; the anticyclic ones carry `-i = i^3`.
#[inline]
pub const fn product(left: Pauli, right: Pauli) -> (u8, Option<Pauli>) {
    match (left, right) {
        (Pauli::X, Pauli::X) | (Pauli::Y, Pauli::Y) | (Pauli::Z, Pauli::Z) => (0, None),
        (Pauli::X, Pauli::Y) => (1, Some(Pauli::Z)),
        (Pauli::Y, Pauli::X) => (3, Some(Pauli::Z)),
        (Pauli::Y, Pauli::Z) => (1, Some(Pauli::X)),
        (Pauli::Z, Pauli::Y) => (3, Some(Pauli::X)),
        (Pauli::Z, Pauli::X) => (1, Some(Pauli::Y)),
        (Pauli::X, Pauli::Z) => (3, Some(Pauli::Y)),
    }
}
