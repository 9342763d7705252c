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

//! Normal ordering of products of fermionic ladder operators.
//!
//! The canonical order puts every creation operator before every annihilation operator, and
//! sorts each group into strictly descending mode order.  Reordering uses the canonical
//! anticommutation relations
//!
//! ```text
//! {a_p, a_q} = {a†_p, a†_q} = 0,      {a_p, a†_q} = δ_pq,
//! ```
//!
//! so moving an annihilator past a creator of the same mode spawns an extra term with the pair
//! removed, and a repeated ladder (`a_p a_p`, `a†_p a†_p`) makes the product vanish.

use num_complex::Complex64;
use smallvec::SmallVec;

use super::{FermionString, Ladder};

/// Does `left` have to come after `right` in a normal-ordered product?
#[inline]
fn out_of_order(left: Ladder, right: Ladder) -> bool {
    match (left.dagger, right.dagger) {
        (false, true) => true,
        (true, false) => false,
        _ => left.mode < right.mode,
    }
}

/// Expand the product `coeff * ladders[0] * ladders[1] * ...` into normal-ordered terms.
///
/// The output terms have distinct keys only if no two branches happen to meet; callers merge by
/// key anyway.  An empty output means the product is zero.
pub fn normal_order(ladders: &[Ladder], coeff: Complex64) -> Vec<(FermionString, Complex64)> {
    let mut out = Vec::new();
    let mut stack: Vec<(SmallVec<[Ladder; 4]>, Complex64)> =
        vec![(SmallVec::from_slice(ladders), coeff)];
    'terms: while let Some((mut ops, mut coeff)) = stack.pop() {
        // Insertion sort, tracking the sign of each transposition.
        for i in 1..ops.len() {
            for j in (0..i).rev() {
                let (left, right) = (ops[j], ops[j + 1]);
                if left == right {
                    continue 'terms;
                }
                if !out_of_order(left, right) {
                    break;
                }
                if left.mode == right.mode {
                    // a_p a†_p = 1 - a†_p a_p
                    let mut contracted = ops.clone();
                    contracted.drain(j..j + 2);
                    stack.push((contracted, coeff));
                }
                ops.swap(j, j + 1);
                coeff = -coeff;
            }
        }
        out.push((FermionString(ops), coeff));
    }
    out
}
