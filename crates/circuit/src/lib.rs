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

//! The abstract instruction representation that observables are lowered into for measurement.
//!
//! This is intentionally small: a flat list of gate applications and measurements, grouped into
//! named [CompositeInstruction]s that can carry the coefficient of the observable term they
//! measure.

pub mod error;
pub mod instruction;
pub mod operations;
pub mod util;

pub use error::CircuitError;
pub use instruction::{CompositeInstruction, Instruction};
pub use operations::{Operation, OperationKind, StandardGate, StandardInstruction};

#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
#[repr(transparent)]
pub struct Qubit(pub u32);

impl From<u32> for Qubit {
    fn from(value: u32) -> Self {
        Qubit(value)
    }
}

impl std::fmt::Display for Qubit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}
