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

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CircuitError {
    #[error("operation '{name}' acts on {expected} qubit(s), but {given} were supplied")]
    QubitCountMismatch {
        name: String,
        expected: u32,
        given: usize,
    },
    #[error("operation '{name}' takes {expected} parameter(s), but {given} were supplied")]
    ParamCountMismatch {
        name: String,
        expected: u32,
        given: usize,
    },
    #[error("operation '{name}' was given the same qubit ({qubit}) more than once")]
    DuplicateQubit { name: String, qubit: u32 },
}
