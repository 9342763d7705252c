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

//! Symbolic algebra of quantum observables: weighted sums of Pauli strings and of fermionic
//! ladder-operator products, with canonical term keys, arithmetic, parsing, commutation checks,
//! symplectic encoding, basis-state action and conversion to measurement instructions.

mod arithmetic;

pub mod config;
pub mod error;
pub mod fermion;
pub mod ir;
pub mod observable;
pub mod options;
pub mod parse;
pub mod pauli;

pub use error::{ConfigError, IrFormatError, ObservableError, ParseError};
pub use fermion::{FermionOperator, FermionString, FermionTerm, Ladder};
pub use observable::{AlgebraicObservable, Observable};
pub use options::{OptionValue, Options};
pub use parse::{format_bitstring, parse_bitstring};
pub use pauli::action::Side;
pub use pauli::symplectic::{BinaryVector, BinaryVectors};
pub use pauli::{Monomial, Pauli, PauliOperator, PauliString, PauliTerm};
