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

use num_complex::Complex64;
use thiserror::Error;

/// An error related to processing a textual operator representation.
///
/// Every variant carries the byte column (zero-based) in the input at which the problem starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("column {col}: '{symbol}' is not a valid operator in the {alphabet} alphabet")]
    UnknownOperator {
        col: usize,
        symbol: String,
        alphabet: &'static str,
    },
    #[error("column {col}: '{text}' is not a valid coefficient")]
    BadCoefficient { col: usize, text: String },
    #[error("column {col}: '{text}' is not a valid site index")]
    BadSite { col: usize, text: String },
    #[error("column {col}: '{text}' is not a valid variable name")]
    BadVariable { col: usize, text: String },
    #[error("column {col}: site {site} appears more than once in a single product")]
    DuplicateSite { col: usize, site: u32 },
    #[error("column {col}: needed {expected}, but instead saw '{found}'")]
    UnexpectedToken {
        col: usize,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of input when expecting to see {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("column {col}: coefficient '{text}' is not finite")]
    NonFinite { col: usize, text: String },
    #[error("column {col}: '{found}' is not a basis-state bit (expected '0' or '1')")]
    BadBit { col: usize, found: char },
}

/// A missing or unusable entry in an options bag.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("required option '{key}' is missing")]
    Missing { key: String },
    #[error("option '{key}' should be {expected}, but was {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("option '{key}' has shape {shape:?}, but {expected} was needed")]
    BadShape {
        key: String,
        shape: Vec<usize>,
        expected: String,
    },
    #[error("option '{key}' is invalid: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Failures when reading an observable back out of the instruction representation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrFormatError {
    #[error("'{composite}': instruction '{name}' has no meaning in a measurement basis change")]
    UnknownInstruction { composite: String, name: String },
    #[error("'{composite}': rotation by {angle} on qubit {qubit} does not select a Pauli basis")]
    BadRotation {
        composite: String,
        qubit: u32,
        angle: f64,
    },
    #[error("'{composite}': qubit {qubit} has more than one basis change")]
    RepeatedBasisChange { composite: String, qubit: u32 },
    #[error("'{composite}': qubit {qubit} has a basis change but is never measured")]
    UnmeasuredRotation { composite: String, qubit: u32 },
    #[error("'{composite}': qubit {qubit} is measured more than once")]
    DuplicateMeasurement { composite: String, qubit: u32 },
    #[error("'{composite}': qubit {qubit} is changed after it was measured")]
    RotationAfterMeasurement { composite: String, qubit: u32 },
}

/// The complete set of failures the operator engine reports.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObservableError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot combine a {left} operator with a {right} operator")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },
    #[error("term '{term}' has non-finite coefficient {coeff}")]
    Numeric { term: String, coeff: Complex64 },
    #[error("unknown observable type '{0}'")]
    UnknownType(String),
    #[error(transparent)]
    IrFormat(#[from] IrFormatError),
    #[error("term acts on site {site}, but the basis state only has {len} bit(s)")]
    BasisState { site: u32, len: usize },
}
