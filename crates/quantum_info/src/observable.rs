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

//! The capability set shared by every observable type, and a closed sum of the built-in
//! algebras for callers that need to combine operators without knowing their kind statically.

use std::any::Any;
use std::fmt;

use num_complex::Complex64;

use qobs_circuit::CompositeInstruction;

use crate::error::{ConfigError, ObservableError};
use crate::fermion::{FermionOperator, FermionString};
use crate::options::{OptionValue, Options};
use crate::pauli::PauliOperator;

/// Something that can be measured.
///
/// Registered observable types implement this alongside the built-in algebras.  Mutating
/// constructors (`from_options`, `from_string`) exist so that a type can be default-constructed
/// by a factory and then populated.
pub trait Observable: fmt::Display + fmt::Debug + Send + Sync {
    /// The registry name of this type.
    fn kind(&self) -> &'static str;

    /// The measurement composites needed to estimate this observable on the state `circuit`
    /// prepares.
    fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction>;

    /// The number of qubits (or modes) the observable acts on.
    fn n_bits(&self) -> usize;

    /// Populate from a configuration bag.  Unrecognised keys are ignored.
    fn from_options(&mut self, options: &Options) -> Result<(), ObservableError>;

    /// Replace the contents with the parse of `text`.
    fn from_string(&mut self, text: &str) -> Result<(), ObservableError>;

    fn to_ir(&self) -> Vec<CompositeInstruction>;

    fn as_any(&self) -> &dyn Any;
}

fn declared_width(options: &Options, key: &str) -> Result<Option<u32>, ConfigError> {
    let Some(value) = options.get_int(key)? else {
        return Ok(None);
    };
    u32::try_from(value)
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            reason: format!("{value} is not a valid count"),
        })
}

impl Observable for PauliOperator {
    fn kind(&self) -> &'static str {
        "pauli"
    }

    fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        PauliOperator::observe(self, circuit)
    }

    fn n_bits(&self) -> usize {
        PauliOperator::n_bits(self)
    }

    /// Recognised keys: `"representation"` (text, added to the current value) and `"n-qubits"`
    /// (the declared width).
    fn from_options(&mut self, options: &Options) -> Result<(), ObservableError> {
        tracing::debug!(kind = "pauli", keys = options.len(), "populating from options");
        if let Some(num_qubits) = declared_width(options, "n-qubits")? {
            self.set_num_qubits(num_qubits);
        }
        if let Some(text) = options.get_str("representation")? {
            self.add_str(text)?;
        }
        Ok(())
    }

    /// Parses with the current tolerance and keeps the declared width.
    fn from_string(&mut self, text: &str) -> Result<(), ObservableError> {
        let mut parsed = PauliOperator::zero()
            .with_tolerance(self.tolerance())
            .with_num_qubits(self.num_qubits());
        parsed.add_str(text)?;
        *self = parsed;
        Ok(())
    }

    fn to_ir(&self) -> Vec<CompositeInstruction> {
        PauliOperator::to_ir(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Observable for FermionOperator {
    fn kind(&self) -> &'static str {
        "fermion"
    }

    fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        FermionOperator::observe(self, circuit)
    }

    fn n_bits(&self) -> usize {
        FermionOperator::n_bits(self)
    }

    /// Recognised keys: `"one-body-integrals"` (a square matrix), `"two-body-integrals"` (a
    /// rank-4 tensor), `"constant"` (an identity offset), `"n-modes"` and `"representation"`.
    fn from_options(&mut self, options: &Options) -> Result<(), ObservableError> {
        tracing::debug!(kind = "fermion", keys = options.len(), "populating from options");
        if let Some(num_modes) = declared_width(options, "n-modes")? {
            self.set_num_modes(num_modes);
        }
        if let Some(h1) = options.get_matrix("one-body-integrals")? {
            self.add_one_body("one-body-integrals", h1)?;
        }
        if let Some(h2) = options.get_tensor("two-body-integrals")? {
            self.add_two_body("two-body-integrals", h2)?;
        }
        let constant = match options.get("constant") {
            None => None,
            Some(OptionValue::Complex(value)) => Some(*value),
            Some(_) => options
                .get_f64("constant")?
                .map(|value| Complex64::new(value, 0.0)),
        };
        if let Some(value) = constant {
            self.add_term(FermionString::identity(), value)?;
        }
        if let Some(text) = options.get_str("representation")? {
            self.add_str(text)?;
        }
        Ok(())
    }

    fn from_string(&mut self, text: &str) -> Result<(), ObservableError> {
        let mut parsed = FermionOperator::zero()
            .with_tolerance(self.tolerance())
            .with_num_modes(self.num_modes());
        parsed.add_str(text)?;
        *self = parsed;
        Ok(())
    }

    fn to_ir(&self) -> Vec<CompositeInstruction> {
        FermionOperator::to_ir(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Either of the built-in operator algebras.
///
/// Arithmetic between values of the same algebra behaves as on the underlying operator; mixing
/// algebras is a [ObservableError::TypeMismatch].
#[derive(Clone, Debug, PartialEq)]
pub enum AlgebraicObservable {
    Pauli(PauliOperator),
    Fermion(FermionOperator),
}

impl From<PauliOperator> for AlgebraicObservable {
    fn from(value: PauliOperator) -> Self {
        Self::Pauli(value)
    }
}

impl From<FermionOperator> for AlgebraicObservable {
    fn from(value: FermionOperator) -> Self {
        Self::Fermion(value)
    }
}

macro_rules! binary_op {
    ($name:ident, $method:ident) => {
        pub fn $name(&self, other: &Self) -> Result<Self, ObservableError> {
            match (self, other) {
                (Self::Pauli(left), Self::Pauli(right)) => left.$method(right).map(Self::Pauli),
                (Self::Fermion(left), Self::Fermion(right)) => {
                    left.$method(right).map(Self::Fermion)
                }
                _ => Err(self.mismatch(other)),
            }
        }
    };
}

impl AlgebraicObservable {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pauli(_) => "pauli",
            Self::Fermion(_) => "fermion",
        }
    }

    fn mismatch(&self, other: &Self) -> ObservableError {
        ObservableError::TypeMismatch {
            left: self.kind(),
            right: other.kind(),
        }
    }

    binary_op!(add, add);
    binary_op!(sub, sub);
    binary_op!(compose, compose);

    pub fn scale(&self, factor: Complex64) -> Result<Self, ObservableError> {
        match self {
            Self::Pauli(op) => op.scale(factor).map(Self::Pauli),
            Self::Fermion(op) => op.scale(factor).map(Self::Fermion),
        }
    }

    /// Closeness of two operators of the same algebra.  Operators of different algebras are
    /// never close.
    pub fn is_close(&self, other: &Self, tol: f64) -> bool {
        match (self, other) {
            (Self::Pauli(left), Self::Pauli(right)) => left.is_close(right, tol),
            (Self::Fermion(left), Self::Fermion(right)) => left.is_close(right, tol),
            _ => false,
        }
    }

    pub fn adjoint(&self) -> Self {
        match self {
            Self::Pauli(op) => Self::Pauli(op.adjoint()),
            Self::Fermion(op) => Self::Fermion(op.adjoint()),
        }
    }

    pub fn n_terms(&self) -> usize {
        match self {
            Self::Pauli(op) => op.n_terms(),
            Self::Fermion(op) => op.n_terms(),
        }
    }

    pub fn identity_coefficient(&self) -> Complex64 {
        match self {
            Self::Pauli(op) => op.identity_coefficient(),
            Self::Fermion(op) => op.identity_coefficient(),
        }
    }

    fn inner(&self) -> &dyn Observable {
        match self {
            Self::Pauli(op) => op,
            Self::Fermion(op) => op,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Observable {
        match self {
            Self::Pauli(op) => op,
            Self::Fermion(op) => op,
        }
    }
}

impl fmt::Display for AlgebraicObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner(), f)
    }
}

impl Observable for AlgebraicObservable {
    fn kind(&self) -> &'static str {
        AlgebraicObservable::kind(self)
    }

    fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        self.inner().observe(circuit)
    }

    fn n_bits(&self) -> usize {
        self.inner().n_bits()
    }

    fn from_options(&mut self, options: &Options) -> Result<(), ObservableError> {
        self.inner_mut().from_options(options)
    }

    fn from_string(&mut self, text: &str) -> Result<(), ObservableError> {
        self.inner_mut().from_string(text)
    }

    fn to_ir(&self) -> Vec<CompositeInstruction> {
        self.inner().to_ir()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
