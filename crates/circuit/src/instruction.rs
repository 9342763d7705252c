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

use std::fmt;

use num_complex::Complex64;
use smallvec::SmallVec;

use crate::error::CircuitError;
use crate::operations::{Operation, OperationKind, StandardGate, StandardInstruction};
use crate::Qubit;

/// A single operation applied to a fixed set of qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    op: OperationKind,
    qubits: SmallVec<[Qubit; 2]>,
    params: SmallVec<[f64; 3]>,
}

impl Instruction {
    /// Create a new instruction, checking that the qubit and parameter counts agree with the
    /// operation.
    pub fn new(
        op: OperationKind,
        qubits: impl IntoIterator<Item = Qubit>,
        params: impl IntoIterator<Item = f64>,
    ) -> Result<Self, CircuitError> {
        let qubits: SmallVec<[Qubit; 2]> = qubits.into_iter().collect();
        let params: SmallVec<[f64; 3]> = params.into_iter().collect();
        // Barriers are the one variadic instruction.
        let variadic = matches!(op, OperationKind::Instruction(StandardInstruction::Barrier));
        if !variadic && qubits.len() != op.num_qubits() as usize {
            return Err(CircuitError::QubitCountMismatch {
                name: op.name().to_owned(),
                expected: op.num_qubits(),
                given: qubits.len(),
            });
        }
        if params.len() != op.num_params() as usize {
            return Err(CircuitError::ParamCountMismatch {
                name: op.name().to_owned(),
                expected: op.num_params(),
                given: params.len(),
            });
        }
        for (i, qubit) in qubits.iter().enumerate() {
            if qubits[..i].contains(qubit) {
                return Err(CircuitError::DuplicateQubit {
                    name: op.name().to_owned(),
                    qubit: qubit.0,
                });
            }
        }
        Ok(Self { op, qubits, params })
    }

    /// Shorthand for a single-qubit standard gate.
    ///
    /// # Panics
    ///
    /// If `gate` is not a single-qubit gate, or `params` has the wrong length for it.
    pub fn gate_1q(gate: StandardGate, qubit: Qubit, params: &[f64]) -> Self {
        Self::new(gate.into(), [qubit], params.iter().copied())
            .expect("single-qubit gate constructed with the wrong arity")
    }

    /// Shorthand for a measurement in the computational basis.
    pub fn measure(qubit: Qubit) -> Self {
        Self {
            op: StandardInstruction::Measure.into(),
            qubits: SmallVec::from_slice(&[qubit]),
            params: SmallVec::new(),
        }
    }

    #[inline]
    pub fn op(&self) -> &OperationKind {
        &self.op
    }

    #[inline]
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    #[inline]
    pub fn is_measurement(&self) -> bool {
        matches!(self.op, OperationKind::Instruction(StandardInstruction::Measure))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.name())?;
        if !self.params.is_empty() {
            write!(
                f,
                "({})",
                self.params
                    .iter()
                    .map(|param| param.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
        for (i, qubit) in self.qubits.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, qubit)?;
        }
        Ok(())
    }
}

/// A named, ordered sequence of [Instruction]s.
///
/// When produced from an observable, the name is the canonical key of the term that the sequence
/// measures, and `coefficient` is that term's weight in the sum.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeInstruction {
    name: String,
    coefficient: Option<Complex64>,
    instructions: Vec<Instruction>,
}

impl CompositeInstruction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coefficient: None,
            instructions: Vec::new(),
        }
    }

    pub fn with_coefficient(mut self, coefficient: Complex64) -> Self {
        self.coefficient = Some(coefficient);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coefficient(&self) -> Option<Complex64> {
        self.coefficient
    }

    pub fn set_coefficient(&mut self, coefficient: Option<Complex64>) {
        self.coefficient = coefficient;
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The number of qubits needed to hold every instruction, i.e. one more than the highest
    /// qubit index used.
    pub fn num_qubits(&self) -> u32 {
        self.instructions
            .iter()
            .flat_map(|inst| inst.qubits())
            .map(|qubit| qubit.0 + 1)
            .max()
            .unwrap_or(0)
    }

    /// The qubits that are measured, in the order the measurements appear.
    pub fn measured_qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        self.instructions
            .iter()
            .filter(|inst| inst.is_measurement())
            .map(|inst| inst.qubits()[0])
    }
}

impl Extend<Instruction> for CompositeInstruction {
    fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
        self.instructions.extend(iter)
    }
}

impl<'a> IntoIterator for &'a CompositeInstruction {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl fmt::Display for CompositeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(coeff) = self.coefficient {
            write!(f, " [({},{})]", coeff.re, coeff.im)?;
        }
        writeln!(f, ":")?;
        for inst in &self.instructions {
            writeln!(f, "  {}", inst)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn arity_is_checked() {
        assert!(matches!(
            Instruction::new(StandardGate::CXGate.into(), [Qubit(0)], []),
            Err(CircuitError::QubitCountMismatch { expected: 2, given: 1, .. })
        ));
        assert!(matches!(
            Instruction::new(StandardGate::RXGate.into(), [Qubit(0)], []),
            Err(CircuitError::ParamCountMismatch { expected: 1, given: 0, .. })
        ));
        assert!(matches!(
            Instruction::new(StandardGate::CZGate.into(), [Qubit(3), Qubit(3)], []),
            Err(CircuitError::DuplicateQubit { qubit: 3, .. })
        ));
        assert!(Instruction::new(
            StandardInstruction::Barrier.into(),
            [Qubit(0), Qubit(1), Qubit(2)],
            []
        )
        .is_ok());
    }

    #[test]
    fn composite_tracks_measurements() {
        let mut composite = CompositeInstruction::new("X0Z2");
        composite.push(Instruction::gate_1q(StandardGate::HGate, Qubit(0), &[]));
        composite.push(Instruction::gate_1q(StandardGate::RXGate, Qubit(1), &[FRAC_PI_2]));
        composite.push(Instruction::measure(Qubit(0)));
        composite.push(Instruction::measure(Qubit(2)));
        assert_eq!(composite.len(), 4);
        assert_eq!(composite.num_qubits(), 3);
        assert_eq!(
            composite.measured_qubits().collect::<Vec<_>>(),
            vec![Qubit(0), Qubit(2)]
        );
        assert_eq!(composite.instructions()[0].to_string(), "h q0");
    }
}
