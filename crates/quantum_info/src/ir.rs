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

//! Conversion between operators and measurement instructions.
//!
//! A term `P` becomes a composite instruction named by its key and carrying its coefficient.
//! The composite rotates each qubit in the support into the computational basis (`H` for `X`,
//! `RX(π/2)` for `Y`, nothing for `Z`) and then measures every qubit of the support.

use std::f64::consts::FRAC_PI_2;

use indexmap::IndexMap;
use num_complex::Complex64;

use qobs_circuit::util::C_ONE;
use qobs_circuit::{
    CompositeInstruction, Instruction, OperationKind, Qubit, StandardGate, StandardInstruction,
};

use crate::error::IrFormatError;
use crate::fermion::FermionOperator;
use crate::pauli::{Pauli, PauliOperator, PauliString};

/// Rotation angles within this of `±π/2` are read as the `Y`-basis change.
const ANGLE_TOLERANCE: f64 = 1e-9;

/// The basis change and measurements for one Pauli string, appended to `out`.
fn push_measurement(out: &mut CompositeInstruction, paulis: &PauliString) {
    for (site, pauli) in paulis.iter() {
        match pauli {
            Pauli::X => out.push(Instruction::gate_1q(StandardGate::HGate, Qubit(site), &[])),
            Pauli::Y => out.push(Instruction::gate_1q(
                StandardGate::RXGate,
                Qubit(site),
                &[FRAC_PI_2],
            )),
            Pauli::Z => (),
        }
    }
    out.extend(paulis.iter().map(|(site, _)| Instruction::measure(Qubit(site))));
}

impl PauliOperator {
    /// One composite per term, in iteration order.  The identity term becomes an empty composite
    /// named `I`, so its coefficient still reaches whoever aggregates expectation values.
    pub fn to_ir(&self) -> Vec<CompositeInstruction> {
        warn_unbound(self);
        let out = self
            .iter()
            .map(|term| {
                let mut composite =
                    CompositeInstruction::new(term.paulis.id()).with_coefficient(term.coeff);
                push_measurement(&mut composite, term.paulis);
                composite
            })
            .collect::<Vec<_>>();
        tracing::debug!(composites = out.len(), "converted operator to instructions");
        out
    }

    /// Append each non-identity term's measurement to a copy of `circuit`.  The identity term
    /// needs no circuit and is skipped; its value is [identity_coefficient][Self::identity_coefficient].
    pub fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        warn_unbound(self);
        self.iter()
            .filter(|term| !term.paulis.is_identity())
            .map(|term| {
                let mut composite =
                    CompositeInstruction::new(term.paulis.id()).with_coefficient(term.coeff);
                composite.extend(circuit.instructions().iter().cloned());
                push_measurement(&mut composite, term.paulis);
                composite
            })
            .collect()
    }

    /// Read an operator back from measurement composites.  A composite without a coefficient
    /// counts with coefficient one.
    pub fn from_ir(composites: &[CompositeInstruction]) -> Result<PauliOperator, IrFormatError> {
        let mut out = PauliOperator::zero();
        for composite in composites {
            let paulis = read_measurement(composite)?;
            out.accumulate(paulis, composite.coefficient().unwrap_or(C_ONE));
        }
        out.prune();
        tracing::debug!(
            composites = composites.len(),
            terms = out.n_terms(),
            "read operator from instructions"
        );
        Ok(out)
    }
}

/// Composites carry only numeric coefficients.
fn warn_unbound(op: &PauliOperator) {
    if op.is_symbolic() {
        tracing::warn!(
            variables = ?op.variables(),
            "unbound variables are left out of the instructions"
        );
    }
}

#[derive(Clone, Copy, Default)]
struct QubitBasis {
    rotation: Option<Pauli>,
    measured: bool,
}

fn read_measurement(composite: &CompositeInstruction) -> Result<PauliString, IrFormatError> {
    let name = || composite.name().to_owned();
    let mut qubits: IndexMap<u32, QubitBasis> = IndexMap::new();
    for inst in composite.instructions() {
        let rotation = match inst.op() {
            OperationKind::Instruction(StandardInstruction::Barrier) => continue,
            OperationKind::Instruction(StandardInstruction::Measure) => None,
            OperationKind::Standard(StandardGate::HGate) => Some(Pauli::X),
            OperationKind::Standard(StandardGate::RXGate) => {
                let angle = inst.params()[0];
                if (angle.abs() - FRAC_PI_2).abs() > ANGLE_TOLERANCE {
                    return Err(IrFormatError::BadRotation {
                        composite: name(),
                        qubit: inst.qubits()[0].0,
                        angle,
                    });
                }
                Some(Pauli::Y)
            }
            other => {
                return Err(IrFormatError::UnknownInstruction {
                    composite: name(),
                    name: qobs_circuit::Operation::name(other).to_owned(),
                })
            }
        };
        let qubit = inst.qubits()[0].0;
        let state = qubits.entry(qubit).or_default();
        match rotation {
            None if state.measured => {
                return Err(IrFormatError::DuplicateMeasurement {
                    composite: name(),
                    qubit,
                })
            }
            None => state.measured = true,
            Some(_) if state.measured => {
                return Err(IrFormatError::RotationAfterMeasurement {
                    composite: name(),
                    qubit,
                })
            }
            Some(_) if state.rotation.is_some() => {
                return Err(IrFormatError::RepeatedBasisChange {
                    composite: name(),
                    qubit,
                })
            }
            Some(pauli) => state.rotation = Some(pauli),
        }
    }
    let mut sites = Vec::with_capacity(qubits.len());
    for (qubit, state) in qubits {
        if !state.measured {
            return Err(IrFormatError::UnmeasuredRotation {
                composite: name(),
                qubit,
            });
        }
        sites.push((qubit, state.rotation.unwrap_or(Pauli::Z)));
    }
    sites.sort_unstable_by_key(|(site, _)| *site);
    Ok(PauliString(sites.into_iter().collect()))
}

impl FermionOperator {
    /// The instructions of the Jordan–Wigner image.
    pub fn to_ir(&self) -> Vec<CompositeInstruction> {
        self.jordan_wigner().to_ir()
    }

    pub fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        self.jordan_wigner().observe(circuit)
    }
}

/// The coefficients of a set of composites, in order.  Composites without one count as one.
pub fn coefficients(composites: &[CompositeInstruction]) -> Vec<Complex64> {
    composites
        .iter()
        .map(|composite| composite.coefficient().unwrap_or(C_ONE))
        .collect()
}
