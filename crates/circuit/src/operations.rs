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

/// Trait for generic circuit operations.  These define the common attributes needed for something
/// to be placed in an [crate::Instruction].
pub trait Operation {
    fn name(&self) -> &str;
    fn num_qubits(&self) -> u32;
    fn num_clbits(&self) -> u32;
    fn num_params(&self) -> u32;
}

/// The gates that have a native representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StandardGate {
    // Pauli Gates
    ZGate,
    YGate,
    XGate,
    // Controlled Pauli Gates
    CZGate,
    CXGate,
    RXGate,
    RYGate,
    RZGate,
    IGate,
    HGate,
    SGate,
    SdgGate,
}

impl StandardGate {
    pub const ALL: [StandardGate; 12] = [
        Self::ZGate,
        Self::YGate,
        Self::XGate,
        Self::CZGate,
        Self::CXGate,
        Self::RXGate,
        Self::RYGate,
        Self::RZGate,
        Self::IGate,
        Self::HGate,
        Self::SGate,
        Self::SdgGate,
    ];

    /// Look up a gate by the name returned from [Operation::name].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gate| gate.name() == name)
    }
}

impl Operation for StandardGate {
    fn name(&self) -> &str {
        match self {
            Self::ZGate => "z",
            Self::YGate => "y",
            Self::XGate => "x",
            Self::CZGate => "cz",
            Self::CXGate => "cx",
            Self::RXGate => "rx",
            Self::RYGate => "ry",
            Self::RZGate => "rz",
            Self::IGate => "id",
            Self::HGate => "h",
            Self::SGate => "s",
            Self::SdgGate => "sdg",
        }
    }

    fn num_qubits(&self) -> u32 {
        match self {
            Self::CZGate | Self::CXGate => 2,
            _ => 1,
        }
    }

    fn num_clbits(&self) -> u32 {
        0
    }

    fn num_params(&self) -> u32 {
        match self {
            Self::RXGate | Self::RYGate | Self::RZGate => 1,
            _ => 0,
        }
    }
}

/// Non-unitary instructions that have a native representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StandardInstruction {
    Barrier,
    Measure,
}

impl StandardInstruction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "barrier" => Some(Self::Barrier),
            "measure" => Some(Self::Measure),
            _ => None,
        }
    }
}

impl Operation for StandardInstruction {
    fn name(&self) -> &str {
        match self {
            Self::Barrier => "barrier",
            Self::Measure => "measure",
        }
    }

    fn num_qubits(&self) -> u32 {
        1
    }

    fn num_clbits(&self) -> u32 {
        match self {
            Self::Measure => 1,
            _ => 0,
        }
    }

    fn num_params(&self) -> u32 {
        0
    }
}

/// The operation an [crate::Instruction] applies.
///
/// `Opaque` covers anything produced by another frontend that this crate has no native knowledge
/// of; it is carried through unchanged, and consumers are free to reject it.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationKind {
    Standard(StandardGate),
    Instruction(StandardInstruction),
    Opaque {
        name: String,
        num_qubits: u32,
        num_params: u32,
    },
}

impl OperationKind {
    /// Resolve a name to a native operation if possible, otherwise treat it as opaque.
    pub fn from_name(name: &str, num_qubits: u32, num_params: u32) -> Self {
        if let Some(gate) = StandardGate::from_name(name) {
            Self::Standard(gate)
        } else if let Some(instruction) = StandardInstruction::from_name(name) {
            Self::Instruction(instruction)
        } else {
            Self::Opaque {
                name: name.to_owned(),
                num_qubits,
                num_params,
            }
        }
    }

    pub fn standard_gate(&self) -> Option<StandardGate> {
        match self {
            Self::Standard(gate) => Some(*gate),
            _ => None,
        }
    }
}

impl Operation for OperationKind {
    fn name(&self) -> &str {
        match self {
            Self::Standard(op) => op.name(),
            Self::Instruction(op) => op.name(),
            Self::Opaque { name, .. } => name,
        }
    }

    fn num_qubits(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_qubits(),
            Self::Instruction(op) => op.num_qubits(),
            Self::Opaque { num_qubits, .. } => *num_qubits,
        }
    }

    fn num_clbits(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_clbits(),
            Self::Instruction(op) => op.num_clbits(),
            Self::Opaque { .. } => 0,
        }
    }

    fn num_params(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_params(),
            Self::Instruction(op) => op.num_params(),
            Self::Opaque { num_params, .. } => *num_params,
        }
    }
}

impl From<StandardGate> for OperationKind {
    fn from(value: StandardGate) -> Self {
        Self::Standard(value)
    }
}

impl From<StandardInstruction> for OperationKind {
    fn from(value: StandardInstruction) -> Self {
        Self::Instruction(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gate_names_round_trip() {
        for gate in StandardGate::ALL {
            assert_eq!(StandardGate::from_name(gate.name()), Some(gate));
        }
        assert_eq!(StandardGate::from_name("measure"), None);
    }

    #[test]
    fn unknown_names_are_opaque() {
        let op = OperationKind::from_name("u3", 1, 3);
        assert_eq!(op.name(), "u3");
        assert_eq!(op.num_params(), 3);
        assert!(op.standard_gate().is_none());
        assert_eq!(
            OperationKind::from_name("measure", 1, 0),
            OperationKind::Instruction(StandardInstruction::Measure)
        );
    }
}
