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

//! A registered observable type: a fermionic operator measured through its Jordan–Wigner image.

use std::any::Any;
use std::fmt;

use qobs_circuit::CompositeInstruction;
use qobs_quantum_info::{
    ConfigError, FermionOperator, Observable, ObservableError, Options, PauliOperator,
};

/// Key of the fermion text in the options bag.
pub const FERMION_KEY: &str = "fermion";

/// A fermionic operator together with its qubit image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JordanWigner {
    fermion: FermionOperator,
    qubits: PauliOperator,
}

impl JordanWigner {
    pub fn new(fermion: FermionOperator) -> Self {
        let qubits = fermion.jordan_wigner();
        Self { fermion, qubits }
    }

    pub fn fermion(&self) -> &FermionOperator {
        &self.fermion
    }

    pub fn qubit_operator(&self) -> &PauliOperator {
        &self.qubits
    }
}

impl fmt::Display for JordanWigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.qubits, f)
    }
}

impl Observable for JordanWigner {
    fn kind(&self) -> &'static str {
        "jordan-wigner"
    }

    fn observe(&self, circuit: &CompositeInstruction) -> Vec<CompositeInstruction> {
        self.qubits.observe(circuit)
    }

    fn n_bits(&self) -> usize {
        self.qubits.n_bits()
    }

    /// Requires `"fermion"`, the text of the fermionic operator.
    fn from_options(&mut self, options: &Options) -> Result<(), ObservableError> {
        let text = options
            .get_str(FERMION_KEY)?
            .ok_or_else(|| ConfigError::Missing {
                key: FERMION_KEY.to_owned(),
            })?;
        self.from_string(text)
    }

    /// Keeps the pruning tolerance of the current fermionic operator.
    fn from_string(&mut self, text: &str) -> Result<(), ObservableError> {
        let mut fermion = FermionOperator::zero().with_tolerance(self.fermion.tolerance());
        fermion.add_str(text)?;
        *self = Self::new(fermion);
        Ok(())
    }

    fn to_ir(&self) -> Vec<CompositeInstruction> {
        self.qubits.to_ir()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fermion_key_is_required() {
        let mut observable = JordanWigner::default();
        assert_eq!(
            observable.from_options(&Options::new()),
            Err(ObservableError::Config(ConfigError::Missing {
                key: "fermion".into()
            }))
        );
        observable
            .from_options(&Options::new().with("fermion", "1^ 0 + 0^ 1"))
            .unwrap();
        assert!(observable
            .qubit_operator()
            .is_close(&"0.5 X0 X1 + 0.5 Y0 Y1".parse().unwrap(), 1e-12));
        assert_eq!(observable.n_bits(), 2);
    }

    #[test]
    fn from_string_keeps_tolerance() {
        let mut observable = JordanWigner::new(FermionOperator::zero().with_tolerance(0.0));
        observable.from_string("1e-13 0^ 0 + 1^ 1").unwrap();
        assert_eq!(observable.fermion().n_terms(), 2);
        assert_eq!(observable.fermion().tolerance(), 0.0);
    }
}
