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

//! Construction of observables by type name.
//!
//! Names resolve through a [ServiceLookup] in two tiers: services registered up front, then
//! contributed services added later by extensions.  The lookup is always passed in; nothing here
//! is process-global.

pub mod jordan_wigner;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use qobs_quantum_info::{FermionOperator, Observable, ObservableError, Options, PauliOperator};

pub use jordan_wigner::JordanWigner;

/// Creates a default-constructed observable, ready to be populated.
pub type ObservableFactory = Arc<dyn Fn() -> Box<dyn Observable> + Send + Sync>;

/// The lookup contract the adapter needs from a service registry.
pub trait ServiceLookup {
    fn has_service_type(&self, name: &str) -> bool;
    fn resolve_service_type(&self, name: &str) -> Option<ObservableFactory>;
    fn has_contributed_type(&self, name: &str) -> bool;
    fn resolve_contributed_type(&self, name: &str) -> Option<ObservableFactory>;
}

impl<L: ServiceLookup + ?Sized> ServiceLookup for &L {
    fn has_service_type(&self, name: &str) -> bool {
        (**self).has_service_type(name)
    }
    fn resolve_service_type(&self, name: &str) -> Option<ObservableFactory> {
        (**self).resolve_service_type(name)
    }
    fn has_contributed_type(&self, name: &str) -> bool {
        (**self).has_contributed_type(name)
    }
    fn resolve_contributed_type(&self, name: &str) -> Option<ObservableFactory> {
        (**self).resolve_contributed_type(name)
    }
}

impl<L: ServiceLookup + ?Sized> ServiceLookup for Arc<L> {
    fn has_service_type(&self, name: &str) -> bool {
        (**self).has_service_type(name)
    }
    fn resolve_service_type(&self, name: &str) -> Option<ObservableFactory> {
        (**self).resolve_service_type(name)
    }
    fn has_contributed_type(&self, name: &str) -> bool {
        (**self).has_contributed_type(name)
    }
    fn resolve_contributed_type(&self, name: &str) -> Option<ObservableFactory> {
        (**self).resolve_contributed_type(name)
    }
}

/// An in-process registry of observable factories.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ObservableFactory>,
    contributed: HashMap<String, ObservableFactory>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in types: `pauli`, `fermion` and `jordan-wigner`.
    pub fn with_defaults() -> Self {
        let mut out = Self::new();
        out.register_service("pauli", || Box::new(PauliOperator::zero()));
        out.register_service("fermion", || Box::new(FermionOperator::zero()));
        out.register_service("jordan-wigner", || Box::new(JordanWigner::default()));
        out
    }

    /// Register a first-tier service.  A later registration under the same name replaces the
    /// earlier one.
    pub fn register_service<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Observable> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(name = name.as_str(), "registering observable service");
        self.services.insert(name, Arc::new(factory));
    }

    /// Register a contributed service.  These are only consulted for names that no first-tier
    /// service claims.
    pub fn contribute_service<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Observable> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(name = name.as_str(), "registering contributed observable service");
        self.contributed.insert(name, Arc::new(factory));
    }

    /// Every registered name, sorted, with contributed names after service names.
    pub fn names(&self) -> Vec<&str> {
        let mut services = self.services.keys().map(String::as_str).collect::<Vec<_>>();
        services.sort_unstable();
        let mut contributed = self
            .contributed
            .keys()
            .map(String::as_str)
            .filter(|name| !self.services.contains_key(*name))
            .collect::<Vec<_>>();
        contributed.sort_unstable();
        services.extend(contributed);
        services
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ServiceLookup for ServiceRegistry {
    fn has_service_type(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
    fn resolve_service_type(&self, name: &str) -> Option<ObservableFactory> {
        self.services.get(name).cloned()
    }
    fn has_contributed_type(&self, name: &str) -> bool {
        self.contributed.contains_key(name)
    }
    fn resolve_contributed_type(&self, name: &str) -> Option<ObservableFactory> {
        self.contributed.get(name).cloned()
    }
}

/// Resolves type names to observables through an injected [ServiceLookup].
#[derive(Clone, Debug)]
pub struct TypeRegistryAdapter<L> {
    lookup: L,
}

impl<L: ServiceLookup> TypeRegistryAdapter<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// A default-constructed instance of a registered type.
    fn instantiate(&self, name: &str) -> Result<Box<dyn Observable>, ObservableError> {
        if self.lookup.has_service_type(name) {
            if let Some(factory) = self.lookup.resolve_service_type(name) {
                tracing::debug!(name, tier = "service", "resolved observable type");
                return Ok(factory());
            }
        }
        if self.lookup.has_contributed_type(name) {
            if let Some(factory) = self.lookup.resolve_contributed_type(name) {
                tracing::debug!(name, tier = "contributed", "resolved observable type");
                return Ok(factory());
            }
        }
        tracing::debug!(name, "no observable type registered under this name");
        Err(ObservableError::UnknownType(name.to_owned()))
    }

    /// Build an observable of type `name` from its text representation.  `pauli` and `fermion`
    /// are parsed directly; anything else is instantiated through the lookup and then given the
    /// text.
    pub fn create_from_str(
        &self,
        name: &str,
        representation: &str,
    ) -> Result<Box<dyn Observable>, ObservableError> {
        match name {
            "pauli" => Ok(Box::new(representation.parse::<PauliOperator>()?)),
            "fermion" => Ok(Box::new(representation.parse::<FermionOperator>()?)),
            _ => {
                let mut out = self.instantiate(name)?;
                out.from_string(representation)?;
                Ok(out)
            }
        }
    }

    /// Build an observable of type `name` and populate it from `options`.
    pub fn create_from_options(
        &self,
        name: &str,
        options: &Options,
    ) -> Result<Box<dyn Observable>, ObservableError> {
        let mut out = self.instantiate(name)?;
        out.from_options(options)?;
        Ok(out)
    }

    /// Build an observable of type `name` with an empty options bag.
    pub fn create(&self, name: &str) -> Result<Box<dyn Observable>, ObservableError> {
        self.create_from_options(name, &Options::new())
    }
}

/// Shorthand for [TypeRegistryAdapter::create_from_str] over a borrowed lookup.
pub fn create_observable<L: ServiceLookup + ?Sized>(
    lookup: &L,
    name: &str,
    representation: &str,
) -> Result<Box<dyn Observable>, ObservableError> {
    TypeRegistryAdapter::new(lookup).create_from_str(name, representation)
}

/// Shorthand for [TypeRegistryAdapter::create_from_options] over a borrowed lookup.
pub fn create_observable_from_options<L: ServiceLookup + ?Sized>(
    lookup: &L,
    name: &str,
    options: &Options,
) -> Result<Box<dyn Observable>, ObservableError> {
    TypeRegistryAdapter::new(lookup).create_from_options(name, options)
}

/// Shorthand for [TypeRegistryAdapter::create] over a borrowed lookup.
pub fn create_observable_default<L: ServiceLookup + ?Sized>(
    lookup: &L,
    name: &str,
) -> Result<Box<dyn Observable>, ObservableError> {
    TypeRegistryAdapter::new(lookup).create(name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn services_shadow_contributions() {
        let mut registry = ServiceRegistry::new();
        registry.contribute_service("pauli", || Box::new(FermionOperator::zero()));
        assert_eq!(
            TypeRegistryAdapter::new(&registry).create("pauli").unwrap().kind(),
            "fermion"
        );
        registry.register_service("pauli", || Box::new(PauliOperator::zero()));
        assert_eq!(
            TypeRegistryAdapter::new(&registry).create("pauli").unwrap().kind(),
            "pauli"
        );
        assert_eq!(registry.names(), vec!["pauli"]);
    }

    #[test]
    fn default_names() {
        assert_eq!(
            ServiceRegistry::with_defaults().names(),
            vec!["fermion", "jordan-wigner", "pauli"]
        );
    }
}
