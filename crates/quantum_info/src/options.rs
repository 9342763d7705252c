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

//! A heterogeneous key/value bag used to configure observables.

use indexmap::IndexMap;
use ndarray::{Array2, ArrayD};
use num_complex::Complex64;

use crate::error::ConfigError;

/// One value in an [Options] bag.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Complex(Complex64),
    String(String),
    Matrix(Array2<f64>),
    Tensor(ArrayD<f64>),
}

impl OptionValue {
    /// Short description of the variant, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::Double(_) => "a real number",
            Self::Complex(_) => "a complex number",
            Self::String(_) => "a string",
            Self::Matrix(_) => "a matrix",
            Self::Tensor(_) => "a tensor",
        }
    }
}

macro_rules! impl_from_for_option_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_option_value!(
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Double,
    Complex64 => Complex,
    String => String,
    &str => String,
    Array2<f64> => Matrix,
    ArrayD<f64> => Tensor,
);

/// An ordered key/value configuration bag.
///
/// Keys are kept in insertion order so that anything derived from iterating the bag is
/// deterministic.  Each observable type documents the keys it recognises; anything else is
/// ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    values: IndexMap<String, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a key that must be present.
    pub fn require(&self, key: &str) -> Result<&OptionValue, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_owned(),
        })
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::String(value)) => Ok(Some(value)),
            Some(other) => Err(wrong_type(key, "a string", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Int(value)) => Ok(Some(*value)),
            Some(other) => Err(wrong_type(key, "an integer", other)),
        }
    }

    /// Get a real number.  Integers are accepted and widened.
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Double(value)) => Ok(Some(*value)),
            Some(OptionValue::Int(value)) => Ok(Some(*value as f64)),
            Some(other) => Err(wrong_type(key, "a real number", other)),
        }
    }

    pub fn get_matrix(&self, key: &str) -> Result<Option<&Array2<f64>>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Matrix(value)) => Ok(Some(value)),
            Some(other) => Err(wrong_type(key, "a matrix", other)),
        }
    }

    pub fn get_tensor(&self, key: &str) -> Result<Option<&ArrayD<f64>>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Tensor(value)) => Ok(Some(value)),
            Some(other) => Err(wrong_type(key, "a tensor", other)),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &OptionValue) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_owned(),
        expected,
        found: found.describe(),
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
