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

//! Weighted sums of Pauli strings.
//!
//! A [PauliOperator] is a map from a canonical [PauliString] key to a complex coefficient.  Every
//! mutating operation merges terms that share a key and then removes any term whose coefficient
//! is negligible with respect to the operator's tolerance.
//!
//! A term may also carry a [Monomial] of named variables, which is part of its key.  Such terms
//! merge only with terms carrying the same variables, and [PauliOperator::eval] substitutes values
//! for them.  The symplectic encoding, the basis-state action and the instruction form only see
//! the numeric coefficient, so bind every variable before using those.

pub mod action;
mod lookup;
pub mod symplectic;

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use itertools::{EitherOrBoth, Itertools};
use num_complex::Complex64;
use num_traits::Zero;
use smallvec::SmallVec;
use thiserror::Error;

use qobs_circuit::util::{mul_i_pow, C_M_ONE, C_ONE, C_ZERO};

use crate::arithmetic::impl_operator_arithmetic;
use crate::config::default_tolerance;
use crate::error::{ObservableError, ParseError};
use crate::parse::{self, Alphabet, Token};

/// A single-qubit non-identity Pauli operator.
///
/// # Representation
///
/// The `u8` representation is the symplectic encoding, with Z in the Lsb0 and X in the Lsb1.  The
/// value `0b00` would be the identity, which is never stored and so is not named here.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pauli {
    X = 0b10,
    Y = 0b11,
    Z = 0b01,
}
impl From<Pauli> for u8 {
    fn from(value: Pauli) -> u8 {
        value as u8
    }
}
unsafe impl ::bytemuck::CheckedBitPattern for Pauli {
    type Bits = u8;

    #[inline(always)]
    fn is_valid_bit_pattern(bits: &Self::Bits) -> bool {
        *bits != 0 && *bits <= 0b11
    }
}
unsafe impl ::bytemuck::NoUninit for Pauli {}

/// The error type for a failed conversion into [Pauli].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not the symplectic encoding of a non-identity Pauli")]
pub struct PauliFromU8Error(u8);

impl ::std::convert::TryFrom<u8> for Pauli {
    type Error = PauliFromU8Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ::bytemuck::checked::try_cast(value).map_err(|_| PauliFromU8Error(value))
    }
}

impl Pauli {
    #[inline]
    pub fn label(&self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    /// Build from the symplectic bits.  `(false, false)` is the identity, so gives `None`.
    #[inline]
    pub fn from_symplectic(x: bool, z: bool) -> Option<Self> {
        Self::try_from(((x as u8) << 1) | (z as u8)).ok()
    }

    #[inline]
    pub fn has_x_component(&self) -> bool {
        ((*self as u8) & (Self::X as u8)) != 0
    }

    #[inline]
    pub fn has_z_component(&self) -> bool {
        ((*self as u8) & (Self::Z as u8)) != 0
    }
}

/// The canonical key of a Pauli term: its non-identity support, sorted by site.
///
/// The empty string is the identity.  The derived ordering puts the identity first and is
/// otherwise lexicographic in the `(site, Pauli)` pairs.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PauliString(pub(crate) SmallVec<[(u32, Pauli); 4]>);

impl PauliString {
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build the key from `(site, Pauli)` pairs given in any order.
    ///
    /// A site that appears twice is a [ParseError::DuplicateSite], whose column is the position of
    /// the second occurrence in the input iteration.
    pub fn from_sites(sites: impl IntoIterator<Item = (u32, Pauli)>) -> Result<Self, ParseError> {
        Self::from_located(sites.into_iter().enumerate().collect())
    }

    /// Build the key from pairs tagged with a column for error reporting.
    fn from_located(mut sites: Vec<(usize, (u32, Pauli))>) -> Result<Self, ParseError> {
        // Stable, so of two equal sites the later one in the input is second.
        sites.sort_by_key(|(_, (site, _))| *site);
        if let Some(pair) = sites.windows(2).find(|pair| pair[0].1 .0 == pair[1].1 .0) {
            return Err(ParseError::DuplicateSite {
                col: pair[1].0,
                site: pair[1].1 .0,
            });
        }
        Ok(Self(sites.into_iter().map(|(_, op)| op).collect()))
    }

    #[inline]
    pub fn iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = (u32, Pauli)> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    /// The Pauli acting on `site`, if it is in the support.
    pub fn get(&self, site: u32) -> Option<Pauli> {
        self.0
            .binary_search_by_key(&site, |(site, _)| *site)
            .ok()
            .map(|index| self.0[index].1)
    }

    #[inline]
    pub fn max_site(&self) -> Option<u32> {
        self.0.last().map(|(site, _)| *site)
    }

    /// The compact identifier, for example `X0Z1`.  The identity is `I`.
    pub fn id(&self) -> String {
        if self.is_identity() {
            return "I".to_owned();
        }
        self.0
            .iter()
            .map(|(site, pauli)| format!("{}{}", pauli.label(), site))
            .collect()
    }

    /// Do the two strings commute?  True when the number of sites on which both are non-identity
    /// and different is even.
    pub fn commutes(&self, other: &PauliString) -> bool {
        let mismatches = self
            .0
            .iter()
            .merge_join_by(other.0.iter(), |left, right| left.0.cmp(&right.0))
            .filter(|pair| matches!(pair, EitherOrBoth::Both(left, right) if left.1 != right.1))
            .count();
        mismatches % 2 == 0
    }

    /// The product `self · other`, as a power of `i` and the resulting string.
    pub fn product(&self, other: &PauliString) -> (u8, PauliString) {
        let mut phase = 0u8;
        let mut out = SmallVec::with_capacity(self.len().max(other.len()));
        for pair in self
            .0
            .iter()
            .merge_join_by(other.0.iter(), |left, right| left.0.cmp(&right.0))
        {
            match pair {
                EitherOrBoth::Left(&item) | EitherOrBoth::Right(&item) => out.push(item),
                EitherOrBoth::Both(&(site, left), &(_, right)) => {
                    let (power, pauli) = lookup::product(left, right);
                    phase = (phase + power) % 4;
                    if let Some(pauli) = pauli {
                        out.push((site, pauli));
                    }
                }
            }
        }
        (phase, PauliString(out))
    }
}

impl From<BTreeMap<u32, Pauli>> for PauliString {
    fn from(value: BTreeMap<u32, Pauli>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("I");
        }
        for (i, (site, pauli)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", pauli.label(), site)?;
        }
        Ok(())
    }
}

/// A product of named real parameters that tags the coefficient of a symbolic term.
///
/// The names are kept sorted, so equal products compare equal.  The empty product is one, the tag
/// of every purely numeric term.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monomial(Vec<String>);

impl Monomial {
    #[inline]
    pub fn one() -> Self {
        Self::default()
    }

    /// A single variable.  Names start with a lowercase ASCII letter, followed by ASCII letters,
    /// digits or `_`.
    pub fn variable(name: &str) -> Result<Self, ParseError> {
        if !is_variable_name(name) {
            return Err(ParseError::BadVariable {
                col: 0,
                text: name.to_owned(),
            });
        }
        Ok(Self(vec![name.to_owned()]))
    }

    fn from_names(mut names: Vec<String>) -> Self {
        names.sort_unstable();
        Self(names)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// The factors in sorted order.  A variable raised to a power appears that many times.
    pub fn variables(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn product(&self, other: &Monomial) -> Monomial {
        Monomial(self.0.iter().merge(other.0.iter()).cloned().collect())
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return f.write_str("1");
        }
        f.write_str(&self.0.join(" "))
    }
}

fn is_variable_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The map key of a term.  Terms merge only when both parts agree.
pub(crate) type TermKey = (PauliString, Monomial);

fn key_id(paulis: &PauliString, monomial: &Monomial) -> String {
    if monomial.is_one() {
        paulis.id()
    } else {
        format!("{} {}", monomial, paulis.id())
    }
}

fn check_coeff(
    paulis: &PauliString,
    monomial: &Monomial,
    coeff: Complex64,
) -> Result<(), ObservableError> {
    if coeff.is_finite() {
        Ok(())
    } else {
        Err(ObservableError::Numeric {
            term: key_id(paulis, monomial),
            coeff,
        })
    }
}

/// A single Pauli string with a coefficient, optionally multiplied by a [Monomial] of variables.
#[derive(Clone, Debug, PartialEq)]
pub struct PauliTerm {
    coeff: Complex64,
    paulis: PauliString,
    monomial: Monomial,
}

impl PauliTerm {
    /// Create a term from a site map, given as `(site, Pauli)` pairs in any order.  The
    /// coefficient must be finite.
    pub fn new(
        sites: impl IntoIterator<Item = (u32, Pauli)>,
        coeff: Complex64,
    ) -> Result<Self, ObservableError> {
        Self::from_parts(PauliString::from_sites(sites)?, coeff)
    }

    pub fn from_parts(paulis: PauliString, coeff: Complex64) -> Result<Self, ObservableError> {
        let monomial = Monomial::one();
        check_coeff(&paulis, &monomial, coeff)?;
        Ok(Self {
            coeff,
            paulis,
            monomial,
        })
    }

    pub fn identity(coeff: Complex64) -> Result<Self, ObservableError> {
        Self::from_parts(PauliString::identity(), coeff)
    }

    /// Multiply the term by a named variable.
    pub fn with_variable(mut self, name: &str) -> Result<Self, ParseError> {
        self.monomial = self.monomial.product(&Monomial::variable(name)?);
        Ok(self)
    }

    #[inline]
    pub fn coeff(&self) -> Complex64 {
        self.coeff
    }

    #[inline]
    pub fn paulis(&self) -> &PauliString {
        &self.paulis
    }

    #[inline]
    pub fn monomial(&self) -> &Monomial {
        &self.monomial
    }

    #[inline]
    pub fn is_symbolic(&self) -> bool {
        !self.monomial.is_one()
    }

    pub fn view(&self) -> PauliTermView<'_> {
        PauliTermView {
            coeff: self.coeff,
            paulis: &self.paulis,
            monomial: &self.monomial,
        }
    }

    /// Sum two terms with the same Pauli string and variables.  `None` if either differs.
    pub fn combine(&self, other: &PauliTerm) -> Option<PauliTerm> {
        (self.paulis == other.paulis && self.monomial == other.monomial).then(|| PauliTerm {
            coeff: self.coeff + other.coeff,
            paulis: self.paulis.clone(),
            monomial: self.monomial.clone(),
        })
    }

    #[inline]
    pub fn commutes(&self, other: &PauliTerm) -> bool {
        self.paulis.commutes(&other.paulis)
    }

    /// The single-term product `self · other`.  The coefficient is not checked; use
    /// [PauliOperator::compose] for a checked product.
    pub fn compose(&self, other: &PauliTerm) -> PauliTerm {
        let (phase, paulis) = self.paulis.product(&other.paulis);
        PauliTerm {
            coeff: mul_i_pow(self.coeff * other.coeff, phase),
            paulis,
            monomial: self.monomial.product(&other.monomial),
        }
    }

    /// The Hermitian conjugate.  Variables are real, so only the coefficient changes.
    pub fn adjoint(&self) -> PauliTerm {
        PauliTerm {
            coeff: self.coeff.conj(),
            paulis: self.paulis.clone(),
            monomial: self.monomial.clone(),
        }
    }

    pub fn to_operator(&self) -> Result<PauliOperator, ObservableError> {
        PauliOperator::from_term(self.clone())
    }
}

impl fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view(), f)
    }
}

/// A borrowed view onto one term of a [PauliOperator].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PauliTermView<'a> {
    pub coeff: Complex64,
    pub paulis: &'a PauliString,
    pub monomial: &'a Monomial,
}

impl PauliTermView<'_> {
    pub fn to_term(&self) -> PauliTerm {
        PauliTerm {
            coeff: self.coeff,
            paulis: self.paulis.clone(),
            monomial: self.monomial.clone(),
        }
    }

    #[inline]
    pub fn is_symbolic(&self) -> bool {
        !self.monomial.is_one()
    }
}

impl fmt::Display for PauliTermView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&parse::format_coeff(self.coeff))?;
        if !self.monomial.is_one() {
            write!(f, " {}", self.monomial)?;
        }
        write!(f, " {}", self.paulis)
    }
}

/// A weighted sum of Pauli strings.
#[derive(Clone, Debug, PartialEq)]
pub struct PauliOperator {
    terms: BTreeMap<TermKey, Complex64>,
    /// Declared lower bound on the number of qubits.
    num_qubits: u32,
    /// Coefficients with magnitude at most this are pruned.
    tolerance: f64,
}

impl Default for PauliOperator {
    fn default() -> Self {
        Self::zero()
    }
}

impl PauliOperator {
    /// The empty sum.
    pub fn zero() -> Self {
        Self {
            terms: BTreeMap::new(),
            num_qubits: 0,
            tolerance: default_tolerance(),
        }
    }

    pub fn identity() -> Self {
        let mut out = Self::zero();
        out.insert((PauliString::identity(), Monomial::one()), C_ONE);
        out
    }

    /// A multiple of the identity.
    pub fn scalar(coeff: Complex64) -> Result<Self, ObservableError> {
        let mut out = Self::zero();
        out.add_term(PauliString::identity(), coeff)?;
        Ok(out)
    }

    pub fn from_term(term: PauliTerm) -> Result<Self, ObservableError> {
        check_coeff(&term.paulis, &term.monomial, term.coeff)?;
        let mut out = Self::zero();
        out.insert((term.paulis, term.monomial), term.coeff);
        Ok(out)
    }

    /// Replace the pruning tolerance, re-pruning with the new value.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self.prune();
        self
    }

    pub fn with_num_qubits(mut self, num_qubits: u32) -> Self {
        self.num_qubits = num_qubits;
        self
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The declared number of qubits.  See [n_bits][Self::n_bits] for the effective width.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn set_num_qubits(&mut self, num_qubits: u32) {
        self.num_qubits = num_qubits;
    }

    /// The width of the operator: the larger of the declared qubit count and one more than the
    /// highest site any term acts on.
    pub fn n_bits(&self) -> usize {
        let used = self
            .terms
            .keys()
            .filter_map(|(paulis, _)| paulis.max_site())
            .max()
            .map_or(0, |site| site as usize + 1);
        used.max(self.num_qubits as usize)
    }

    #[inline]
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Does any term carry a variable?
    pub fn is_symbolic(&self) -> bool {
        self.terms.keys().any(|(_, monomial)| !monomial.is_one())
    }

    /// Every variable named by some term.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.terms
            .keys()
            .flat_map(|(_, monomial)| monomial.variables())
            .collect()
    }

    /// Iterate through the terms in key order.  Each call starts from the beginning.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = PauliTermView<'_>> + '_ {
        self.terms
            .iter()
            .map(|((paulis, monomial), coeff)| PauliTermView {
                coeff: *coeff,
                paulis,
                monomial,
            })
    }

    /// The coefficient stored against a numeric key.
    pub fn get(&self, key: &PauliString) -> Option<Complex64> {
        self.get_symbolic(key, &Monomial::one())
    }

    /// The coefficient of the term with this Pauli string and these variables.
    pub fn get_symbolic(&self, key: &PauliString, monomial: &Monomial) -> Option<Complex64> {
        self.terms.get(&(key.clone(), monomial.clone())).copied()
    }

    /// The coefficient of the all-identity term (zero if it is absent).
    pub fn identity_coefficient(&self) -> Complex64 {
        self.get(&PauliString::identity()).unwrap_or(C_ZERO)
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Add a single numeric term, merging with an existing term of the same key.  A non-finite
    /// coefficient is rejected and leaves `self` unchanged.
    pub fn add_term(
        &mut self,
        paulis: PauliString,
        coeff: Complex64,
    ) -> Result<(), ObservableError> {
        let monomial = Monomial::one();
        check_coeff(&paulis, &monomial, coeff)?;
        self.insert((paulis, monomial), coeff);
        Ok(())
    }

    fn insert(&mut self, key: TermKey, coeff: Complex64) {
        let tolerance = self.tolerance;
        match self.terms.entry(key) {
            btree_map::Entry::Vacant(entry) => {
                if !negligible(coeff, tolerance) {
                    entry.insert(coeff);
                }
            }
            btree_map::Entry::Occupied(mut entry) => {
                *entry.get_mut() += coeff;
                if negligible(*entry.get(), tolerance) {
                    entry.remove();
                }
            }
        }
    }

    /// Add a numeric term without pruning.  Callers must finish with [prune][Self::prune].
    pub(crate) fn accumulate(&mut self, paulis: PauliString, coeff: Complex64) {
        self.accumulate_key((paulis, Monomial::one()), coeff);
    }

    fn accumulate_key(&mut self, key: TermKey, coeff: Complex64) {
        *self.terms.entry(key).or_insert(C_ZERO) += coeff;
    }

    pub(crate) fn prune(&mut self) {
        let before = self.terms.len();
        let tolerance = self.tolerance;
        self.terms.retain(|_, coeff| !negligible(*coeff, tolerance));
        let removed = before - self.terms.len();
        if removed > 0 {
            tracing::trace!(removed, remaining = self.terms.len(), "pruned negligible terms");
        }
    }

    /// Add `factor * other` into `self`.
    pub(crate) fn merge_from(&mut self, other: &PauliOperator, factor: Complex64) {
        self.num_qubits = self.num_qubits.max(other.num_qubits);
        for (key, coeff) in other.terms.iter() {
            self.accumulate_key(key.clone(), coeff * factor);
        }
        self.prune();
    }

    pub(crate) fn scale_in_place(&mut self, factor: Complex64) {
        if factor.is_zero() {
            self.terms.clear();
            return;
        }
        self.terms.values_mut().for_each(|coeff| *coeff *= factor);
        self.prune();
    }

    /// The operator product `self · other`, expanded over every pair of terms, without checking
    /// the result.
    pub(crate) fn expand_product(&self, other: &PauliOperator) -> PauliOperator {
        let mut out = PauliOperator {
            terms: BTreeMap::new(),
            num_qubits: self.num_qubits.max(other.num_qubits),
            tolerance: self.tolerance,
        };
        for (((left, left_vars), left_coeff), ((right, right_vars), right_coeff)) in
            self.terms.iter().cartesian_product(other.terms.iter())
        {
            let (phase, paulis) = left.product(right);
            out.accumulate_key(
                (paulis, left_vars.product(right_vars)),
                mul_i_pow(left_coeff * right_coeff, phase),
            );
        }
        out.prune();
        out
    }

    /// The sum `self + other`.  Fails if a merged coefficient is not finite.
    pub fn add(&self, other: &PauliOperator) -> Result<PauliOperator, ObservableError> {
        let mut out = self.clone();
        out.merge_from(other, C_ONE);
        out.validate()?;
        Ok(out)
    }

    /// The difference `self - other`.  Fails if a merged coefficient is not finite.
    pub fn sub(&self, other: &PauliOperator) -> Result<PauliOperator, ObservableError> {
        let mut out = self.clone();
        out.merge_from(other, C_M_ONE);
        out.validate()?;
        Ok(out)
    }

    /// The operator product `self · other`, expanded over every pair of terms.  Fails if a
    /// product coefficient overflows.
    pub fn compose(&self, other: &PauliOperator) -> Result<PauliOperator, ObservableError> {
        let out = self.expand_product(other);
        out.validate()?;
        Ok(out)
    }

    /// Multiply every coefficient by `factor`.  A zero factor gives the empty sum.
    pub fn scale(&self, factor: Complex64) -> Result<PauliOperator, ObservableError> {
        let mut out = self.clone();
        out.scale_in_place(factor);
        out.validate()?;
        Ok(out)
    }

    /// The Hermitian conjugate.  Pauli strings are Hermitian and variables are real, so only the
    /// coefficients change.
    pub fn adjoint(&self) -> PauliOperator {
        let mut out = self.clone();
        out.terms.values_mut().for_each(|coeff| *coeff = coeff.conj());
        out
    }

    /// Does every term of `self` commute with every term of `other`?
    pub fn commutes(&self, other: &PauliOperator) -> bool {
        self.terms
            .keys()
            .cartesian_product(other.terms.keys())
            .all(|((left, _), (right, _))| left.commutes(right))
    }

    /// Do the two operators have the same terms, with coefficients that differ by at most `tol`?
    pub fn is_close(&self, other: &PauliOperator, tol: f64) -> bool {
        self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .merge_join_by(other.terms.iter(), |left, right| left.0.cmp(right.0))
                .all(|pair| match pair {
                    EitherOrBoth::Both((_, left), (_, right)) => (left - right).norm() <= tol,
                    EitherOrBoth::Left(_) | EitherOrBoth::Right(_) => false,
                })
    }

    /// Check that every coefficient is finite.
    pub fn validate(&self) -> Result<(), ObservableError> {
        self.terms
            .iter()
            .try_for_each(|((paulis, monomial), coeff)| check_coeff(paulis, monomial, *coeff))
    }

    /// Substitute values for variables.  A variable without a value stays symbolic, so a partial
    /// binding gives an operator that can be evaluated again later.
    pub fn eval(
        &self,
        values: &HashMap<String, Complex64>,
    ) -> Result<PauliOperator, ObservableError> {
        let mut out = PauliOperator {
            terms: BTreeMap::new(),
            num_qubits: self.num_qubits,
            tolerance: self.tolerance,
        };
        for ((paulis, monomial), coeff) in self.terms.iter() {
            let mut value = *coeff;
            let mut unbound = Vec::new();
            for name in monomial.variables() {
                match values.get(name) {
                    Some(bound) => value *= bound,
                    None => unbound.push(name.to_owned()),
                }
            }
            out.accumulate_key((paulis.clone(), Monomial(unbound)), value);
        }
        out.prune();
        out.validate()?;
        tracing::debug!(
            bound = values.len(),
            terms = out.n_terms(),
            symbolic = out.is_symbolic(),
            "evaluated operator variables"
        );
        Ok(out)
    }

    /// Parse `text` and add the result into `self`.  On error, `self` is unchanged.
    pub fn add_str(&mut self, text: &str) -> Result<(), ParseError> {
        let parsed = parse::parse_sum::<PauliAlphabet>(text)?
            .into_iter()
            .map(|term| {
                let mut sites = Vec::with_capacity(term.ops.len());
                let mut names = Vec::new();
                for (col, factor) in term.ops {
                    match factor {
                        PauliFactor::Site(site, pauli) => sites.push((col, (site, pauli))),
                        PauliFactor::Variable(name) => names.push(name),
                    }
                }
                let key = (PauliString::from_located(sites)?, Monomial::from_names(names));
                Ok((key, term.coeff))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        for (key, coeff) in parsed {
            self.accumulate_key(key, coeff);
        }
        self.prune();
        Ok(())
    }
}

impl_operator_arithmetic!(PauliOperator);

#[inline]
fn negligible(coeff: Complex64, tolerance: f64) -> bool {
    coeff.norm_sqr() <= tolerance * tolerance
}

impl FromStr for PauliOperator {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut out = Self::zero();
        out.add_str(text)?;
        Ok(out)
    }
}

impl fmt::Display for PauliOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, term) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

impl TryFrom<PauliTerm> for PauliOperator {
    type Error = ObservableError;

    fn try_from(value: PauliTerm) -> Result<Self, Self::Error> {
        Self::from_term(value)
    }
}

impl<'a> IntoIterator for &'a PauliOperator {
    type Item = PauliTermView<'a>;
    type IntoIter = Box<dyn ExactSizeIterator<Item = PauliTermView<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// One factor of a product in the Pauli text form.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PauliFactor {
    Site(u32, Pauli),
    Variable(String),
}

/// The Pauli text alphabet: `X3`, `Y0`, `Z12`, with `I` or `I<n>` for an explicit identity.  A
/// word starting with a lowercase letter, such as `theta`, is a variable.
pub(crate) struct PauliAlphabet;

impl Alphabet for PauliAlphabet {
    type Op = PauliFactor;
    const NAME: &'static str = "Pauli";
    const INTEGER_COEFFICIENTS: bool = true;

    fn parse_op(token: &Token) -> Result<Option<Self::Op>, ParseError> {
        let mut chars = token.text.chars();
        let letter = chars.next().unwrap_or_default();
        let site_text = chars.as_str();
        let pauli = match letter {
            'I' if site_text.is_empty() => return Ok(None),
            'I' => None,
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            'a'..='z' if is_variable_name(token.text) => {
                return Ok(Some(PauliFactor::Variable(token.text.to_owned())))
            }
            'a'..='z' => {
                return Err(ParseError::BadVariable {
                    col: token.col,
                    text: token.text.to_owned(),
                })
            }
            _ => {
                return Err(ParseError::UnknownOperator {
                    col: token.col,
                    symbol: token.text.to_owned(),
                    alphabet: Self::NAME,
                })
            }
        };
        if site_text.is_empty() || !site_text.bytes().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::BadSite {
                col: token.col + 1,
                text: site_text.to_owned(),
            });
        }
        let site = site_text.parse::<u32>().map_err(|_| ParseError::BadSite {
            col: token.col + 1,
            text: site_text.to_owned(),
        })?;
        Ok(pauli.map(|pauli| PauliFactor::Site(site, pauli)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qobs_circuit::c64;

    fn op(text: &str) -> PauliOperator {
        text.parse().unwrap()
    }

    fn values(pairs: &[(&str, Complex64)]) -> HashMap<String, Complex64> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn bytemuck_validation() {
        assert_eq!(Pauli::try_from(0b10), Ok(Pauli::X));
        assert_eq!(Pauli::try_from(0b11), Ok(Pauli::Y));
        assert_eq!(Pauli::try_from(0b01), Ok(Pauli::Z));
        assert!(Pauli::try_from(0).is_err());
        assert!(Pauli::try_from(4).is_err());
        assert_eq!(Pauli::from_symplectic(true, true), Some(Pauli::Y));
        assert_eq!(Pauli::from_symplectic(false, false), None);
    }

    #[test]
    fn key_is_order_independent() {
        let forward = PauliString::from_sites([(0, Pauli::X), (3, Pauli::Z), (1, Pauli::Y)]);
        let backward = PauliString::from_sites([(1, Pauli::Y), (3, Pauli::Z), (0, Pauli::X)]);
        assert_eq!(forward, backward);
        assert_eq!(forward.unwrap().id(), "X0Y1Z3");
        assert_eq!(PauliString::identity().id(), "I");
        assert_eq!(
            PauliString::from_sites([(2, Pauli::X), (0, Pauli::Z), (2, Pauli::Y)]),
            Err(ParseError::DuplicateSite { col: 2, site: 2 })
        );
    }

    #[test]
    fn combine_requires_equal_keys() {
        let a = PauliTerm::new([(0, Pauli::X)], c64!(1, 0)).unwrap();
        let b = PauliTerm::new([(0, Pauli::X)], c64!(0, 2)).unwrap();
        let c = PauliTerm::new([(0, Pauli::Z)], c64!(1, 0)).unwrap();
        assert_eq!(a.combine(&b).map(|term| term.coeff()), Some(c64!(1, 2)));
        assert_eq!(a.combine(&c), None);
        let tagged = a.clone().with_variable("theta").unwrap();
        assert_eq!(a.combine(&tagged), None);
    }

    #[test]
    fn term_constructors_reject_non_finite() {
        assert!(matches!(
            PauliTerm::new([(0, Pauli::X)], c64!(f64::NAN, 0)),
            Err(ObservableError::Numeric { ref term, .. }) if term == "X0"
        ));
        assert!(matches!(
            PauliTerm::new([(0, Pauli::X), (0, Pauli::Y)], c64!(1, 0)),
            Err(ObservableError::Parse(ParseError::DuplicateSite { .. }))
        ));
        assert!(PauliTerm::identity(c64!(f64::INFINITY, 0)).is_err());
        assert!(PauliOperator::scalar(c64!(0, f64::NAN)).is_err());

        let mut sum = op("X0");
        let z = PauliString::from_sites([(1, Pauli::Z)]).unwrap();
        assert!(sum.add_term(z.clone(), c64!(f64::INFINITY, 0)).is_err());
        assert_eq!(sum, op("X0"));
        sum.add_term(z, c64!(2, 0)).unwrap();
        assert_eq!(sum, op("X0 + 2 Z1"));

        let term = PauliTerm::new([(0, Pauli::Y)], c64!(1e300, 0)).unwrap();
        let overflowed = term.compose(&term).compose(&term);
        assert!(PauliOperator::from_term(overflowed.clone()).is_err());
        assert!(PauliOperator::try_from(overflowed).is_err());
    }

    #[test]
    fn parse_and_display() {
        let parsed = op("0.5 X0 Z1 - (0,1.2) Y2 + 3 I");
        assert_eq!(parsed.n_terms(), 3);
        assert_eq!(parsed.identity_coefficient(), c64!(3, 0));
        assert_eq!(
            parsed.to_string(),
            "(3,0) I + (0.5,0) X0 Z1 + (0,-1.2) Y2"
        );
        assert!(parsed.to_string().parse::<PauliOperator>().unwrap().is_close(&parsed, 1e-12));
        assert_eq!(PauliOperator::zero().to_string(), "0");
        assert!(op("").is_zero());
        assert!(op("0").is_zero());
        assert_eq!(op("X0 I3 Y1"), op("X0 Y1"));
        assert_eq!(op("- -X0"), op("X0"));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "X0 Q1".parse::<PauliOperator>(),
            Err(ParseError::UnknownOperator {
                col: 3,
                symbol: "Q1".into(),
                alphabet: "Pauli"
            })
        );
        assert_eq!(
            "X0 Y0".parse::<PauliOperator>(),
            Err(ParseError::DuplicateSite { col: 3, site: 0 })
        );
        assert_eq!(
            "0.5 X".parse::<PauliOperator>(),
            Err(ParseError::BadSite {
                col: 5,
                text: "".into()
            })
        );
        assert!(matches!(
            "Abc X0".parse::<PauliOperator>(),
            Err(ParseError::UnknownOperator { col: 0, .. })
        ));
        assert_eq!(
            "X0 theta^".parse::<PauliOperator>(),
            Err(ParseError::BadVariable {
                col: 3,
                text: "theta^".into()
            })
        );
        assert!(matches!(
            "X0 +".parse::<PauliOperator>(),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            "X0 2 Z1".parse::<PauliOperator>(),
            Err(ParseError::UnexpectedToken { col: 3, .. })
        ));
    }

    #[test]
    fn merge_and_prune() {
        let mut sum = op("0.25 X0 Z1");
        sum += op("0.5 Z1 X0");
        assert_eq!(sum.n_terms(), 1);
        assert_abs_diff_eq!(
            sum.get(&PauliString::from_sites([(0, Pauli::X), (1, Pauli::Z)]).unwrap()).unwrap(),
            c64!(0.75, 0)
        );
        sum -= op("0.75 X0 Z1");
        assert!(sum.is_zero());

        let tiny = op("1e-13 X0 + Y1");
        assert_eq!(tiny.n_terms(), 1);
        let loose = op("1e-3 X0 + Y1").with_tolerance(1e-2);
        assert_eq!(loose, op("Y1").with_tolerance(1e-2));
    }

    #[test]
    fn product_table() {
        let i = c64!(0, 1);
        assert_eq!(op("X0") * op("Y0"), op("Z0") * i);
        assert_eq!(op("Y0") * op("Z0"), op("X0") * i);
        assert_eq!(op("Z0") * op("X0"), op("Y0") * i);
        assert_eq!(op("Y0") * op("X0"), op("Z0") * -i);
        assert_eq!(op("Z0") * op("Y0"), op("X0") * -i);
        assert_eq!(op("X0") * op("Z0"), op("Y0") * -i);
        for label in ["X0", "Y0", "Z0"] {
            assert_eq!(op(label) * op(label), PauliOperator::identity());
        }
    }

    #[test]
    fn compose_expands_sums() {
        let left = op("X0 + Z1");
        let right = op("X0 - Z1");
        // (X0 + Z1)(X0 - Z1) = I - X0 Z1 + Z1 X0 - I = 0
        assert!((&left * &right).is_zero());
        let square = &left * &left;
        assert!(square.is_close(&op("2 I + 2 X0 Z1"), 1e-12));
        assert_eq!(left.compose(&left), Ok(square));
        let mut product = left.clone();
        product *= &right;
        assert!(product.is_zero());
    }

    #[test]
    fn scalars() {
        let base = op("X0 - 2 Y1 Z3");
        assert!((&base * c64!(0, 0)).is_zero());
        assert_eq!(&base * 1.0, base);
        assert_eq!(2.0 * base.clone(), &base + &base);
        assert_eq!(-&base, &base * -1.0);
        assert_eq!(
            base.scale(c64!(0, 1)).unwrap().adjoint(),
            base.scale(c64!(0, -1)).unwrap()
        );
    }

    #[test]
    fn commutation() {
        assert!(op("X0").commutes(&op("Z1")));
        assert!(!op("X0").commutes(&op("Z0")));
        assert!(op("X0 Z1").commutes(&op("Z0 X1")));
        // X0 and Z0 X1 overlap on one site with different Paulis.
        assert!(!op("X0 Z1 + X0").commutes(&op("Z0 X1")));
        assert!(op("I").commutes(&op("Y3")));
    }

    #[test]
    fn n_bits_respects_declared_width() {
        assert_eq!(op("X0 Z4").n_bits(), 5);
        assert_eq!(op("X0").with_num_qubits(3).n_bits(), 3);
        assert_eq!(op("X7").with_num_qubits(3).n_bits(), 8);
        assert_eq!(PauliOperator::identity().n_bits(), 0);
    }

    #[test]
    fn named_arithmetic_reports_non_finite() {
        let big = op("1e300 X0");
        assert!(matches!(
            big.compose(&big),
            Err(ObservableError::Numeric { ref term, .. }) if term == "I"
        ));
        assert_eq!(big.add(&big), Ok(op("2e300 X0")));
        let huge = op("1.7e308 X0");
        assert!(huge.add(&huge).is_err());
        assert!(huge.sub(&-&huge).is_err());
        assert_eq!(big.sub(&big), Ok(PauliOperator::zero()));
        assert!(matches!(
            op("X0").scale(c64!(f64::NAN, 0)),
            Err(ObservableError::Numeric { .. })
        ));
    }

    #[test]
    fn is_close_requires_the_same_terms() {
        let a = op("X0 + 1e-10 Z1");
        let b = op("X0");
        assert!(!a.is_close(&b, 1e-8));
        assert!(!b.is_close(&a, 1e-8));
        assert!(a.is_close(&op("1.000000001 X0 + 1e-10 Z1"), 1e-8));
        assert!(!a.is_close(&op("1.001 X0 + 1e-10 Z1"), 1e-8));
        assert!(!op("X0").is_close(&op("Y0"), 1e-8));
        assert!(!op("theta X0").is_close(&op("X0"), 1e-8));
    }

    #[test]
    fn variables_parse_and_display() {
        let sym = op("0.5 theta X0 + theta X0 + X0 - 2 phi");
        assert_eq!(sym.n_terms(), 3);
        assert!(sym.is_symbolic());
        assert!(!op("X0").is_symbolic());
        assert_eq!(sym.variables().into_iter().collect::<Vec<_>>(), vec!["phi", "theta"]);
        assert_eq!(sym.to_string(), "(-2,0) phi I + (1,0) X0 + (1.5,0) theta X0");
        assert_eq!(sym.to_string().parse::<PauliOperator>(), Ok(sym.clone()));
        let x0 = PauliString::from_sites([(0, Pauli::X)]).unwrap();
        assert_eq!(sym.get(&x0), Some(c64!(1, 0)));
        assert_eq!(
            sym.get_symbolic(&x0, &Monomial::variable("theta").unwrap()),
            Some(c64!(1.5, 0))
        );
        // Variables commute with each other and with the Pauli factors.
        assert_eq!(op("b a X0"), op("a X0 b"));
        assert_eq!(
            Monomial::variable("Theta"),
            Err(ParseError::BadVariable {
                col: 0,
                text: "Theta".into()
            })
        );
    }

    #[test]
    fn symbolic_terms_from_sites() {
        let term = PauliTerm::new([(1, Pauli::Z), (0, Pauli::X)], c64!(0.5, 0))
            .unwrap()
            .with_variable("theta")
            .unwrap();
        assert!(term.is_symbolic());
        assert_eq!(term.to_string(), "(0.5,0) theta X0 Z1");
        assert_eq!(term.to_operator().unwrap(), op("0.5 theta X0 Z1"));
        assert!(term.with_variable("x_1").unwrap().monomial().variables().eq(["theta", "x_1"]));
    }

    #[test]
    fn products_multiply_variables() {
        let product = op("theta X0") * op("2 phi X0 + Z1");
        assert_eq!(product, op("2 phi theta I + theta X0 Z1"));
        let square = op("theta Y0") * op("theta Y0");
        assert_eq!(square.to_string(), "(1,0) theta theta I");
        assert_eq!(op("(0,1) theta X0").adjoint(), op("(0,-1) theta X0"));
    }

    #[test]
    fn eval_binds_variables() {
        let sym = op("0.5 theta X0 + theta X0 + X0 - 2 phi");
        let bound = sym
            .eval(&values(&[("theta", c64!(2, 0)), ("phi", c64!(0, 1))]))
            .unwrap();
        assert!(!bound.is_symbolic());
        assert!(bound.is_close(&op("4 X0 + (0,-2) I"), 1e-12));

        let partial = op("a b X0 + a Z1").eval(&values(&[("a", c64!(3, 0))])).unwrap();
        assert_eq!(partial, op("3 b X0 + 3 Z1"));
        assert_eq!(partial.variables().into_iter().collect::<Vec<_>>(), vec!["b"]);

        // Binding can cancel a numeric term.
        let cancelled = op("X0 + t X0").eval(&values(&[("t", c64!(-1, 0))])).unwrap();
        assert!(cancelled.is_zero());

        assert_eq!(op("X0").eval(&values(&[])), Ok(op("X0")));
        assert!(matches!(
            op("t X0").eval(&values(&[("t", c64!(f64::INFINITY, 0))])),
            Err(ObservableError::Numeric { ref term, .. }) if term == "X0"
        ));
    }
}
