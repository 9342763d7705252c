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

//! Weighted sums of products of fermionic creation and annihilation operators.
//!
//! Every product is stored in normal order (see [normal_order]), and that ordered sequence is the
//! canonical key.  Arithmetic expands products back into normal order, so two operators that are
//! equal as algebra elements have identical term maps.

pub mod jordan_wigner;
pub mod normal_order;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::{EitherOrBoth, Itertools};
use ndarray::{Array2, ArrayD};
use num_complex::Complex64;
use num_traits::Zero;
use smallvec::SmallVec;

use qobs_circuit::util::{C_M_ONE, C_ONE, C_ZERO};

use crate::arithmetic::impl_operator_arithmetic;
use crate::config::default_tolerance;
use crate::error::{ConfigError, ObservableError, ParseError};
use crate::parse::{self, Alphabet, Token, TokenType};

pub use normal_order::normal_order;

/// A single creation (`dagger`) or annihilation operator on one mode.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ladder {
    pub mode: u32,
    pub dagger: bool,
}

impl Ladder {
    #[inline]
    pub fn creation(mode: u32) -> Self {
        Self { mode, dagger: true }
    }

    #[inline]
    pub fn annihilation(mode: u32) -> Self {
        Self {
            mode,
            dagger: false,
        }
    }

    #[inline]
    pub fn adjoint(&self) -> Self {
        Self {
            mode: self.mode,
            dagger: !self.dagger,
        }
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dagger {
            write!(f, "{}^", self.mode)
        } else {
            write!(f, "{}", self.mode)
        }
    }
}

/// The canonical key of a fermionic term: a normal-ordered ladder sequence.  Empty is the
/// identity.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FermionString(SmallVec<[Ladder; 4]>);

impl FermionString {
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ladder> + ExactSizeIterator + '_ {
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

    #[inline]
    pub fn as_slice(&self) -> &[Ladder] {
        &self.0
    }

    pub fn max_mode(&self) -> Option<u32> {
        self.0.iter().map(|ladder| ladder.mode).max()
    }

    /// The identifier used in messages and instruction names, for example `3^ 2^ 1 0`.  The
    /// identity is `I`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FermionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("I");
        }
        for (i, ladder) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", ladder)?;
        }
        Ok(())
    }
}

/// A single normal-ordered product with a coefficient.
#[derive(Clone, Debug, PartialEq)]
pub struct FermionTerm {
    coeff: Complex64,
    ladders: FermionString,
}

impl FermionTerm {
    /// The normal-ordered product of the given ladders with this coefficient.  The input order is
    /// irrelevant: the ladders name the factors, and the term is their product written in normal
    /// order.  `Ok(None)` if a ladder repeats, since that product is zero.  The coefficient must
    /// be finite.
    ///
    /// To multiply out ladders in a specific order, with the signs that implies, use
    /// [FermionOperator::from_product].
    pub fn new(
        ladders: impl IntoIterator<Item = Ladder>,
        coeff: Complex64,
    ) -> Result<Option<Self>, ObservableError> {
        let mut ladders: SmallVec<[Ladder; 4]> = ladders.into_iter().collect();
        ladders.sort_by(|left, right| {
            right
                .dagger
                .cmp(&left.dagger)
                .then_with(|| right.mode.cmp(&left.mode))
        });
        let ladders = FermionString(ladders);
        check_coeff(&ladders, coeff)?;
        if ladders.0.windows(2).any(|pair| pair[0] == pair[1]) {
            return Ok(None);
        }
        Ok(Some(Self { coeff, ladders }))
    }

    pub fn identity(coeff: Complex64) -> Result<Self, ObservableError> {
        let ladders = FermionString::identity();
        check_coeff(&ladders, coeff)?;
        Ok(Self { coeff, ladders })
    }

    #[inline]
    pub fn key(&self) -> &FermionString {
        &self.ladders
    }

    #[inline]
    pub fn coeff(&self) -> Complex64 {
        self.coeff
    }

    #[inline]
    pub fn ladders(&self) -> &FermionString {
        &self.ladders
    }

    pub fn view(&self) -> FermionTermView<'_> {
        FermionTermView {
            coeff: self.coeff,
            ladders: &self.ladders,
        }
    }

    /// Sum two terms with the same key.  `None` if the keys differ.
    pub fn combine(&self, other: &FermionTerm) -> Option<FermionTerm> {
        (self.ladders == other.ladders).then(|| FermionTerm {
            coeff: self.coeff + other.coeff,
            ladders: self.ladders.clone(),
        })
    }

    pub fn to_operator(&self) -> Result<FermionOperator, ObservableError> {
        FermionOperator::from_term(self.clone())
    }
}

impl fmt::Display for FermionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", parse::format_coeff(self.coeff), self.ladders)
    }
}

/// A borrowed view onto one term of a [FermionOperator].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FermionTermView<'a> {
    pub coeff: Complex64,
    pub ladders: &'a FermionString,
}

impl FermionTermView<'_> {
    pub fn to_term(&self) -> FermionTerm {
        FermionTerm {
            coeff: self.coeff,
            ladders: self.ladders.clone(),
        }
    }

    #[inline]
    pub fn key(&self) -> &FermionString {
        self.ladders
    }
}

/// A weighted sum of normal-ordered fermionic products.
#[derive(Clone, Debug, PartialEq)]
pub struct FermionOperator {
    terms: BTreeMap<FermionString, Complex64>,
    /// Declared lower bound on the number of modes.
    num_modes: u32,
    tolerance: f64,
}

impl Default for FermionOperator {
    fn default() -> Self {
        Self::zero()
    }
}

impl FermionOperator {
    pub fn zero() -> Self {
        Self {
            terms: BTreeMap::new(),
            num_modes: 0,
            tolerance: default_tolerance(),
        }
    }

    pub fn identity() -> Self {
        let mut out = Self::zero();
        out.accumulate(FermionString::identity(), C_ONE);
        out
    }

    pub fn scalar(coeff: Complex64) -> Result<Self, ObservableError> {
        let mut out = Self::zero();
        out.add_term(FermionString::identity(), coeff)?;
        Ok(out)
    }

    pub fn from_term(term: FermionTerm) -> Result<Self, ObservableError> {
        let mut out = Self::zero();
        out.add_term(term.ladders, term.coeff)?;
        Ok(out)
    }

    /// The product `coeff * ladders[0] * ladders[1] * ...`, in that order, expanded into normal
    /// order.
    pub fn from_product(ladders: &[Ladder], coeff: Complex64) -> Result<Self, ObservableError> {
        check_coeff(&FermionString(ladders.iter().copied().collect()), coeff)?;
        let mut out = Self::zero();
        out.accumulate_product(ladders, coeff);
        out.prune();
        Ok(out)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self.prune();
        self
    }

    pub fn with_num_modes(mut self, num_modes: u32) -> Self {
        self.num_modes = num_modes;
        self
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    pub fn num_modes(&self) -> u32 {
        self.num_modes
    }

    pub fn set_num_modes(&mut self, num_modes: u32) {
        self.num_modes = num_modes;
    }

    /// The larger of the declared mode count and one more than the highest mode used.
    pub fn n_bits(&self) -> usize {
        let used = self
            .terms
            .keys()
            .filter_map(FermionString::max_mode)
            .max()
            .map_or(0, |mode| mode as usize + 1);
        used.max(self.num_modes as usize)
    }

    #[inline]
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate through the terms in key order.  Each call starts from the beginning.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = FermionTermView<'_>> + '_ {
        self.terms
            .iter()
            .map(|(ladders, coeff)| FermionTermView {
                coeff: *coeff,
                ladders,
            })
    }

    pub fn get(&self, key: &FermionString) -> Option<Complex64> {
        self.terms.get(key).copied()
    }

    pub fn identity_coefficient(&self) -> Complex64 {
        self.get(&FermionString::identity()).unwrap_or(C_ZERO)
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Add a single normal-ordered term, merging with an existing term of the same key.  A
    /// non-finite coefficient is rejected and leaves `self` unchanged.
    pub fn add_term(
        &mut self,
        ladders: FermionString,
        coeff: Complex64,
    ) -> Result<(), ObservableError> {
        check_coeff(&ladders, coeff)?;
        self.accumulate(ladders, coeff);
        self.prune();
        Ok(())
    }

    fn accumulate(&mut self, ladders: FermionString, coeff: Complex64) {
        *self.terms.entry(ladders).or_insert(C_ZERO) += coeff;
    }

    fn accumulate_product(&mut self, ladders: &[Ladder], coeff: Complex64) {
        for (key, coeff) in normal_order(ladders, coeff) {
            self.accumulate(key, coeff);
        }
    }

    fn prune(&mut self) {
        let before = self.terms.len();
        let tolerance = self.tolerance;
        self.terms.retain(|_, coeff| !negligible(*coeff, tolerance));
        let removed = before - self.terms.len();
        if removed > 0 {
            tracing::trace!(removed, remaining = self.terms.len(), "pruned negligible terms");
        }
    }

    pub(crate) fn merge_from(&mut self, other: &FermionOperator, factor: Complex64) {
        self.num_modes = self.num_modes.max(other.num_modes);
        for (ladders, coeff) in other.terms.iter() {
            self.accumulate(ladders.clone(), coeff * factor);
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

    /// The operator product `self · other`.  Each pair of terms is concatenated and re-ordered,
    /// which can give zero, one or several terms.  The result is not checked.
    pub(crate) fn expand_product(&self, other: &FermionOperator) -> FermionOperator {
        let mut out = FermionOperator {
            terms: BTreeMap::new(),
            num_modes: self.num_modes.max(other.num_modes),
            tolerance: self.tolerance,
        };
        let mut buffer = Vec::new();
        for ((left, left_coeff), (right, right_coeff)) in
            self.terms.iter().cartesian_product(other.terms.iter())
        {
            buffer.clear();
            buffer.extend_from_slice(left.as_slice());
            buffer.extend_from_slice(right.as_slice());
            out.accumulate_product(&buffer, left_coeff * right_coeff);
        }
        out.prune();
        out
    }

    /// The Hermitian conjugate: each product is reversed with every ladder conjugated, then
    /// brought back into normal order.
    pub fn adjoint(&self) -> FermionOperator {
        let mut out = FermionOperator {
            terms: BTreeMap::new(),
            num_modes: self.num_modes,
            tolerance: self.tolerance,
        };
        for (ladders, coeff) in self.terms.iter() {
            let reversed = ladders.iter().rev().map(|ladder| ladder.adjoint()).collect::<Vec<_>>();
            out.accumulate_product(&reversed, coeff.conj());
        }
        out.prune();
        out
    }

    /// Do the two operators have the same keys, with coefficients that differ by at most `tol`?
    pub fn is_close(&self, other: &FermionOperator, tol: f64) -> bool {
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

    pub fn validate(&self) -> Result<(), ObservableError> {
        self.terms
            .iter()
            .try_for_each(|(ladders, coeff)| check_coeff(ladders, *coeff))
    }

    /// The sum `self + other`.  Fails if a merged coefficient is not finite.
    pub fn add(&self, other: &FermionOperator) -> Result<FermionOperator, ObservableError> {
        let mut out = self.clone();
        out.merge_from(other, C_ONE);
        out.validate()?;
        Ok(out)
    }

    pub fn sub(&self, other: &FermionOperator) -> Result<FermionOperator, ObservableError> {
        let mut out = self.clone();
        out.merge_from(other, C_M_ONE);
        out.validate()?;
        Ok(out)
    }

    /// The normal-ordered product `self · other`.  Fails if a coefficient overflows.
    pub fn compose(&self, other: &FermionOperator) -> Result<FermionOperator, ObservableError> {
        let out = self.expand_product(other);
        out.validate()?;
        Ok(out)
    }

    pub fn scale(&self, factor: Complex64) -> Result<FermionOperator, ObservableError> {
        let mut out = self.clone();
        out.scale_in_place(factor);
        out.validate()?;
        Ok(out)
    }

    /// Parse `text` and add it into `self`.  Each product is read in the order written and
    /// normal-ordered.  On error, `self` is unchanged.
    pub fn add_str(&mut self, text: &str) -> Result<(), ParseError> {
        let parsed = parse::parse_sum::<FermionAlphabet>(text)?;
        for term in parsed {
            let ladders = term.ops.iter().map(|(_, ladder)| *ladder).collect::<Vec<_>>();
            self.accumulate_product(&ladders, term.coeff);
        }
        self.prune();
        Ok(())
    }

    /// Add the one-body part `Σ h[p, q] a†_p a_q` of a second-quantized Hamiltonian.
    ///
    /// `key` is only used to label errors.
    pub fn add_one_body(&mut self, key: &str, integrals: &Array2<f64>) -> Result<(), ConfigError> {
        let (rows, cols) = integrals.dim();
        if rows != cols {
            return Err(ConfigError::BadShape {
                key: key.to_owned(),
                shape: vec![rows, cols],
                expected: "a square matrix".to_owned(),
            });
        }
        check_finite(key, integrals.iter())?;
        for ((p, q), value) in integrals.indexed_iter() {
            if *value == 0.0 {
                continue;
            }
            self.accumulate_product(
                &[Ladder::creation(p as u32), Ladder::annihilation(q as u32)],
                Complex64::new(*value, 0.0),
            );
        }
        self.num_modes = self.num_modes.max(rows as u32);
        self.prune();
        Ok(())
    }

    /// Add the two-body part `½ Σ h[p, q, r, s] a†_p a†_q a_r a_s`.
    pub fn add_two_body(&mut self, key: &str, integrals: &ArrayD<f64>) -> Result<(), ConfigError> {
        let shape = integrals.shape();
        if shape.len() != 4 || shape.iter().any(|dim| *dim != shape[0]) {
            return Err(ConfigError::BadShape {
                key: key.to_owned(),
                shape: shape.to_vec(),
                expected: "a rank-4 tensor with equal dimensions".to_owned(),
            });
        }
        check_finite(key, integrals.iter())?;
        for (index, value) in integrals.indexed_iter() {
            if *value == 0.0 {
                continue;
            }
            let ladders = [
                Ladder::creation(index[0] as u32),
                Ladder::creation(index[1] as u32),
                Ladder::annihilation(index[2] as u32),
                Ladder::annihilation(index[3] as u32),
            ];
            self.accumulate_product(&ladders, Complex64::new(0.5 * value, 0.0));
        }
        self.num_modes = self.num_modes.max(shape[0] as u32);
        self.prune();
        Ok(())
    }
}

impl_operator_arithmetic!(FermionOperator);

#[inline]
fn negligible(coeff: Complex64, tolerance: f64) -> bool {
    coeff.norm_sqr() <= tolerance * tolerance
}

fn check_coeff(ladders: &FermionString, coeff: Complex64) -> Result<(), ObservableError> {
    if coeff.is_finite() {
        Ok(())
    } else {
        Err(ObservableError::Numeric {
            term: ladders.id(),
            coeff,
        })
    }
}

fn check_finite<'a>(key: &str, mut values: impl Iterator<Item = &'a f64>) -> Result<(), ConfigError> {
    if values.all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            reason: "contains a non-finite entry".to_owned(),
        })
    }
}

impl FromStr for FermionOperator {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut out = Self::zero();
        out.add_str(text)?;
        Ok(out)
    }
}

impl fmt::Display for FermionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            // A bare `0` would read back as a mode.
            return f.write_str("0.0");
        }
        for (i, term) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{} {}", parse::format_coeff(term.coeff), term.ladders)?;
        }
        Ok(())
    }
}

impl TryFrom<FermionTerm> for FermionOperator {
    type Error = ObservableError;

    fn try_from(value: FermionTerm) -> Result<Self, Self::Error> {
        Self::from_term(value)
    }
}

/// The fermion text alphabet: `3^` is a creation operator on mode 3, a bare `3` the annihilation
/// operator, and `I` an explicit identity.
pub(crate) struct FermionAlphabet;

impl Alphabet for FermionAlphabet {
    type Op = Ladder;
    const NAME: &'static str = "fermion";
    const INTEGER_COEFFICIENTS: bool = false;

    fn parse_op(token: &Token) -> Result<Option<Self::Op>, ParseError> {
        if token.text == "I" {
            return Ok(None);
        }
        let (digits, dagger) = match token.text.strip_suffix('^') {
            Some(digits) => (digits, true),
            None if token.ttype == TokenType::Integer => (token.text, false),
            None => {
                return Err(ParseError::UnknownOperator {
                    col: token.col,
                    symbol: token.text.to_owned(),
                    alphabet: Self::NAME,
                })
            }
        };
        if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::UnknownOperator {
                col: token.col,
                symbol: token.text.to_owned(),
                alphabet: Self::NAME,
            });
        }
        let mode = digits.parse::<u32>().map_err(|_| ParseError::BadSite {
            col: token.col,
            text: digits.to_owned(),
        })?;
        Ok(Some(Ladder { mode, dagger }))
    }
}
