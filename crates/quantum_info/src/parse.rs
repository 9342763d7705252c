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

//! The lexing and parsing logic for the textual form of operator sums, for example
//! `0.5 X0 Z1 - (0,1.2) Y2` or `(0.5,0) 3^ 2 + 1.5 1^ 0`.
//!
//! The lexer is alphabet-agnostic: it splits the input into signs, numeric literals,
//! parenthesised complex literals and "words".  The [Alphabet] implementation decides which words
//! (and, for fermions, which bare integers) are operators.  The grammar is
//!
//! ```text
//! sum  := sign* term (sign+ term)*
//! term := coefficient? op*           (at least one of the two)
//! ```
//!
//! with the sum of the signs before a term applied to its coefficient.

use num_complex::Complex64;

use crate::error::ParseError;

/// The different types of [Token] that can be created during lexing.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum TokenType {
    Plus,
    Minus,
    Integer,
    Real,
    Complex,
    Word,
}

/// A single lexed component of the input.  The text is borrowed from the input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Token<'a> {
    pub ttype: TokenType,
    pub text: &'a str,
    /// The byte offset of the start of the token.
    pub col: usize,
    /// The numeric value, for the number-like tokens.
    pub value: Complex64,
}

impl Token<'_> {
    fn is_sign(&self) -> bool {
        matches!(self.ttype, TokenType::Plus | TokenType::Minus)
    }
}

/// Iterator over the [Token]s of an input string.
pub(crate) struct TokenStream<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn lex_complex(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let Some(close) = self.text[start..].find(')') else {
            return Err(ParseError::UnexpectedEnd {
                expected: "')' to close a complex coefficient",
            });
        };
        let end = start + close + 1;
        self.pos = end;
        let text = &self.text[start..end];
        let bad = || ParseError::BadCoefficient {
            col: start,
            text: text.to_owned(),
        };
        let (re, im) = text[1..text.len() - 1].split_once(',').ok_or_else(bad)?;
        let re = re.trim().parse::<f64>().map_err(|_| bad())?;
        let im = im.trim().parse::<f64>().map_err(|_| bad())?;
        let value = Complex64::new(re, im);
        if !value.is_finite() {
            return Err(ParseError::NonFinite {
                col: start,
                text: text.to_owned(),
            });
        }
        Ok(Token {
            ttype: TokenType::Complex,
            text,
            col: start,
            value,
        })
    }

    fn lex_chunk(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let bytes = self.text.as_bytes();
        let numeric = bytes[start].is_ascii_digit() || bytes[start] == b'.';
        let mut end = start;
        while end < bytes.len() {
            let c = bytes[end];
            let exponent_sign = numeric
                && (c == b'+' || c == b'-')
                && end > start
                && matches!(bytes[end - 1], b'e' | b'E');
            if c.is_ascii_alphanumeric() || c == b'.' || c == b'^' || c == b'_' || exponent_sign {
                end += 1;
            } else {
                break;
            }
        }
        self.pos = end;
        let text = &self.text[start..end];
        if !numeric {
            return Ok(Token {
                ttype: TokenType::Word,
                text,
                col: start,
                value: Complex64::default(),
            });
        }
        let digits = text.strip_suffix('^').unwrap_or(text);
        if digits.bytes().all(|c| c.is_ascii_digit()) {
            let ttype = if digits.len() == text.len() {
                TokenType::Integer
            } else {
                TokenType::Word
            };
            let value = digits.parse::<f64>().map_err(|_| ParseError::BadCoefficient {
                col: start,
                text: text.to_owned(),
            })?;
            return Ok(Token {
                ttype,
                text,
                col: start,
                value: Complex64::new(value, 0.0),
            });
        }
        let value = text.parse::<f64>().map_err(|_| ParseError::BadCoefficient {
            col: start,
            text: text.to_owned(),
        })?;
        if !value.is_finite() {
            return Err(ParseError::NonFinite {
                col: start,
                text: text.to_owned(),
            });
        }
        Ok(Token {
            ttype: TokenType::Real,
            text,
            col: start,
            value: Complex64::new(value, 0.0),
        })
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.peek_byte().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        let start = self.pos;
        let c = self.peek_byte()?;
        match c {
            b'+' | b'-' => {
                self.pos += 1;
                Some(Ok(Token {
                    ttype: if c == b'+' {
                        TokenType::Plus
                    } else {
                        TokenType::Minus
                    },
                    text: &self.text[start..start + 1],
                    col: start,
                    value: Complex64::default(),
                }))
            }
            b'(' => Some(self.lex_complex(start)),
            c if c.is_ascii_alphanumeric() || c == b'.' => Some(self.lex_chunk(start)),
            _ => {
                let found = self.text[start..].chars().next().unwrap_or_default();
                self.pos += found.len_utf8();
                Some(Err(ParseError::UnexpectedToken {
                    col: start,
                    expected: "a coefficient, an operator or a sign",
                    found: found.to_string(),
                }))
            }
        }
    }
}

/// The single-site operator vocabulary of one kind of operator sum.
pub(crate) trait Alphabet {
    type Op;
    /// Name used in error messages.
    const NAME: &'static str;
    /// Whether a bare integer at the start of a term is a coefficient (otherwise it is offered to
    /// [Alphabet::parse_op]).
    const INTEGER_COEFFICIENTS: bool;

    /// Interpret a token as an operator.  `Ok(None)` is an explicit identity, which contributes
    /// nothing to the product.
    fn parse_op(token: &Token) -> Result<Option<Self::Op>, ParseError>;
}

/// One summand as read from the input.  The operators are in input order, each tagged with the
/// column it started at.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ParsedTerm<Op> {
    pub coeff: Complex64,
    pub ops: Vec<(usize, Op)>,
}

/// Parse a complete sum of products in the given alphabet.  The empty string (or pure whitespace)
/// is the empty sum.
pub(crate) fn parse_sum<A: Alphabet>(text: &str) -> Result<Vec<ParsedTerm<A::Op>>, ParseError> {
    let tokens = TokenStream::new(text).collect::<Result<Vec<_>, _>>()?;
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        let mut negative = false;
        let mut saw_sign = false;
        while let Some(token) = tokens.get(pos).filter(|token| token.is_sign()) {
            negative ^= token.ttype == TokenType::Minus;
            saw_sign = true;
            pos += 1;
        }
        if !out.is_empty() && !saw_sign {
            // The previous term stopped on something that wasn't a sign.
            let token = &tokens[pos];
            return Err(ParseError::UnexpectedToken {
                col: token.col,
                expected: "an operator or a sign",
                found: token.text.to_owned(),
            });
        }
        let Some(first) = tokens.get(pos) else {
            return Err(ParseError::UnexpectedEnd {
                expected: "a term after a sign",
            });
        };
        let mut coeff = Complex64::new(1.0, 0.0);
        let mut has_coeff = false;
        match first.ttype {
            TokenType::Real | TokenType::Complex => {
                coeff = first.value;
                has_coeff = true;
                pos += 1;
            }
            TokenType::Integer if A::INTEGER_COEFFICIENTS => {
                coeff = first.value;
                has_coeff = true;
                pos += 1;
            }
            _ => (),
        }
        let mut ops = Vec::new();
        let mut saw_op = false;
        while let Some(token) = tokens.get(pos) {
            match token.ttype {
                TokenType::Word => (),
                TokenType::Integer if !A::INTEGER_COEFFICIENTS => (),
                _ => break,
            }
            if let Some(op) = A::parse_op(token)? {
                ops.push((token.col, op));
            }
            saw_op = true;
            pos += 1;
        }
        if !has_coeff && !saw_op {
            let token = &tokens[pos];
            return Err(ParseError::UnexpectedToken {
                col: token.col,
                expected: "a coefficient or an operator",
                found: token.text.to_owned(),
            });
        }
        out.push(ParsedTerm {
            coeff: if negative { -coeff } else { coeff },
            ops,
        });
    }
    Ok(out)
}

/// Parse a computational-basis state written as a string of `0` and `1`.  Character `k` is the
/// value of site `k`.
pub fn parse_bitstring(text: &str) -> Result<Vec<bool>, ParseError> {
    text.char_indices()
        .map(|(col, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            found => Err(ParseError::BadBit { col, found }),
        })
        .collect()
}

/// Format a basis state in the form accepted by [parse_bitstring].
pub fn format_bitstring(state: &[bool]) -> String {
    state.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}

/// Format a coefficient in the form accepted by the lexer.
pub(crate) fn format_coeff(coeff: Complex64) -> String {
    format!("({},{})", coeff.re, coeff.im)
}

#[cfg(test)]
mod test {
    use super::*;

    fn types(text: &str) -> Vec<TokenType> {
        TokenStream::new(text)
            .map(|token| token.unwrap().ttype)
            .collect()
    }

    #[test]
    fn lex_mixed_input() {
        assert_eq!(
            types("0.5 X0 Z12 - (1,-2.5) Y2 + 3 1^ 0"),
            vec![
                TokenType::Real,
                TokenType::Word,
                TokenType::Word,
                TokenType::Minus,
                TokenType::Complex,
                TokenType::Word,
                TokenType::Plus,
                TokenType::Integer,
                TokenType::Word,
                TokenType::Integer,
            ]
        );
    }

    #[test]
    fn lex_exponents() {
        let tokens = TokenStream::new("1.5e-3 X0 2E+2")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens[0].value, Complex64::new(1.5e-3, 0.0));
        assert_eq!(tokens[2].value, Complex64::new(200.0, 0.0));
    }

    #[test]
    fn lex_errors() {
        assert!(matches!(
            TokenStream::new("(1,2").next(),
            Some(Err(ParseError::UnexpectedEnd { .. }))
        ));
        assert!(matches!(
            TokenStream::new("(1;2)").next(),
            Some(Err(ParseError::BadCoefficient { col: 0, .. }))
        ));
        assert!(matches!(
            TokenStream::new("1.2.3").next(),
            Some(Err(ParseError::BadCoefficient { col: 0, .. }))
        ));
        assert!(matches!(
            TokenStream::new("1e999").next(),
            Some(Err(ParseError::NonFinite { .. }))
        ));
        assert!(matches!(
            TokenStream::new("  $").next(),
            Some(Err(ParseError::UnexpectedToken { col: 2, .. }))
        ));
    }

    #[test]
    fn bitstrings() {
        assert_eq!(parse_bitstring("0110"), Ok(vec![false, true, true, false]));
        assert_eq!(format_bitstring(&[true, false]), "10");
        assert_eq!(
            parse_bitstring("01x"),
            Err(ParseError::BadBit { col: 2, found: 'x' })
        );
    }
}
