//! Parsing of linear-predictor formulas.
//!
//! A formula has the form `y ~ c0 + c1*x1 + c2*x2 + ...`: a response name, a
//! bare intercept coefficient, and any number of `coefficient*variable`
//! terms. Parsing runs in two passes, a tokenizer over the raw text and a
//! term parser over the tokens, and every failure maps to one
//! [`FormulaError`] variant.
//!
//! ```
//! use glmm_data::parse_formula;
//!
//! let formula = parse_formula("y ~ 1.4 + 3.15*x1 + 2.5*x2").expect("valid formula");
//!
//! assert_eq!(formula.response(), "y");
//! assert_eq!(formula.coefficients(), &[1.4, 3.15, 2.5]);
//! assert_eq!(formula.variable_names(), &["Intercept", "x1", "x2"]);
//! ```

use std::str::FromStr;

use crate::dataset::{ETA_COLUMN, GROUP_INDEX_COLUMN, INTERCEPT_COLUMN, RESPONSE_COLUMN};
use crate::error::FormulaError;

/// Names that a formula variable may not take.
const RESERVED_NAMES: [&str; 4] = [
    INTERCEPT_COLUMN,
    ETA_COLUMN,
    GROUP_INDEX_COLUMN,
    RESPONSE_COLUMN,
];

/// A parsed linear-predictor formula.
///
/// Coefficients and variable names are aligned one to one. The first entry
/// is always the intercept, named [`INTERCEPT_COLUMN`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    response: String,
    coefficients: Vec<f64>,
    variable_names: Vec<String>,
}

impl ParsedFormula {
    /// Returns the response name written left of `~`.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Returns the coefficients, intercept first.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Returns the variable names, starting with the intercept name.
    #[must_use]
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// Returns the intercept coefficient.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or_default()
    }

    /// Iterates over the `(name, coefficient)` pairs of the non-intercept
    /// terms.
    pub fn covariates(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variable_names
            .iter()
            .zip(&self.coefficients)
            .skip(1)
            .map(|(name, &coefficient)| (name.as_str(), coefficient))
    }
}

impl FromStr for ParsedFormula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_formula(s)
    }
}

/// Parses a formula string.
///
/// # Errors
///
/// Returns [`FormulaError`] when the text does not follow the grammar: a
/// missing `~`, a response that is not a single name, an intercept with a
/// variable, a later term without exactly one `*`, an unparsable
/// coefficient, or a duplicate or reserved variable name.
pub fn parse_formula(input: &str) -> Result<ParsedFormula, FormulaError> {
    let tokens = tokenize(input)?;
    Parser::new(&tokens).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Tilde,
    Plus,
    Minus,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, FormulaError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&byte) = bytes.get(pos) {
        let (kind, len) = match byte {
            b' ' | b'\t' | b'\n' | b'\r' => {
                pos += 1;
                continue;
            }
            b'~' => (TokenKind::Tilde, 1),
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' => (TokenKind::Star, 1),
            b'0'..=b'9' | b'.' => (TokenKind::Number, number_len(bytes, pos)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => (TokenKind::Ident, ident_len(bytes, pos)),
            _ => {
                let ch = input
                    .get(pos..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(FormulaError::UnexpectedCharacter { ch, position: pos });
            }
        };
        let text = input.get(pos..pos + len).unwrap_or_default();
        tokens.push(Token { kind, text });
        pos += len;
    }

    Ok(tokens)
}

/// Length of the number starting at `start`: digits and dots, then an
/// optional exponent when it is followed by at least one digit.
fn number_len(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while bytes
        .get(end)
        .is_some_and(|b| b.is_ascii_digit() || *b == b'.')
    {
        end += 1;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let digits_at = if matches!(bytes.get(end + 1), Some(b'+' | b'-')) {
            end + 2
        } else {
            end + 1
        };
        if bytes.get(digits_at).is_some_and(u8::is_ascii_digit) {
            end = digits_at;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
    }
    end - start
}

fn ident_len(bytes: &[u8], start: usize) -> usize {
    bytes
        .iter()
        .skip(start)
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'.')
        .count()
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
}

impl<'t, 'a> Parser<'t, 'a> {
    const fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens }
    }

    fn parse(&self) -> Result<ParsedFormula, FormulaError> {
        let tilde = self
            .tokens
            .iter()
            .position(|token| token.kind == TokenKind::Tilde)
            .ok_or(FormulaError::MissingTilde)?;
        let (lhs, rest) = self.tokens.split_at(tilde);
        let rhs = rest.get(1..).unwrap_or_default();

        let response = match lhs {
            [token] if token.kind == TokenKind::Ident => token.text.to_owned(),
            _ => return Err(FormulaError::MissingResponse),
        };

        let mut coefficients = Vec::new();
        let mut variable_names = vec![INTERCEPT_COLUMN.to_owned()];

        for (index, term) in rhs.split(|token| token.kind == TokenKind::Plus).enumerate() {
            let parsed = parse_term(term, index)?;
            coefficients.push(parsed.coefficient);
            match (index, parsed.variable) {
                (0, None) => {}
                (0, Some(_)) => return Err(FormulaError::InterceptHasVariable),
                (_, None) => return Err(FormulaError::MissingVariable { index }),
                (_, Some(name)) => {
                    check_variable_name(name, &variable_names)?;
                    variable_names.push(name.to_owned());
                }
            }
        }

        Ok(ParsedFormula {
            response,
            coefficients,
            variable_names,
        })
    }
}

struct Term<'a> {
    coefficient: f64,
    variable: Option<&'a str>,
}

/// Parses `['-'] NUMBER ['*' IDENT]`.
fn parse_term<'a>(term: &[Token<'a>], index: usize) -> Result<Term<'a>, FormulaError> {
    if term.is_empty() {
        return Err(FormulaError::EmptyTerm { index });
    }
    if term.iter().any(|token| token.kind == TokenKind::Tilde) {
        return Err(FormulaError::UnexpectedToken { index });
    }
    let stars = term
        .iter()
        .filter(|token| token.kind == TokenKind::Star)
        .count();
    if stars > 1 {
        return Err(if index == 0 {
            FormulaError::InterceptHasVariable
        } else {
            FormulaError::TooManyFactors { index }
        });
    }

    let (negative, unsigned) = match term {
        [first, rest @ ..] if first.kind == TokenKind::Minus => (true, rest),
        _ => (false, term),
    };

    let (number, tail) = match unsigned {
        [number, tail @ ..] if number.kind == TokenKind::Number => (number, tail),
        [other, ..] => {
            return Err(FormulaError::InvalidCoefficient {
                text: other.text.to_owned(),
            });
        }
        [] => return Err(FormulaError::UnexpectedToken { index }),
    };
    let magnitude = number
        .text
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FormulaError::InvalidCoefficient {
            text: number.text.to_owned(),
        })?;
    let coefficient = if negative { -magnitude } else { magnitude };

    let variable = match tail {
        [] => None,
        [star, name] if star.kind == TokenKind::Star && name.kind == TokenKind::Ident => {
            Some(name.text)
        }
        [star] if star.kind == TokenKind::Star => {
            return Err(if index == 0 {
                FormulaError::InterceptHasVariable
            } else {
                FormulaError::MissingVariable { index }
            });
        }
        _ => return Err(FormulaError::UnexpectedToken { index }),
    };

    Ok(Term {
        coefficient,
        variable,
    })
}

fn check_variable_name(name: &str, seen: &[String]) -> Result<(), FormulaError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(FormulaError::ReservedName {
            name: name.to_owned(),
        });
    }
    if seen.iter().any(|existing| existing == name) {
        return Err(FormulaError::DuplicateVariable {
            name: name.to_owned(),
        });
    }
    Ok(())
}
