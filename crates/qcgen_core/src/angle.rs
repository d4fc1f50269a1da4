//! Angle expression evaluation
//!
//! Gantree: L2_Normalize → AngleEvaluator
//!
//! A small recursive-descent evaluator for rotation angles over tokens
//! produced by a `logos` lexer:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | 'pi' | 'π' | '(' expr ')'
//! ```
//!
//! Nothing outside this grammar is evaluated. Nesting of parentheses and
//! unary signs is capped at [`MAX_ANGLE_DEPTH`].

use crate::constants::assembly::MAX_ANGLE_DEPTH;
use logos::{Lexer, Logos};
use std::f64::consts::PI;
use thiserror::Error;

/// Strict evaluation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AngleError {
    /// Nothing but whitespace
    #[error("empty angle expression")]
    Empty,

    /// Character outside the grammar
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// Offending character
        ch: char,
        /// Byte offset in the expression
        pos: usize,
    },

    /// Name other than `pi`
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// Numeric literal that does not parse
    #[error("malformed number '{0}'")]
    InvalidNumber(String),

    /// Expression stops where an operand is required
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Token in operand position that cannot start one
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    /// Missing `(` or `)`
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// Divisor evaluated to zero
    #[error("division by zero")]
    DivisionByZero,

    /// Result is NaN or infinite
    #[error("result is not finite")]
    NonFinite,

    /// Parentheses or unary signs nested deeper than the limit
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluate an angle expression, falling back to `0.0` on any failure
/// Gantree: evaluate_angle(s) -> f64 // 관대한 평가
pub fn evaluate_angle(expr: &str) -> f64 {
    match try_evaluate_angle(expr) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("angle '{}' could not be evaluated ({}), using 0.0", expr, err);
            0.0
        }
    }
}

/// Evaluate an angle expression, reporting why it failed
/// Gantree: try_evaluate_angle(s) -> Result<f64> // 엄격한 평가
pub fn try_evaluate_angle(expr: &str) -> Result<f64, AngleError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(AngleError::Empty);
    }

    let value = if is_expression(trimmed) {
        let mut parser = Parser::new(tokenize(trimmed)?);
        let value = parser.expr()?;
        if parser.pos < parser.tokens.len() {
            return Err(match parser.tokens[parser.pos].kind {
                AngleToken::RParen => AngleError::UnbalancedParens,
                _ => AngleError::UnexpectedToken(parser.tokens[parser.pos].offset),
            });
        }
        value
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_| AngleError::InvalidNumber(trimmed.to_string()))?
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(AngleError::NonFinite)
    }
}

/// Check if the text needs the expression grammar rather than a plain parse
pub fn is_expression(s: &str) -> bool {
    s.to_ascii_lowercase().contains("pi")
        || s.contains('π')
        || s.contains(|c: char| matches!(c, '+' | '-' | '*' | '/' | '(' | ')'))
}

// ============================================================================
// Lexer
// ============================================================================

/// Tokens of the angle grammar
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum AngleToken {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", number)]
    Number(f64),

    #[token("pi", priority = 10, ignore(ascii_case))]
    #[token("π")]
    Pi,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

fn number(lex: &mut Lexer<AngleToken>) -> Option<f64> {
    lex.slice().parse().ok()
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: AngleToken,
    offset: usize,
}

fn tokenize(s: &str) -> Result<Vec<Token>, AngleError> {
    let mut lexer = AngleToken::lexer(s);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let offset = lexer.span().start;
        match result {
            Ok(AngleToken::Ident) => {
                return Err(AngleError::UnknownIdentifier(lexer.slice().to_string()))
            }
            Ok(kind) => tokens.push(Token { kind, offset }),
            Err(()) => {
                let ch = s[offset..].chars().next().unwrap_or_default();
                return Err(if ch.is_ascii_digit() || ch == '.' {
                    AngleError::InvalidNumber(s[offset..].to_string())
                } else {
                    AngleError::UnexpectedChar { ch, pos: offset }
                });
            }
        }
    }

    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<AngleToken> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn next(&mut self) -> Option<AngleToken> {
        let kind = self.peek();
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    /// Run `rule` one nesting level down
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<f64, AngleError>,
    ) -> Result<f64, AngleError> {
        if self.depth >= MAX_ANGLE_DEPTH {
            return Err(AngleError::TooDeep(MAX_ANGLE_DEPTH));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<f64, AngleError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(AngleToken::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(AngleToken::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, AngleError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(AngleToken::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(AngleToken::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(AngleError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, AngleError> {
        match self.peek() {
            Some(AngleToken::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(AngleToken::Minus) => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, AngleError> {
        let offset = self.tokens.get(self.pos).map(|t| t.offset);
        match self.next() {
            Some(AngleToken::Number(v)) => Ok(v),
            Some(AngleToken::Pi) => Ok(PI),
            Some(AngleToken::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(AngleToken::RParen) => Ok(value),
                    _ => Err(AngleError::UnbalancedParens),
                }
            }
            Some(_) => Err(AngleError::UnexpectedToken(offset.unwrap_or(0))),
            None => Err(AngleError::UnexpectedEnd),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pi_fractions() {
        assert_abs_diff_eq!(evaluate_angle("pi/2"), PI / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(evaluate_angle("3*pi/4"), 3.0 * PI / 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(evaluate_angle("PI"), PI, epsilon = 1e-9);
        assert_abs_diff_eq!(evaluate_angle("π/4"), PI / 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(evaluate_angle("-pi/8"), -PI / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_int_times_pi_over_int() {
        for n in 1..6 {
            for d in 1..9 {
                let expr = format!("{}*pi/{}", n, d);
                let expected = n as f64 * PI / d as f64;
                assert_abs_diff_eq!(evaluate_angle(&expr), expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_plain_decimals() {
        assert_eq!(evaluate_angle("1.5708"), 1.5708);
        assert_eq!(evaluate_angle("0.5"), 0.5);
        assert_eq!(evaluate_angle(" 2 "), 2.0);
        assert_eq!(evaluate_angle("1e-3"), 1e-3);
        assert_eq!(evaluate_angle(".25"), 0.25);
    }

    #[test]
    fn test_arithmetic() {
        assert_abs_diff_eq!(evaluate_angle("(1+2)*3"), 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evaluate_angle("2*(pi - pi/2)"), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(evaluate_angle("1 - -1"), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_is_zero() {
        for bad in [
            "", "abc", "pi/", "(pi", "pi)", "1/0", "2pi", "__import__('os')", "pi**2", "nan",
            "inf", "1..2",
        ] {
            assert_eq!(evaluate_angle(bad), 0.0, "input {:?}", bad);
        }
    }

    #[test]
    fn test_deep_nesting_is_zero() {
        let parens = format!("{}pi{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(evaluate_angle(&parens), 0.0);
        assert_eq!(
            try_evaluate_angle(&parens),
            Err(AngleError::TooDeep(MAX_ANGLE_DEPTH))
        );

        let signs = format!("{}1", "-".repeat(50_000));
        assert_eq!(evaluate_angle(&signs), 0.0);

        let at_limit = format!(
            "{}pi{}",
            "(".repeat(MAX_ANGLE_DEPTH),
            ")".repeat(MAX_ANGLE_DEPTH)
        );
        assert_abs_diff_eq!(evaluate_angle(&at_limit), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_strict_reasons() {
        assert_eq!(try_evaluate_angle(""), Err(AngleError::Empty));
        assert_eq!(try_evaluate_angle("1/0"), Err(AngleError::DivisionByZero));
        assert_eq!(try_evaluate_angle("(1+2"), Err(AngleError::UnbalancedParens));
        assert_eq!(try_evaluate_angle("1+2)"), Err(AngleError::UnbalancedParens));
        assert!(matches!(
            try_evaluate_angle("theta/2"),
            Err(AngleError::UnknownIdentifier(_))
        ));
        assert_eq!(
            try_evaluate_angle("pi % 2"),
            Err(AngleError::UnexpectedChar { ch: '%', pos: 3 })
        );
    }
}
