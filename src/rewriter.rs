//! This module contains the precedence rewriter.
//! The rewriter makes concatenation explicit and converts the resulting infix form into postfix
//! notation with an operator precedence (shunting-yard) algorithm.
//!
//! Permissive mode mirrors the classic behavior: unknown characters are dropped and unbalanced
//! parentheses are ignored. Strict mode reports all of these as malformed expressions.

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    config::{CompilerConfig, Limits},
    errors::{Capacity, MalformedExpression},
    malformed, Result,
};

/// A token of the augmented infix or the postfix form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A character of the input alphabet.
    Operand(char),
    /// Binary concatenation, written `.`.
    Concat,
    /// Binary union, written `|`.
    Union,
    /// Postfix zero-or-more, written `*`.
    Star,
    /// Postfix one-or-more, written `+`.
    Plus,
    /// Postfix zero-or-one, written `?`.
    Optional,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// Any other character. It never reaches the postfix form.
    Unrecognized(char),
}

impl Token {
    /// Classify a single character of the expression.
    pub fn from_char(c: char) -> Self {
        match c {
            '.' => Token::Concat,
            '|' => Token::Union,
            '*' => Token::Star,
            '+' => Token::Plus,
            '?' => Token::Optional,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            c if is_operand(c) => Token::Operand(c),
            c => Token::Unrecognized(c),
        }
    }

    /// The character this token is written as.
    pub fn as_char(&self) -> char {
        match self {
            Token::Operand(c) | Token::Unrecognized(c) => *c,
            Token::Concat => '.',
            Token::Union => '|',
            Token::Star => '*',
            Token::Plus => '+',
            Token::Optional => '?',
            Token::OpenParen => '(',
            Token::CloseParen => ')',
        }
    }

    fn is_postfix_unary(&self) -> bool {
        matches!(self, Token::Star | Token::Plus | Token::Optional)
    }

    // A concatenation is inserted after a token that can end an operand...
    fn ends_operand(&self) -> bool {
        matches!(self, Token::Operand(_) | Token::CloseParen) || self.is_postfix_unary()
    }

    // ...and before a token that can start one.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Operand(_) | Token::OpenParen)
    }

    fn precedence(&self) -> u8 {
        match self {
            Token::Union => 1,
            Token::Concat => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Operands are ASCII letters, digits and the underscore.
pub fn is_operand(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The postfix form of an expression.
/// It only contains operands and the operators `.`, `|`, `*`, `+` and `?`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Postfix(Vec<Token>);

impl Postfix {
    /// The tokens in postfix order.
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Postfix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(""))
    }
}

// A token together with the position of the character it stems from. Inserted concatenations
// carry the position of the following character.
#[derive(Debug, Clone, Copy)]
struct Positioned {
    token: Token,
    position: usize,
}

/// Strip whitespace and make concatenation explicit.
///
/// A `.` is inserted between a left token that is an operand, `)` or a postfix operator and a
/// right token that is an operand or `(`.
pub fn insert_concatenation(expression: &str) -> Vec<Token> {
    augment(expression).into_iter().map(|p| p.token).collect()
}

// Positions count characters of the expression as given, whitespace included.
fn augment(expression: &str) -> Vec<Positioned> {
    let tokens = expression
        .chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(position, c)| Positioned {
            token: Token::from_char(c),
            position,
        })
        .collect::<Vec<_>>();
    let mut infix = Vec::with_capacity(tokens.len() * 2);
    let mut previous: Option<Token> = None;
    for positioned in tokens {
        if previous.map_or(false, |p| p.ends_operand()) && positioned.token.starts_operand() {
            infix.push(Positioned {
                token: Token::Concat,
                position: positioned.position,
            });
        }
        previous = Some(positioned.token);
        infix.push(positioned);
    }
    infix
}

/// Convert the expression into postfix form.
///
/// # Errors
/// A capacity error is returned if the expression or its augmented infix form exceed the
/// configured limits. In strict mode unbalanced parentheses and unrecognized characters are
/// reported as malformed expressions.
pub fn rewrite(expression: &str, config: &CompilerConfig) -> Result<Postfix> {
    Limits::check(
        Capacity::ExpressionLength,
        expression.chars().count(),
        config.limits.max_expression_len,
    )?;

    let infix = augment(expression);
    // The postfix form is never longer than the augmented infix.
    Limits::check(
        Capacity::PostfixLength,
        infix.len(),
        config.limits.max_postfix_len,
    )?;
    debug!("Augmented infix: {}", infix.iter().map(|p| p.token).join(""));

    let mut output = Vec::with_capacity(infix.len());
    let mut operators: Vec<Positioned> = Vec::new();

    for positioned in infix {
        let Positioned { token, position } = positioned;
        match token {
            Token::Operand(_) | Token::Star | Token::Plus | Token::Optional => output.push(token),
            Token::OpenParen => operators.push(positioned),
            Token::CloseParen => {
                let mut matched = false;
                while let Some(top) = operators.pop() {
                    if top.token == Token::OpenParen {
                        matched = true;
                        break;
                    }
                    output.push(top.token);
                }
                if !matched {
                    if config.strict {
                        return Err(malformed!(MalformedExpression::UnmatchedCloseParenthesis {
                            position
                        }));
                    }
                    warn!("Ignoring unmatched ')' at position {}", position);
                }
            }
            Token::Concat | Token::Union => {
                while let Some(top) = operators.last() {
                    if top.token == Token::OpenParen
                        || top.token.precedence() < token.precedence()
                    {
                        break;
                    }
                    output.push(top.token);
                    operators.pop();
                }
                operators.push(positioned);
            }
            Token::Unrecognized(character) => {
                if config.strict {
                    return Err(malformed!(MalformedExpression::UnrecognizedCharacter {
                        character,
                        position
                    }));
                }
                warn!(
                    "Dropping unrecognized character '{}' at position {}",
                    character, position
                );
            }
        }
    }

    while let Some(top) = operators.pop() {
        if top.token == Token::OpenParen {
            if config.strict {
                return Err(malformed!(MalformedExpression::UnmatchedOpenParenthesis {
                    position: top.position
                }));
            }
            warn!("Discarding unmatched '(' at position {}", top.position);
            continue;
        }
        output.push(top.token);
    }

    let postfix = Postfix(output);
    debug!("Postfix: {}", postfix);
    Ok(postfix)
}
