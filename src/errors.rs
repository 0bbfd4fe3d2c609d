use thiserror::Error;

/// The result type for the `regex2dfa` crate.
pub type Result<T> = std::result::Result<T, Regex2DfaError>;

/// A macro that constructs a new Regex2DfaError::MalformedExpression variant.
#[macro_export]
macro_rules! malformed {
    ($kind:expr) => {
        $crate::Regex2DfaError::new($crate::Regex2DfaErrorKind::MalformedExpression($kind))
    };
}

/// The error type for the `regex2dfa` crate.
#[derive(Error, Debug)]
pub struct Regex2DfaError {
    /// The kind of the error.
    pub kind: Box<Regex2DfaErrorKind>,
}

impl Regex2DfaError {
    /// Create a new `Regex2DfaError`.
    pub fn new(kind: Regex2DfaErrorKind) -> Self {
        Regex2DfaError {
            kind: Box::new(kind),
        }
    }

    /// Create a new capacity error.
    pub(crate) fn capacity(capacity: Capacity, actual: usize, limit: usize) -> Self {
        Regex2DfaError::new(Regex2DfaErrorKind::CapacityExceeded {
            capacity,
            actual,
            limit,
        })
    }

    /// Get the kind of the error.
    pub fn kind(&self) -> &Regex2DfaErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for Regex2DfaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum Regex2DfaErrorKind {
    /// The input was closed before a regular expression could be read.
    #[error("No regular expression could be read from the input")]
    InputUnavailable,

    /// A std::io error occurred.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// The expression could not be turned into an automaton.
    #[error("Malformed expression: {0}")]
    MalformedExpression(MalformedExpression),

    /// A bounded resource overflowed during compilation.
    #[error("Capacity exceeded: {capacity} is {actual}, the limit is {limit}")]
    CapacityExceeded {
        /// The resource that overflowed.
        capacity: Capacity,
        /// The size that was requested.
        actual: usize,
        /// The configured limit.
        limit: usize,
    },

    /// The NFA has more states than the fixed-width state-set representation can hold.
    #[error("Automaton too large: {states} NFA states do not fit into a {capacity} bit state set")]
    AutomatonTooLarge {
        /// The number of NFA states.
        states: usize,
        /// The number of bits of the state set.
        capacity: usize,
    },
}

impl From<std::io::Error> for Regex2DfaError {
    fn from(error: std::io::Error) -> Self {
        Regex2DfaError::new(Regex2DfaErrorKind::IoError(error))
    }
}

/// The reasons why an expression is considered malformed.
///
/// The first three variants are only reported in strict mode. In permissive mode the rewriter
/// degrades silently instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedExpression {
    /// A `(` without matching `)`.
    #[error("unmatched '(' at position {position}")]
    UnmatchedOpenParenthesis {
        /// Character position in the expression as given, counting from 0.
        position: usize,
    },

    /// A `)` without matching `(`.
    #[error("unmatched ')' at position {position}")]
    UnmatchedCloseParenthesis {
        /// Character position in the expression as given, counting from 0.
        position: usize,
    },

    /// A character that is neither operand, operator nor parenthesis.
    #[error("unrecognized character '{character}' at position {position}")]
    UnrecognizedCharacter {
        /// The offending character.
        character: char,
        /// Character position in the expression as given, counting from 0.
        position: usize,
    },

    /// An operator found fewer operands on the fragment stack than it needs.
    #[error("operator '{operator}' is missing an operand")]
    MissingOperand {
        /// The operator in its postfix notation.
        operator: char,
    },

    /// More than one fragment was left over after the postfix form was consumed.
    #[error("{count} unconnected sub-expressions are left over")]
    DanglingFragments {
        /// The number of fragments left on the stack.
        count: usize,
    },

    /// The expression contains no operand at all.
    #[error("the expression is empty")]
    Empty,
}

/// The bounded resources of a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Length of the raw expression in characters.
    ExpressionLength,
    /// Length of the augmented infix or postfix form in tokens.
    PostfixLength,
    /// Number of NFA states.
    NfaStates,
    /// Number of NFA transitions.
    NfaTransitions,
    /// Number of DFA states.
    DfaStates,
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capacity::ExpressionLength => write!(f, "expression length"),
            Capacity::PostfixLength => write!(f, "postfix length"),
            Capacity::NfaStates => write!(f, "number of NFA states"),
            Capacity::NfaTransitions => write!(f, "number of NFA transitions"),
            Capacity::DfaStates => write!(f, "number of DFA states"),
        }
    }
}
