#![forbid(missing_docs)]
//! The `regex2dfa` crate compiles regular expressions into finite automata.
//!
//! The pipeline has three stages:
//! 1. The precedence rewriter makes concatenation explicit and converts the infix expression into
//!    postfix form.
//! 2. Thompson's construction builds an NFA with epsilon transitions from the postfix form.
//! 3. Subset construction turns the NFA into a DFA.
//!
//! The supported syntax consists of the operands `[A-Za-z0-9_]`, union `|`, explicit
//! concatenation `.`, the postfix operators `*`, `+` and `?` and parentheses.
//!
//! ```
//! let compilation = regex2dfa::compile("ab|c").unwrap();
//! assert_eq!(compilation.postfix().to_string(), "ab.c|");
//! assert_eq!(compilation.dfa().states().len(), 4);
//! ```

/// Module with error definitions
mod errors;
pub use errors::{Capacity, MalformedExpression, Regex2DfaError, Regex2DfaErrorKind, Result};

/// Module for the id types of NFA and DFA states.
mod ids;
pub use ids::{DfaStateID, StateID};

/// Module with the configuration of a compilation.
mod config;
pub use config::{CompilerConfig, Limits, StateSetKind};

/// The rewriter module converts the expression into postfix form.
mod rewriter;
pub use rewriter::{insert_concatenation, is_operand, rewrite, Postfix, Token};

/// The nfa module contains the NFA implementation.
mod nfa;
pub use nfa::{Fragment, Nfa, Symbol, Transition};

/// Module with the state set representations used by the subset construction.
mod state_set;

/// The dfa module contains the DFA implementation.
mod dfa;
pub use dfa::{Dfa, DfaState};

/// Module that runs the complete pipeline.
mod compiler;
pub use compiler::{compile, Compilation, Compiler};

/// Module with the textual report.
mod report;
pub use report::{write_dfa, write_nfa, write_report};

/// Module with conversion to graphviz dot format
mod dot;
pub use dot::{dfa_render, nfa_render};
