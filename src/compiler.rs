//! This module runs the complete pipeline from the raw expression to the DFA.

use std::time::Instant;

use log::trace;

use crate::{
    config::{CompilerConfig, Limits, StateSetKind},
    dfa::Dfa,
    nfa::Nfa,
    rewriter::{rewrite, Postfix},
    Result,
};

/// The outcome of a compilation: all intermediate forms and both automata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    postfix: Postfix,
    nfa: Nfa,
    dfa: Dfa,
}

impl Compilation {
    /// The postfix form of the expression.
    pub fn postfix(&self) -> &Postfix {
        &self.postfix
    }

    /// The NFA built by Thompson's construction.
    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    /// The DFA built by subset construction.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}

/// Compiles regular expressions with a fixed configuration.
///
/// Each call to [`Compiler::compile`] starts from scratch, state numbering included, so the same
/// compiler can be used for any number of expressions.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a compiler with the default configuration.
    pub fn new() -> Self {
        Compiler::default()
    }

    /// Creates a compiler with the given configuration.
    pub fn with_config(config: CompilerConfig) -> Self {
        Compiler { config }
    }

    /// Report malformed input instead of silently degrading it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Choose the state set representation of the determinizer.
    pub fn state_sets(mut self, state_sets: StateSetKind) -> Self {
        self.config.state_sets = state_sets;
        self
    }

    /// Set the size limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile the expression into an NFA and a DFA.
    /// # Errors
    /// Capacity errors are returned if any stage exceeds its limits. Malformed expressions are
    /// reported if the NFA can't be built, or in strict mode if the expression is not well formed.
    pub fn compile(&self, expression: &str) -> Result<Compilation> {
        let now = Instant::now();
        let postfix = rewrite(expression, &self.config)?;
        trace!("Rewriting took {} milliseconds.", now.elapsed().as_millis());

        let now = Instant::now();
        let nfa = Nfa::from_postfix(&postfix, &self.config)?;
        trace!("NFA construction took {} milliseconds.", now.elapsed().as_millis());

        let now = Instant::now();
        let dfa = Dfa::from_nfa(&nfa, &self.config)?;
        trace!("Subset construction took {} milliseconds.", now.elapsed().as_millis());

        Ok(Compilation { postfix, nfa, dfa })
    }
}

/// Compile the expression with the default configuration.
/// See [`Compiler::compile`].
pub fn compile(expression: &str) -> Result<Compilation> {
    Compiler::new().compile(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DfaStateID, MalformedExpression, Regex2DfaErrorKind};
    use regex::Regex;

    // Initialize the logger for the tests
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // Walk the transition table. Only used to check the accepted language.
    fn accepts(dfa: &Dfa, input: &str) -> bool {
        let mut state = dfa.start_state();
        for c in input.chars() {
            match dfa.transition(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        dfa.is_accepting(state)
    }

    // All strings over the alphabet up to the given length.
    fn words(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut words = vec![String::new()];
        let mut last = vec![String::new()];
        for _ in 0..max_len {
            last = last
                .iter()
                .flat_map(|w| alphabet.iter().map(move |c| format!("{}{}", w, c)))
                .collect();
            words.extend(last.iter().cloned());
        }
        words
    }

    #[test]
    fn test_concatenation_language() {
        let compilation = compile("ab").unwrap();
        let accepted = words(&['a', 'b'], 4)
            .into_iter()
            .filter(|w| accepts(compilation.dfa(), w))
            .collect::<Vec<_>>();
        assert_eq!(accepted, vec!["ab".to_string()]);
    }

    #[test]
    fn test_union_language() {
        let compilation = compile("a|b").unwrap();
        let accepted = words(&['a', 'b'], 4)
            .into_iter()
            .filter(|w| accepts(compilation.dfa(), w))
            .collect::<Vec<_>>();
        assert_eq!(accepted, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_star_and_plus_language() {
        let star = compile("a*").unwrap();
        let plus = compile("a+").unwrap();
        assert!(accepts(star.dfa(), ""));
        assert!(!accepts(plus.dfa(), ""));
        for n in 1..10 {
            let run = "a".repeat(n);
            assert!(accepts(star.dfa(), &run));
            assert!(accepts(plus.dfa(), &run));
        }
    }

    #[test]
    fn test_language_matches_regex_crate() {
        init();
        const EXPRESSIONS: &[&str] = &[
            "ab|c",
            "a.b|c*",
            "(a|b)*abb",
            "a(b|c)+",
            "(a|b)?c*",
            "((ab)*|c)+b?",
            "a b | c",
        ];
        for expression in EXPRESSIONS {
            let compilation = compile(expression).unwrap();
            let pattern = format!(
                "^(?:{})$",
                expression.replace(' ', "").replace('.', "")
            );
            let rx = Regex::new(&pattern).unwrap();
            for word in words(&['a', 'b', 'c'], 6) {
                assert_eq!(
                    accepts(compilation.dfa(), &word),
                    rx.is_match(&word),
                    "{} on '{}'",
                    expression,
                    word
                );
            }
        }
    }

    #[test]
    fn test_deterministic_output() {
        let compiler = Compiler::new();
        let first = compiler.compile("(a|b)*abb").unwrap();
        let second = compiler.compile("(a|b)*abb").unwrap();
        assert_eq!(first, second);
        // An intermediate compilation doesn't shift the state numbering
        compiler.compile("abc|d*").unwrap();
        assert_eq!(compiler.compile("(a|b)*abb").unwrap(), first);
    }

    #[test]
    fn test_strict_compiler() {
        let compiler = Compiler::new().strict(true);
        assert!(compiler.compile("(a|b)*abb").is_ok());
        let error = compiler.compile("a)b").unwrap_err();
        assert!(matches!(
            error.kind(),
            Regex2DfaErrorKind::MalformedExpression(
                MalformedExpression::UnmatchedCloseParenthesis { position: 1 }
            )
        ));
        // The permissive compiler ignores the parenthesis
        let compilation = Compiler::new().compile("a)b").unwrap();
        assert_eq!(compilation.postfix().to_string(), "ab.");
    }

    #[test]
    fn test_capacity_error_aborts_compilation() {
        let limits = Limits {
            max_dfa_states: 2,
            ..Default::default()
        };
        let error = Compiler::new().limits(limits).compile("ab").unwrap_err();
        assert!(matches!(
            error.kind(),
            Regex2DfaErrorKind::CapacityExceeded { .. }
        ));
    }

    #[test]
    fn test_compiler_config() {
        let compiler = Compiler::new()
            .strict(true)
            .state_sets(StateSetKind::Ordered);
        assert!(compiler.config().strict);
        assert_eq!(compiler.config().state_sets, StateSetKind::Ordered);
        let compilation = compiler.compile("a").unwrap();
        assert_eq!(
            compilation.dfa().accepting_states(),
            vec![DfaStateID::new(1)]
        );
    }
}
