//! Configuration of a compilation.

use std::str::FromStr;

use crate::{errors::Capacity, Regex2DfaError, Result};

/// Upper bounds for the sizes of the intermediate forms and automata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of characters of the raw expression.
    pub max_expression_len: usize,
    /// Maximum number of tokens of the augmented infix and the postfix form.
    pub max_postfix_len: usize,
    /// Maximum number of NFA states.
    pub max_nfa_states: usize,
    /// Maximum number of NFA transitions, epsilon transitions included.
    pub max_transitions: usize,
    /// Maximum number of DFA states.
    pub max_dfa_states: usize,
}

impl Limits {
    /// Fail with a capacity error if `actual` exceeds `limit`.
    pub(crate) fn check(capacity: Capacity, actual: usize, limit: usize) -> Result<()> {
        if actual > limit {
            Err(Regex2DfaError::capacity(capacity, actual, limit))
        } else {
            Ok(())
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_expression_len: 512,
            max_postfix_len: 1024,
            max_nfa_states: 1024,
            max_transitions: 4096,
            max_dfa_states: 4096,
        }
    }
}

/// The representation of the NFA state sets during subset construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSetKind {
    /// Use the 64 bit mask if the NFA fits into it, otherwise the ordered set.
    #[default]
    Auto,
    /// Always use the 64 bit mask. Larger NFAs are rejected.
    FixedWidth,
    /// Always use the growable ordered set.
    Ordered,
}

impl FromStr for StateSetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(StateSetKind::Auto),
            "fixed" => Ok(StateSetKind::FixedWidth),
            "ordered" => Ok(StateSetKind::Ordered),
            _ => Err(format!(
                "unknown state set kind '{}', expected one of auto, fixed, ordered",
                s
            )),
        }
    }
}

/// The settings shared by all stages of a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerConfig {
    /// Report malformed input instead of silently degrading it.
    pub strict: bool,
    /// The state set representation used by the determinizer.
    pub state_sets: StateSetKind,
    /// Size bounds.
    pub limits: Limits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Regex2DfaErrorKind;

    #[test]
    fn test_state_set_kind_from_str() {
        assert_eq!("auto".parse::<StateSetKind>(), Ok(StateSetKind::Auto));
        assert_eq!("fixed".parse::<StateSetKind>(), Ok(StateSetKind::FixedWidth));
        assert_eq!("ordered".parse::<StateSetKind>(), Ok(StateSetKind::Ordered));
        assert!("bitset".parse::<StateSetKind>().is_err());
    }

    #[test]
    fn test_limits_check() {
        assert!(Limits::check(Capacity::NfaStates, 1024, 1024).is_ok());
        let error = Limits::check(Capacity::NfaStates, 1025, 1024).unwrap_err();
        assert!(matches!(
            error.kind(),
            Regex2DfaErrorKind::CapacityExceeded {
                capacity: Capacity::NfaStates,
                actual: 1025,
                limit: 1024
            }
        ));
    }
}
