//! This module contains the DFA implementation.
//! The DFA is generated from the NFA using the subset construction algorithm.
//! No minimization is performed, every distinct reachable state set becomes one DFA state.

use std::collections::{HashMap, VecDeque};

use itertools::Itertools;
use log::debug;

use crate::{
    config::{CompilerConfig, Limits, StateSetKind},
    errors::Capacity,
    nfa::{Adjacency, Nfa},
    state_set::{BitSet64, OrderedStateSet, StateSet},
    DfaStateID, Regex2DfaError, Regex2DfaErrorKind, Result, StateID,
};

/// A state of the DFA.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DfaState {
    id: DfaStateID,
    // The ids of the NFA states that constitute this DFA state, in ascending order.
    nfa_states: Vec<StateID>,
    // True if the NFA accept state is among the NFA states.
    accepting: bool,
}

impl DfaState {
    /// Get the id of the DFA state.
    pub fn id(&self) -> DfaStateID {
        self.id
    }

    /// Get the NFA states that constitute the DFA state in ascending order.
    pub fn nfa_states(&self) -> &[StateID] {
        &self.nfa_states
    }

    /// Returns true if the state is an accepting state.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

/// Renders the NFA state set as `{i,j,...}`.
impl std::fmt::Display for DfaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.nfa_states.iter().join(","))
    }
}

/// The DFA implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    // The input symbols in the order of their discovery in the NFA.
    alphabet: Vec<char>,
    // The states of the DFA. The start state is always the first state in the vector, i.e. state 0.
    states: Vec<DfaState>,
    // One row per state and one column per alphabet symbol.
    transitions: Vec<Vec<Option<DfaStateID>>>,
}

impl Dfa {
    /// Create a DFA from the NFA by subset construction.
    ///
    /// # Errors
    /// `AutomatonTooLarge` is returned if fixed-width state sets were requested for an NFA that
    /// does not fit into them. A capacity error is returned if more DFA states than configured
    /// are discovered.
    pub fn from_nfa(nfa: &Nfa, config: &CompilerConfig) -> Result<Self> {
        let fits = nfa.state_count() <= BitSet64::CAPACITY;
        match config.state_sets {
            StateSetKind::Auto if fits => {
                SubsetConstruction::<BitSet64>::new(nfa, &config.limits).run()
            }
            StateSetKind::Auto | StateSetKind::Ordered => {
                SubsetConstruction::<OrderedStateSet>::new(nfa, &config.limits).run()
            }
            StateSetKind::FixedWidth if fits => {
                SubsetConstruction::<BitSet64>::new(nfa, &config.limits).run()
            }
            StateSetKind::FixedWidth => Err(Regex2DfaError::new(
                Regex2DfaErrorKind::AutomatonTooLarge {
                    states: nfa.state_count(),
                    capacity: BitSet64::CAPACITY,
                },
            )),
        }
    }

    /// The start state. It is always the first state.
    pub fn start_state(&self) -> DfaStateID {
        DfaStateID::default()
    }

    /// Get the states of the DFA in discovery order.
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Get the input symbols in column order.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Get the transition row of a state, one entry per alphabet symbol.
    /// Returns `None` if the state is not part of this DFA.
    pub fn row(&self, state: DfaStateID) -> Option<&[Option<DfaStateID>]> {
        self.transitions.get(state.as_usize()).map(Vec::as_slice)
    }

    /// Get the target of the transition from `state` on `symbol`, if there is one.
    pub fn transition(&self, state: DfaStateID, symbol: char) -> Option<DfaStateID> {
        let column = self.alphabet.iter().position(|c| *c == symbol)?;
        self.transitions.get(state.as_usize())?[column]
    }

    /// Returns true if the given state is an accepting state.
    pub fn is_accepting(&self, state: DfaStateID) -> bool {
        self.states
            .get(state.as_usize())
            .map_or(false, |s| s.is_accepting())
    }

    /// Get the ids of all accepting states in ascending order.
    pub fn accepting_states(&self) -> Vec<DfaStateID> {
        self.states
            .iter()
            .filter(|s| s.is_accepting())
            .map(|s| s.id())
            .collect()
    }
}

// The state of a running subset construction.
struct SubsetConstruction<'a, S: StateSet> {
    nfa: &'a Nfa,
    limits: &'a Limits,
    adjacency: Adjacency,
    // The NFA state sets of the DFA states, indexed by DFA state id.
    sets: Vec<S>,
    // Lookup of the DFA state by its NFA state set.
    known: HashMap<S, DfaStateID>,
    dfa: Dfa,
}

impl<'a, S: StateSet> SubsetConstruction<'a, S> {
    fn new(nfa: &'a Nfa, limits: &'a Limits) -> Self {
        Self {
            nfa,
            limits,
            adjacency: nfa.adjacency(),
            sets: Vec::new(),
            known: HashMap::new(),
            dfa: Dfa {
                alphabet: nfa.alphabet(),
                states: Vec::new(),
                transitions: Vec::new(),
            },
        }
    }

    fn run(mut self) -> Result<Dfa> {
        // The initial state of the DFA is the epsilon closure of the start state of the NFA.
        let start_set = self
            .adjacency
            .epsilon_closure(&S::from_states([self.nfa.start_state()]));
        let (initial_state, _) = self.add_state_if_new(start_set)?;
        // The work list holds the states whose transitions are not yet computed. States are
        // processed in the order of their discovery.
        let mut work_list = VecDeque::from([initial_state]);

        while let Some(state_id) = work_list.pop_front() {
            let current = self.sets[state_id].clone();
            for column in 0..self.dfa.alphabet.len() {
                let symbol = self.dfa.alphabet[column];
                let target_set = self
                    .adjacency
                    .epsilon_closure(&self.adjacency.move_on(&current, symbol));
                if target_set.is_empty() {
                    continue;
                }
                let (target_state, is_new) = self.add_state_if_new(target_set)?;
                if is_new {
                    work_list.push_back(target_state);
                }
                self.dfa.transitions[state_id][column] = Some(target_state);
            }
        }

        debug!(
            "DFA with {} states over {} symbols",
            self.dfa.states.len(),
            self.dfa.alphabet.len()
        );
        Ok(self.dfa)
    }

    /// Add a state to the DFA if it does not already exist.
    /// The state is identified by the NFA states that constitute the DFA state.
    /// Returns the state id and whether the state was added.
    fn add_state_if_new(&mut self, set: S) -> Result<(DfaStateID, bool)> {
        if let Some(state_id) = self.known.get(&set) {
            return Ok((*state_id, false));
        }
        Limits::check(
            Capacity::DfaStates,
            self.dfa.states.len() + 1,
            self.limits.max_dfa_states,
        )?;

        let state_id = DfaStateID::new(self.dfa.states.len());
        self.dfa.states.push(DfaState {
            id: state_id,
            nfa_states: set.states(),
            accepting: set.contains(self.nfa.accept_state()),
        });
        self.dfa
            .transitions
            .push(vec![None; self.dfa.alphabet.len()]);
        self.known.insert(set.clone(), state_id);
        self.sets.push(set);
        Ok((state_id, true))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::rewriter::rewrite;

    // A data type that provides test data for the subset construction tests.
    struct TestData {
        expression: &'static str,
        states: usize,
        accepting_states: usize,
        alphabet: &'static [char],
    }

    const TEST_DATA: &[TestData] = &[
        TestData {
            expression: "a",
            states: 2,
            accepting_states: 1,
            alphabet: &['a'],
        },
        TestData {
            expression: "ab",
            states: 3,
            accepting_states: 1,
            alphabet: &['a', 'b'],
        },
        TestData {
            expression: "a|b",
            states: 3,
            accepting_states: 2,
            alphabet: &['a', 'b'],
        },
        TestData {
            expression: "a*",
            states: 2,
            accepting_states: 2,
            alphabet: &['a'],
        },
        TestData {
            expression: "a+",
            states: 2,
            accepting_states: 1,
            alphabet: &['a'],
        },
        TestData {
            expression: "a?",
            states: 2,
            accepting_states: 2,
            alphabet: &['a'],
        },
        TestData {
            expression: "ab|c",
            states: 4,
            accepting_states: 2,
            alphabet: &['a', 'b', 'c'],
        },
        TestData {
            expression: "(a|b)*abb",
            states: 5,
            accepting_states: 1,
            alphabet: &['a', 'b'],
        },
        TestData {
            expression: "a.b|c*",
            states: 4,
            accepting_states: 3,
            alphabet: &['a', 'b', 'c'],
        },
        TestData {
            expression: "a(b|c)+",
            states: 4,
            accepting_states: 2,
            alphabet: &['a', 'b', 'c'],
        },
        TestData {
            expression: "(a|b)?c*",
            states: 4,
            accepting_states: 4,
            alphabet: &['a', 'b', 'c'],
        },
    ];

    // Initialize the logger for the tests
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn build(expression: &str, config: &CompilerConfig) -> Result<(Nfa, Dfa)> {
        let postfix = rewrite(expression, config)?;
        let nfa = Nfa::from_postfix(&postfix, config)?;
        let dfa = Dfa::from_nfa(&nfa, config)?;
        Ok((nfa, dfa))
    }

    fn dfa_of(expression: &str) -> Dfa {
        build(expression, &CompilerConfig::default()).unwrap().1
    }

    fn with_state_sets(state_sets: StateSetKind) -> CompilerConfig {
        CompilerConfig {
            state_sets,
            ..Default::default()
        }
    }

    fn set(states: &[StateID]) -> Vec<usize> {
        states.iter().map(|s| s.as_usize()).collect()
    }

    #[test]
    fn test_subset_construction() {
        init();
        for data in TEST_DATA {
            let dfa = dfa_of(data.expression);
            assert_eq!(dfa.states().len(), data.states, "states of {}", data.expression);
            assert_eq!(
                dfa.accepting_states().len(),
                data.accepting_states,
                "accepting states of {}",
                data.expression
            );
            assert_eq!(dfa.alphabet(), data.alphabet, "alphabet of {}", data.expression);
        }
    }

    #[test]
    fn test_transition_table_shape() {
        let dfa = dfa_of("ab|c");
        let d = |i: usize| Some(DfaStateID::new(i));
        assert_eq!(dfa.alphabet(), &['a', 'b', 'c']);
        assert_eq!(dfa.states().len(), 4);
        assert_eq!(dfa.row(DfaStateID::new(0)), Some(&[d(1), None, d(2)][..]));
        assert_eq!(dfa.row(DfaStateID::new(1)), Some(&[None, d(3), None][..]));
        assert_eq!(dfa.row(DfaStateID::new(2)), Some(&[None, None, None][..]));
        assert_eq!(dfa.row(DfaStateID::new(3)), Some(&[None, None, None][..]));
        let sets = dfa
            .states()
            .iter()
            .map(|s| set(s.nfa_states()))
            .collect::<Vec<_>>();
        assert_eq!(sets, vec![vec![0, 4, 6], vec![1, 2], vec![5, 7], vec![3, 7]]);
        assert_eq!(
            dfa.accepting_states(),
            vec![DfaStateID::new(2), DfaStateID::new(3)]
        );
        assert_eq!(dfa.states()[0].to_string(), "{0,4,6}");
        assert_eq!(dfa.row(DfaStateID::new(4)), None);
        assert_eq!(dfa.transition(DfaStateID::new(4), 'a'), None);
        assert!(!dfa.is_accepting(DfaStateID::new(4)));
    }

    #[test]
    fn test_single_operand() {
        for c in ('a'..='z').chain('A'..='Z').chain('0'..='9').chain(['_']) {
            let (nfa, dfa) = build(&c.to_string(), &CompilerConfig::default()).unwrap();
            assert_eq!(
                nfa.transitions()
                    .iter()
                    .filter(|t| !t.symbol.is_epsilon())
                    .count(),
                1,
                "symbol transitions of {}",
                c
            );
            assert_eq!(dfa.alphabet(), &[c]);
            assert_eq!(dfa.states().len(), 2, "states of {}", c);
            assert!(!dfa.is_accepting(DfaStateID::new(0)));
            assert!(dfa.is_accepting(DfaStateID::new(1)));
            assert_eq!(
                dfa.transition(dfa.start_state(), c),
                Some(DfaStateID::new(1))
            );
            assert_eq!(dfa.transition(DfaStateID::new(1), c), None);
        }
    }

    #[test]
    fn test_star_and_plus() {
        let star = dfa_of("a*");
        let plus = dfa_of("a+");
        assert!(star.is_accepting(star.start_state()));
        assert!(!plus.is_accepting(plus.start_state()));
        for dfa in [&star, &plus] {
            // Both loop on the accepting state reached after one 'a'
            let one = dfa.transition(dfa.start_state(), 'a').unwrap();
            assert!(dfa.is_accepting(one));
            assert_eq!(dfa.transition(one, 'a'), Some(one));
        }
    }

    #[test]
    fn test_start_state_is_closure_of_nfa_start() {
        for data in TEST_DATA {
            let (nfa, dfa) = build(data.expression, &CompilerConfig::default()).unwrap();
            let closure = nfa.epsilon_closure([nfa.start_state()]);
            assert_eq!(
                dfa.states()[0].nfa_states(),
                closure.into_iter().collect::<Vec<_>>().as_slice()
            );
        }
    }

    #[test]
    fn test_soundness() {
        for data in TEST_DATA {
            let (nfa, dfa) = build(data.expression, &CompilerConfig::default()).unwrap();
            for state in dfa.states() {
                for symbol in dfa.alphabet() {
                    let moved = nfa.move_on(state.nfa_states().iter().copied(), *symbol);
                    let expected = nfa.epsilon_closure(moved);
                    match dfa.transition(state.id(), *symbol) {
                        Some(target) => assert_eq!(
                            dfa.states()[target]
                                .nfa_states()
                                .iter()
                                .copied()
                                .collect::<BTreeSet<_>>(),
                            expected
                        ),
                        None => assert!(expected.is_empty()),
                    }
                }
            }
        }
    }

    #[test]
    fn test_state_sets_are_distinct() {
        for data in TEST_DATA {
            let dfa = dfa_of(data.expression);
            let distinct = dfa
                .states()
                .iter()
                .map(|s| s.nfa_states())
                .unique()
                .count();
            assert_eq!(distinct, dfa.states().len());
        }
    }

    #[test]
    fn test_representations_agree() {
        for data in TEST_DATA {
            let fixed = build(data.expression, &with_state_sets(StateSetKind::FixedWidth))
                .unwrap()
                .1;
            let ordered = build(data.expression, &with_state_sets(StateSetKind::Ordered))
                .unwrap()
                .1;
            assert_eq!(fixed, ordered, "{}", data.expression);
        }
    }

    #[test]
    fn test_automaton_too_large() {
        // 33 operands need 66 NFA states
        let expression = "a".repeat(33);
        let error = build(&expression, &with_state_sets(StateSetKind::FixedWidth)).unwrap_err();
        assert!(matches!(
            error.kind(),
            Regex2DfaErrorKind::AutomatonTooLarge {
                states: 66,
                capacity: 64
            }
        ));

        // 64 NFA states still fit
        let (_, dfa) = build(&"a".repeat(32), &with_state_sets(StateSetKind::FixedWidth)).unwrap();
        assert_eq!(dfa.states().len(), 33);

        // Auto falls back to the ordered set
        let (nfa, dfa) = build(&expression, &CompilerConfig::default()).unwrap();
        assert_eq!(nfa.state_count(), 66);
        assert_eq!(dfa.states().len(), 34);
        assert_eq!(dfa.accepting_states(), vec![DfaStateID::new(33)]);
    }

    #[test]
    fn test_dfa_state_limit() {
        let mut config = CompilerConfig::default();
        config.limits.max_dfa_states = 3;
        let error = build("ab|c", &config).unwrap_err();
        assert!(matches!(
            error.kind(),
            Regex2DfaErrorKind::CapacityExceeded {
                capacity: Capacity::DfaStates,
                actual: 4,
                limit: 3
            }
        ));
    }
}
