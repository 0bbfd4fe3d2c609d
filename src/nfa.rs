//! This module contains the NFA (Non-deterministic Finite Automaton) implementation.
//! The NFA is built from the postfix form with Thompson's construction.
//! The NFA is later converted to a DFA (Deterministic Finite Automaton) by subset construction.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::{
    config::{CompilerConfig, Limits},
    errors::{Capacity, MalformedExpression},
    malformed,
    rewriter::{Postfix, Token},
    state_set::{OrderedStateSet, StateSet},
    Result, StateID,
};

/// The label of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A character of the input alphabet.
    Char(char),
    /// Consumed without reading input.
    Epsilon,
}

impl Symbol {
    /// Returns true for the epsilon label.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{}", c),
            Symbol::Epsilon => write!(f, "eps"),
        }
    }
}

/// A transition `from --symbol--> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// The source state.
    pub from: StateID,
    /// The target state.
    pub to: StateID,
    /// The label.
    pub symbol: Symbol,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.symbol, self.to)
    }
}

/// A sub-automaton under construction with one start and one accept state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Entry state of the fragment.
    pub start: StateID,
    /// Exit state of the fragment.
    pub accept: StateID,
}

/// The NFA produced by Thompson's construction.
///
/// States are numbered in allocation order starting at 0. The transitions are kept in the order
/// they were created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    transitions: Vec<Transition>,
    start_state: StateID,
    accept_state: StateID,
    state_count: usize,
}

impl Nfa {
    /// Build the NFA for the given postfix form.
    ///
    /// # Errors
    /// A malformed expression error is returned if an operator misses an operand or if nothing is
    /// left to build an automaton from. In strict mode leftover unconnected sub-expressions are
    /// reported too, whereas permissive mode keeps the last one.
    /// A capacity error is returned if the configured state or transition limits are exceeded.
    pub fn from_postfix(postfix: &Postfix, config: &CompilerConfig) -> Result<Self> {
        let mut builder = NfaBuilder::new(&config.limits);
        for token in postfix.tokens() {
            match token {
                Token::Operand(c) => builder.operand(*c)?,
                Token::Concat => builder.concat()?,
                Token::Union => builder.alternation()?,
                Token::Star => builder.zero_or_more()?,
                Token::Plus => builder.one_or_more()?,
                Token::Optional => builder.zero_or_one()?,
                // The rewriter never emits these
                Token::OpenParen | Token::CloseParen | Token::Unrecognized(_) => {}
            }
        }
        builder.finish(config.strict)
    }

    /// The start state.
    pub fn start_state(&self) -> StateID {
        self.start_state
    }

    /// The accept state.
    pub fn accept_state(&self) -> StateID {
        self.accept_state
    }

    /// All transitions in construction order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The number of allocated states.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// The non-epsilon symbols in the order of their first appearance in the transition list.
    pub fn alphabet(&self) -> Vec<char> {
        let mut alphabet = Vec::new();
        for transition in &self.transitions {
            if let Symbol::Char(c) = transition.symbol {
                if !alphabet.contains(&c) {
                    alphabet.push(c);
                }
            }
        }
        alphabet
    }

    /// The states reachable from `states` by epsilon transitions alone, `states` included.
    pub fn epsilon_closure<I>(&self, states: I) -> BTreeSet<StateID>
    where
        I: IntoIterator<Item = StateID>,
    {
        let adjacency = self.adjacency();
        let set = OrderedStateSet::from_states(states);
        adjacency.epsilon_closure(&set).into_inner()
    }

    /// The direct targets of the transitions labelled `symbol` leaving any of `states`.
    pub fn move_on<I>(&self, states: I, symbol: char) -> BTreeSet<StateID>
    where
        I: IntoIterator<Item = StateID>,
    {
        let adjacency = self.adjacency();
        let set = OrderedStateSet::from_states(states);
        adjacency.move_on(&set, symbol).into_inner()
    }

    /// Per-state outgoing edges, used during subset construction.
    pub(crate) fn adjacency(&self) -> Adjacency {
        let mut adjacency = Adjacency {
            epsilon: vec![Vec::new(); self.state_count],
            symbols: vec![Vec::new(); self.state_count],
        };
        for transition in &self.transitions {
            match transition.symbol {
                Symbol::Epsilon => adjacency.epsilon[transition.from].push(transition.to),
                Symbol::Char(c) => adjacency.symbols[transition.from].push((c, transition.to)),
            }
        }
        adjacency
    }
}

/// Outgoing edges of each NFA state, split into epsilon and symbol edges.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    epsilon: Vec<Vec<StateID>>,
    symbols: Vec<Vec<(char, StateID)>>,
}

impl Adjacency {
    /// Follow epsilon edges until no new state is added. Each state is expanded at most once.
    /// States outside the automaton have no edges.
    pub(crate) fn epsilon_closure<S: StateSet>(&self, set: &S) -> S {
        let mut closure = set.clone();
        let mut stack = set.states();
        while let Some(state) = stack.pop() {
            for target in self.epsilon.get(state.as_usize()).into_iter().flatten() {
                if closure.insert(*target) {
                    stack.push(*target);
                }
            }
        }
        closure
    }

    /// Union of the targets of all edges labelled `symbol` leaving the set.
    pub(crate) fn move_on<S: StateSet>(&self, set: &S, symbol: char) -> S {
        let mut result = S::empty();
        for state in set.states() {
            for (c, target) in self.symbols.get(state.as_usize()).into_iter().flatten() {
                if *c == symbol {
                    result.insert(*target);
                }
            }
        }
        result
    }
}

// The construction context of a single compilation. It owns the state counter, the transition
// list and the fragment stack so that nothing leaks from one compilation into the next.
struct NfaBuilder<'a> {
    limits: &'a Limits,
    next_state: usize,
    transitions: Vec<Transition>,
    fragments: Vec<Fragment>,
}

impl<'a> NfaBuilder<'a> {
    fn new(limits: &'a Limits) -> Self {
        Self {
            limits,
            next_state: 0,
            transitions: Vec::new(),
            fragments: Vec::new(),
        }
    }

    fn new_state(&mut self) -> Result<StateID> {
        Limits::check(
            Capacity::NfaStates,
            self.next_state + 1,
            self.limits.max_nfa_states,
        )?;
        let state = StateID::new(self.next_state);
        self.next_state += 1;
        Ok(state)
    }

    fn add_transition(&mut self, from: StateID, to: StateID, symbol: Symbol) -> Result<()> {
        Limits::check(
            Capacity::NfaTransitions,
            self.transitions.len() + 1,
            self.limits.max_transitions,
        )?;
        self.transitions.push(Transition { from, to, symbol });
        Ok(())
    }

    fn add_epsilon_transition(&mut self, from: StateID, to: StateID) -> Result<()> {
        self.add_transition(from, to, Symbol::Epsilon)
    }

    fn pop(&mut self, operator: Token) -> Result<Fragment> {
        self.fragments.pop().ok_or_else(|| {
            malformed!(MalformedExpression::MissingOperand {
                operator: operator.as_char()
            })
        })
    }

    fn operand(&mut self, c: char) -> Result<()> {
        let start = self.new_state()?;
        let accept = self.new_state()?;
        self.add_transition(start, accept, Symbol::Char(c))?;
        self.fragments.push(Fragment { start, accept });
        Ok(())
    }

    fn concat(&mut self) -> Result<()> {
        let b = self.pop(Token::Concat)?;
        let a = self.pop(Token::Concat)?;
        // Connect the accept state of the left fragment to the start state of the right one
        self.add_epsilon_transition(a.accept, b.start)?;
        self.fragments.push(Fragment {
            start: a.start,
            accept: b.accept,
        });
        Ok(())
    }

    fn alternation(&mut self) -> Result<()> {
        let b = self.pop(Token::Union)?;
        let a = self.pop(Token::Union)?;
        let start = self.new_state()?;
        let accept = self.new_state()?;
        self.add_epsilon_transition(start, a.start)?;
        self.add_epsilon_transition(start, b.start)?;
        self.add_epsilon_transition(a.accept, accept)?;
        self.add_epsilon_transition(b.accept, accept)?;
        self.fragments.push(Fragment { start, accept });
        Ok(())
    }

    fn zero_or_more(&mut self) -> Result<()> {
        let a = self.pop(Token::Star)?;
        let start = self.new_state()?;
        let accept = self.new_state()?;
        self.add_epsilon_transition(start, a.start)?;
        // The skip edge accepts the empty string
        self.add_epsilon_transition(start, accept)?;
        self.add_epsilon_transition(a.accept, a.start)?;
        self.add_epsilon_transition(a.accept, accept)?;
        self.fragments.push(Fragment { start, accept });
        Ok(())
    }

    fn one_or_more(&mut self) -> Result<()> {
        let a = self.pop(Token::Plus)?;
        let start = self.new_state()?;
        let accept = self.new_state()?;
        self.add_epsilon_transition(start, a.start)?;
        self.add_epsilon_transition(a.accept, a.start)?;
        self.add_epsilon_transition(a.accept, accept)?;
        self.fragments.push(Fragment { start, accept });
        Ok(())
    }

    fn zero_or_one(&mut self) -> Result<()> {
        let a = self.pop(Token::Optional)?;
        let start = self.new_state()?;
        let accept = self.new_state()?;
        self.add_epsilon_transition(start, a.start)?;
        self.add_epsilon_transition(start, accept)?;
        self.add_epsilon_transition(a.accept, accept)?;
        self.fragments.push(Fragment { start, accept });
        Ok(())
    }

    fn finish(mut self, strict: bool) -> Result<Nfa> {
        let count = self.fragments.len();
        if count > 1 {
            if strict {
                return Err(malformed!(MalformedExpression::DanglingFragments { count }));
            }
            warn!(
                "{} unconnected sub-expressions, keeping only the last one",
                count
            );
        }
        let fragment = self
            .fragments
            .pop()
            .ok_or_else(|| malformed!(MalformedExpression::Empty))?;
        debug!(
            "NFA with {} states and {} transitions",
            self.next_state,
            self.transitions.len()
        );
        Ok(Nfa {
            transitions: self.transitions,
            start_state: fragment.start,
            accept_state: fragment.accept,
            state_count: self.next_state,
        })
    }
}
