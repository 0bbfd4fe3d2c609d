//! Sets of NFA states as used by the subset construction.

use std::collections::BTreeSet;
use std::hash::Hash;

use crate::StateID;

/// A set of NFA states that can serve as a DFA state during subset construction.
pub(crate) trait StateSet: Clone + Eq + Hash {
    /// The empty set.
    fn empty() -> Self;

    /// Insert a state and return true if it was not yet contained.
    fn insert(&mut self, state: StateID) -> bool;

    /// Returns true if the state is contained.
    fn contains(&self, state: StateID) -> bool;

    /// Returns true if no state is contained.
    fn is_empty(&self) -> bool;

    /// The contained states in ascending order.
    fn states(&self) -> Vec<StateID>;

    /// Build a set from the given states.
    fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = StateID>,
    {
        let mut set = Self::empty();
        for state in states {
            set.insert(state);
        }
        set
    }
}

/// A state set packed into a single 64 bit mask.
///
/// Only NFAs with at most [`BitSet64::CAPACITY`] states may use it. The determinizer checks this
/// before the construction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BitSet64(u64);

impl BitSet64 {
    /// The number of states the mask can hold.
    pub(crate) const CAPACITY: usize = u64::BITS as usize;

    #[inline]
    fn bit(state: StateID) -> u64 {
        debug_assert!(state.as_usize() < Self::CAPACITY);
        1u64 << state.as_usize()
    }
}

impl StateSet for BitSet64 {
    fn empty() -> Self {
        BitSet64(0)
    }

    #[inline]
    fn insert(&mut self, state: StateID) -> bool {
        let bit = Self::bit(state);
        let inserted = self.0 & bit == 0;
        self.0 |= bit;
        inserted
    }

    #[inline]
    fn contains(&self, state: StateID) -> bool {
        self.0 & Self::bit(state) != 0
    }

    fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn states(&self) -> Vec<StateID> {
        let mut states = Vec::with_capacity(self.0.count_ones() as usize);
        let mut bits = self.0;
        while bits != 0 {
            states.push(StateID::new(bits.trailing_zeros() as usize));
            // Clear the lowest set bit
            bits &= bits - 1;
        }
        states
    }
}

/// A growable ordered state set without size restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct OrderedStateSet(BTreeSet<StateID>);

impl OrderedStateSet {
    pub(crate) fn into_inner(self) -> BTreeSet<StateID> {
        self.0
    }
}

impl StateSet for OrderedStateSet {
    fn empty() -> Self {
        OrderedStateSet(BTreeSet::new())
    }

    fn insert(&mut self, state: StateID) -> bool {
        self.0.insert(state)
    }

    fn contains(&self, state: StateID) -> bool {
        self.0.contains(&state)
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn states(&self) -> Vec<StateID> {
        self.0.iter().copied().collect()
    }
}
