use std::mem;

use crate::errors::CapacityError;
use crate::nfa::{Edge, NfaState, StateId};

/// Maximum number of discarded states kept for reuse. States discarded
/// while the stack is full are left unused in the arena.
pub(crate) const RECYCLE_STACK_SIZE: usize = 32;

/// Arena where the states of an automaton under construction live.
///
/// Concatenating two fragments leaves one of the states without any
/// reference to it. Those states are pushed into a bounded recycle stack
/// and handed out again by [`StatePool::alloc`], which keeps the number of
/// states proportional to the size of the rules.
#[derive(Debug)]
pub(crate) struct StatePool {
    states: Vec<NfaState>,
    recycled: Vec<StateId>,
    max_states: usize,
}

impl StatePool {
    pub fn new(max_states: usize) -> Self {
        Self {
            states: Vec::new(),
            recycled: Vec::with_capacity(RECYCLE_STACK_SIZE),
            max_states,
        }
    }

    pub fn set_max_states(&mut self, max_states: usize) {
        self.max_states = max_states;
    }

    /// Returns a new state with an epsilon edge and no transitions.
    pub fn alloc(&mut self) -> Result<StateId, CapacityError> {
        if let Some(id) = self.recycled.pop() {
            self.states[id.index()] = NfaState::default();
            return Ok(id);
        }
        if self.states.len() >= self.max_states {
            return Err(CapacityError::NfaStates(self.max_states));
        }
        self.states.push(NfaState::default());
        Ok(StateId::from(self.states.len() - 1))
    }

    /// Marks a state as unused. The caller must guarantee that no other
    /// state has a transition to it.
    pub fn discard(&mut self, id: StateId) {
        let state = &mut self.states[id.index()];
        state.edge = Edge::Empty;
        state.next1 = None;
        state.next2 = None;
        state.accept = None;
        if self.recycled.len() < RECYCLE_STACK_SIZE {
            self.recycled.push(id);
        }
    }

    /// Moves the content of `src` into `dst` and discards `src`. Every
    /// transition that pointed to `dst` now leads to what `src` was.
    pub fn merge(&mut self, dst: StateId, src: StateId) {
        let content = mem::take(&mut self.states[src.index()]);
        self.states[dst.index()] = content;
        self.discard(src);
    }

    /// Forgets the recycled states. States allocated after this call have
    /// larger identifiers than any state allocated before it.
    pub fn seal(&mut self) {
        self.recycled.clear();
    }

    /// Drops every state allocated after the arena had `len` states.
    pub fn truncate(&mut self, len: usize) {
        self.states.truncate(len);
        self.recycled.clear();
    }

    #[cfg(test)]
    #[inline]
    pub fn get(&self, id: StateId) -> &NfaState {
        &self.states[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> &mut NfaState {
        &mut self.states[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn into_states(self) -> Vec<NfaState> {
        self.states
    }
}
