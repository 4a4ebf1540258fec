/*! Deterministic automata built from an [`Nfa`] by subset construction.

Each state of a [`Dfa`] stands for a set of NFA states: the ones the NFA
could be in after reading the same input. The transitions are stored in a
dense table with one row per state and one column per character in the
alphabet. Cells without a transition contain [`FAIL`].

The states are numbered in the order in which they are discovered, state 0
is the initial state.
*/

use std::fmt::{Display, Formatter};
use std::io::{BufWriter, Read, Write};
#[cfg(feature = "logging")]
use std::time::Instant;

use bincode::Options;
use bstr::BStr;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::actions::ActionPool;
use crate::errors::{CapacityError, SerializationError};
use crate::interp::{epsilon_closure, move_on};
use crate::nfa::{fmt_accept, Accept, AnchorSet, Nfa};
use crate::set::CharSet;
use crate::utils::{fmt_range, ranges};
use crate::ALPHABET_SIZE;

#[cfg(test)]
mod tests;

/// Value of the transition table cells for which there's no transition.
pub const FAIL: i32 = -1;

/// Header that identifies a serialized [`Dfa`].
const MAGIC: &[u8] = b"RELEX-DFA";

/// A deterministic automaton produced by [`crate::Compiler::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dfa {
    /// Transition table, `ALPHABET_SIZE` cells per state.
    table: Vec<i32>,
    /// What each state accepts.
    accepts: Vec<Option<Accept>>,
    /// Group each state belongs to. All states are in group 0 until the
    /// automaton is minimized.
    groups: Vec<u32>,
    /// Action texts referenced from `accepts`.
    actions: ActionPool,
}

/// Intermediate result of the subset construction, where each DFA state
/// still carries the NFA states it stands for.
pub(crate) struct Subsets {
    pub sets: Vec<CharSet>,
    pub accepts: Vec<Option<Accept>>,
    pub table: Vec<i32>,
}

/// Converts `nfa` into a transition table. Fails if the table needs more
/// than `max_states` states.
pub(crate) fn subset_construction(
    nfa: &Nfa,
    max_states: usize,
) -> Result<Subsets, CapacityError> {
    if max_states == 0 {
        return Err(CapacityError::DfaStates(max_states));
    }

    let mut start = CharSet::with_capacity(nfa.len());
    start.add(nfa.start().index());

    let initial = epsilon_closure(nfa, &start);

    let mut sets = vec![initial.states];
    let mut accepts = vec![initial.accept];
    let mut table = Vec::new();

    // States are marked in the same order in which they are created, so
    // the earliest unmarked state is always the one after the last marked
    // state.
    let mut current = 0;

    while current < sets.len() {
        let mut row = [FAIL; ALPHABET_SIZE];

        for (c, cell) in row.iter_mut().enumerate() {
            let Some(moved) = move_on(nfa, &sets[current], c as u8) else {
                continue;
            };

            let closure = epsilon_closure(nfa, &moved);

            let target = match sets
                .iter()
                .position(|set| set.is_equal(&closure.states))
            {
                Some(existing) => existing,
                None => {
                    if sets.len() >= max_states {
                        return Err(CapacityError::DfaStates(max_states));
                    }
                    debug!("DFA state {} = {}", sets.len(), closure.states);
                    sets.push(closure.states);
                    accepts.push(closure.accept);
                    sets.len() - 1
                }
            };

            *cell = target as i32;
        }

        table.extend_from_slice(&row);
        current += 1;
    }

    Ok(Subsets { sets, accepts, table })
}

impl Dfa {
    /// Builds a deterministic automaton equivalent to `nfa`, with at most
    /// `max_states` states.
    pub fn from_nfa(
        nfa: &Nfa,
        max_states: usize,
    ) -> Result<Self, CapacityError> {
        #[cfg(feature = "logging")]
        let start = Instant::now();

        let subsets = subset_construction(nfa, max_states)?;
        let len = subsets.sets.len();

        #[cfg(feature = "logging")]
        info!("Subset construction time: {:?}", Instant::elapsed(&start));

        info!("DFA built with {} states", len);

        Ok(Self {
            table: subsets.table,
            accepts: subsets.accepts,
            groups: vec![0; len],
            actions: nfa.actions.clone(),
        })
    }

    /// Number of states.
    #[inline]
    pub fn len(&self) -> usize {
        self.accepts.len()
    }

    /// Returns `true` if the automaton has no states.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.accepts.is_empty()
    }

    /// Returns the row of the transition table for `state`. The row has
    /// one cell per character, containing either the next state or
    /// [`FAIL`].
    ///
    /// # Panics
    ///
    /// If `state` is not a valid state.
    pub fn row(&self, state: usize) -> &[i32] {
        &self.table[state * ALPHABET_SIZE..(state + 1) * ALPHABET_SIZE]
    }

    /// Returns the state reached from `state` when reading `c`.
    pub fn next(&self, state: usize, c: u8) -> Option<usize> {
        if state >= self.len() || c as usize >= ALPHABET_SIZE {
            return None;
        }
        match self.table[state * ALPHABET_SIZE + c as usize] {
            FAIL => None,
            next => Some(next as usize),
        }
    }

    /// Returns the action and anchors of the rule accepted in `state`, if
    /// any.
    pub fn accept(&self, state: usize) -> Option<(&BStr, AnchorSet)> {
        let accept = (*self.accepts.get(state)?)?;
        Some((self.actions.get(accept.action)?, accept.anchor))
    }

    /// Returns the group of `state`.
    pub fn group(&self, state: usize) -> Option<u32> {
        self.groups.get(state).copied()
    }

    /// Runs `input` through the automaton starting at state 0 and returns
    /// the state where it ends, or `None` if some character has no
    /// transition.
    pub fn run(&self, input: &[u8]) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        input.iter().try_fold(0, |state, c| self.next(state, *c))
    }

    /// Serializes the automaton as a sequence of bytes.
    ///
    /// The [`Dfa`] can be restored back by passing the bytes to
    /// [`Dfa::deserialize`].
    pub fn serialize(&self) -> Result<Vec<u8>, SerializationError> {
        let mut bytes = Vec::new();
        self.serialize_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserializes the automaton from a sequence of bytes produced by
    /// [`Dfa::serialize`].
    pub fn deserialize<B>(bytes: B) -> Result<Self, SerializationError>
    where
        B: AsRef<[u8]>,
    {
        let bytes = bytes.as_ref();

        if bytes.len() < MAGIC.len() || &bytes[0..MAGIC.len()] != MAGIC {
            return Err(SerializationError::InvalidFormat);
        }

        // Skip the magic and deserialize the remaining data.
        let dfa = bincode::DefaultOptions::new()
            .with_varint_encoding()
            .deserialize::<Self>(&bytes[MAGIC.len()..])?;

        if !dfa.is_consistent() {
            return Err(SerializationError::InvalidFormat);
        }

        Ok(dfa)
    }

    /// Serializes the automaton into a `writer`.
    pub fn serialize_into<W>(
        &self,
        writer: W,
    ) -> Result<(), SerializationError>
    where
        W: Write,
    {
        let mut writer = BufWriter::new(writer);

        // Write file header.
        writer.write_all(MAGIC)?;

        Ok(bincode::DefaultOptions::new()
            .with_varint_encoding()
            .serialize_into(writer, self)?)
    }

    /// Deserializes the automaton from a `reader`.
    pub fn deserialize_from<R>(
        mut reader: R,
    ) -> Result<Self, SerializationError>
    where
        R: Read,
    {
        let mut bytes = Vec::new();
        let _ = reader.read_to_end(&mut bytes)?;
        Self::deserialize(bytes)
    }

    /// Checks that the table dimensions agree with the number of states,
    /// and that every transition leads to an existing state.
    fn is_consistent(&self) -> bool {
        let len = self.len();
        self.table.len() == len * ALPHABET_SIZE
            && self.groups.len() == len
            && self
                .table
                .iter()
                .all(|next| *next == FAIL || (0..len as i32).contains(next))
            && self.accepts.iter().flatten().all(|accept| {
                self.actions.get(accept.action).is_some()
            })
    }
}

impl Display for Dfa {
    /// Prints each state, what it accepts, and its transitions grouped by
    /// target state.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for state in 0..self.len() {
            write!(f, "DFA state {}:", state)?;

            if let Some(accept) = self.accepts[state] {
                let accept = fmt_accept(&self.actions, accept);
                write!(f, " accepting {}", accept)?;
            }

            writeln!(f)?;

            let row = self.row(state);
            let targets = row
                .iter()
                .copied()
                .filter(|next| *next != FAIL)
                .sorted()
                .dedup();

            for target in targets {
                let chars = row
                    .iter()
                    .enumerate()
                    .filter(|(_, next)| **next == target)
                    .map(|(c, _)| c);

                writeln!(
                    f,
                    "    on [{}] goto {}",
                    ranges(chars).map(|(lo, hi)| fmt_range(lo, hi)).join(""),
                    target
                )?;
            }
        }
        Ok(())
    }
}
