/*! Nondeterministic automata built with [Thompson's construction][1].

Each rule is a regular expression followed by an action. The rules are
parsed by a recursive-descent parser that produces a fragment of automaton
for every sub-expression and glues the fragments together. The fragments of
all rules hang from a single start state, in the same order in which the
rules were declared.

States live in an index-addressed arena, transitions are [`StateId`]s that
point into it. Each state has at most two outgoing transitions, and the
second one only exists when the state's edge is an epsilon.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
*/

use std::collections::VecDeque;
use std::fmt::{Display, Formatter, Write};

use bitmask::bitmask;
use bstr::BStr;
use serde::{Deserialize, Serialize};

use crate::actions::{ActionId, ActionPool};
use crate::set::CharSet;
use crate::utils::{fmt_char, fmt_class};

pub(crate) use builder::Builder;
pub(crate) use pool::StatePool;

mod builder;
mod lexer;
mod pool;


/// Identifies a state within an [`Nfa`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for StateId {
    #[inline]
    fn from(value: usize) -> Self {
        Self(value as u32)
    }
}

impl From<StateId> for usize {
    #[inline]
    fn from(value: StateId) -> Self {
        value.0 as usize
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitmask! {
    /// Line anchors that constrain where a rule can match.
    ///
    /// `Start` is set for rules that begin with `^`, which only match at the
    /// start of a line. `End` is set for rules that end with `$`, which only
    /// match at the end of a line.
    #[derive(Debug, Hash, Serialize, Deserialize)]
    pub mask AnchorSet: u8 where flags Anchor {
        Start = 0x01,
        End   = 0x02,
    }
}

/// What a state accepts: the rule's action and its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accept {
    /// Action of the rule that reaches this state.
    pub action: ActionId,
    /// Anchors of the rule that reaches this state.
    pub anchor: AnchorSet,
}

/// Label of the outgoing edge of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// The transition consumes the given byte.
    Literal(u8),
    /// The transition consumes any byte in the set.
    Class(CharSet),
    /// The transition doesn't consume input.
    Epsilon,
    /// The state is not in use.
    Empty,
}

/// A state in an [`Nfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) edge: Edge,
    pub(crate) next1: Option<StateId>,
    pub(crate) next2: Option<StateId>,
    pub(crate) accept: Option<Accept>,
}

impl Default for NfaState {
    fn default() -> Self {
        Self { edge: Edge::Epsilon, next1: None, next2: None, accept: None }
    }
}

impl NfaState {
    /// Label of the state's edge.
    #[inline]
    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    /// Primary transition.
    #[inline]
    pub fn next1(&self) -> Option<StateId> {
        self.next1
    }

    /// Secondary transition, only present in epsilon states that branch.
    #[inline]
    pub fn next2(&self) -> Option<StateId> {
        self.next2
    }

    /// Accept information, only present in terminal states.
    #[inline]
    pub fn accept(&self) -> Option<Accept> {
        self.accept
    }

    /// Returns `true` if the state has no outgoing transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.next1.is_none()
    }

    /// Returns the state reached from this one when consuming `c`, if any.
    pub fn transition(&self, c: u8) -> Option<StateId> {
        match &self.edge {
            Edge::Literal(l) if *l == c => self.next1,
            Edge::Class(class) if class.contains(c as usize) => self.next1,
            _ => None,
        }
    }
}

/// A nondeterministic automaton produced by [`crate::Compiler::build_nfa`].
#[derive(Debug)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: StateId,
    pub(crate) actions: ActionPool,
}

impl Nfa {
    /// The state where every rule begins.
    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Returns the state identified by `id`.
    ///
    /// # Panics
    ///
    /// If `id` doesn't belong to this automaton.
    #[inline]
    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id.index()]
    }

    /// Number of slots in the state arena. This includes states that were
    /// discarded during the construction, which are not reachable from
    /// [`Nfa::start`].
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the automaton has no states.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the text of an action.
    #[inline]
    pub fn action(&self, id: ActionId) -> Option<&BStr> {
        self.actions.get(id)
    }

    /// Returns the identifiers of the states reachable from the start
    /// state, in ascending order.
    pub fn reachable(&self) -> Vec<StateId> {
        let mut visited = CharSet::with_capacity(self.states.len());
        let mut queue = VecDeque::from([self.start]);

        visited.add(self.start.index());

        while let Some(id) = queue.pop_front() {
            let state = self.state(id);
            for next in [state.next1, state.next2].into_iter().flatten() {
                if !visited.contains(next.index()) {
                    visited.add(next.index());
                    queue.push_back(next);
                }
            }
        }

        visited.iter().map(StateId::from).collect()
    }

    /// Renders the automaton in the [DOT language][1] used by Graphviz.
    ///
    /// [1]: https://graphviz.org/doc/info/lang.html
    pub fn graphviz(&self) -> String {
        let mut out = String::from("digraph {\n");
        out.push_str("rankdir=LR;\n");

        for id in self.reachable() {
            let state = self.state(id);

            if let Some(next2) = state.next2 {
                let _ = writeln!(out, "{} -> {}[label=\"ɛ\"];", id, next2);
            }

            if let Some(next1) = state.next1 {
                let label = match &state.edge {
                    Edge::Literal(c) => fmt_char(*c),
                    Edge::Class(class) => fmt_class(class),
                    Edge::Epsilon | Edge::Empty => String::from("ɛ"),
                };
                let _ = writeln!(
                    out,
                    "{} -> {}[label=\"{}\"];",
                    id,
                    next1,
                    label.replace('\\', r"\\").replace('"', "\\\"")
                );
            }

            if let Some(accept) = state.accept {
                let _ = writeln!(
                    out,
                    "{}[shape=doublecircle, xlabel=\"{}\"];",
                    id,
                    self.fmt_accept(accept)
                        .replace('\\', r"\\")
                        .replace('"', "\\\"")
                );
            }
        }

        out.push_str("}\n");
        out
    }

    /// Formats accept information as `^<action>$`, where the anchors are
    /// only present if the rule has them.
    pub(crate) fn fmt_accept(&self, accept: Accept) -> String {
        fmt_accept(&self.actions, accept)
    }
}

/// Formats accept information as `^<action>$`, where the anchors are only
/// present if the rule has them.
pub(crate) fn fmt_accept(actions: &ActionPool, accept: Accept) -> String {
    format!(
        "{}<{}>{}",
        if accept.anchor.contains(Anchor::Start) { "^" } else { "" },
        actions.get(accept.action).unwrap_or(BStr::new("")),
        if accept.anchor.contains(Anchor::End) { "$" } else { "" },
    )
}

impl Display for Nfa {
    /// Lists the states reachable from the start state, one per line.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for id in self.reachable() {
            let state = self.state(id);

            write!(f, "NFA state {}: ", id)?;

            match state.next1 {
                None => write!(f, "(TERMINAL)")?,
                Some(next1) => {
                    write!(f, "--> {}", next1)?;
                    if let Some(next2) = state.next2 {
                        write!(f, " ({})", next2)?;
                    }
                    match &state.edge {
                        Edge::Literal(c) => write!(f, " on {}", fmt_char(*c))?,
                        Edge::Class(class) => {
                            write!(f, " on {}", fmt_class(class))?
                        }
                        Edge::Epsilon | Edge::Empty => {
                            write!(f, " on EPSILON")?
                        }
                    }
                }
            }

            if id == self.start {
                write!(f, " (START STATE)")?;
            }

            if let Some(accept) = state.accept {
                write!(f, " accepting {}", self.fmt_accept(accept))?;
            }

            writeln!(f)?;
        }
        Ok(())
    }
}
