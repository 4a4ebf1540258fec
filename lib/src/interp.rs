/*! Primitives for running an [`Nfa`] over sets of states.

[`epsilon_closure`] and [`move_on`] are the two operations that subset
construction is built upon. [`simulate`] combines them for running an input
string directly against the automaton.
*/

use crate::nfa::{Accept, Edge, Nfa, StateId};
use crate::set::CharSet;

/// Result of [`epsilon_closure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    /// States reachable through epsilon transitions, including the initial
    /// ones.
    pub states: CharSet,
    /// What the closure accepts. When the closure contains more than one
    /// accepting state, the one with the smallest identifier wins, which
    /// is the one for the rule that was declared first.
    pub accept: Option<Accept>,
}

/// Returns every state reachable from the states in `input` without
/// consuming any input.
pub fn epsilon_closure(nfa: &Nfa, input: &CharSet) -> Closure {
    let mut states = input.clone();
    let mut pending: Vec<usize> = input.iter().collect();
    let mut accept: Option<(usize, Accept)> = None;

    states.grow(nfa.len());

    while let Some(index) = pending.pop() {
        let state = nfa.state(StateId::from(index));

        if let Some(a) = state.accept() {
            if accept.map_or(true, |(current, _)| index < current) {
                accept = Some((index, a));
            }
        }

        if !matches!(state.edge(), Edge::Epsilon) {
            continue;
        }

        for next in [state.next1(), state.next2()].into_iter().flatten() {
            if !states.contains(next.index()) {
                states.add(next.index());
                pending.push(next.index());
            }
        }
    }

    Closure { states, accept: accept.map(|(_, a)| a) }
}

/// Returns the states reached from the states in `input` when consuming
/// `c`, or `None` if none of them has a transition on `c`.
pub fn move_on(nfa: &Nfa, input: &CharSet, c: u8) -> Option<CharSet> {
    let mut output: Option<CharSet> = None;

    for index in input {
        if let Some(next) = nfa.state(StateId::from(index)).transition(c) {
            output
                .get_or_insert_with(|| CharSet::with_capacity(nfa.len()))
                .add(next.index());
        }
    }

    output
}

/// Runs `input` through the automaton and returns what the automaton
/// accepts after consuming all of it, or `None` if the input is rejected.
pub fn simulate(nfa: &Nfa, input: &[u8]) -> Option<Accept> {
    let mut start = CharSet::with_capacity(nfa.len());
    start.add(nfa.start().index());

    let mut closure = epsilon_closure(nfa, &start);

    for c in input {
        let next = move_on(nfa, &closure.states, *c)?;
        closure = epsilon_closure(nfa, &next);
    }

    closure.accept
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{epsilon_closure, move_on, simulate};
    use crate::nfa::Nfa;
    use crate::set::CharSet;
    use crate::Compiler;

    fn build(rules: &[&str]) -> Nfa {
        let mut compiler = Compiler::new();
        compiler.add_rules(rules.iter()).unwrap();
        compiler.build_nfa().unwrap()
    }

    fn action(nfa: &Nfa, input: &[u8]) -> Option<String> {
        simulate(nfa, input)
            .and_then(|accept| nfa.action(accept.action))
            .map(|text| text.to_string())
    }

    #[test]
    fn closure() {
        let nfa = build(&["a* A"]);

        let mut start = CharSet::new();
        start.add(nfa.start().index());

        let closure = epsilon_closure(&nfa, &start);

        // `a*` accepts the empty string, so the closure of the start state
        // contains the accepting state.
        assert!(closure.accept.is_some());
        assert!(closure.states.contains(nfa.start().index()));
        assert!(closure.states.len() > 1);

        // The closure of a set contains the set.
        let again = epsilon_closure(&nfa, &closure.states);
        assert_eq!(again.states, closure.states);
    }

    #[test]
    fn no_transition() {
        let nfa = build(&["ab AB"]);

        let mut start = CharSet::new();
        start.add(nfa.start().index());

        let closure = epsilon_closure(&nfa, &start);

        assert_eq!(move_on(&nfa, &closure.states, b'b'), None);
        assert!(move_on(&nfa, &closure.states, b'a').is_some());
    }

    #[test]
    fn first_rule_wins() {
        let nfa = build(&["if IF", "[a-z]+ ID"]);

        assert_eq!(action(&nfa, b"if"), Some("IF".to_string()));
        assert_eq!(action(&nfa, b"i"), Some("ID".to_string()));
        assert_eq!(action(&nfa, b"iff"), Some("ID".to_string()));
        assert_eq!(action(&nfa, b"IF"), None);

        let nfa = build(&["[a-z]+ ID", "if IF"]);
        assert_eq!(action(&nfa, b"if"), Some("ID".to_string()));
    }
}
