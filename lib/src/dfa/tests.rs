use pretty_assertions::assert_eq;

use crate::dfa::{subset_construction, Dfa, FAIL};
use crate::errors::{CapacityError, Error, SerializationError};
use crate::interp::simulate;
use crate::nfa::{Anchor, Nfa};
use crate::{compile, Compiler, ALPHABET_SIZE};

fn build_nfa(rules: &[&str]) -> Nfa {
    let mut compiler = Compiler::new();
    compiler.add_rules(rules.iter()).unwrap();
    compiler.build_nfa().unwrap()
}

fn dfa_action(dfa: &Dfa, input: &[u8]) -> Option<String> {
    dfa.run(input)
        .and_then(|state| dfa.accept(state))
        .map(|(action, _)| action.to_string())
}

fn nfa_action(nfa: &Nfa, input: &[u8]) -> Option<String> {
    simulate(nfa, input)
        .and_then(|accept| nfa.action(accept.action))
        .map(|action| action.to_string())
}

/// Returns every string of length up to `max_len` made of characters in
/// `alphabet`.
fn strings(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    let mut result = vec![vec![]];
    let mut last = vec![vec![]];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for s in &last {
            for c in alphabet {
                let mut s = s.clone();
                s.push(*c);
                next.push(s);
            }
        }
        result.extend(next.iter().cloned());
        last = next;
    }
    result
}

#[test]
fn icon_fcon() {
    let mut compiler = Compiler::new();
    compiler
        .define_macro("D  [0-9]")
        .unwrap()
        .add_rules(["{D}+  return ICON;", "{D}*\\.{D}+  return FCON;"].iter())
        .unwrap();

    let dfa = compiler.build().unwrap();

    assert_eq!(dfa_action(&dfa, b"123"), Some("return ICON;".to_string()));
    assert_eq!(dfa_action(&dfa, b"12.5"), Some("return FCON;".to_string()));
    assert_eq!(dfa_action(&dfa, b".5"), Some("return FCON;".to_string()));
    assert_eq!(dfa_action(&dfa, b"12."), None);
    assert_eq!(dfa.run(b"abc"), None);

    // No prefix of "abc" reaches an accepting state.
    assert_eq!(dfa.next(0, b'a'), None);
    assert!(dfa.accept(0).is_none());
}

#[test]
fn table_layout() {
    let nfa = build_nfa(&["ab  X"]);
    let dfa = Dfa::from_nfa(&nfa, 10).unwrap();

    assert_eq!(dfa.len(), 3);
    assert_eq!(dfa.row(0).len(), ALPHABET_SIZE);

    assert_eq!(dfa.next(0, b'a'), Some(1));
    assert_eq!(dfa.next(1, b'b'), Some(2));
    assert_eq!(dfa.row(0)[b'b' as usize], FAIL);
    assert!(dfa.row(2).iter().all(|next| *next == FAIL));

    assert_eq!(dfa.group(2), Some(0));
    assert_eq!(dfa.group(3), None);

    let (action, anchor) = dfa.accept(2).unwrap();
    assert_eq!(action, "X");
    assert!(!anchor.contains(Anchor::Start));

    // Non-ASCII characters never have transitions.
    assert_eq!(dfa.next(0, 0xE1), None);
}

#[test]
fn no_duplicated_states() {
    let rules = [
        "[0-9]+  ICON",
        "[0-9]*\\.[0-9]+  FCON",
        "(a|b)*abb  ABB",
        "a(b|c)*|d?  X",
        "if|[a-z][a-z0-9]*  ID",
    ];

    let nfa = build_nfa(&rules);
    let subsets = subset_construction(&nfa, 1000).unwrap();

    assert_eq!(subsets.sets.len(), subsets.accepts.len());
    assert_eq!(subsets.table.len(), subsets.sets.len() * ALPHABET_SIZE);

    for (i, a) in subsets.sets.iter().enumerate() {
        for b in &subsets.sets[i + 1..] {
            assert!(!a.is_equal(b));
        }
    }
}

#[test]
fn nfa_and_dfa_agree() {
    let cases: &[(&[&str], &[u8])] = &[
        (&["ab  AB"], b"abc"),
        (&["a|b  X"], b"abc"),
        (&["a*  X", "b  Y"], b"ab"),
        (&["(a|b)*abb  ABB", "a+  A"], b"ab"),
        (&["[0-9]+  ICON", "[0-9]*\\.[0-9]+  FCON"], b"19.x"),
        (&["if  IF", "[a-z]+  ID", ".  ANY"], b"ifz\n"),
        (&["^ab  START", "ab$  END", "ab  AB"], b"ab\n"),
        (&["[^a]b?  X", "a\"+\"  Y"], b"ab+"),
    ];

    for (rules, alphabet) in cases {
        let nfa = build_nfa(rules);
        let dfa = Dfa::from_nfa(&nfa, 254).unwrap();

        for input in strings(alphabet, 5) {
            assert_eq!(
                nfa_action(&nfa, &input),
                dfa_action(&dfa, &input),
                "rules: {:?}, input: {:?}",
                rules,
                String::from_utf8_lossy(&input)
            );
        }
    }
}

#[test]
fn capacity() {
    let nfa = build_nfa(&["(a|b)*abb  ABB"]);

    assert_eq!(Dfa::from_nfa(&nfa, 5).unwrap().len(), 5);
    assert_eq!(
        Dfa::from_nfa(&nfa, 4).unwrap_err(),
        CapacityError::DfaStates(4)
    );

    let mut compiler = Compiler::new();
    compiler.max_dfa_states(2);
    compiler.add_rules(["abc  X"].iter()).unwrap();

    assert_eq!(
        compiler.build().unwrap_err(),
        Error::CapacityError(CapacityError::DfaStates(2))
    );
}

#[test]
fn display() {
    let nfa = build_nfa(&["[0-9]+  NUM", "x  X"]);
    let dfa = Dfa::from_nfa(&nfa, 10).unwrap();

    assert_eq!(
        dfa.to_string(),
        r#"DFA state 0:
    on [0-9] goto 1
    on [x] goto 2
DFA state 1: accepting <NUM>
    on [0-9] goto 1
DFA state 2: accepting <X>
"#
    );
}

#[test]
fn serialization() {
    let dfa = compile("[0-9]+  NUM\n[a-z]+  ID").unwrap();

    let bytes = dfa.serialize().unwrap();
    assert!(bytes.starts_with(b"RELEX-DFA"));

    let restored = Dfa::deserialize(&bytes).unwrap();

    assert_eq!(restored.len(), dfa.len());
    assert_eq!(dfa_action(&restored, b"42"), Some("NUM".to_string()));
    assert_eq!(dfa_action(&restored, b"abc"), Some("ID".to_string()));

    let restored = Dfa::deserialize_from(bytes.as_slice()).unwrap();
    assert_eq!(restored.to_string(), dfa.to_string());

    assert!(matches!(
        Dfa::deserialize(b"NOT-A-DFA"),
        Err(SerializationError::InvalidFormat)
    ));

    assert!(matches!(
        Dfa::deserialize(&bytes[..bytes.len() / 2]),
        Err(SerializationError::InvalidEncoding(_))
    ));
}
