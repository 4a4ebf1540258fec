/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::errors::{CapacityError, MacroError, SyntaxError};
use crate::{compile, Compiler, Error, Limits};

macro_rules! test_pattern {
    ($pattern:literal, $data:expr, $expected_result:expr) => {{
        let src = format!("{}  MATCH", $pattern);
        let dfa = crate::compile(src.as_str()).unwrap();

        let matches = dfa
            .run($data)
            .and_then(|state| dfa.accept(state))
            .is_some();

        assert_eq!(
            matches, $expected_result,
            "\n\n`{}` applied to `{:?}` should be {}, but it is {}",
            $pattern, $data, $expected_result, !$expected_result
        );
    }};
}

macro_rules! pattern_true {
    ($pattern:literal, $data:expr) => {{
        test_pattern!($pattern, $data, true);
    }};
}

macro_rules! pattern_false {
    ($pattern:literal, $data:expr) => {{
        test_pattern!($pattern, $data, false);
    }};
}

macro_rules! action_for {
    ($src:expr, $data:expr) => {{
        let dfa = crate::compile($src).unwrap();
        dfa.run($data)
            .and_then(|state| dfa.accept(state))
            .map(|(action, _)| action.to_string())
    }};
}

#[test]
fn literals() {
    pattern_true!("abc", b"abc");
    pattern_false!("abc", b"ab");
    pattern_false!("abc", b"abcd");
    pattern_false!("abc", b"ABC");
    pattern_true!("a\\tb", b"a\tb");
    pattern_true!("\\x41\\102", b"AB");
    pattern_true!("\\$\\.", b"$.");
    pattern_true!("\\^M", b"\r");
    pattern_true!("\"(a|b)\"", b"(a|b)");
    pattern_false!("\"(a|b)\"", b"a");
}

#[test]
fn operators() {
    pattern_true!("ab|cd", b"ab");
    pattern_true!("ab|cd", b"cd");
    pattern_false!("ab|cd", b"abcd");
    pattern_true!("a(b|c)*d", b"ad");
    pattern_true!("a(b|c)*d", b"abcbcd");
    pattern_false!("a(b|c)*d", b"abcbc");
    pattern_true!("(ab)+", b"ababab");
    pattern_false!("(ab)+", b"");
    pattern_true!("colou?r", b"color");
    pattern_true!("colou?r", b"colour");
    pattern_false!("colou?r", b"colouur");
    pattern_true!("((a))", b"a");
}

#[test]
fn classes() {
    pattern_true!("[a-z]+", b"hello");
    pattern_false!("[a-z]+", b"Hello");
    pattern_true!("[^a-z]", b"H");
    pattern_false!("[^a-z]", b"h");
    pattern_true!("[A-Za-z_][A-Za-z0-9_]*", b"_foo42");
    pattern_false!("[A-Za-z_][A-Za-z0-9_]*", b"42foo");
    pattern_true!("[+-]?[0-9]+", b"-12");
    pattern_true!("[.]", b".");
    pattern_false!("[.]", b"a");
    pattern_true!(".+", b"any thing");
    pattern_false!(".+", b"two\nlines");
}

#[test]
fn anchors() {
    pattern_true!("^abc", b"\nabc");
    pattern_false!("^abc", b"abc");
    pattern_true!("abc$", b"abc\n");
    pattern_false!("abc$", b"abc");

    let dfa = compile("^a$  X").unwrap();
    let state = dfa.run(b"\na\n").unwrap();
    let (action, anchor) = dfa.accept(state).unwrap();

    assert_eq!(action, "X");
    assert!(anchor.contains(crate::nfa::Anchor::Start));
    assert!(anchor.contains(crate::nfa::Anchor::End));
}

#[test]
fn sections() {
    let src = r#"
D       [0-9]
E       [Ee][-+]?{D}+
%%
{D}+                    return ICON;
({D}+|{D}*\.{D}+)({E})? return FCON;
[a-z]+                  return ID;
%%
int main() { return 0; }
"#;

    assert_eq!(action_for!(src, b"123"), Some("return ICON;".to_string()));
    assert_eq!(action_for!(src, b"1.5"), Some("return FCON;".to_string()));
    assert_eq!(action_for!(src, b"1e-3"), Some("return FCON;".to_string()));
    assert_eq!(action_for!(src, b".5E7"), Some("return FCON;".to_string()));
    assert_eq!(action_for!(src, b"abc"), Some("return ID;".to_string()));
    assert_eq!(action_for!(src, b"1e"), None);
}

#[test]
fn without_sections() {
    assert_eq!(
        action_for!("a  A\nb+  B\n", b"bbb"),
        Some("B".to_string())
    );
}

#[test]
fn earlier_rules_win() {
    let src = "if  KEYWORD\n[a-z]+  ID";
    assert_eq!(action_for!(src, b"if"), Some("KEYWORD".to_string()));
    assert_eq!(action_for!(src, b"iff"), Some("ID".to_string()));

    let src = "[a-z]+  ID\nif  KEYWORD";
    assert_eq!(action_for!(src, b"if"), Some("ID".to_string()));
}

#[test]
fn macros_are_textual() {
    let with_macro = compile("D  [0-9]\n%%\n{D}+  NUM").unwrap();
    let without_macro = compile("[0-9]+  NUM").unwrap();

    assert_eq!(with_macro.to_string(), without_macro.to_string());

    // Macros can reference other macros defined before.
    let nested = compile("D  [0-9]\nN  {D}+\n%%\n{N}  NUM").unwrap();
    assert_eq!(nested.to_string(), without_macro.to_string());
}

#[test]
fn error_lines() {
    assert_eq!(
        compile("D  [0-9]\n%%\n{D}+  NUM\n({D}  BAD").unwrap_err(),
        Error::SyntaxError { line: 4, err: SyntaxError::MissingParen }
    );

    assert_eq!(
        compile("a  A\n\n[z-a]  B").unwrap_err(),
        Error::SyntaxError {
            line: 3,
            err: SyntaxError::InvalidRange('z', 'a')
        }
    );

    assert_eq!(
        compile("D\n%%\na  A").unwrap_err(),
        Error::MacroError(MacroError::Malformed("D".to_string()))
    );

    assert_eq!(
        compile("D  [0-9]\n%%\na  A\n{X}  B").unwrap_err(),
        Error::MacroExpansionError {
            line: 4,
            err: MacroError::Undefined("X".to_string())
        }
    );

    assert_eq!(
        compile("S  a b\n%%\na  A\n\n{S}  B")
            .unwrap_err()
            .to_string(),
        "macro error in line 5: whitespace in the expansion of macro `S`"
    );

    assert_eq!(compile("D  [0-9]\n%%\n").unwrap_err(), Error::NoRules);
}

#[test]
fn limits() {
    let mut compiler = Compiler::new();
    compiler
        .limits(Limits { max_dfa_states: 2, ..Limits::default() })
        .add_rules(["abc  X"].iter())
        .unwrap();

    assert_eq!(
        compiler.build().unwrap_err(),
        Error::CapacityError(CapacityError::DfaStates(2))
    );

    let mut compiler = Compiler::new();
    compiler.max_macros(1).add_macro("A", "a").unwrap();

    assert_eq!(
        compiler.add_macro("B", "b").unwrap_err(),
        Error::CapacityError(CapacityError::Macros(1))
    );

    // Redefining an existing macro doesn't count as a new one.
    assert!(compiler.add_macro("A", "aa").is_ok());

    let mut compiler = Compiler::new();
    compiler.max_macro_depth(2).add_macro("A", "a{A}").unwrap();

    assert_eq!(
        compiler.add_rules(["{A}  X"].iter()).unwrap_err(),
        Error::MacroExpansionError { line: 1, err: MacroError::TooDeep(2) }
    );
}

#[test]
fn default_limits() {
    let limits = Limits::default();

    assert_eq!(limits.max_nfa_states, 768);
    assert_eq!(limits.max_dfa_states, 254);
    assert_eq!(limits.max_macro_depth, 32);
    assert_eq!(limits.max_action_bytes, 10240);
    assert_eq!(limits.max_macros, 512);
}

#[test]
fn failed_batches_leave_no_actions() {
    let mut compiler = Compiler::new();
    compiler.add_rules(["[0-9]+  NUM"].iter()).unwrap();
    assert!(compiler
        .add_rules(["[a-z]+  DISCARDED", "[A-Z  UPPER"].iter())
        .is_err());

    let dfa = compiler.build().unwrap();
    let serialized = dfa.serialize().unwrap();

    assert!(!serialized.windows(9).any(|w| w == b"DISCARDED"));
    assert!(!format!("{:?}", dfa).contains("DISCARDED"));

    let state = dfa.run(b"7").unwrap();
    assert_eq!(dfa.accept(state).unwrap().0, "NUM");
}

#[test]
fn serialization_round_trip() {
    let dfa = compile("[0-9]+  NUM\n[a-z]+  ID\n[\\t\\s]+  WS").unwrap();
    let restored = crate::Dfa::deserialize(dfa.serialize().unwrap()).unwrap();

    assert_eq!(restored.to_string(), dfa.to_string());
}
