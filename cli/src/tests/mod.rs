
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn cli_nfa() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("nfa")
        .arg("src/tests/testdata/ab.lex")
        .assert()
        .success()
        .stdout(
            "NFA state 0: --> 1 on a
NFA state 1: --> 3 on b
NFA state 3: (TERMINAL) accepting <X>
NFA state 4: --> 0 on EPSILON (START STATE)
",
        );
}

#[test]
fn cli_nfa_graphviz() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("nfa")
        .arg("--graphviz")
        .arg("src/tests/testdata/ab.lex")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph {"))
        .stdout(predicate::str::contains("0 -> 1[label=\"a\"];"));
}

#[test]
fn cli_dfa() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("dfa")
        .arg("src/tests/testdata/ab.lex")
        .assert()
        .success()
        .stdout(
            "DFA state 0:
    on [a] goto 1
DFA state 1:
    on [b] goto 2
DFA state 2: accepting <X>
",
        );
}

#[test]
fn cli_run() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("run")
        .arg("src/tests/testdata/numbers.lex")
        .arg("123")
        .arg("1.5")
        .arg("1.")
        .assert()
        .success()
        .stdout(
            "123: return ICON;
1.5: return FCON;
1.: no match
",
        );
}

#[test]
fn cli_syntax_error() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("dfa")
        .arg("src/tests/testdata/unbalanced.lex")
        .assert()
        .code(1)
        .stderr(
            "error: can not compile `src/tests/testdata/unbalanced.lex`: \
             syntax error in line 4: missing close parenthesis\n",
        );
}

#[test]
fn cli_missing_file() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("dfa")
        .arg("src/tests/testdata/missing.lex")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with(
            "error: can not read `src/tests/testdata/missing.lex`",
        ));
}

#[test]
fn cli_config_limits() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("--config")
        .arg("src/tests/testdata/small.toml")
        .arg("dfa")
        .arg("src/tests/testdata/ab.lex")
        .assert()
        .code(1)
        .stderr("error: too many DFA states (max: 2)\n");
}

#[test]
fn cli_config_unknown_field() {
    Command::cargo_bin("relex")
        .unwrap()
        .arg("--config")
        .arg("src/tests/testdata/unknown.toml")
        .arg("dfa")
        .arg("src/tests/testdata/ab.lex")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_states"));
}
