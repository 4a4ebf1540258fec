use std::io;

use thiserror::Error;

/// Errors returned while compiling rules.
///
/// All of them abort the compilation, no partial automaton is produced.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("syntax error in line {line}: {err}")]
    SyntaxError { line: usize, err: SyntaxError },

    #[error(transparent)]
    MacroError(#[from] MacroError),

    #[error("macro error in line {line}: {err}")]
    MacroExpansionError { line: usize, err: MacroError },

    #[error(transparent)]
    CapacityError(#[from] CapacityError),

    #[error("input error in line {line}: {err}")]
    InputError { line: usize, err: InputError },

    #[error("no rules to compile")]
    NoRules,
}

/// Errors in the structure of a regular expression.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    #[error("missing close parenthesis")]
    MissingParen,

    #[error("unmatched close parenthesis")]
    UnmatchedParen,

    #[error("missing `]` in character class")]
    MissingBracket,

    #[error("unexpected `]`")]
    UnexpectedBracket,

    #[error("expected an expression")]
    MissingFactor,

    #[error("`{0}` must follow an expression")]
    MisplacedClosure(char),

    #[error("`^` must be at the start of a rule or a character class")]
    MisplacedBol,

    #[error("invalid range `{0}-{1}` in character class")]
    InvalidRange(char, char),

    #[error("`$` must be at the end of a pattern")]
    MisplacedEol,

    #[error("missing action after pattern")]
    MissingAction,
}

/// Errors related to macro definitions and macro references.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum MacroError {
    #[error("macro `{0}` is not defined")]
    Undefined(String),

    #[error("missing `}}` in macro reference")]
    MissingBrace,

    #[error("malformed macro definition: `{0}`")]
    Malformed(String),

    #[error("whitespace in the expansion of macro `{0}`")]
    Whitespace(String),

    #[error("macros nested too deeply (max: {0})")]
    TooDeep(usize),
}

/// A configured capacity limit was exceeded.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum CapacityError {
    #[error("too many NFA states (max: {0})")]
    NfaStates(usize),

    #[error("too many DFA states (max: {0})")]
    DfaStates(usize),

    #[error("action text too large (max: {0} bytes)")]
    ActionText(usize),

    #[error("too many macros (max: {0})")]
    Macros(usize),
}

/// Errors in the input lines themselves.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InputError {
    #[error("newline inside quoted string")]
    NewlineInQuote,
}

/// Errors returned while serializing/deserializing a DFA.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("not a relex DFA file")]
    InvalidFormat,

    #[error("invalid relex DFA file")]
    InvalidEncoding(#[from] bincode::Error),

    #[error(transparent)]
    IoError(#[from] io::Error),
}
