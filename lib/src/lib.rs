/*! A compiler that turns lex-style rules into deterministic automata.

Each rule is a regular expression followed by an action. The rules are
compiled into a nondeterministic automaton using Thompson's construction,
which is later converted into a deterministic one by subset construction.
The result is a dense transition table with one row per state and one
column per ASCII character, plus the action accepted by each state.

The main type in this crate is [`Compiler`]. A compiler receives macro
definitions and rules, and produces either an [`Nfa`] or a [`Dfa`]. Each
compiler is independent from the others, all the state used during the
compilation is owned by it.

# Example

```rust
# use relex;
// Create a compiler.
let mut compiler = relex::Compiler::new();

// Define a macro and add some rules that use it.
compiler
    .define_macro("D   [0-9]")
    .unwrap()
    .add_rules(["{D}+  return ICON;", "{D}*\\.{D}+  return FCON;"].iter())
    .unwrap();

// Obtain the deterministic automaton.
let dfa = compiler.build().unwrap();

let state = dfa.run(b"12.5").unwrap();
assert_eq!(dfa.accept(state).unwrap().0, "return FCON;");
```
*/

pub use actions::ActionId;
pub use compiler::compile;
pub use compiler::Compiler;
pub use compiler::Limits;
pub use dfa::Dfa;
pub use errors::Error;
pub use errors::SerializationError;
pub use input::LineSource;
pub use nfa::Nfa;
pub use set::CharSet;

pub mod dfa;
pub mod errors;
pub mod escape;
pub mod input;
pub mod interp;
pub mod nfa;
pub mod set;

mod actions;
mod compiler;
mod macros;
mod utils;

#[cfg(test)]
mod tests;

/// Number of characters in the alphabet. Patterns can only match ASCII
/// characters, which is also the number of columns in the transition
/// table.
pub const ALPHABET_SIZE: usize = 128;
