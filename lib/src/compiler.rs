/*! Compilation sessions.

A [`Compiler`] owns everything needed while compiling a set of rules: the
macro table, the pool of action texts and the arena where the NFA states
live. Nothing is shared between different compilers, so any number of them
can exist at the same time.
*/

#[cfg(feature = "logging")]
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::actions::ActionPool;
use crate::dfa::Dfa;
use crate::errors::Error;
use crate::input::LineSource;
use crate::macros::MacroTable;
use crate::nfa::{Builder, Nfa, StateId, StatePool};

/// Line that separates the macro definitions from the rules in the text
/// accepted by [`Compiler::add_source`].
const SECTION_SEPARATOR: &str = "%%";

/// Capacity limits for a compilation. Exceeding any of them aborts the
/// compilation with [`crate::errors::CapacityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum number of NFA states.
    pub max_nfa_states: usize,
    /// Maximum number of DFA states.
    pub max_dfa_states: usize,
    /// Maximum number of macros that can be expanded one inside another.
    pub max_macro_depth: usize,
    /// Maximum number of bytes in all action texts together.
    pub max_action_bytes: usize,
    /// Maximum number of macros.
    pub max_macros: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nfa_states: 768,
            max_dfa_states: 254,
            max_macro_depth: 32,
            max_action_bytes: 10240,
            max_macros: 512,
        }
    }
}

/// Compiles a lex-style text into a [`Dfa`] using the default limits.
///
/// See [`Compiler::add_source`] for the format of the text.
///
/// # Example
///
/// ```rust
/// let dfa = relex::compile(r#"
/// D   [0-9]
/// %%
/// {D}+   return ICON;
/// "#).unwrap();
///
/// let state = dfa.run(b"123").unwrap();
/// assert_eq!(dfa.accept(state).unwrap().0, "return ICON;");
/// ```
pub fn compile(src: &str) -> Result<Dfa, Error> {
    let mut compiler = Compiler::new();
    compiler.add_source(src)?;
    compiler.build()
}

/// Compiles rules into automata.
///
/// Macros must be defined before the rules that use them. Rules can be
/// added in several batches with [`Compiler::add_rules`], they are kept in
/// the order in which they were added. When two rules match the same input
/// the one added first wins.
#[derive(Debug)]
pub struct Compiler {
    limits: Limits,
    macros: MacroTable,
    actions: ActionPool,
    pool: StatePool,
    rules: Vec<StateId>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Creates a new compiler with the default [`Limits`].
    pub fn new() -> Self {
        let limits = Limits::default();
        Self {
            macros: MacroTable::new(limits.max_macros),
            actions: ActionPool::new(limits.max_action_bytes),
            pool: StatePool::new(limits.max_nfa_states),
            rules: Vec::new(),
            limits,
        }
    }

    /// Sets all the capacity limits at once.
    pub fn limits(&mut self, limits: Limits) -> &mut Self {
        self.limits = limits;
        self.macros.set_max_macros(limits.max_macros);
        self.actions.set_max_size(limits.max_action_bytes);
        self.pool.set_max_states(limits.max_nfa_states);
        self
    }

    /// Maximum number of NFA states.
    pub fn max_nfa_states(&mut self, n: usize) -> &mut Self {
        self.limits(Limits { max_nfa_states: n, ..self.limits })
    }

    /// Maximum number of DFA states.
    pub fn max_dfa_states(&mut self, n: usize) -> &mut Self {
        self.limits(Limits { max_dfa_states: n, ..self.limits })
    }

    /// Maximum number of macros that can be expanded one inside another.
    pub fn max_macro_depth(&mut self, n: usize) -> &mut Self {
        self.limits(Limits { max_macro_depth: n, ..self.limits })
    }

    /// Maximum number of bytes in all action texts together.
    pub fn max_action_bytes(&mut self, n: usize) -> &mut Self {
        self.limits(Limits { max_action_bytes: n, ..self.limits })
    }

    /// Maximum number of macros.
    pub fn max_macros(&mut self, n: usize) -> &mut Self {
        self.limits(Limits { max_macros: n, ..self.limits })
    }

    /// Defines a macro from a line with the form `<name> <text>`.
    ///
    /// ```
    /// # use relex::Compiler;
    /// let mut compiler = Compiler::new();
    /// compiler
    ///     .define_macro("D  [0-9]")?
    ///     .add_rules(["{D}+  return NUM;"].iter())?;
    /// # Ok::<(), relex::Error>(())
    /// ```
    pub fn define_macro(&mut self, line: &str) -> Result<&mut Self, Error> {
        self.macros.define(line)?;
        Ok(self)
    }

    /// Defines a macro given its name and replacement text.
    pub fn add_macro(
        &mut self,
        name: &str,
        text: &str,
    ) -> Result<&mut Self, Error> {
        self.macros.insert(name, text)?;
        Ok(self)
    }

    /// Adds the rules read from `source`, one per line.
    ///
    /// If some rule contains errors none of the rules read from `source`
    /// are added, and the compiler stays as it was before the call.
    pub fn add_rules<S: LineSource>(
        &mut self,
        source: S,
    ) -> Result<&mut Self, Error> {
        self.add_rules_at(source, 0)
    }

    /// Adds a lex-style text, which contains macro definitions followed by
    /// a line consisting of `%%` and then the rules. Anything after a
    /// second `%%` line is ignored. A text without `%%` lines contains only
    /// rules.
    ///
    /// Errors report line numbers relative to the start of `src`.
    pub fn add_source(&mut self, src: &str) -> Result<&mut Self, Error> {
        let lines: Vec<&str> = src.lines().collect();

        let separator =
            lines.iter().position(|line| line.trim_end() == SECTION_SEPARATOR);

        let rules = match separator {
            Some(separator) => {
                for line in &lines[..separator] {
                    if !line.trim().is_empty() {
                        self.macros.define(line)?;
                    }
                }
                separator + 1
            }
            None => 0,
        };

        let rules_end = lines[rules..]
            .iter()
            .position(|line| line.trim_end() == SECTION_SEPARATOR)
            .map_or(lines.len(), |end| rules + end);

        self.add_rules_at(lines[rules..rules_end].iter(), rules)
    }

    fn add_rules_at<S: LineSource>(
        &mut self,
        source: S,
        line_offset: usize,
    ) -> Result<&mut Self, Error> {
        let arena_len = self.pool.len();
        let actions_len = self.actions.len();

        let result = Builder::new(
            source,
            &self.macros,
            self.limits.max_macro_depth,
            &mut self.pool,
            &mut self.actions,
            line_offset,
        )
        .rules();

        match result {
            Ok(rules) => {
                self.rules.extend(rules);
                Ok(self)
            }
            Err(err) => {
                // Release every state and action text added by this batch
                // of rules.
                self.pool.truncate(arena_len);
                self.actions.truncate(actions_len);
                Err(err)
            }
        }
    }

    /// Builds an [`Nfa`] with all the rules added so far. The NFA has a
    /// start state with epsilon transitions to each rule's start state.
    pub fn build_nfa(mut self) -> Result<Nfa, Error> {
        let Some((first, rest)) = self.rules.split_first() else {
            return Err(Error::NoRules);
        };

        self.pool.seal();

        let start = self.pool.alloc()?;
        self.pool.get_mut(start).next1 = Some(*first);

        // Each rule hangs from its own epsilon state, chained through
        // `next2`.
        let mut prev = start;
        for rule in rest {
            let branch = self.pool.alloc()?;
            self.pool.get_mut(branch).next1 = Some(*rule);
            self.pool.get_mut(prev).next2 = Some(branch);
            prev = branch;
        }

        info!(
            "NFA built with {} states for {} rules",
            self.pool.len(),
            self.rules.len()
        );

        Ok(Nfa {
            states: self.pool.into_states(),
            start,
            actions: self.actions,
        })
    }

    /// Builds the [`Dfa`] for all the rules added so far.
    pub fn build(self) -> Result<Dfa, Error> {
        let max_dfa_states = self.limits.max_dfa_states;

        #[cfg(feature = "logging")]
        let start = Instant::now();

        let nfa = self.build_nfa()?;

        #[cfg(feature = "logging")]
        info!("NFA build time: {:?}", Instant::elapsed(&start));

        Ok(Dfa::from_nfa(&nfa, max_dfa_states)?)
    }
}
