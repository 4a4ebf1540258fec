/*! Macro definitions.

A macro definition is a line with the form `<name> <replacement text>`. The
name extends up to the first whitespace, and the replacement text starts
after the whitespace that follows the name. Trailing whitespace in the
replacement text is ignored, except for a space preceded by a backslash,
which is kept as part of an escape sequence.

Macros are referenced in patterns as `{name}`, the reference is replaced
with the macro's text.
*/

use rustc_hash::FxHashMap;

use crate::errors::{CapacityError, MacroError};

/// Table that maps macro names to their replacement text.
///
/// Defining a macro that already exists replaces the previous definition.
#[derive(Debug)]
pub struct MacroTable {
    macros: FxHashMap<String, String>,
    max_macros: usize,
}

impl MacroTable {
    /// Creates an empty table that accepts at most `max_macros` different
    /// macros.
    pub fn new(max_macros: usize) -> Self {
        Self { macros: FxHashMap::default(), max_macros }
    }

    /// Changes the maximum number of macros. Macros already in the table
    /// are kept even if they exceed the new limit.
    pub fn set_max_macros(&mut self, max_macros: usize) {
        self.max_macros = max_macros;
    }

    /// Parses a definition line and adds the macro to the table.
    pub fn define(&mut self, line: &str) -> Result<(), crate::Error> {
        let line = line.trim_start();

        let (name, text) = line
            .split_once(|c: char| c.is_ascii_whitespace())
            .ok_or_else(|| MacroError::Malformed(line.to_string()))?;

        let text = trim_end_preserving_escape(text.trim_start());

        if text.is_empty() {
            return Err(MacroError::Malformed(line.to_string()).into());
        }

        self.insert(name, text)?;
        Ok(())
    }

    /// Adds a macro to the table, replacing any previous macro with the
    /// same name.
    pub fn insert(
        &mut self,
        name: &str,
        text: &str,
    ) -> Result<(), CapacityError> {
        if self.macros.len() >= self.max_macros
            && !self.macros.contains_key(name)
        {
            return Err(CapacityError::Macros(self.max_macros));
        }
        self.macros.insert(name.to_string(), text.to_string());
        Ok(())
    }

    /// Returns the text of the macro with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(|text| text.as_str())
    }

    /// Number of macros in the table.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.macros.len()
    }
}

/// Removes trailing whitespace from `text`. If the last removed character is
/// a space preceded by a backslash, the space is put back, as `\ ` is an
/// escaped space.
fn trim_end_preserving_escape(text: &str) -> &str {
    let trimmed = text.trim_end();
    if trimmed.len() < text.len()
        && trimmed.ends_with('\\')
        && text.as_bytes()[trimmed.len()] == b' '
        && !ends_with_escaped_backslash(trimmed)
    {
        &text[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Returns `true` if `text` ends with an even number of backslashes, which
/// means that the last backslash is escaped.
fn ends_with_escaped_backslash(text: &str) -> bool {
    let backslashes =
        text.as_bytes().iter().rev().take_while(|c| **c == b'\\').count();
    backslashes % 2 == 0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::MacroTable;
    use crate::errors::{CapacityError, Error, MacroError};

    #[test]
    fn define() {
        let mut table = MacroTable::new(10);

        table.define("D   [0-9]  ").unwrap();
        table.define("L\t[a-zA-Z_]").unwrap();
        table.define("SP [ ]+\\ ").unwrap();

        assert_eq!(table.get("D"), Some("[0-9]"));
        assert_eq!(table.get("L"), Some("[a-zA-Z_]"));
        assert_eq!(table.get("SP"), Some("[ ]+\\ "));
        assert_eq!(table.get("X"), None);

        // Last definition wins.
        table.define("D [0-7]").unwrap();
        assert_eq!(table.get("D"), Some("[0-7]"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn escaped_backslash_at_end() {
        let mut table = MacroTable::new(10);
        table.define("B  a\\\\   ").unwrap();
        assert_eq!(table.get("B"), Some("a\\\\"));
    }

    #[test]
    fn malformed() {
        let mut table = MacroTable::new(10);

        assert_eq!(
            table.define("D").unwrap_err(),
            Error::from(MacroError::Malformed("D".to_string()))
        );

        assert_eq!(
            table.define("D    ").unwrap_err(),
            Error::from(MacroError::Malformed("D    ".to_string()))
        );
    }

    #[test]
    fn capacity() {
        let mut table = MacroTable::new(1);
        table.insert("A", "a").unwrap();
        // Redefinitions don't count.
        table.insert("A", "b").unwrap();
        assert_eq!(table.insert("B", "b"), Err(CapacityError::Macros(1)));
    }
}
