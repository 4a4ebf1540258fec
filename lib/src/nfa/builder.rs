use crate::actions::ActionPool;
use crate::errors::{Error, SyntaxError};
use crate::input::LineSource;
use crate::macros::MacroTable;
use crate::nfa::lexer::{Lexer, Token};
use crate::nfa::{Accept, Anchor, AnchorSet, Edge, StateId, StatePool};
use crate::set::CharSet;
use crate::ALPHABET_SIZE;

/// A piece of automaton with a single entry and a single exit. The exit
/// state has an epsilon edge without transitions, so it can be connected
/// to anything.
type Fragment = (StateId, StateId);

/// Recursive-descent parser that builds an automaton for each rule it
/// reads, using Thompson's construction.
///
/// The grammar is:
///
/// ```text
/// machine   ::= (rule)+ EOF
/// rule      ::= ['^'] expr ['$'] WHITESPACE action
/// expr      ::= cat_expr ('|' cat_expr)*
/// cat_expr  ::= factor+
/// factor    ::= term ('*' | '+' | '?')?
/// term      ::= '(' expr ')' | '[' ['^'] class ']' | '.' | literal
/// ```
pub(crate) struct Builder<'a, S> {
    lexer: Lexer<'a, S>,
    pool: &'a mut StatePool,
    actions: &'a mut ActionPool,
}

impl<'a, S: LineSource> Builder<'a, S> {
    pub fn new(
        source: S,
        macros: &'a MacroTable,
        max_macro_depth: usize,
        pool: &'a mut StatePool,
        actions: &'a mut ActionPool,
        line_offset: usize,
    ) -> Self {
        Self {
            lexer: Lexer::new(source, macros, max_macro_depth)
                .with_line_offset(line_offset),
            pool,
            actions,
        }
    }

    /// Parses every rule in the input and returns the entry state of each
    /// one, in the order in which they appear.
    pub fn rules(mut self) -> Result<Vec<StateId>, Error> {
        let mut rules = Vec::new();

        self.lexer.advance()?;

        while self.lexer.token() != Token::EndOfInput {
            // States discarded by a previous rule are not reused, so every
            // state in this rule gets a larger identifier than the states
            // in the previous ones.
            self.pool.seal();
            rules.push(self.rule()?);
        }

        Ok(rules)
    }

    fn syntax_error(&self, err: SyntaxError) -> Error {
        Error::SyntaxError { line: self.lexer.line(), err }
    }

    fn rule(&mut self) -> Result<StateId, Error> {
        let mut anchor = AnchorSet::none();

        let (start, mut end) = if self.lexer.token() == Token::AtBol {
            anchor.set(Anchor::Start);
            self.lexer.advance()?;

            let start = self.pool.alloc()?;
            let (expr_start, expr_end) = self.expr()?;

            let state = self.pool.get_mut(start);
            state.edge = Edge::Literal(b'\n');
            state.next1 = Some(expr_start);

            (start, expr_end)
        } else {
            self.expr()?
        };

        if self.lexer.token() == Token::AtEol {
            anchor.set(Anchor::End);
            self.lexer.advance()?;

            let next = self.pool.alloc()?;
            let mut newline = CharSet::new();
            newline.add(b'\n' as usize);

            let state = self.pool.get_mut(end);
            state.edge = Edge::Class(newline);
            state.next1 = Some(next);

            end = next;
        }

        match self.lexer.token() {
            Token::Eos => {}
            Token::ParenClose => {
                return Err(self.syntax_error(SyntaxError::UnmatchedParen))
            }
            _ => return Err(self.syntax_error(SyntaxError::MisplacedEol)),
        }

        let action = self.lexer.action();

        if action.is_empty() {
            return Err(self.syntax_error(SyntaxError::MissingAction));
        }

        let action = self.actions.get_or_intern(action)?;

        self.pool.get_mut(end).accept = Some(Accept { action, anchor });

        // Skip the end of the pattern, this reads the next line.
        self.lexer.advance()?;

        Ok(start)
    }

    fn expr(&mut self) -> Result<Fragment, Error> {
        let (mut start, mut end) = self.cat_expr()?;

        while self.lexer.token() == Token::Or {
            self.lexer.advance()?;

            let (alt_start, alt_end) = self.cat_expr()?;

            let branch = self.pool.alloc()?;
            let join = self.pool.alloc()?;

            let state = self.pool.get_mut(branch);
            state.next1 = Some(start);
            state.next2 = Some(alt_start);

            self.pool.get_mut(end).next1 = Some(join);
            self.pool.get_mut(alt_end).next1 = Some(join);

            start = branch;
            end = join;
        }

        Ok((start, end))
    }

    fn cat_expr(&mut self) -> Result<Fragment, Error> {
        if !self.first_in_cat()? {
            return Err(self.syntax_error(SyntaxError::MissingFactor));
        }

        let (start, mut end) = self.factor()?;

        while self.first_in_cat()? {
            let (next_start, next_end) = self.factor()?;
            // The entry of the second fragment becomes the exit of the
            // first one, nothing points to `next_start` after this.
            self.pool.merge(end, next_start);
            end = next_end;
        }

        Ok((start, end))
    }

    /// Returns `true` if the current token can start a factor, `false` if
    /// it ends a concatenation, and an error if it can't appear here.
    fn first_in_cat(&self) -> Result<bool, Error> {
        match self.lexer.token() {
            Token::ParenClose
            | Token::AtEol
            | Token::Or
            | Token::Eos
            | Token::EndOfInput => Ok(false),
            Token::Closure | Token::PlusClose | Token::Optional => {
                Err(self.syntax_error(SyntaxError::MisplacedClosure(
                    self.lexer.lexeme() as char,
                )))
            }
            Token::CclEnd => {
                Err(self.syntax_error(SyntaxError::UnexpectedBracket))
            }
            Token::AtBol => Err(self.syntax_error(SyntaxError::MisplacedBol)),
            Token::Any
            | Token::CclStart
            | Token::ParenOpen
            | Token::Dash
            | Token::Literal => Ok(true),
        }
    }

    fn factor(&mut self) -> Result<Fragment, Error> {
        let (start, end) = self.term()?;
        let token = self.lexer.token();

        if !matches!(
            token,
            Token::Closure | Token::PlusClose | Token::Optional
        ) {
            return Ok((start, end));
        }

        let entry = self.pool.alloc()?;
        let exit = self.pool.alloc()?;

        let state = self.pool.get_mut(entry);
        state.next1 = Some(start);
        if matches!(token, Token::Closure | Token::Optional) {
            state.next2 = Some(exit);
        }

        let state = self.pool.get_mut(end);
        state.next1 = Some(exit);
        if matches!(token, Token::Closure | Token::PlusClose) {
            state.next2 = Some(start);
        }

        self.lexer.advance()?;

        Ok((entry, exit))
    }

    fn term(&mut self) -> Result<Fragment, Error> {
        if self.lexer.token() == Token::ParenOpen {
            self.lexer.advance()?;
            let fragment = self.expr()?;
            if self.lexer.token() != Token::ParenClose {
                return Err(self.syntax_error(SyntaxError::MissingParen));
            }
            self.lexer.advance()?;
            return Ok(fragment);
        }

        let start = self.pool.alloc()?;
        let end = self.pool.alloc()?;

        let edge = match self.lexer.token() {
            Token::Any => {
                self.lexer.advance()?;
                let mut any = CharSet::with_capacity(ALPHABET_SIZE);
                any.add(b'\n' as usize);
                any.invert();
                Edge::Class(any)
            }
            Token::CclStart => Edge::Class(self.class()?),
            _ => {
                let c = self.lexer.lexeme();
                self.lexer.advance()?;
                Edge::Literal(c)
            }
        };

        let state = self.pool.get_mut(start);
        state.edge = edge;
        state.next1 = Some(end);

        Ok((start, end))
    }

    /// Parses a character class, the current token is `[`.
    fn class(&mut self) -> Result<CharSet, Error> {
        self.lexer.advance()?;

        let negate = self.lexer.token() == Token::AtBol;

        if negate {
            self.lexer.advance()?;
        }

        let mut set = CharSet::with_capacity(ALPHABET_SIZE);

        if self.lexer.token() == Token::CclEnd {
            // `[]` matches whitespace and control characters.
            set.add_members(0..=b' ' as usize);
        } else {
            self.class_members(&mut set)?;
        }

        // Skip `]`.
        self.lexer.advance()?;

        if negate {
            set.grow(ALPHABET_SIZE);
            set.invert();
        }

        Ok(set)
    }

    /// Adds the members of a class to `set`, expanding ranges. Stops at
    /// the closing `]`, without consuming it.
    fn class_members(&mut self, set: &mut CharSet) -> Result<(), Error> {
        let mut prev: Option<u8> = None;

        loop {
            match (self.lexer.token(), prev) {
                (Token::CclEnd, _) => return Ok(()),
                (Token::Eos | Token::EndOfInput, _) => {
                    return Err(self.syntax_error(SyntaxError::MissingBracket))
                }
                (Token::Dash, Some(lo)) => {
                    self.lexer.advance()?;
                    match self.lexer.token() {
                        // A trailing dash is a literal.
                        Token::CclEnd => {
                            set.add(b'-' as usize);
                            return Ok(());
                        }
                        Token::Eos | Token::EndOfInput => {
                            return Err(self
                                .syntax_error(SyntaxError::MissingBracket))
                        }
                        _ => {}
                    }
                    let hi = self.lexer.lexeme();
                    if hi < lo {
                        return Err(self.syntax_error(
                            SyntaxError::InvalidRange(lo as char, hi as char),
                        ));
                    }
                    set.add_members(lo as usize..=hi as usize);
                    prev = None;
                }
                _ => {
                    let c = self.lexer.lexeme();
                    set.add(c as usize);
                    prev = Some(c);
                }
            }
            self.lexer.advance()?;
        }
    }
}
