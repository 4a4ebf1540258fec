use log::trace;

use crate::errors::{Error, InputError, MacroError};
use crate::escape::escape;
use crate::input::LineSource;
use crate::macros::MacroTable;

/// Tokens recognized in rule patterns. All lexemes are a single character,
/// except escape sequences, which are decoded into a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    /// End of the pattern, either because whitespace was found or because
    /// the line ended.
    Eos,
    /// `.`
    Any,
    /// `^`
    AtBol,
    /// `$`
    AtEol,
    /// `[`
    CclStart,
    /// `]`
    CclEnd,
    /// `(`
    ParenOpen,
    /// `)`
    ParenClose,
    /// `*`
    Closure,
    /// `-`
    Dash,
    /// No more lines.
    EndOfInput,
    /// Any character without a special meaning, or a character that is
    /// quoted or escaped.
    Literal,
    /// `?`
    Optional,
    /// `|`
    Or,
    /// `+`
    PlusClose,
}

impl Token {
    fn from_lexeme(c: u8) -> Self {
        match c {
            b'.' => Token::Any,
            b'^' => Token::AtBol,
            b'$' => Token::AtEol,
            b'[' => Token::CclStart,
            b']' => Token::CclEnd,
            b'(' => Token::ParenOpen,
            b')' => Token::ParenClose,
            b'*' => Token::Closure,
            b'-' => Token::Dash,
            b'?' => Token::Optional,
            b'|' => Token::Or,
            b'+' => Token::PlusClose,
            _ => Token::Literal,
        }
    }
}

/// Text being tokenized. The bottom frame is the current input line, the
/// ones above it are the replacement texts of the macros being expanded.
struct Frame {
    text: Vec<u8>,
    pos: usize,
    /// Name of the macro, `None` for the input line.
    name: Option<String>,
}

impl Frame {
    fn rest(&self) -> &[u8] {
        &self.text[self.pos..]
    }
}

/// Splits the text coming from a [`LineSource`] into tokens, expanding
/// macro references on the fly.
pub(crate) struct Lexer<'a, S> {
    source: S,
    macros: &'a MacroTable,
    max_macro_depth: usize,
    frames: Vec<Frame>,
    in_quote: bool,
    token: Token,
    lexeme: u8,
    line: usize,
}

impl<'a, S: LineSource> Lexer<'a, S> {
    pub fn new(
        source: S,
        macros: &'a MacroTable,
        max_macro_depth: usize,
    ) -> Self {
        Self {
            source,
            macros,
            max_macro_depth,
            frames: Vec::new(),
            in_quote: false,
            // Starting at `Eos` forces the first call to `advance` to read
            // a line.
            token: Token::Eos,
            lexeme: 0,
            line: 0,
        }
    }

    /// Makes line numbers start after `offset`, for sources that begin
    /// in the middle of a file.
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        self.line = offset;
        self
    }

    /// Current token.
    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Character associated to the current token.
    #[inline]
    pub fn lexeme(&self) -> u8 {
        self.lexeme
    }

    /// Number of the line being tokenized, starting at 1. Blank lines
    /// count.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the rest of the current line, skipping leading whitespace,
    /// and consumes it. Only meaningful when the current token is
    /// [`Token::Eos`].
    pub fn action(&mut self) -> Vec<u8> {
        let Some(frame) = self.frames.first_mut() else {
            return Vec::new();
        };
        let rest = frame.rest();
        let skip =
            rest.iter().take_while(|c| c.is_ascii_whitespace()).count();
        let action = rest[skip..].to_vec();
        frame.pos = frame.text.len();
        action
    }

    /// Moves to the next token and returns it.
    pub fn advance(&mut self) -> Result<Token, Error> {
        match self.token {
            Token::EndOfInput => return Ok(Token::EndOfInput),
            Token::Eos => {
                if !self.next_line() {
                    self.token = Token::EndOfInput;
                    self.lexeme = 0;
                    return Ok(self.token);
                }
            }
            _ => {}
        }

        loop {
            let Some(frame) = self.frames.last() else {
                return Ok(self.eos());
            };

            match frame.rest().first().copied() {
                None if self.frames.len() > 1 => {
                    self.frames.pop();
                }
                None if self.in_quote => {
                    return Err(Error::InputError {
                        line: self.line,
                        err: InputError::NewlineInQuote,
                    });
                }
                None => return Ok(self.eos()),
                Some(b'{') if !self.in_quote => self.expand_macro()?,
                Some(b'"') => {
                    self.in_quote = !self.in_quote;
                    self.bump(1);
                }
                Some(_) => break,
            }
        }

        let Some(frame) = self.frames.last() else {
            return Ok(self.eos());
        };

        let rest = frame.rest();
        let escaped = rest[0] == b'\\';

        let (token, lexeme, len) = if self.in_quote {
            if escaped && rest.get(1) == Some(&b'"') {
                (Token::Literal, b'"', 2)
            } else {
                (Token::Literal, rest[0], 1)
            }
        } else if rest[0].is_ascii_whitespace() {
            if let Some(name) = &frame.name {
                return Err(Error::MacroExpansionError {
                    line: self.line,
                    err: MacroError::Whitespace(name.clone()),
                });
            }
            // The whitespace is not consumed, it separates the pattern
            // from the action.
            return Ok(self.eos());
        } else {
            let (lexeme, len) = escape(rest);
            let token = if escaped {
                Token::Literal
            } else {
                Token::from_lexeme(lexeme)
            };
            (token, lexeme, len)
        };

        self.bump(len);
        self.token = token;
        self.lexeme = lexeme;

        Ok(token)
    }

    fn eos(&mut self) -> Token {
        self.token = Token::Eos;
        self.lexeme = 0;
        self.token
    }

    fn bump(&mut self, len: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pos += len;
        }
    }

    /// Reads the next non-blank line. Returns `false` if there are no more
    /// lines.
    fn next_line(&mut self) -> bool {
        self.frames.clear();
        self.in_quote = false;
        while let Some(line) = self.source.next_line() {
            self.line += 1;
            let line = line.trim_start();
            if !line.is_empty() {
                self.frames.push(Frame {
                    text: line.as_bytes().to_vec(),
                    pos: 0,
                    name: None,
                });
                return true;
            }
        }
        false
    }

    /// Replaces the `{name}` reference at the current position with the
    /// text of the macro.
    fn expand_macro(&mut self) -> Result<(), Error> {
        let line = self.line;
        let error = |err| Error::MacroExpansionError { line, err };

        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };

        let rest = &frame.rest()[1..];
        let close = rest
            .iter()
            .position(|c| *c == b'}')
            .ok_or_else(|| error(MacroError::MissingBrace))?;

        let name = String::from_utf8_lossy(&rest[..close]).into_owned();

        // Skip `{`, the name and `}`.
        frame.pos += close + 2;

        let text = self
            .macros
            .get(&name)
            .ok_or_else(|| error(MacroError::Undefined(name.clone())))?;

        // The bottom frame is the input line, the rest are macros.
        if self.frames.len() > self.max_macro_depth {
            return Err(error(MacroError::TooDeep(self.max_macro_depth)));
        }

        trace!("expanding macro `{}` into `{}`", name, text);

        self.frames.push(Frame {
            text: text.as_bytes().to_vec(),
            pos: 0,
            name: Some(name),
        });

        Ok(())
    }
}
