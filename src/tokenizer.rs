// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Query template tokenizer
//!
//! Splits a `format`-style query template into literal text, `%s`
//! placeholders and `%%` escapes. The SQL itself is never inspected: a `%s`
//! inside a quoted string is still a placeholder, exactly like the
//! `pyformat` parameter style MySQL drivers use.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Query template token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal SQL text, copied through unchanged
    Text(String),
    /// A `%s` parameter slot
    Placeholder,
    /// An escaped percent sign `%%`
    Percent,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Text(ref s) => f.write_str(s),
            Token::Placeholder => f.write_str("%s"),
            Token::Percent => f.write_str("%%"),
        }
    }
}

/// Tokenizer error
#[derive(Debug, PartialEq)]
pub struct TokenizerError {
    pub message: String,
    pub line: u64,
    pub col: u64,
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at Line: {}, Col: {}",
            self.message, self.line, self.col
        )
    }
}

impl std::error::Error for TokenizerError {}

/// Query template tokenizer
pub struct Tokenizer<'a> {
    query: Peekable<Chars<'a>>,
    pub line: u64,
    pub col: u64,
}

impl<'a> Tokenizer<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query: query.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the whole template.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Get the next token or return None
    pub fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        match self.query.peek() {
            Some('%') => {
                let (line, col) = (self.line, self.col);
                self.bump(); // consume the '%'
                match self.query.peek() {
                    Some('s') => self.consume_and_return(Token::Placeholder),
                    Some('%') => self.consume_and_return(Token::Percent),
                    Some(other) => Err(TokenizerError {
                        message: format!("unsupported format character '{}'", other),
                        line,
                        col,
                    }),
                    None => Err(TokenizerError {
                        message: "incomplete format".to_string(),
                        line,
                        col,
                    }),
                }
            }
            Some(_) => {
                let s = self.peeking_take_while(|ch| ch != '%');
                Ok(Some(Token::Text(s)))
            }
            None => Ok(None),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.query.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn consume_and_return(&mut self, t: Token) -> Result<Option<Token>, TokenizerError> {
        self.bump();
        Ok(Some(t))
    }

    /// Read until `predicate` returns `false` or EOF is hit. The first
    /// non-matching char stays available as the next peek.
    fn peeking_take_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(&ch) = self.query.peek() {
            if predicate(ch) {
                self.bump();
                s.push(ch);
            } else {
                break;
            }
        }
        s
    }
}
