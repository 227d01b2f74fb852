//! Tokenizer for metadata declaration blocks.
//!
//! Recognizes only what the declaration grammar needs: variables, bare words,
//! quoted strings, numbers and punctuation. Comments (`//`, `#`, `/* */`) and
//! whitespace are skipped. Any other character is reported as
//! [`Token::Unexpected`] so the parser can reject it with a position.

use super::ExtractError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// `$name`
    Variable(String),
    /// Bare word: `array`, `true`, `false`, `null` or anything the parser rejects.
    Word(String),
    Str(String),
    Integer(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// `=>`
    Arrow,
    /// `=`
    Assign,
    Semicolon,
    Unexpected(char),
}

/// A token with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// `first_line` is the file line the block starts on, so positions in
    /// errors point into the about file rather than the block.
    pub fn new(source: &'a str, first_line: usize) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: first_line,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, ExtractError> {
        let mut tokens = Vec::new();
        while let Some(spanned) = self.next_token()? {
            tokens.push(spanned);
        }
        Ok(tokens)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn syntax(&self, line: usize, column: usize, message: impl Into<String>) -> ExtractError {
        ExtractError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ExtractError> {
        loop {
            match self.chars.peek().copied() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            let (line, column) = (self.line, self.column);
                            self.bump();
                            self.bump();
                            let mut closed = false;
                            while let Some(c) = self.bump() {
                                if c == '*' && self.chars.peek() == Some(&'/') {
                                    self.bump();
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(self.syntax(line, column, "unterminated comment"));
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ExtractError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(c) = self.bump() else {
            return Ok(None);
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '=' => {
                if self.chars.peek() == Some(&'>') {
                    self.bump();
                    Token::Arrow
                } else {
                    Token::Assign
                }
            }
            '$' => {
                let name = self.take_word();
                if name.is_empty() {
                    return Err(self.syntax(line, column, "expected a variable name after '$'"));
                }
                Token::Variable(name)
            }
            '\'' | '"' => Token::Str(self.take_string(c, line, column)?),
            '-' | '+' if self.chars.peek().is_some_and(|d| d.is_ascii_digit()) => {
                let mut text = String::new();
                if c == '-' {
                    text.push('-');
                }
                text.push_str(&self.take_digits());
                self.number_token(&text, line, column)?
            }
            d if d.is_ascii_digit() => {
                let mut text = String::from(d);
                text.push_str(&self.take_digits());
                self.number_token(&text, line, column)?
            }
            w if w.is_alphabetic() || w == '_' => {
                let mut word = String::from(w);
                word.push_str(&self.take_word());
                Token::Word(word)
            }
            other => Token::Unexpected(other),
        };

        Ok(Some(Spanned {
            token,
            line,
            column,
        }))
    }

    fn take_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        word
    }

    fn take_string(&mut self, quote: char, line: usize, column: usize) -> Result<String, ExtractError> {
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.syntax(line, column, "unterminated string literal"));
            };
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(escaped) = self.bump() else {
                return Err(self.syntax(line, column, "unterminated string literal"));
            };
            match (quote, escaped) {
                (_, '\\') => out.push('\\'),
                (q, e) if e == q => out.push(e),
                ('"', 'n') => out.push('\n'),
                ('"', 't') => out.push('\t'),
                ('"', 'r') => out.push('\r'),
                ('"', '$') => out.push('$'),
                (_, other) => {
                    // Unknown escapes are kept verbatim.
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    /// Digits, `.` and `_` separators following the current position.
    fn take_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                if c != '_' {
                    digits.push(c);
                }
                self.bump();
            } else {
                break;
            }
        }
        digits
    }

    fn number_token(&self, text: &str, line: usize, column: usize) -> Result<Token, ExtractError> {
        if text.contains('.') {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.syntax(line, column, format!("invalid number '{text}'")))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.syntax(line, column, format!("invalid number '{text}'")))
        }
    }
}
