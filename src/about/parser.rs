//! Constrained parser for metadata declarations.
//!
//! Accepted grammar (nothing else, in particular no calls, variables on the
//! right-hand side, constants or concatenation):
//!
//! ```text
//! statement := '$ThemeInfo' ('[' key ']')* '=' value ';'?
//! value     := array | string | number | true | false | null
//! array     := 'array' '(' entries ')' | '[' entries ']'
//! entries   := (entry (',' entry)* ','?)?
//! entry     := key '=>' value | value
//! key       := string | integer
//! ```

use super::ExtractError;
use super::lexer::{Lexer, Spanned, Token};
use super::value::MetaValue;
use std::collections::BTreeMap;

/// Maximum array nesting, counted from the outermost declaration array.
///
/// `$ThemeInfo = array('id' => array('Options' => array('Styles' =>
/// array('Dark' => array(...)))))` uses all five levels.
pub const MAX_NESTING: usize = 5;

/// Parse a declaration block whose statement assigns to `$<variable>`.
///
/// Returns the assigned structure with any `[key]` indexes on the left-hand
/// side folded in, so `$ThemeInfo['foo'] = array(...)` yields
/// `{foo: {...}}`.
pub(crate) fn parse_statement(
    source: &str,
    variable: &str,
    first_line: usize,
) -> Result<MetaValue, ExtractError> {
    let tokens = Lexer::new(source, first_line).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end_line: first_line + source.lines().count().saturating_sub(1),
    };
    parser.statement(variable)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn next(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn error_at(&self, spanned: Option<&Spanned>, message: impl Into<String>) -> ExtractError {
        let (line, column) = spanned
            .map(|s| (s.line, s.column))
            .unwrap_or((self.end_line, 1));
        ExtractError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn describe(token: &Token) -> String {
        match token {
            Token::Variable(name) => format!("variable '${name}'"),
            Token::Word(word) => format!("'{word}'"),
            Token::Str(_) => "string".to_string(),
            Token::Integer(_) | Token::Float(_) => "number".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Arrow => "'=>'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Unexpected(c) => format!("'{c}'"),
        }
    }

    fn statement(&mut self, variable: &str) -> Result<MetaValue, ExtractError> {
        let head = self.next();
        match head.as_ref().map(|s| &s.token) {
            Some(Token::Variable(name)) if name == variable => {}
            Some(other) => {
                let message = format!("expected ${variable}, found {}", Self::describe(other));
                return Err(self.error_at(head.as_ref(), message));
            }
            None => return Err(self.error_at(None, format!("expected ${variable}"))),
        }

        let mut path = Vec::new();
        while self.peek_token() == Some(&Token::LBracket) {
            let open = self.next();
            let key = self.key()?;
            match self.next() {
                Some(Spanned {
                    token: Token::RBracket,
                    ..
                }) => {}
                Some(other) => {
                    return Err(Self::unbalanced(&other, ']'));
                }
                None => return Err(self.unbalanced_at_end(open.as_ref(), ']')),
            }
            path.push(key);
        }

        let assign = self.next();
        if assign.as_ref().map(|s| &s.token) != Some(&Token::Assign) {
            let found = assign
                .as_ref()
                .map(|s| Self::describe(&s.token))
                .unwrap_or_else(|| "end of block".to_string());
            return Err(self.error_at(assign.as_ref(), format!("expected '=', found {found}")));
        }

        // Each `[key]` on the left-hand side adds one level of nesting.
        let mut value = self.value(path.len())?;

        if self.peek_token() == Some(&Token::Semicolon) {
            self.next();
        }
        if let Some(extra) = self.peek() {
            let message = format!(
                "unexpected {} after the declaration",
                Self::describe(&extra.token)
            );
            return Err(self.error_at(Some(extra), message));
        }

        for key in path.into_iter().rev() {
            let mut map = BTreeMap::new();
            map.insert(key, value);
            value = MetaValue::Map(map);
        }
        Ok(value)
    }

    fn key(&mut self) -> Result<String, ExtractError> {
        let spanned = self.next();
        match spanned.as_ref().map(|s| &s.token) {
            Some(Token::Str(s)) => Ok(s.clone()),
            Some(Token::Integer(i)) => Ok(i.to_string()),
            Some(other) => {
                let message = format!("expected a string or integer key, found {}", Self::describe(other));
                Err(self.error_at(spanned.as_ref(), message))
            }
            None => Err(self.error_at(None, "expected a key")),
        }
    }

    /// `depth` is the number of arrays already open around this value.
    fn value(&mut self, depth: usize) -> Result<MetaValue, ExtractError> {
        let spanned = self.next();
        let Some(spanned) = spanned else {
            return Err(self.error_at(None, "expected a value"));
        };

        match &spanned.token {
            Token::Str(s) => Ok(MetaValue::String(s.clone())),
            Token::Integer(i) => Ok(MetaValue::Integer(*i)),
            Token::Float(f) => Ok(MetaValue::Float(*f)),
            Token::LBracket => self.array(depth + 1, &spanned, Token::RBracket, ']'),
            Token::Word(word) => match word.to_ascii_lowercase().as_str() {
                "true" => Ok(MetaValue::Bool(true)),
                "false" => Ok(MetaValue::Bool(false)),
                "null" => Ok(MetaValue::Null),
                "array" => {
                    let open = self.next();
                    match open.as_ref().map(|s| &s.token) {
                        Some(Token::LParen) => {}
                        _ => {
                            return Err(self.error_at(open.as_ref(), "expected '(' after 'array'"));
                        }
                    }
                    self.array(depth + 1, &spanned, Token::RParen, ')')
                }
                _ => {
                    let message = if self.peek_token() == Some(&Token::LParen) {
                        format!("function calls are not allowed ('{word}')")
                    } else {
                        format!("constants are not allowed ('{word}')")
                    };
                    Err(self.error_at(Some(&spanned), message))
                }
            },
            Token::Variable(name) => Err(self.error_at(
                Some(&spanned),
                format!("variables are not allowed in values ('${name}')"),
            )),
            Token::RParen | Token::RBracket => Err(ExtractError::Unbalanced {
                line: spanned.line,
                column: spanned.column,
                expected: "a value".to_string(),
            }),
            other => {
                let message = format!("expected a value, found {}", Self::describe(other));
                Err(self.error_at(Some(&spanned), message))
            }
        }
    }

    fn array(
        &mut self,
        depth: usize,
        open: &Spanned,
        close: Token,
        close_char: char,
    ) -> Result<MetaValue, ExtractError> {
        if depth > MAX_NESTING {
            return Err(ExtractError::TooDeep {
                line: open.line,
                max: MAX_NESTING,
            });
        }

        let mut entries: Vec<(String, MetaValue)> = Vec::new();
        let mut positional = true;
        let mut next_index: i64 = 0;

        loop {
            match self.peek_token() {
                None => return Err(self.unbalanced_at_end(Some(open), close_char)),
                Some(t) if *t == close => {
                    self.next();
                    break;
                }
                _ => {}
            }

            let keyed = matches!(
                (self.peek_token(), self.tokens.get(self.pos + 1).map(|s| &s.token)),
                (Some(Token::Str(_) | Token::Integer(_)), Some(Token::Arrow))
            );

            let key = if keyed {
                let key_token = self.next();
                self.next(); // =>
                match key_token {
                    Some(Spanned {
                        token: Token::Integer(i),
                        ..
                    }) => {
                        if i != next_index {
                            positional = false;
                        }
                        let after = i
                            .checked_add(1)
                            .ok_or_else(|| self.error_at(key_token.as_ref(), "array index out of range"))?;
                        next_index = next_index.max(after);
                        i.to_string()
                    }
                    Some(Spanned {
                        token: Token::Str(ref s),
                        ..
                    }) => {
                        positional = false;
                        s.clone()
                    }
                    _ => unreachable!("keyed entries start with a string or integer"),
                }
            } else {
                let key = next_index.to_string();
                next_index = next_index
                    .checked_add(1)
                    .ok_or_else(|| self.error_at(self.peek(), "array index out of range"))?;
                key
            };

            let value = self.value(depth)?;
            if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = value;
                positional = false;
            } else {
                entries.push((key, value));
            }

            match self.next() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => {}
                Some(s) if s.token == close => break,
                Some(s @ Spanned {
                    token: Token::RParen | Token::RBracket,
                    ..
                }) => return Err(Self::unbalanced(&s, close_char)),
                Some(Spanned {
                    token: Token::Semicolon,
                    ..
                }) => return Err(self.unbalanced_at_end(Some(open), close_char)),
                Some(s) => {
                    let message = format!(
                        "expected ',' or '{close_char}', found {}",
                        Self::describe(&s.token)
                    );
                    return Err(self.error_at(Some(&s), message));
                }
                None => return Err(self.unbalanced_at_end(Some(open), close_char)),
            }
        }

        if positional {
            Ok(MetaValue::List(entries.into_iter().map(|(_, v)| v).collect()))
        } else {
            Ok(MetaValue::Map(entries.into_iter().collect()))
        }
    }

    fn unbalanced(found: &Spanned, expected: char) -> ExtractError {
        ExtractError::Unbalanced {
            line: found.line,
            column: found.column,
            expected: format!("'{expected}'"),
        }
    }

    fn unbalanced_at_end(&self, open: Option<&Spanned>, expected: char) -> ExtractError {
        let (line, column) = open.map(|s| (s.line, s.column)).unwrap_or((self.end_line, 1));
        ExtractError::Unbalanced {
            line,
            column,
            expected: format!("'{expected}' to close the array opened here"),
        }
    }
}
