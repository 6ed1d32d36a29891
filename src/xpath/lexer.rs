//! Expression tokenizer.
//!
//! Names are classified while scanning: a name followed by `(` is a function
//! or node type, a name followed by `::` is an axis, and `*`, `and`, `or`,
//! `div`, `mod` are operators only when the previous token can end an operand.

use super::error::{QueryError, QueryErrorCode, QueryResult};

const NODE_TYPES: &[&str] = &["comment", "text", "processing-instruction", "node"];

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    DotDot,
    At,
    Comma,
    ColonColon,
    Slash,
    DoubleSlash,
    Pipe,
    Plus,
    Minus,
    /// `*` in operator position.
    Multiply,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Mod,
    Div,
    Number(f64),
    Literal(String),
    /// A name test: `p`, `*` or `svg:*`.
    Name(String),
    Variable(String),
    Function(String),
    NodeType(String),
    Axis(String),
}

impl Token {
    /// True if this token can end an operand, which makes a following `*`
    /// or operator name an operator.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::RightParen
                | Self::RightBracket
                | Self::Dot
                | Self::DotDot
                | Self::Number(_)
                | Self::Literal(_)
                | Self::Name(_)
                | Self::Variable(_)
                | Self::NodeType(_)
        )
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Splits an expression into tokens.
pub fn tokenize(input: &str) -> QueryResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        input,
        bytes: input.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'s> {
    input: &'s str,
    bytes: &'s [u8],
    pos: usize,
    tokens: Vec<Spanned>,
}

impl Lexer<'_> {
    fn run(&mut self) -> QueryResult<()> {
        loop {
            self.skip_whitespace();
            let Some(byte) = self.peek() else {
                return Ok(());
            };
            let start = self.pos;
            let token = self.scan(byte)?;
            self.tokens.push(Spanned {
                token,
                position: start,
            });
        }
    }

    fn scan(&mut self, byte: u8) -> QueryResult<Token> {
        let single = match byte {
            b'(' => Some(Token::LeftParen),
            b')' => Some(Token::RightParen),
            b'[' => Some(Token::LeftBracket),
            b']' => Some(Token::RightBracket),
            b'@' => Some(Token::At),
            b',' => Some(Token::Comma),
            b'|' => Some(Token::Pipe),
            b'+' => Some(Token::Plus),
            b'-' => Some(Token::Minus),
            b'=' => Some(Token::Equal),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        match byte {
            b'*' => {
                self.pos += 1;
                Ok(if self.after_operand() {
                    Token::Multiply
                } else {
                    Token::Name("*".to_string())
                })
            }
            b'/' => Ok(self.pair(b'/', Token::DoubleSlash, Token::Slash)),
            b'<' => Ok(self.pair(b'=', Token::LessEqual, Token::Less)),
            b'>' => Ok(self.pair(b'=', Token::GreaterEqual, Token::Greater)),
            b'!' => {
                if self.peek_at(1) == Some(b'=') {
                    self.pos += 2;
                    Ok(Token::NotEqual)
                } else {
                    Err(self.error(QueryErrorCode::ExprError, "expected '=' after '!'"))
                }
            }
            b':' => {
                if self.peek_at(1) == Some(b':') {
                    self.pos += 2;
                    Ok(Token::ColonColon)
                } else {
                    Err(self.error(QueryErrorCode::ExprError, "unexpected ':'"))
                }
            }
            b'.' => {
                if self.peek_at(1) == Some(b'.') {
                    self.pos += 2;
                    Ok(Token::DotDot)
                } else if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                    self.number()
                } else {
                    self.pos += 1;
                    Ok(Token::Dot)
                }
            }
            b'"' | b'\'' => self.literal(byte),
            b'$' => self.variable(),
            b'0'..=b'9' => self.number(),
            _ if self.at_name_start() => Ok(self.name()),
            _ => Err(self.error(
                QueryErrorCode::InvalidChar,
                format!("unexpected character '{}'", self.current_char()),
            )),
        }
    }

    fn pair(&mut self, second: u8, double: Token, single: Token) -> Token {
        if self.peek_at(1) == Some(second) {
            self.pos += 2;
            double
        } else {
            self.pos += 1;
            single
        }
    }

    fn literal(&mut self, quote: u8) -> QueryResult<Token> {
        let start = self.pos;
        let body = start + 1;
        match self.bytes[body..].iter().position(|&b| b == quote) {
            Some(len) => {
                self.pos = body + len + 1;
                Ok(Token::Literal(self.input[body..body + len].to_string()))
            }
            None => Err(QueryError::new(
                QueryErrorCode::UnfinishedLiteral,
                "unterminated string literal",
                start,
            )),
        }
    }

    fn variable(&mut self) -> QueryResult<Token> {
        self.pos += 1;
        if !self.at_name_start() {
            return Err(self.error(QueryErrorCode::VariableRef, "expected a name after '$'"));
        }
        Ok(Token::Variable(self.qname()))
    }

    fn number(&mut self) -> QueryResult<Token> {
        let start = self.pos;
        self.skip_while(|b| b.is_ascii_digit());
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_while(|b| b.is_ascii_digit());
        }
        let text = &self.input[start..self.pos];
        text.parse::<f64>().map(Token::Number).map_err(|_| {
            QueryError::new(QueryErrorCode::Number, format!("invalid number '{text}'"), start)
        })
    }

    fn name(&mut self) -> Token {
        let name = self.qname_or_wildcard();

        if self.after_operand() {
            match name.as_str() {
                "and" => return Token::And,
                "or" => return Token::Or,
                "div" => return Token::Div,
                "mod" => return Token::Mod,
                _ => {}
            }
        }

        match self.next_significant() {
            Some(b'(') if NODE_TYPES.contains(&name.as_str()) => Token::NodeType(name),
            Some(b'(') => Token::Function(name),
            Some(b':') if self.next_is_colon_colon() => Token::Axis(name),
            _ => Token::Name(name),
        }
    }

    /// Reads `NCName`, `prefix:NCName` or `prefix:*`.
    fn qname_or_wildcard(&mut self) -> String {
        let start = self.pos;
        self.skip_name_chars();
        if self.peek() == Some(b':') && self.peek_at(1) == Some(b'*') {
            self.pos += 2;
        } else if self.peek() == Some(b':') && self.peek_at(1).is_some_and(is_name_start) {
            self.pos += 1;
            self.skip_name_chars();
        }
        self.input[start..self.pos].to_string()
    }

    fn qname(&mut self) -> String {
        let start = self.pos;
        self.skip_name_chars();
        if self.peek() == Some(b':') && self.peek_at(1).is_some_and(is_name_start) {
            self.pos += 1;
            self.skip_name_chars();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_name_chars(&mut self) {
        while self.pos < self.bytes.len() {
            let c = self.current_char();
            if is_name_char(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn after_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.token.ends_operand())
    }

    fn next_significant(&self) -> Option<u8> {
        self.bytes[self.pos..]
            .iter()
            .copied()
            .find(|b| !is_whitespace(*b))
    }

    fn next_is_colon_colon(&self) -> bool {
        let rest = self.input[self.pos..].trim_start_matches(|c: char| c.is_ascii_whitespace());
        rest.starts_with("::")
    }

    fn at_name_start(&self) -> bool {
        self.pos < self.bytes.len() && {
            let c = self.current_char();
            c.is_alphabetic() || c == '_'
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_while(&mut self, accept: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(is_whitespace);
    }

    fn error(&self, kind: QueryErrorCode, message: impl Into<String>) -> QueryError {
        QueryError::new(kind, message, self.pos)
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || !byte.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.') || !c.is_ascii()
}

/// True if `name` lexes as a single unprefixed name.
pub(crate) fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || !first.is_ascii())
        && chars.all(is_name_char)
}
