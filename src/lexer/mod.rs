use crate::error::{CompileError, CompileResult, Span};


#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Float(f64),
    Str(String),
    ConstString(String),

    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Semicolon,

    Plus,
    Minus,
    Star,
    Slash,

    Let,
    Var,

    Exit,
    Print,

    Eof,
}

/// Payload-free mirror of [`Token`], used by the parser's `consume`
/// primitive and by kind-only error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Integer,
    Float,
    Str,
    ConstString,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Let,
    Var,
    Exit,
    Print,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::Str(_) => TokenKind::Str,
            Token::ConstString(_) => TokenKind::ConstString,
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
            Token::OpenBrace => TokenKind::OpenBrace,
            Token::CloseBrace => TokenKind::CloseBrace,
            Token::OpenBracket => TokenKind::OpenBracket,
            Token::CloseBracket => TokenKind::CloseBracket,
            Token::Semicolon => TokenKind::Semicolon,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Star => TokenKind::Star,
            Token::Slash => TokenKind::Slash,
            Token::Let => TokenKind::Let,
            Token::Var => TokenKind::Var,
            Token::Exit => TokenKind::Exit,
            Token::Print => TokenKind::Print,
            Token::Eof => TokenKind::Eof,
        }
    }
}

/// Append-only token stream. Insertion order is program order; a stream
/// produced by [`tokenize`] always ends with exactly one `Eof`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    tokens: Vec<(Token, Span)>,
}

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token, span: Span) {
        self.tokens.push((token, span));
    }

    pub fn get(&self, index: usize) -> Option<&(Token, Span)> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Token, Span)> {
        self.tokens.iter()
    }
}

/// Multi-character matches, longest first so a longer word is never
/// shadowed by a shorter prefix of it.
const KEYWORDS: &[(&str, Token)] = &[
    ("print", Token::Print),
    ("exit", Token::Exit),
    ("let", Token::Let),
    ("var", Token::Var),
];

const SYMBOLS: &[(char, Token)] = &[
    ('(', Token::OpenParen),
    (')', Token::CloseParen),
    ('{', Token::OpenBrace),
    ('}', Token::CloseBrace),
    ('[', Token::OpenBracket),
    (']', Token::CloseBracket),
    (';', Token::Semicolon),
];

const QUOTES: &[char] = &['"', '\''];

pub fn tokenize(source: &str) -> CompileResult<Tokens> {
    let mut tokens = Tokens::new();
    let mut i = 0;

    'scan: while i < source.len() {
        let rest = &source[i..];

        for (word, token) in KEYWORDS {
            if rest.starts_with(word) {
                tokens.push(token.clone(), i..i + word.len());
                i += word.len();
                continue 'scan;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };

        if let Some((_, token)) = SYMBOLS.iter().find(|(symbol, _)| *symbol == ch) {
            tokens.push(token.clone(), i..i + 1);
            i += 1;
        } else if QUOTES.contains(&ch) {
            let (token, end) = scan_string(source, i)?;
            tokens.push(token, i..end);
            i = end;
        } else if ch.is_ascii_digit() {
            let (token, end) = scan_number(source, i)?;
            tokens.push(token, i..end);
            i = end;
        } else if ch.is_whitespace() {
            i += ch.len_utf8();
        } else {
            return Err(unrecognized(source, i, ch.to_string()));
        }
    }

    tokens.push(Token::Eof, source.len()..source.len());
    Ok(tokens)
}

/// Reads a literal delimited by the quote at `start`. A backslash escapes
/// the character after it and is dropped from the payload; the literal
/// ends at the first unescaped quote matching the opener.
fn scan_string(source: &str, start: usize) -> CompileResult<(Token, usize)> {
    let mut chars = source[start..].char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(unrecognized(source, start, String::new()));
    };

    let mut value = String::new();
    let mut escaped = false;
    for (offset, ch) in chars {
        if escaped {
            value.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Ok((Token::ConstString(value), start + offset + ch.len_utf8()));
        } else {
            value.push(ch);
        }
    }

    // Ran out of input before the closing quote.
    Err(unrecognized(source, start, quote.to_string()))
}

/// Accumulates digits, skipping `_` separators. The first `.` switches
/// the literal to a float; a second one is an error at its position.
fn scan_number(source: &str, start: usize) -> CompileResult<(Token, usize)> {
    let bytes = source.as_bytes();
    let mut text = String::new();
    let mut is_float = false;
    let mut i = start;

    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.' || bytes[i] == b'_') {
        match bytes[i] {
            b'_' => {}
            b'.' if is_float => return Err(unrecognized(source, i, ".".to_string())),
            b'.' => {
                is_float = true;
                text.push('.');
            }
            digit => text.push(digit as char),
        }
        i += 1;
    }

    let token = if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| unrecognized(source, start, text.clone()))?
    } else {
        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| unrecognized(source, start, text.clone()))?
    };
    Ok((token, i))
}

fn unrecognized(source: &str, index: usize, text: String) -> CompileError {
    let (line, column) = line_column(source, index);
    let end = index + text.len().max(1);
    CompileError::UnrecognizedToken {
        text,
        line,
        column,
        span: index..end,
    }
}

/// 1-based line and column of a byte index, counting newlines from the
/// start of the input.
pub(crate) fn line_column(source: &str, index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i == index {
            return (line, column);
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
