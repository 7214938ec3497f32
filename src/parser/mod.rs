use crate::ast::ASTNode;
use crate::error::{CompileError, CompileResult, Span};
use crate::lexer::{self, Token, TokenKind, Tokens};

#[cfg(test)]
pub mod test;

const EOF: Token = Token::Eof;

/// Recursive-descent parser over a lexed [`Tokens`] stream. The cursor
/// only ever advances; the first error aborts the whole parse.
pub struct Parser<'a> {
    tokens: Tokens,
    source: &'a str,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Tokens, source: &'a str) -> Self {
        Parser {
            tokens,
            source,
            current: 0,
        }
    }

    fn current_token(&self) -> (&Token, Span) {
        match self.tokens.get(self.current) {
            Some((token, span)) => (token, span.clone()),
            None => (&EOF, self.source.len()..self.source.len()),
        }
    }

    /// The only structural primitive: advance past a token of the
    /// expected kind or fail identifying both kinds.
    fn consume(&mut self, expected: TokenKind) -> CompileResult<()> {
        let (token, span) = self.current_token();
        if token.kind() == expected {
            self.current += 1;
            Ok(())
        } else {
            Err(CompileError::UnexpectedToken {
                expected,
                found: token.kind(),
                span,
            })
        }
    }

    fn integer(&mut self) -> CompileResult<i64> {
        let (token, span) = self.current_token();
        match token {
            Token::Integer(value) => {
                let value = *value;
                self.current += 1;
                Ok(value)
            }
            other => Err(CompileError::UnexpectedToken {
                expected: TokenKind::Integer,
                found: other.kind(),
                span,
            }),
        }
    }

    fn const_string(&mut self) -> CompileResult<String> {
        let (token, span) = self.current_token();
        match token {
            Token::ConstString(value) => {
                let value = value.clone();
                self.current += 1;
                Ok(value)
            }
            other => Err(CompileError::UnexpectedToken {
                expected: TokenKind::ConstString,
                found: other.kind(),
                span,
            }),
        }
    }

    pub fn parse(&mut self) -> CompileResult<Vec<ASTNode>> {
        let mut nodes = Vec::new();
        loop {
            let (token, span) = self.current_token();
            match token.kind() {
                TokenKind::Eof => break,
                TokenKind::Exit => nodes.push(self.parse_exit()?),
                TokenKind::Print => nodes.push(self.parse_print()?),
                kind => {
                    let (line, column) = lexer::line_column(self.source, span.start);
                    return Err(CompileError::UnrecognizedToken {
                        text: format!("{kind:?}"),
                        line,
                        column,
                        span,
                    });
                }
            }
        }
        Ok(nodes)
    }

    // exit '(' INTEGER ')' ';'
    fn parse_exit(&mut self) -> CompileResult<ASTNode> {
        self.consume(TokenKind::Exit)?;
        self.consume(TokenKind::OpenParen)?;
        let code = self.integer()?;
        self.consume(TokenKind::CloseParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(ASTNode::Exit(code))
    }

    // print '(' CONST_STRING ')' ';'
    fn parse_print(&mut self) -> CompileResult<ASTNode> {
        self.consume(TokenKind::Print)?;
        self.consume(TokenKind::OpenParen)?;
        let text = self.const_string()?;
        self.consume(TokenKind::CloseParen)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(ASTNode::Print(text))
    }
}
