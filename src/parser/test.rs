use super::*;
use crate::lexer::tokenize;

fn parse(source: &str) -> CompileResult<Vec<ASTNode>> {
    let tokens = tokenize(source)?;
    Parser::new(tokens, source).parse()
}

#[test]
fn test_exit_statement() {
    assert_eq!(parse("exit(42);").unwrap(), vec![ASTNode::Exit(42)]);
}

#[test]
fn test_print_then_exit() {
    assert_eq!(
        parse("print(\"hi\");exit(3);").unwrap(),
        vec![ASTNode::Print("hi".to_string()), ASTNode::Exit(3)]
    );
}

#[test]
fn test_empty_program() {
    assert_eq!(parse("").unwrap(), vec![]);
}

#[test]
fn test_missing_close_paren() {
    let err = parse("exit(1").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedToken {
            expected: TokenKind::CloseParen,
            found: TokenKind::Eof,
            ..
        }
    ));
}

#[test]
fn test_missing_semicolon() {
    let err = parse("exit(1)").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedToken {
            expected: TokenKind::Semicolon,
            found: TokenKind::Eof,
            ..
        }
    ));
}

#[test]
fn test_exit_wants_an_integer() {
    let err = parse("exit(\"nope\");").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedToken {
            expected: TokenKind::Integer,
            found: TokenKind::ConstString,
            ..
        }
    ));
}

#[test]
fn test_unknown_leading_token() {
    let err = parse("{ exit(1); }").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnrecognizedToken { ref text, line: 1, column: 1, .. } if text == "OpenBrace"
    ));
}

#[test]
fn test_parse_is_deterministic() {
    let source = "print(\"a\");exit(7);print(\"b\");";
    assert_eq!(parse(source).unwrap(), parse(source).unwrap());
}
