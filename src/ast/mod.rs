/// One parsed statement. The language has no compound statements, so a
/// program is a flat `Vec<ASTNode>` in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    /// `exit(<code>);` terminates the process with the given code.
    Exit(i64),
    /// `print("<text>");` writes the text plus a newline to stdout.
    Print(String),
}
