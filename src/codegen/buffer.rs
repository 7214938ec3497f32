const INDENT: &str = "    ";

/// Indentation-aware text accumulator. A buffer is written once during a
/// generation pass and consumed when its content is folded into a parent.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    text: String,
    depth: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Appends one line at the current indentation depth.
    pub fn line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.text.push_str(INDENT);
            }
            self.text.push_str(line);
        }
        self.text.push('\n');
    }

    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    pub fn strip_trailing_blank_lines(&mut self) {
        while self.text.ends_with("\n\n") {
            self.text.pop();
        }
    }

    /// Copies a finished child buffer into this one, releasing the child.
    pub fn absorb(&mut self, child: CodeBuffer) {
        self.text.push_str(&child.text);
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// A named code buffer: the label goes out at zero indentation, the body
/// at one fixed depth below it.
#[derive(Debug)]
pub struct Section {
    buffer: CodeBuffer,
}

impl Section {
    pub fn new(label: &str) -> Self {
        let mut buffer = CodeBuffer::new();
        buffer.line(label);
        buffer.indent();
        Section { buffer }
    }

    pub fn line(&mut self, line: &str) {
        self.buffer.line(line);
    }

    pub fn blank(&mut self) {
        self.buffer.blank();
    }

    pub fn fold(mut self) -> CodeBuffer {
        self.buffer.strip_trailing_blank_lines();
        self.buffer.dedent();
        self.buffer
    }
}
