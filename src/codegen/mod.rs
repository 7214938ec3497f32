use std::env;

use crate::ast::ASTNode;
use crate::program::Program;

pub mod buffer;
#[cfg(test)]
pub mod test;

use self::buffer::{CodeBuffer, Section};

const BUILTINS_TEMPLATE: &str = include_str!("builtins.asm");
const BUILTINS_UNIT: &str = "builtins";

const INCLUDE_DIRECTIVE: &str = "%include \"__builtins_path__\"";
const PATH_PLACEHOLDER: &str = "__builtins_path__";
const RELATIVE_BUILTINS_PATH: &str = "output/lib/builtins.asm";

const STORAGE_BEGIN: &str = "; [begin-storage]";
const STORAGE_END: &str = "; [end-storage]";
const DOC_MARKER: &str = ";;";

/// Options that change what [`Generator::generate`] emits. Passed in at
/// construction; there is no global state.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Append the terminating exit sequence even when the program
    /// already contains an exit statement.
    pub always_default_exit: bool,
    /// Substitute the builtins include with an absolute path instead of
    /// the fixed relative one.
    pub absolute_include_path: bool,
    /// Regenerate the filtered builtins unit from the bundled template
    /// instead of referencing a prebuilt copy.
    pub rebuild_builtins: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            always_default_exit: false,
            absolute_include_path: false,
            rebuild_builtins: true,
        }
    }
}

pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    /// Walks the nodes once, in order, and wraps the emitted assembly in
    /// a [`Program`]. Identical nodes and configuration always produce
    /// byte-identical text.
    pub fn generate(&self, nodes: &[ASTNode]) -> Program {
        let mut data = Section::new("section .data");
        let mut text = Section::new("section .text");
        text.line("global _start");
        let mut start = Section::new("_start:");

        let mut saw_exit = false;
        for (index, node) in nodes.iter().enumerate() {
            match node {
                ASTNode::Print(value) => {
                    data.line(&format!("str_{index}: db {}", nasm_db(value)));
                    start.line(&format!("print str_{index}"));
                    start.blank();
                }
                ASTNode::Exit(code) => {
                    saw_exit = true;
                    emit_exit(&mut start, *code);
                }
            }
        }
        if !saw_exit || self.config.always_default_exit {
            emit_exit(&mut start, 0);
        }

        let mut out = CodeBuffer::new();
        out.line(&format!("; Generated by panda v{}", env!("CARGO_PKG_VERSION")));
        out.blank();
        out.absorb(data.fold());
        out.blank();
        out.absorb(text.fold());
        out.blank();
        out.line(&INCLUDE_DIRECTIVE.replace(PATH_PLACEHOLDER, &self.builtins_path()));
        out.blank();
        out.absorb(start.fold());

        let mut program = Program::new(out.into_text());
        if self.config.rebuild_builtins {
            program.add_child(Program::named(BUILTINS_UNIT, filter_builtins(BUILTINS_TEMPLATE)));
        }
        program
    }

    fn builtins_path(&self) -> String {
        if self.config.absolute_include_path {
            env::current_dir()
                .unwrap_or_default()
                .join(RELATIVE_BUILTINS_PATH)
                .display()
                .to_string()
        } else {
            RELATIVE_BUILTINS_PATH.to_string()
        }
    }
}

fn emit_exit(start: &mut Section, code: i64) {
    start.line("mov rax, 60         ; syscall number for exit");
    start.line(&format!("mov rdi, {code} ; exit code"));
    start.line("syscall             ; perform the system call");
    start.blank();
}

/// Drops the storage block (sentinel lines included) and every
/// documentation-marker line from the bundled builtins template.
pub fn filter_builtins(template: &str) -> String {
    let mut out = CodeBuffer::new();
    let mut in_storage = false;
    for line in template.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(STORAGE_BEGIN) {
            in_storage = true;
        } else if trimmed.starts_with(STORAGE_END) {
            in_storage = false;
        } else if !in_storage && !trimmed.starts_with(DOC_MARKER) {
            out.line(line);
        }
    }
    out.strip_trailing_blank_lines();
    out.into_text()
}

/// Renders string data as a NASM `db` operand list: printable runs stay
/// quoted, quotes and non-printable bytes become numbers, and a newline
/// plus NUL terminator are appended.
fn nasm_db(value: &str) -> String {
    let mut parts = Vec::new();
    let mut run = String::new();
    for byte in value.bytes() {
        if (0x20..=0x7e).contains(&byte) && byte != b'"' {
            run.push(byte as char);
        } else {
            if !run.is_empty() {
                parts.push(format!("\"{run}\""));
                run.clear();
            }
            parts.push(byte.to_string());
        }
    }
    if !run.is_empty() {
        parts.push(format!("\"{run}\""));
    }
    parts.push("10".to_string());
    parts.push("0".to_string());
    parts.join(", ")
}
