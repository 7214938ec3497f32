use super::*;
use super::buffer::{CodeBuffer, Section};

fn generate(nodes: &[ASTNode]) -> Program {
    Generator::new(GeneratorConfig::default()).generate(nodes)
}

#[test]
fn test_exit_scenario() {
    let program = generate(&[ASTNode::Exit(42)]);
    let source = program.assembly_source();
    assert!(source.starts_with("; Generated by panda v"));
    assert!(source.contains("section .data"));
    assert!(source.contains("section .text"));
    assert!(source.contains("global _start"));
    assert!(source.contains("_start:"));
    assert!(source.contains("mov rdi, 42 ; exit code"));
    assert!(source.contains("%include \"output/lib/builtins.asm\""));
}

#[test]
fn test_print_reserves_constant_and_calls_builtin() {
    let program = generate(&[ASTNode::Print("hi".to_string())]);
    let source = program.assembly_source();
    assert!(source.contains("str_0: db \"hi\", 10, 0"));
    assert!(source.contains("print str_0"));
}

#[test]
fn test_generation_preserves_ast_order() {
    let program = generate(&[
        ASTNode::Print("a".to_string()),
        ASTNode::Exit(1),
        ASTNode::Print("b".to_string()),
    ]);
    let source = program.assembly_source();

    let str_0 = source.find("str_0: db").unwrap();
    let str_2 = source.find("str_2: db").unwrap();
    assert!(str_0 < str_2);

    let print_0 = source.find("print str_0").unwrap();
    let exit_1 = source.find("mov rdi, 1 ; exit code").unwrap();
    let print_2 = source.find("print str_2").unwrap();
    assert!(print_0 < exit_1);
    assert!(exit_1 < print_2);
}

#[test]
fn test_generation_is_idempotent() {
    let nodes = vec![ASTNode::Print("x".to_string()), ASTNode::Exit(3)];
    let first = generate(&nodes);
    let second = generate(&nodes);
    assert_eq!(first.assembly_source(), second.assembly_source());
}

#[test]
fn test_default_exit_appended_when_absent() {
    let program = generate(&[ASTNode::Print("hi".to_string())]);
    assert!(program.assembly_source().contains("mov rdi, 0 ; exit code"));
}

#[test]
fn test_no_default_exit_when_program_exits() {
    let program = generate(&[ASTNode::Exit(3)]);
    let source = program.assembly_source();
    assert!(!source.contains("mov rdi, 0 ; exit code"));
}

#[test]
fn test_always_default_exit_flag() {
    let generator = Generator::new(GeneratorConfig {
        always_default_exit: true,
        ..GeneratorConfig::default()
    });
    let program = generator.generate(&[ASTNode::Exit(3)]);
    let source = program.assembly_source();
    assert!(source.contains("mov rdi, 3 ; exit code"));
    assert!(source.contains("mov rdi, 0 ; exit code"));
}

#[test]
fn test_empty_program_still_exits_zero() {
    let program = generate(&[]);
    let source = program.assembly_source();
    assert!(source.contains("section .data"));
    assert!(source.contains("global _start"));
    assert!(source.contains("mov rdi, 0 ; exit code"));
}

#[test]
fn test_builtins_child_attached_by_default() {
    let program = generate(&[ASTNode::Exit(0)]);
    let children: Vec<_> = program.children().iter().map(|c| c.name()).collect();
    assert_eq!(children, vec![Some("builtins")]);
}

#[test]
fn test_prebuilt_builtins_skips_child() {
    let generator = Generator::new(GeneratorConfig {
        rebuild_builtins: false,
        ..GeneratorConfig::default()
    });
    let program = generator.generate(&[ASTNode::Exit(0)]);
    assert!(program.children().is_empty());
}

#[test]
fn test_absolute_include_path() {
    let generator = Generator::new(GeneratorConfig {
        absolute_include_path: true,
        ..GeneratorConfig::default()
    });
    let program = generator.generate(&[]);
    let expected = std::env::current_dir()
        .unwrap()
        .join("output/lib/builtins.asm");
    assert!(
        program
            .assembly_source()
            .contains(&format!("%include \"{}\"", expected.display()))
    );
}

#[test]
fn test_builtins_template_is_filtered() {
    let filtered = filter_builtins(BUILTINS_TEMPLATE);
    assert!(filtered.contains("%macro exit 1"));
    assert!(filtered.contains("builtin_print:"));
    assert!(!filtered.contains("[begin-storage]"));
    assert!(!filtered.contains("[end-storage]"));
    assert!(!filtered.contains("resb"));
    assert!(!filtered.contains(";;"));
}

#[test]
fn test_filter_drops_sentinel_block_inclusive() {
    let template = "keep\n; [begin-storage]\ndropped\n; [end-storage]\n;; doc\nalso kept\n";
    assert_eq!(filter_builtins(template), "keep\nalso kept\n");
}

#[test]
fn test_quotes_in_string_constants() {
    let program = generate(&[ASTNode::Print("say \"hi\"".to_string())]);
    assert!(
        program
            .assembly_source()
            .contains("str_0: db \"say \", 34, \"hi\", 34, 10, 0")
    );
}

#[test]
fn test_empty_string_constant() {
    let program = generate(&[ASTNode::Print(String::new())]);
    assert!(program.assembly_source().contains("str_0: db 10, 0"));
}

#[test]
fn test_section_indents_its_body() {
    let mut section = Section::new("section .data");
    section.line("str_0: db 10, 0");
    assert_eq!(
        section.fold().into_text(),
        "section .data\n    str_0: db 10, 0\n"
    );
}

#[test]
fn test_buffer_strips_trailing_blank_lines() {
    let mut buffer = CodeBuffer::new();
    buffer.line("a");
    buffer.blank();
    buffer.blank();
    buffer.strip_trailing_blank_lines();
    assert_eq!(buffer.into_text(), "a\n");
}

#[test]
fn test_buffer_absorb() {
    let mut parent = CodeBuffer::new();
    parent.line("top");
    let mut child = CodeBuffer::new();
    child.indent();
    child.line("inner");
    parent.absorb(child);
    assert_eq!(parent.into_text(), "top\n    inner\n");
}
