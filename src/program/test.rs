use super::*;

#[test]
fn test_run_before_compile_is_not_yet_built() {
    let program = Program::new("section .text\n".to_string());
    assert_eq!(program.run().unwrap_err(), CompileError::NotYetBuilt);
}

#[test]
fn test_top_level_unit_is_unnamed() {
    let program = Program::new(String::new());
    assert_eq!(program.name(), None);
    assert!(program.executable_path().is_none());
}

#[test]
fn test_child_units_keep_their_name_and_order() {
    let mut program = Program::new(String::new());
    program.add_child(Program::named("builtins", String::new()));
    program.add_child(Program::named("extra", String::new()));
    let names: Vec<_> = program.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec![Some("builtins"), Some("extra")]);
}

#[test]
fn test_assembly_source_is_preserved() {
    let program = Program::new("; banner\n".to_string());
    assert_eq!(program.assembly_source(), "; banner\n");
}
