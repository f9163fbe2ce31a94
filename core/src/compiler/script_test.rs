//! Tests for the compile driver.

use crate::api::CompilationOptions;
use crate::compiler::{CodePart, CompileError, Script};

fn options(context_id: &str) -> CompilationOptions {
    CompilationOptions {
        context_id: context_id.into(),
    }
}

fn labels(parts: &[CodePart]) -> Vec<u32> {
    let mut labels: Vec<u32> = parts
        .iter()
        .flat_map(|part| part.opcodes())
        .map(|opcode| opcode.label.unwrap().0)
        .collect();
    labels.sort_unstable();
    labels
}

#[test]
fn test_simple_program_is_one_part() {
    let mut script = Script::new();
    let parts = script.compile("print 1.", &options("interpreter")).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].main_code.len(), 2);
}

#[test]
fn test_new_lock_parts_come_first() {
    let mut script = Script::new();
    let parts = script
        .compile("lock throttle to 1. when x then print x.", &options("interpreter"))
        .unwrap();
    // Lock part, lock refresh trigger, when trigger, mainline.
    assert_eq!(parts.len(), 4);
    assert!(!parts[0].initialization_code.is_empty());
    assert!(parts[1].main_code.is_empty() && !parts[1].functions_code.is_empty());
    assert!(!parts[3].main_code.is_empty());
}

#[test]
fn test_only_new_parts_are_returned() {
    let mut script = Script::new();
    let interpreter = options("interpreter");

    let first = script.compile("lock x to 1.", &interpreter).unwrap();
    assert_eq!(first.len(), 2);

    // Same expression: nothing new besides the mainline.
    let second = script.compile("lock x to 1.", &interpreter).unwrap();
    assert_eq!(second.len(), 1);

    // New expression for a known lock: a functions-only part.
    let third = script.compile("lock x to 2.", &interpreter).unwrap();
    assert_eq!(third.len(), 2);
    assert!(third[0].initialization_code.is_empty());
    assert_eq!(third[0].functions_code.len(), 2);
}

#[test]
fn test_labels_increase_across_compiles() {
    let mut script = Script::new();
    let interpreter = options("interpreter");
    let first = labels(&script.compile("set x to 1. lock y to x.", &interpreter).unwrap());
    let second = labels(&script.compile("until x > 3 { set x to x + 1. }", &interpreter).unwrap());

    let mut all = first.clone();
    all.extend(&second);
    let mut deduped = all.clone();
    deduped.dedup();
    assert_eq!(all, deduped, "labels must be unique");
    assert!(first.last().unwrap() < second.first().unwrap());
}

#[test]
fn test_instruction_ids_are_stamped() {
    let mut script = Script::new();
    let interpreter = options("interpreter");
    let first = script.compile("lock x to 1.", &interpreter).unwrap();
    let second = script.compile("print x.", &interpreter).unwrap();

    assert!(first.iter().flat_map(CodePart::opcodes).all(|op| op.instruction_id == 1));
    assert!(second.iter().flat_map(CodePart::opcodes).all(|op| op.instruction_id == 2));
    assert_eq!(script.context("interpreter").unwrap().instruction_id(), 2);
}

#[test]
fn test_empty_context_id_is_fresh_every_time() {
    let mut script = Script::new();
    let first = script.compile("print 1.", &options("")).unwrap();
    let second = script.compile("print 1.", &options("")).unwrap();
    assert_eq!(labels(&first), labels(&second));
    assert_eq!(labels(&first), vec![1, 2]);
}

#[test]
fn test_program_context_is_cached() {
    let mut script = Script::new();
    let program = options("program");
    let first = script.compile("SET X TO 1.", &program).unwrap();
    let second = script.compile("set x to 1.", &program).unwrap();
    assert_eq!(first, second);
    assert_eq!(script.context("program").unwrap().instruction_id(), 1);
}

#[test]
fn test_clear_context_restarts_labels() {
    let mut script = Script::new();
    let program = options("program");
    script.compile("print 1.", &program).unwrap();
    script.clear_context("program");
    assert!(script.context("program").is_none());

    let parts = script.compile("print 2.", &program).unwrap();
    assert_eq!(labels(&parts), vec![1, 2]);
}

#[test]
fn test_parse_error_is_reported() {
    let mut script = Script::new();
    let err = script
        .compile("set x to .", &options("interpreter"))
        .unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn test_cache_is_per_context() {
    let mut script = Script::new();
    let source = "lock y to 1. when y > 0 then print y.";
    let first = script.compile(source, &options("boot")).unwrap();
    let second = script.compile(source, &options("program")).unwrap();
    assert_eq!(first.len(), second.len());

    let program = script.context("program").unwrap();
    assert!(program.locks.contains("y"));
    assert_eq!(program.triggers.len(), 1);
}

#[test]
fn test_clear_context_keeps_other_cache_entries() {
    let mut script = Script::new();
    script.compile("print 1.", &options("boot")).unwrap();
    script.compile("print 1.", &options("program")).unwrap();
    script.clear_context("program");

    script.compile("print 1.", &options("boot")).unwrap();
    assert_eq!(script.context("boot").unwrap().instruction_id(), 1);
    script.compile("print 1.", &options("program")).unwrap();
    assert_eq!(script.context("program").unwrap().instruction_id(), 1);
}
