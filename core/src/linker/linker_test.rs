//! Tests for program layout and label resolution.

use crate::api::CompilationOptions;
use crate::compiler::{CodePart, Label, Script};
use crate::linker::{LinkError, LinkMode, Program, ProgramBuilder};
use crate::values::Value;
use crate::vm::{Instruction, Opcode};

fn parts(script: &mut Script, source: &str) -> Vec<CodePart> {
    script
        .compile(source, &CompilationOptions::default())
        .unwrap()
}

fn link(mode: LinkMode, source: &str) -> Program {
    let mut builder = ProgramBuilder::new(mode);
    builder.add_parts(parts(&mut Script::new(), source));
    builder.build().unwrap()
}

#[test]
fn test_mainline_only_has_no_jump() {
    let program = link(LinkMode::Interpreter, "print 1.");
    assert_eq!(program.entry_point, 0);
    assert_eq!(program.len(), 3);
    assert_eq!(program.code[2].instruction, Instruction::Eof);
    assert_eq!(program.code[2].label, None);
}

#[test]
fn test_program_layout() {
    let program = link(LinkMode::Program, "lock x to 1. print x.");

    // Initialization, jump, default + expression functions, mainline, end.
    assert_eq!(program.code[0].instruction, Instruction::Push(Value::identifier("x*")));
    assert_eq!(program.code[3].instruction, Instruction::Jump);
    assert_eq!(program.code[3].target, Some(program.entry_point));
    assert_eq!(program.entry_point, 8);
    assert_eq!(program.code.last().unwrap().instruction, Instruction::Eop);
}

#[test]
fn test_interpreter_moves_initialization_into_main() {
    let program = link(LinkMode::Interpreter, "lock x to 1.");
    assert_eq!(program.code[0].instruction, Instruction::Jump);
    assert_eq!(
        program.code[program.entry_point].instruction,
        Instruction::Push(Value::identifier("x*"))
    );
    assert_eq!(program.code.last().unwrap().instruction, Instruction::Eof);
}

#[test]
fn test_destinations_are_resolved() {
    let program = link(LinkMode::Program, "lock x to 1. if x { print 1. }");
    for (address, opcode) in program.code.iter().enumerate() {
        if let Some(destination) = opcode.destination {
            let target = opcode.target.expect("unresolved destination");
            assert_eq!(program.code[target].label, Some(destination), "at {}", address);
        }
    }
    // Pushes of addresses carry the resolved address as their literal.
    let default = program.code[1].target.unwrap();
    assert_eq!(program.code[1].instruction, Instruction::Push(Value::Address(default)));
}

#[test]
fn test_undefined_label() {
    let mut jump = Opcode::with_destination(Instruction::Jump, Label(99));
    jump.label = Some(Label(1));
    let part = CodePart {
        main_code: vec![jump],
        ..CodePart::new()
    };
    let mut builder = ProgramBuilder::new(LinkMode::Program);
    builder.add_part(part);
    assert_eq!(builder.build(), Err(LinkError::UndefinedLabel(Label(99))));
}

#[test]
fn test_relocate_after_incremental_link() {
    let mut script = Script::new();
    let mut builder = ProgramBuilder::new(LinkMode::Interpreter);
    builder.add_parts(parts(&mut script, "print 1."));
    let old = builder.build().unwrap();

    builder.add_parts(parts(&mut script, "lock x to 1."));
    let new = builder.build().unwrap();

    // Finished at the old end marker: continue with the new line.
    let resumed = new.relocate(&old, 2);
    assert_eq!(resumed, 7);
    assert_eq!(
        new.code[resumed].instruction,
        Instruction::Push(Value::identifier("x*"))
    );
    // Labeled opcodes keep their identity.
    assert_eq!(new.relocate(&old, 1), 6);
}

#[test]
fn test_relocate_from_empty_program() {
    let builder = ProgramBuilder::new(LinkMode::Interpreter);
    let old = builder.build().unwrap();
    let new = link(LinkMode::Interpreter, "print 1.");
    assert_eq!(new.relocate(&old, 0), 0);
}

#[test]
fn test_program_image() {
    let program = link(LinkMode::Program, "set x to 1.5. print \"x\" + x.");
    let bytes = program.to_bytes().unwrap();
    assert_eq!(Program::from_bytes(&bytes).unwrap(), program);
    assert!(matches!(
        Program::from_bytes(&bytes[..3]),
        Err(LinkError::Image(_))
    ));
}
