//! Tests for the main code generation pass.

use bumpalo::Bump;

use crate::compiler::{CodePart, CompileError, Compiler, Context, Label};
use crate::parser::{self, NodeKind};
use crate::values::Value;
use crate::vm::{Builtin, CallTarget, Instruction, Opcode};

fn compile_in(context: &mut Context, source: &str) -> Result<CodePart, CompileError> {
    let arena = Bump::new();
    let tree = parser::parse(&arena, source).unwrap();
    Compiler::compile(&tree, context)
}

fn compile(source: &str) -> (CodePart, Context) {
    let mut context = Context::new();
    let part = compile_in(&mut context, source).unwrap();
    (part, context)
}

fn instructions(code: &[Opcode]) -> Vec<Instruction> {
    code.iter().map(|opcode| opcode.instruction.clone()).collect()
}

fn push(value: impl Into<Value>) -> Instruction {
    Instruction::Push(value.into())
}

fn var(name: &str) -> Instruction {
    Instruction::Push(Value::identifier(name))
}

fn call(builtin: Builtin) -> Instruction {
    Instruction::Call(CallTarget::Builtin(builtin))
}

fn function(name: &str) -> Instruction {
    Instruction::Call(CallTarget::Function(name.into()))
}

fn destination(code: &[Opcode], index: usize) -> Option<Label> {
    code[index].destination
}

#[test]
fn test_arithmetic_follows_precedence() {
    let (part, _) = compile("set x to 1 + 2 * 3.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("x"),
            push(1),
            push(2),
            push(3),
            Instruction::Multiply,
            Instruction::Add,
            Instruction::Store,
        ]
    );
}

#[test]
fn test_chains_are_left_to_right() {
    let (part, _) = compile("set x to 8 - 2 - 1.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("x"),
            push(8),
            push(2),
            Instruction::Subtract,
            push(1),
            Instruction::Subtract,
            Instruction::Store,
        ]
    );
}

#[test]
fn test_labels_are_sequential() {
    let (part, context) = compile("set x to 1 + 2 * 3.");
    let labels: Vec<u32> = part
        .main_code
        .iter()
        .map(|opcode| opcode.label.unwrap().0)
        .collect();
    assert_eq!(labels, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(context.label_index(), 7);
}

#[test]
fn test_leading_minus_emits_logic_not() {
    let (part, _) = compile("set y to -5.");
    assert_eq!(
        instructions(&part.main_code),
        vec![var("y"), push(5), Instruction::LogicNot, Instruction::Store]
    );
}

#[test]
fn test_number_literals() {
    let (part, _) = compile("print 1.5e2. print 3000000000. print 0.25. print true.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            push(150.0),
            call(Builtin::Print),
            push(3_000_000_000.0),
            call(Builtin::Print),
            push(0.25),
            call(Builtin::Print),
            push(true),
            call(Builtin::Print),
        ]
    );
}

#[test]
fn test_string_literal_keeps_case() {
    let (part, _) = compile("PRINT \"Hello\".");
    assert_eq!(
        instructions(&part.main_code),
        vec![push("Hello"), call(Builtin::Print)]
    );
}

#[test]
fn test_if_branch_targets_next_label() {
    let (part, _) = compile("if x { print 1. }");
    let code = &part.main_code;
    assert_eq!(
        instructions(code),
        vec![
            var("x"),
            Instruction::BranchIfFalse,
            push(1),
            call(Builtin::Print),
            Instruction::Nop,
        ]
    );
    assert_eq!(destination(code, 1), code[4].label);
}

#[test]
fn test_if_followed_by_statement_needs_no_nop() {
    let (part, _) = compile("if x { print 1. } print 2.");
    let code = &part.main_code;
    assert_eq!(code.len(), 6);
    assert_eq!(code[4].instruction, push(2));
    assert_eq!(destination(code, 1), code[4].label);
}

#[test]
fn test_nested_break_targets_its_own_loop() {
    let (part, _) = compile("until a { until b { break. } break. }");
    let code = &part.main_code;
    assert_eq!(
        instructions(code),
        vec![
            var("a"),
            Instruction::LogicNot,
            Instruction::BranchIfFalse,
            var("b"),
            Instruction::LogicNot,
            Instruction::BranchIfFalse,
            Instruction::Jump,
            Instruction::Jump,
            Instruction::Jump,
            Instruction::Jump,
            Instruction::Nop,
        ]
    );
    // Inner loop: exit and break land after the inner back jump.
    assert_eq!(destination(code, 5), code[8].label);
    assert_eq!(destination(code, 6), code[8].label);
    assert_eq!(destination(code, 7), code[3].label);
    // Outer loop.
    assert_eq!(destination(code, 2), code[10].label);
    assert_eq!(destination(code, 8), code[10].label);
    assert_eq!(destination(code, 9), code[0].label);
}

#[test]
fn test_break_outside_loop_is_an_error() {
    let mut context = Context::new();
    let err = compile_in(&mut context, "break.").unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CompileError::MalformedTree {
            kind: NodeKind::BreakStmt,
            ..
        }
    ));
    match err {
        CompileError::Node { fragment, .. } => assert_eq!(fragment, "break"),
        other => panic!("expected node error, got {:?}", other),
    }
}

#[test]
fn test_function_call_overloads() {
    let (part, _) = compile("set a to round(x). set b to round(x, 2). set c to sin(x).");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("a"),
            var("x"),
            function("roundnearest()"),
            Instruction::Store,
            var("b"),
            var("x"),
            push(2),
            function("round()"),
            Instruction::Store,
            var("c"),
            var("x"),
            function("sin()"),
            Instruction::Store,
        ]
    );
}

#[test]
fn test_suffix_reads_and_writes() {
    let (part, _) = compile("print ship:altitude. set ship:control:throttle to 1.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("ship"),
            push("altitude"),
            Instruction::GetMember,
            call(Builtin::Print),
            var("ship"),
            push("control"),
            Instruction::GetMember,
            push("throttle"),
            push(1),
            Instruction::SetMember,
        ]
    );
}

#[test]
fn test_reserved_values_skip_suffixes() {
    let (part, _) = compile("print alt:radar. set eta:apoapsis to 1.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("alt|radar"),
            call(Builtin::Print),
            var("eta|apoapsis"),
            push(1),
            Instruction::Store,
        ]
    );
}

#[test]
fn test_declare() {
    let (part, _) = compile("declare x. declare parameter a, b.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("x"),
            push(0),
            Instruction::Store,
            var("b"),
            Instruction::Swap,
            Instruction::Store,
            var("a"),
            Instruction::Swap,
            Instruction::Store,
        ]
    );
}

#[test]
fn test_toggle_and_on_off() {
    let (part, _) = compile("toggle sas. rcs on. gear off.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("sas"),
            var("sas"),
            Instruction::LogicToBool,
            Instruction::LogicNot,
            Instruction::Store,
            var("rcs"),
            push(true),
            Instruction::Store,
            var("gear"),
            push(false),
            Instruction::Store,
        ]
    );
}

#[test]
fn test_print_at() {
    let (part, _) = compile("print \"hi\" at (1, 2).");
    assert_eq!(
        instructions(&part.main_code),
        vec![push("hi"), push(1), push(2), call(Builtin::PrintAt)]
    );
}

#[test]
fn test_file_statements() {
    let (part, _) = compile(
        "copy \"a\" from 1. rename volume 1 to \"x\". rename old to new. delete foo. log x to \"f\".",
    );
    assert_eq!(
        instructions(&part.main_code),
        vec![
            push("a"),
            push("from"),
            push(1),
            call(Builtin::Copy),
            push("volume"),
            push(1),
            push("x"),
            call(Builtin::Rename),
            push("file"),
            push("old"),
            push("new"),
            call(Builtin::Rename),
            push("foo"),
            Instruction::Push(Value::Null),
            call(Builtin::Delete),
            var("x"),
            push("f"),
            call(Builtin::Log),
        ]
    );
}

#[test]
fn test_run_pushes_arguments_first() {
    let (part, _) = compile("run prog(1, 2) on archive. run other.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            push(1),
            push(2),
            push("prog"),
            push("archive"),
            call(Builtin::Run),
            push("other"),
            Instruction::Push(Value::Null),
            call(Builtin::Run),
        ]
    );
}

#[test]
fn test_simple_builtins() {
    let (part, _) = compile("stage. clearscreen. list. list volumes. switch to 0. reboot. shutdown.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            call(Builtin::Stage),
            call(Builtin::ClearScreen),
            push("files"),
            call(Builtin::List),
            push("volumes"),
            call(Builtin::List),
            push(0),
            call(Builtin::Switch),
            call(Builtin::Reboot),
            call(Builtin::Shutdown),
        ]
    );
}

#[test]
fn test_unset() {
    let (part, _) = compile("unset x. unset all.");
    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("x"),
            call(Builtin::Unset),
            Instruction::Push(Value::Null),
            call(Builtin::Unset),
        ]
    );
}

#[test]
fn test_wait_for_time() {
    let (part, _) = compile("wait 5.");
    assert_eq!(
        instructions(&part.main_code),
        vec![push(5), Instruction::Wait]
    );
}

#[test]
fn test_lock_in_mainline_points_at_its_function() {
    let (part, context) = compile("lock x to 5.");
    let lock = context.locks.get("x").unwrap();
    let function = lock.function("5").unwrap();

    assert_eq!(
        instructions(&part.main_code),
        vec![
            var("x*"),
            Instruction::Push(Value::Null),
            Instruction::Store
        ]
    );
    assert_eq!(destination(&part.main_code, 1), function.label());
}

#[test]
fn test_reading_a_lock_calls_its_pointer() {
    let (part, _) = compile("lock x to 5. print x + 1.");
    assert_eq!(
        instructions(&part.main_code[3..]),
        vec![
            Instruction::Call(CallTarget::Pointer("x*".into())),
            push(1),
            Instruction::Add,
            call(Builtin::Print),
        ]
    );
}

#[test]
fn test_system_lock_enables_fly_by_wire() {
    let (part, context) = compile("lock throttle to 1.");
    let trigger = context.triggers.get("lock-throttle").unwrap();

    let code = &part.main_code;
    assert_eq!(
        instructions(code),
        vec![
            var("throttle*"),
            Instruction::Push(Value::Null),
            Instruction::Store,
            Instruction::Push(Value::Null),
            Instruction::AddTrigger { wait: false },
            push("throttle"),
            push(true),
            call(Builtin::ToggleFlyByWire),
        ]
    );
    assert_eq!(destination(code, 3), trigger.function_label());
}

#[test]
fn test_unlock_restores_default_function() {
    let (part, context) = compile("lock x to 1. unlock x.");
    let lock = context.locks.get("x").unwrap();
    let code = &part.main_code[3..];
    assert_eq!(
        instructions(code),
        vec![
            var("x*"),
            Instruction::Push(Value::Null),
            Instruction::Store
        ]
    );
    assert_eq!(destination(code, 1), Some(lock.default_label));
}

#[test]
fn test_unlock_system_lock_disables_fly_by_wire() {
    let (part, _) = compile("lock steering to 1. unlock all.");
    assert_eq!(
        instructions(&part.main_code[8..]),
        vec![
            push("steering"),
            push(false),
            call(Builtin::ToggleFlyByWire),
            Instruction::Push(Value::Null),
            Instruction::RemoveTrigger,
            var("steering*"),
            Instruction::Push(Value::Null),
            Instruction::Store,
        ]
    );
}

#[test]
fn test_unlock_unknown_lock_is_a_no_op() {
    let (part, context) = compile("unlock foo.");
    assert!(part.main_code.is_empty());
    assert!(context.locks.is_empty());
}

#[test]
fn test_on_statement_arms_trigger() {
    let (part, context) = compile("on ag1 { print 1. }");
    let trigger = context.triggers.get("on-0").unwrap();
    let code = &part.main_code;
    assert_eq!(
        instructions(code),
        vec![
            var("old-ag1"),
            var("ag1"),
            Instruction::Store,
            Instruction::Push(Value::Null),
            Instruction::AddTrigger { wait: false },
        ]
    );
    assert_eq!(destination(code, 3), trigger.function_label());
}

#[test]
fn test_wait_until_arms_waiting_trigger() {
    let (part, context) = compile("wait until x > 1.");
    let trigger = context.triggers.get("wait-0").unwrap();
    let code = &part.main_code;
    assert_eq!(
        instructions(code),
        vec![
            Instruction::Push(Value::Null),
            Instruction::AddTrigger { wait: true },
        ]
    );
    assert_eq!(destination(code, 0), trigger.function_label());
}
