//! Hoisting pass: triggers and lock functions.
//!
//! Runs over the statement skeleton before the mainline is compiled and
//! never looks inside expressions. Each `on`, `when`, `wait until` and
//! `lock` becomes a self-contained function in the context's registries,
//! so the mainline only has to push its address.

use super::codegen::{
    Result, lock_trigger_id, on_trigger_id, required, wait_trigger_id, when_trigger_id,
};
use super::{CompileError, Compiler, Label, Lock, Trigger};
use crate::parser::{Node, NodeKind};
use crate::values::Value;
use crate::vm::{CallTarget, Instruction};

impl Compiler<'_> {
    pub(super) fn preprocess(&mut self, node: &Node<'_>) -> Result<()> {
        self.last_node = node.text.into();
        match node.kind {
            NodeKind::Start
            | NodeKind::InstructionBlock
            | NodeKind::Instruction
            | NodeKind::IfStmt
            | NodeKind::UntilStmt => self.preprocess_children(node),
            // Handlers nested in a body must exist before the body compiles.
            NodeKind::OnStmt => {
                self.preprocess_children(node)?;
                self.preprocess_on(node)
            }
            NodeKind::WhenStmt => {
                self.preprocess_children(node)?;
                self.preprocess_when(node)
            }
            NodeKind::WaitStmt if node.has(NodeKind::Until) => self.preprocess_wait(node),
            NodeKind::LockStmt => self.preprocess_lock(node),
            _ => Ok(()),
        }
    }

    fn preprocess_children(&mut self, node: &Node<'_>) -> Result<()> {
        node.children
            .iter()
            .try_for_each(|child| self.preprocess(child))
    }

    /// `$old-var = var` guard, body, self removal.
    fn preprocess_on(&mut self, node: &Node<'_>) -> Result<()> {
        let id = on_trigger_id(node);
        if self.context.triggers.contains(&id) {
            return Ok(());
        }
        let variable = required(node, 0)?;
        let body = required(node, 1)?;

        let mut trigger = Trigger::new(id);
        trigger.set_trigger_variable(variable.text);
        let old_value = trigger.variable_name_old_value.clone();
        trigger.code = self.in_section(|c| {
            let entry = c.context.peek_label();
            c.emit_push(Value::identifier(&old_value));
            c.visit(variable)?;
            c.emit(Instruction::CompareEqual);
            c.emit(Instruction::LogicNot);
            c.guarded_body(body, entry)
        })?;
        self.context.triggers.insert(trigger);
        Ok(())
    }

    fn preprocess_when(&mut self, node: &Node<'_>) -> Result<()> {
        let id = when_trigger_id(node);
        if self.context.triggers.contains(&id) {
            return Ok(());
        }
        let condition = required(node, 0)?;
        let body = required(node, 1)?;

        let mut trigger = Trigger::new(id);
        trigger.code = self.in_section(|c| {
            let entry = c.context.peek_label();
            c.visit(condition)?;
            c.guarded_body(body, entry)
        })?;
        self.context.triggers.insert(trigger);
        Ok(())
    }

    fn preprocess_wait(&mut self, node: &Node<'_>) -> Result<()> {
        let id = wait_trigger_id(node);
        if self.context.triggers.contains(&id) {
            return Ok(());
        }
        let condition = node
            .find(NodeKind::Expr)
            .ok_or(CompileError::malformed(node.kind, "missing condition"))?;

        let mut trigger = Trigger::new(id);
        trigger.code = self.in_section(|c| {
            let entry = c.context.peek_label();
            c.visit(condition)?;
            let branch = c.emit(Instruction::BranchIfFalse);
            c.emit(Instruction::EndWait);
            c.emit_push_address(entry);
            c.emit(Instruction::RemoveTrigger);
            let end = c.context.peek_label();
            c.emit(Instruction::Eof);
            c.set_destination(branch, end);
            Ok(())
        })?;
        self.context.triggers.insert(trigger);
        Ok(())
    }

    /// `br.false end; body; push entry; removetrigger; end: eof`.
    fn guarded_body(&mut self, body: &Node<'_>, entry: Label) -> Result<()> {
        let branch = self.emit(Instruction::BranchIfFalse);
        self.visit(body)?;
        self.emit_push_address(entry);
        self.emit(Instruction::RemoveTrigger);
        let end = self.context.peek_label();
        self.emit(Instruction::Eof);
        self.set_destination(branch, end);
        Ok(())
    }

    fn preprocess_lock(&mut self, node: &Node<'_>) -> Result<()> {
        let name = required(node, 0)?.text;
        let expression = required(node, 1)?;

        if !self.context.locks.contains(name) {
            self.create_lock(node, name)?;
        }

        let known = self
            .context
            .locks
            .get(name)
            .is_some_and(|lock| lock.function(expression.text).is_some());
        if known {
            return Ok(());
        }
        let code = self.in_section(|c| {
            c.visit(expression)?;
            c.emit(Instruction::Return);
            Ok(())
        })?;
        if let Some(lock) = self.context.locks.get_mut(name) {
            lock.add_function(expression.text, code);
        }
        Ok(())
    }

    /// Default function, pointer setup and, for flight controls, the
    /// refresh trigger. The default function is compiled first so every
    /// later reference to it points backwards.
    fn create_lock(&mut self, node: &Node<'_>, name: &str) -> Result<()> {
        let default_function = self.in_section(|c| {
            c.emit_push(Value::identifier(name));
            c.emit(Instruction::Return);
            Ok(())
        })?;
        let default_label = default_function
            .first()
            .and_then(|opcode| opcode.label)
            .ok_or(CompileError::malformed(node.kind, "empty default function"))?;

        let mut lock = Lock::new(name, default_label);
        lock.set_default_function(default_function);
        let pointer = lock.pointer_identifier.clone();
        lock.initialization_code = self.in_section(|c| {
            c.emit_push(Value::identifier(&pointer));
            c.emit_push_address(default_label);
            c.emit(Instruction::Store);
            Ok(())
        })?;
        let is_system = lock.is_system_lock();
        self.context.locks.insert(lock);

        let trigger_id = lock_trigger_id(name);
        if is_system && !self.context.triggers.contains(&trigger_id) {
            let mut trigger = Trigger::new(trigger_id);
            trigger.code = self.in_section(|c| {
                c.emit_push(Value::identifier(name));
                c.emit(Instruction::Call(CallTarget::Pointer(pointer.clone())));
                c.emit(Instruction::Store);
                c.emit(Instruction::Eof);
                Ok(())
            })?;
            self.context.triggers.insert(trigger);
        }
        Ok(())
    }
}
