//! Main tree walk: statements and expressions to opcodes.

use core::mem;

use ecow::{EcoString, eco_format};
use hashbrown::HashMap;
use lazy_static::lazy_static;
use smallvec::SmallVec;
use tracing::trace;

use super::{CodePart, CompileError, Context, Label};
use crate::parser::{Node, NodeKind, ParseTree};
use crate::values::Value;
use crate::vm::{Builtin, CallTarget, Instruction, Opcode};

lazy_static! {
    /// Suffix chains that name a single reserved value.
    static ref IDENTIFIER_REPLACEMENTS: HashMap<&'static str, &'static str> = [
        ("alt:radar", "alt|radar"),
        ("alt:apoapsis", "alt|apoapsis"),
        ("alt:periapsis", "alt|periapsis"),
        ("eta:apoapsis", "eta|apoapsis"),
        ("eta:periapsis", "eta|periapsis"),
    ]
    .into_iter()
    .collect();

    /// `name|arity` to the function actually called.
    static ref FUNCTION_OVERLOADS: HashMap<&'static str, &'static str> =
        [("round|1", "roundnearest"), ("round|2", "round")]
            .into_iter()
            .collect();
}

pub(crate) type Result<T> = core::result::Result<T, CompileError>;

/// Tree-walking code generator.
///
/// One `Compiler` compiles one parse tree against a long-lived [`Context`].
/// The pre-processing pass runs first and fills the context's lock and
/// trigger registries; the main pass then emits the mainline into a
/// [`CodePart`].
pub struct Compiler<'c> {
    pub(super) context: &'c mut Context,

    /// Section currently being written. Swapped out while a trigger or lock
    /// function is compiled.
    pub(super) current: Vec<Opcode>,

    /// Pending `break` jumps, one list per enclosing `until`. Entries are
    /// indices into `current`.
    pub(super) break_lists: SmallVec<[Vec<usize>; 4]>,

    /// The last branch targets the next label, so some opcode must follow.
    add_branch_destination: bool,

    /// Compiling the target of an assignment: the last suffix is left for
    /// `SetMember`.
    compiling_set_destination: bool,

    /// Text of the most recently visited node, for error reports.
    pub(super) last_node: EcoString,
}

impl<'c> Compiler<'c> {
    pub fn new(context: &'c mut Context) -> Self {
        Self {
            context,
            current: Vec::new(),
            break_lists: SmallVec::new(),
            add_branch_destination: false,
            compiling_set_destination: false,
            last_node: EcoString::new(),
        }
    }

    /// Compile a whole program.
    ///
    /// Locks and triggers end up in the context; the returned part holds
    /// only the mainline.
    pub fn compile(tree: &ParseTree<'_>, context: &'c mut Context) -> Result<CodePart> {
        let mut compiler = Self::new(context);
        compiler
            .compile_root(tree.root)
            .map_err(|source| CompileError::Node {
                fragment: compiler.last_node.to_string(),
                source: Box::new(source),
            })?;
        let mut part = CodePart::new();
        part.main_code = mem::take(&mut compiler.current);
        trace!(opcodes = part.main_code.len(), "compiled mainline");
        Ok(part)
    }

    fn compile_root(&mut self, root: &Node<'_>) -> Result<()> {
        self.preprocess(root)?;
        self.visit(root)?;
        if self.add_branch_destination {
            self.emit(Instruction::Nop);
        }
        Ok(())
    }

    // === Emission ===

    /// Append an opcode to the current section and give it the next label.
    pub(super) fn emit_opcode(&mut self, mut opcode: Opcode) -> usize {
        opcode.label = Some(self.context.next_label());
        self.add_branch_destination = false;
        self.current.push(opcode);
        self.current.len() - 1
    }

    pub(super) fn emit(&mut self, instruction: Instruction) -> usize {
        self.emit_opcode(Opcode::new(instruction))
    }

    pub(super) fn emit_to(&mut self, instruction: Instruction, destination: Label) -> usize {
        self.emit_opcode(Opcode::with_destination(instruction, destination))
    }

    pub(super) fn emit_push(&mut self, value: Value) -> usize {
        self.emit(Instruction::Push(value))
    }

    /// `push null` that the linker turns into the address of `destination`.
    pub(super) fn emit_push_address(&mut self, destination: Label) -> usize {
        self.emit_to(Instruction::Push(Value::Null), destination)
    }

    pub(super) fn emit_call(&mut self, builtin: Builtin) -> usize {
        self.emit(Instruction::Call(CallTarget::Builtin(builtin)))
    }

    pub(super) fn set_destination(&mut self, index: usize, destination: Label) {
        if let Some(opcode) = self.current.get_mut(index) {
            opcode.destination = Some(destination);
        }
    }

    /// Compile into a fresh section and return its code.
    pub(super) fn in_section<F>(&mut self, f: F) -> Result<Vec<Opcode>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let saved = mem::take(&mut self.current);
        let saved_breaks = mem::take(&mut self.break_lists);
        let result = f(self);
        let code = mem::replace(&mut self.current, saved);
        self.break_lists = saved_breaks;
        result.map(|()| code)
    }

    // === Tree walk ===

    pub(super) fn visit(&mut self, node: &Node<'_>) -> Result<()> {
        self.last_node = EcoString::from(node.text);
        use NodeKind as K;
        match node.kind {
            K::Start | K::InstructionBlock => self.visit_children(node),
            K::Instruction => self.visit(required(node, 0)?),

            K::SetStmt => self.visit_set(node),
            K::IfStmt => self.visit_if(node),
            K::UntilStmt => self.visit_until(node),
            K::BreakStmt => self.visit_break(node),
            K::LockStmt => self.visit_lock(node),
            K::UnlockStmt => self.visit_unlock(node),
            K::OnStmt => self.visit_on(node),
            K::WhenStmt => self.visit_when(node),
            K::WaitStmt => self.visit_wait(node),
            K::DeclareStmt => self.visit_declare(node),
            K::ToggleStmt => self.visit_toggle(node),
            K::OnOffStmt => self.visit_on_off(node),
            K::PrintStmt => self.visit_print(node),
            K::StageStmt => self.visit_call(Builtin::Stage),
            K::ClearStmt => self.visit_call(Builtin::ClearScreen),
            K::RebootStmt => self.visit_call(Builtin::Reboot),
            K::ShutdownStmt => self.visit_call(Builtin::Shutdown),
            K::AddStmt => self.visit_with_arguments(node, Builtin::Add),
            K::RemoveStmt => self.visit_with_arguments(node, Builtin::Remove),
            K::LogStmt => self.visit_with_arguments(node, Builtin::Log),
            K::SwitchStmt => self.visit_with_arguments(node, Builtin::Switch),
            K::CopyStmt => self.visit_copy(node),
            K::RenameStmt => self.visit_rename(node),
            K::DeleteStmt => self.visit_delete(node),
            K::RunStmt => self.visit_run(node),
            K::ListStmt => self.visit_list(node),
            K::UnsetStmt => self.visit_unset(node),

            K::Expr => self.visit(required(node, 0)?),
            K::OrExpr | K::AndExpr | K::CompareExpr | K::ArithExpr | K::MultExpr | K::Factor => {
                self.visit_chain(node)
            }
            K::Atom => self.visit_atom(node),
            K::SciNumber => self.visit_sci_number(node),
            K::Number => self.visit_number(node),
            K::Integer => self.visit_integer(node),
            K::Double => self.visit_double(node),
            K::Bool => {
                self.emit_push(Value::Bool(node.text == "true"));
                Ok(())
            }
            K::String => {
                self.emit_push(Value::str(strip_quotes(node.text)));
                Ok(())
            }
            K::Identifier => {
                self.emit_push(Value::str(node.text));
                Ok(())
            }
            K::VarIdentifier => self.visit_var_identifier(node),
            K::FileVolName => self.visit(required(node, 0)?),
            K::ArgList => self.visit_children(node),

            K::PlusMinus
            | K::Mult
            | K::Div
            | K::Power
            | K::Comparator
            | K::And
            | K::Or
            | K::Until
            | K::All
            | K::On
            | K::Off
            | K::From
            | K::To
            | K::File
            | K::Volume
            | K::Parameter => Err(CompileError::malformed(
                node.kind,
                "token outside of its statement",
            )),
        }
    }

    fn visit_children(&mut self, node: &Node<'_>) -> Result<()> {
        node.children.iter().try_for_each(|child| self.visit(child))
    }

    // === Expressions ===

    /// `operand (operator operand)*`, emitted left to right.
    fn visit_chain(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit(required(node, 0)?)?;
        for pair in node.children[1..].chunks(2) {
            let [operator, operand] = pair else {
                return Err(CompileError::malformed(node.kind, "dangling operator"));
            };
            self.visit(operand)?;
            self.emit(operator_instruction(operator)?);
        }
        Ok(())
    }

    fn visit_atom(&mut self, node: &Node<'_>) -> Result<()> {
        let (sign, content) = match node.children {
            [sign, content] if sign.kind == NodeKind::PlusMinus => (Some(sign.text), content),
            [content] => (None, content),
            _ => return Err(CompileError::malformed(node.kind, "expected one operand")),
        };
        self.visit(content)?;
        if sign == Some("-") {
            self.emit(Instruction::LogicNot);
        }
        Ok(())
    }

    fn visit_sci_number(&mut self, node: &Node<'_>) -> Result<()> {
        let Some(exponent) = node.child(1) else {
            return self.visit(required(node, 0)?);
        };
        let mantissa = parse_number(required(node, 0)?)?;
        let exponent: f64 = exponent
            .text
            .parse()
            .map_err(|_| CompileError::malformed(node.kind, "bad exponent"))?;
        self.emit_push(Value::Float(mantissa * 10f64.powf(exponent)));
        Ok(())
    }

    fn visit_number(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit(required(node, 0)?)
    }

    fn visit_integer(&mut self, node: &Node<'_>) -> Result<()> {
        let value = match node.text.parse::<i32>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(parse_double(node)?),
        };
        self.emit_push(value);
        Ok(())
    }

    fn visit_double(&mut self, node: &Node<'_>) -> Result<()> {
        let value = parse_double(node)?;
        self.emit_push(Value::Float(value));
        Ok(())
    }

    /// Variable reads, suffix chains, function calls and lock reads.
    fn visit_var_identifier(&mut self, node: &Node<'_>) -> Result<()> {
        let base = required(node, 0)?;
        let arguments = node.find(NodeKind::ArgList);
        let suffixes: SmallVec<[&Node<'_>; 4]> = node.children[1..]
            .iter()
            .filter(|child| child.kind == NodeKind::Identifier)
            .collect();

        let replacement = replacement_for(base.text, &suffixes);
        let name = replacement.unwrap_or(base.text);
        let as_destination = self.compiling_set_destination && suffixes.is_empty();

        if self.context.locks.contains(name) && !as_destination {
            let pointer = eco_format!("{}{}", name, crate::values::POINTER_MARKER);
            self.emit(Instruction::Call(CallTarget::Pointer(pointer)));
        } else if let Some(arguments) = arguments {
            self.visit_function_call(name, arguments)?;
        } else {
            self.emit_push(Value::identifier(name));
        }

        if replacement.is_some() {
            return Ok(());
        }
        let last = suffixes.len().saturating_sub(1);
        for (index, suffix) in suffixes.iter().enumerate() {
            self.emit_push(Value::str(suffix.text));
            if !(self.compiling_set_destination && index == last) {
                self.emit(Instruction::GetMember);
            }
        }
        Ok(())
    }

    fn visit_function_call(&mut self, name: &str, arguments: &Node<'_>) -> Result<()> {
        let was_destination = mem::replace(&mut self.compiling_set_destination, false);
        let result = self.visit_children(arguments);
        self.compiling_set_destination = was_destination;
        result?;

        let key = format!("{}|{}", name, arguments.children.len());
        let name = FUNCTION_OVERLOADS.get(key.as_str()).copied().unwrap_or(name);
        self.emit(Instruction::Call(CallTarget::Function(eco_format!(
            "{}()",
            name
        ))));
        Ok(())
    }

    /// Compile an assignment target: `$name`, or the object plus the final
    /// suffix name when the target has suffixes.
    fn visit_destination(&mut self, node: &Node<'_>) -> Result<()> {
        let was_destination = mem::replace(&mut self.compiling_set_destination, true);
        let result = self.visit(node);
        self.compiling_set_destination = was_destination;
        result
    }

    // === Statements ===

    fn visit_set(&mut self, node: &Node<'_>) -> Result<()> {
        let target = required(node, 0)?;
        let setting_member = is_member_target(target);
        self.visit_destination(target)?;
        self.visit(required(node, 1)?)?;
        self.emit(if setting_member {
            Instruction::SetMember
        } else {
            Instruction::Store
        });
        Ok(())
    }

    fn visit_if(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit(required(node, 0)?)?;
        let branch = self.emit(Instruction::BranchIfFalse);
        self.visit(required(node, 1)?)?;
        let after_body = self.context.peek_label();
        self.set_destination(branch, after_body);
        self.add_branch_destination = true;
        Ok(())
    }

    fn visit_until(&mut self, node: &Node<'_>) -> Result<()> {
        let condition_label = self.context.peek_label();
        self.break_lists.push(Vec::new());

        self.visit(required(node, 0)?)?;
        self.emit(Instruction::LogicNot);
        let exit = self.emit(Instruction::BranchIfFalse);
        if let Some(breaks) = self.break_lists.last_mut() {
            breaks.push(exit);
        }
        self.visit(required(node, 1)?)?;
        self.emit_to(Instruction::Jump, condition_label);

        let after_loop = self.context.peek_label();
        for index in self.break_lists.pop().unwrap_or_default() {
            self.set_destination(index, after_loop);
        }
        self.add_branch_destination = true;
        Ok(())
    }

    fn visit_break(&mut self, node: &Node<'_>) -> Result<()> {
        if self.break_lists.is_empty() {
            return Err(CompileError::malformed(node.kind, "break outside of a loop"));
        }
        let jump = self.emit(Instruction::Jump);
        if let Some(breaks) = self.break_lists.last_mut() {
            breaks.push(jump);
        }
        Ok(())
    }

    fn visit_lock(&mut self, node: &Node<'_>) -> Result<()> {
        let name = required(node, 0)?.text;
        let expression = required(node, 1)?.text;
        let Some(lock) = self.context.locks.get(name) else {
            return Ok(());
        };
        if !lock.is_initialized() {
            return Ok(());
        }
        let function = lock
            .function(expression)
            .and_then(|function| function.label())
            .ok_or(CompileError::malformed(node.kind, "lock function was not compiled"))?;
        let pointer = lock.pointer_identifier.clone();
        let is_system = lock.is_system_lock();

        self.emit_push(Value::identifier(&pointer));
        self.emit_push_address(function);
        self.emit(Instruction::Store);

        if is_system {
            if let Some(entry) = self.trigger_entry(&lock_trigger_id(name)) {
                self.emit_push_address(entry);
                self.emit(Instruction::AddTrigger { wait: false });
            }
            self.emit_push(Value::str(name));
            self.emit_push(Value::Bool(true));
            self.emit_call(Builtin::ToggleFlyByWire);
        }
        Ok(())
    }

    fn visit_unlock(&mut self, node: &Node<'_>) -> Result<()> {
        let target = required(node, 0)?;
        if target.kind == NodeKind::All {
            let names: Vec<EcoString> = self
                .context
                .locks
                .iter()
                .map(|lock| lock.identifier.clone())
                .collect();
            return names.iter().try_for_each(|name| self.unlock(name));
        }
        self.unlock(target.text)
    }

    fn unlock(&mut self, name: &str) -> Result<()> {
        let Some(lock) = self.context.locks.get(name) else {
            return Ok(());
        };
        if !lock.is_initialized() {
            return Ok(());
        }
        let pointer = lock.pointer_identifier.clone();
        let default_label = lock.default_label;

        if lock.is_system_lock() {
            self.emit_push(Value::str(name));
            self.emit_push(Value::Bool(false));
            self.emit_call(Builtin::ToggleFlyByWire);
            if let Some(entry) = self.trigger_entry(&lock_trigger_id(name)) {
                self.emit_push_address(entry);
                self.emit(Instruction::RemoveTrigger);
            }
        }

        self.emit_push(Value::identifier(&pointer));
        self.emit_push_address(default_label);
        self.emit(Instruction::Store);
        Ok(())
    }

    fn visit_on(&mut self, node: &Node<'_>) -> Result<()> {
        let id = on_trigger_id(node);
        let Some(trigger) = self.context.triggers.get(&id) else {
            return Ok(());
        };
        let old_value = trigger.variable_name_old_value.clone();
        let entry = self.require_entry(node, &id)?;

        self.emit_push(Value::identifier(&old_value));
        self.visit(required(node, 0)?)?;
        self.emit(Instruction::Store);
        self.emit_push_address(entry);
        self.emit(Instruction::AddTrigger { wait: false });
        Ok(())
    }

    fn visit_when(&mut self, node: &Node<'_>) -> Result<()> {
        let id = when_trigger_id(node);
        if !self.context.triggers.contains(&id) {
            return Ok(());
        }
        let entry = self.require_entry(node, &id)?;
        self.emit_push_address(entry);
        self.emit(Instruction::AddTrigger { wait: false });
        Ok(())
    }

    fn visit_wait(&mut self, node: &Node<'_>) -> Result<()> {
        if !node.has(NodeKind::Until) {
            self.visit(required(node, 0)?)?;
            self.emit(Instruction::Wait);
            return Ok(());
        }
        let id = wait_trigger_id(node);
        if !self.context.triggers.contains(&id) {
            return Ok(());
        }
        let entry = self.require_entry(node, &id)?;
        self.emit_push_address(entry);
        self.emit(Instruction::AddTrigger { wait: true });
        Ok(())
    }

    fn visit_declare(&mut self, node: &Node<'_>) -> Result<()> {
        if !node.has(NodeKind::Parameter) {
            self.emit_push(Value::identifier(required(node, 0)?.text));
            self.emit_push(Value::Int(0));
            self.emit(Instruction::Store);
            return Ok(());
        }
        // Arguments arrive in call order, so the last parameter is on top.
        for name in node.children[1..].iter().rev() {
            self.emit_push(Value::identifier(name.text));
            self.emit(Instruction::Swap);
            self.emit(Instruction::Store);
        }
        Ok(())
    }

    fn visit_toggle(&mut self, node: &Node<'_>) -> Result<()> {
        let target = required(node, 0)?;
        self.visit_destination(target)?;
        self.visit(target)?;
        self.emit(Instruction::LogicToBool);
        self.emit(Instruction::LogicNot);
        self.emit(Instruction::Store);
        Ok(())
    }

    fn visit_on_off(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit_destination(required(node, 0)?)?;
        let on = required(node, 1)?.kind == NodeKind::On;
        self.emit_push(Value::Bool(on));
        self.emit(Instruction::Store);
        Ok(())
    }

    fn visit_print(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit_children(node)?;
        self.emit_call(match node.children.len() {
            3 => Builtin::PrintAt,
            _ => Builtin::Print,
        });
        Ok(())
    }

    fn visit_call(&mut self, builtin: Builtin) -> Result<()> {
        self.emit_call(builtin);
        Ok(())
    }

    /// Every child is an argument, in order.
    fn visit_with_arguments(&mut self, node: &Node<'_>, builtin: Builtin) -> Result<()> {
        self.visit_children(node)?;
        self.emit_call(builtin);
        Ok(())
    }

    fn visit_copy(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit(required(node, 0)?)?;
        let direction = match required(node, 1)?.kind {
            NodeKind::From => "from",
            _ => "to",
        };
        self.emit_push(Value::str(direction));
        self.visit(required(node, 2)?)?;
        self.emit_call(Builtin::Copy);
        Ok(())
    }

    fn visit_rename(&mut self, node: &Node<'_>) -> Result<()> {
        let (kind, names) = match node.children {
            [kind, names @ ..] if kind.kind == NodeKind::Volume => ("volume", names),
            [kind, names @ ..] if kind.kind == NodeKind::File => ("file", names),
            names => ("file", names),
        };
        let [old_name, new_name] = names else {
            return Err(CompileError::malformed(node.kind, "expected two names"));
        };
        self.emit_push(Value::str(kind));
        self.visit(old_name)?;
        self.visit(new_name)?;
        self.emit_call(Builtin::Rename);
        Ok(())
    }

    fn visit_delete(&mut self, node: &Node<'_>) -> Result<()> {
        self.visit(required(node, 0)?)?;
        self.visit_optional(node.child(1))?;
        self.emit_call(Builtin::Delete);
        Ok(())
    }

    fn visit_run(&mut self, node: &Node<'_>) -> Result<()> {
        let program = required(node, 0)?;
        if let Some(arguments) = node.find(NodeKind::ArgList) {
            self.visit_children(arguments)?;
        }
        self.visit(program)?;
        let volume = node.children[1..]
            .iter()
            .find(|child| child.kind == NodeKind::FileVolName);
        self.visit_optional(volume)?;
        self.emit_call(Builtin::Run);
        Ok(())
    }

    fn visit_list(&mut self, node: &Node<'_>) -> Result<()> {
        let what = node.child(0).map_or("files", |list| list.text);
        self.emit_push(Value::str(what));
        self.emit_call(Builtin::List);
        Ok(())
    }

    fn visit_unset(&mut self, node: &Node<'_>) -> Result<()> {
        let target = required(node, 0)?;
        if target.kind == NodeKind::All {
            self.emit_push(Value::Null);
        } else {
            self.emit_push(Value::identifier(required(target, 0)?.text));
        }
        self.emit_call(Builtin::Unset);
        Ok(())
    }

    /// The node, or `push null` when it is absent.
    fn visit_optional(&mut self, node: Option<&Node<'_>>) -> Result<()> {
        match node {
            Some(node) => self.visit(node),
            None => {
                self.emit_push(Value::Null);
                Ok(())
            }
        }
    }

    fn trigger_entry(&self, id: &str) -> Option<Label> {
        self.context
            .triggers
            .get(id)
            .and_then(|trigger| trigger.function_label())
    }

    fn require_entry(&self, node: &Node<'_>, id: &str) -> Result<Label> {
        self.trigger_entry(id)
            .ok_or(CompileError::malformed(node.kind, "trigger has no code"))
    }
}

pub(super) fn required<'a>(node: &Node<'a>, index: usize) -> Result<&'a Node<'a>> {
    node.child(index)
        .ok_or(CompileError::malformed(node.kind, "missing child"))
}

pub(super) fn on_trigger_id(node: &Node<'_>) -> EcoString {
    eco_format!("on-{}", node.start())
}

pub(super) fn when_trigger_id(node: &Node<'_>) -> EcoString {
    eco_format!("when-{}", node.start())
}

pub(super) fn wait_trigger_id(node: &Node<'_>) -> EcoString {
    eco_format!("wait-{}", node.start())
}

pub(super) fn lock_trigger_id(name: &str) -> EcoString {
    eco_format!("lock-{}", name)
}

fn replacement_for(base: &str, suffixes: &[&Node<'_>]) -> Option<&'static str> {
    if suffixes.is_empty() {
        return None;
    }
    let mut full = String::from(base);
    for suffix in suffixes {
        full.push(':');
        full.push_str(suffix.text);
    }
    IDENTIFIER_REPLACEMENTS.get(full.as_str()).copied()
}

/// Assignments to a suffix use `SetMember`; reserved values are plain
/// variables.
fn is_member_target(target: &Node<'_>) -> bool {
    let Some(base) = target.child(0) else {
        return false;
    };
    let suffixes: SmallVec<[&Node<'_>; 4]> = target.children[1..]
        .iter()
        .filter(|child| child.kind == NodeKind::Identifier)
        .collect();
    !suffixes.is_empty() && replacement_for(base.text, &suffixes).is_none()
}

fn operator_instruction(node: &Node<'_>) -> Result<Instruction> {
    let instruction = match (node.kind, node.text) {
        (NodeKind::Or, _) => Instruction::LogicOr,
        (NodeKind::And, _) => Instruction::LogicAnd,
        (NodeKind::Comparator, ">") => Instruction::CompareGt,
        (NodeKind::Comparator, "<") => Instruction::CompareLt,
        (NodeKind::Comparator, ">=") => Instruction::CompareGte,
        (NodeKind::Comparator, "<=") => Instruction::CompareLte,
        (NodeKind::Comparator, "=") => Instruction::CompareEqual,
        (NodeKind::Comparator, "<>") => Instruction::CompareNotEqual,
        (NodeKind::PlusMinus, "+") => Instruction::Add,
        (NodeKind::PlusMinus, "-") => Instruction::Subtract,
        (NodeKind::Mult, _) => Instruction::Multiply,
        (NodeKind::Div, _) => Instruction::Divide,
        (NodeKind::Power, _) => Instruction::Power,
        (kind, _) => return Err(CompileError::malformed(kind, "not an operator")),
    };
    Ok(instruction)
}

fn parse_double(node: &Node<'_>) -> Result<f64> {
    node.text
        .parse()
        .map_err(|_| CompileError::malformed(node.kind, "not a number"))
}

/// Value of a `Number` node as a double.
fn parse_number(node: &Node<'_>) -> Result<f64> {
    parse_double(required(node, 0)?)
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches('"')
}
