//! Fetch and execute.

use ecow::EcoString;
use tracing::trace;

use super::cpu::Flow;
use super::operators::{self, BinaryOp};
use super::{CallFrame, CallTarget, Cpu, ExecutionError, Instruction, Opcode, StackEntry};
use crate::values::Value;

impl Cpu {
    /// Execute the opcode under the running context's instruction pointer
    /// and advance the pointer of the context that ran it.
    pub(super) fn step(&mut self) -> Result<Flow, ExecutionError> {
        let depth = self.contexts.len();
        let Some(context) = self.contexts.last() else {
            return Ok(Flow::EndOfProgram);
        };
        let ip = context.instruction_pointer;
        let opcode = context
            .program
            .get(ip)
            .cloned()
            .ok_or(ExecutionError::BadJump {
                address: ip as isize,
            })?;
        trace!(ip, %opcode);

        match opcode.instruction {
            Instruction::Eof => return Ok(Flow::EndOfFunction),
            Instruction::Eop => {
                self.break_execution(false);
                return Ok(Flow::EndOfProgram);
            }
            _ => {}
        }

        let delta = self.execute(&opcode, ip)?;

        // A built-in may have pushed or popped contexts; the delta belongs
        // to the context that executed the opcode.
        if let Some(context) = self.contexts.get_mut(depth - 1) {
            let next = context.instruction_pointer as isize + delta;
            if next < 0 {
                return Err(ExecutionError::BadJump { address: next });
            }
            context.instruction_pointer = next as usize;
        }
        Ok(Flow::Continue)
    }

    /// Returns the instruction pointer delta.
    fn execute(&mut self, opcode: &Opcode, ip: usize) -> Result<isize, ExecutionError> {
        use Instruction as I;

        match &opcode.instruction {
            I::Push(value) => self.stack.push(value.clone())?,
            I::Store => {
                let value = self.pop_value()?;
                let name = self.pop_name()?;
                self.set_value(&name, value);
            }
            I::Dup => {
                let top = match self.stack.peek(0) {
                    Some(StackEntry::Value(value)) => value.clone(),
                    Some(StackEntry::Frame(_)) => {
                        return Err(ExecutionError::InvalidStackValue(
                            "Cannot duplicate a call frame".into(),
                        ));
                    }
                    None => return Err(ExecutionError::StackUnderflow),
                };
                self.stack.push(top)?;
            }
            I::Swap => {
                let b = self.stack.pop_value()?;
                let a = self.stack.pop_value()?;
                self.stack.push(b)?;
                self.stack.push(a)?;
            }
            I::GetMember => {
                let suffix = self.pop_suffix()?;
                let object = self.pop_value()?;
                let value = match &object {
                    Value::Structure(structure) => structure
                        .get_suffix(&suffix)
                        .ok_or(ExecutionError::SuffixNotFound(suffix))?,
                    other => return Err(no_suffixes(other)),
                };
                self.stack.push(value)?;
            }
            I::SetMember => {
                let value = self.pop_value()?;
                let suffix = self.pop_suffix()?;
                let object = self.pop_value()?;
                match &object {
                    Value::Structure(structure) => {
                        if !structure.set_suffix(&suffix, value) {
                            return Err(ExecutionError::SuffixNotFound(suffix));
                        }
                    }
                    other => return Err(no_suffixes(other)),
                }
            }
            I::Eof | I::Eop | I::Nop => {}

            I::BranchIfFalse => {
                let condition = self.pop_value()?;
                if !operators::to_bool(&condition)? {
                    return jump_delta(opcode, ip);
                }
            }
            I::Jump => return jump_delta(opcode, ip),

            I::CompareGt => self.binary(BinaryOp::Greater)?,
            I::CompareLt => self.binary(BinaryOp::Less)?,
            I::CompareGte => self.binary(BinaryOp::GreaterOrEqual)?,
            I::CompareLte => self.binary(BinaryOp::LessOrEqual)?,
            I::CompareEqual => self.binary(BinaryOp::Equal)?,
            I::CompareNotEqual => self.binary(BinaryOp::NotEqual)?,
            I::Add => self.binary(BinaryOp::Add)?,
            I::Subtract => self.binary(BinaryOp::Subtract)?,
            I::Multiply => self.binary(BinaryOp::Multiply)?,
            I::Divide => self.binary(BinaryOp::Divide)?,
            I::Power => self.binary(BinaryOp::Power)?,

            I::LogicToBool => {
                let value = self.pop_value()?;
                let result = operators::to_bool(&value)?;
                self.stack.push(Value::Bool(result))?;
            }
            I::LogicNot => {
                let value = self.pop_value()?;
                self.stack.push(operators::logic_not(&value)?)?;
            }
            I::LogicAnd => {
                let right = self.pop_value()?;
                let left = self.pop_value()?;
                self.stack.push(operators::logic_and(&left, &right)?)?;
            }
            I::LogicOr => {
                let right = self.pop_value()?;
                let left = self.pop_value()?;
                self.stack.push(operators::logic_or(&left, &right)?)?;
            }

            I::Call(target) => return self.call(target, ip),
            I::Return => {
                self.stack.move_pointer(1);
                let frame = self.stack.pop_frame()?;
                return Ok(frame.return_address as isize - ip as isize);
            }

            I::AddTrigger { wait } => {
                let address = self.pop_address()?;
                if let Some(context) = self.contexts.last_mut() {
                    context.add_trigger(address);
                }
                if *wait {
                    self.start_wait(0.0);
                }
            }
            I::RemoveTrigger => {
                let address = self.pop_address()?;
                if let Some(context) = self.contexts.last_mut() {
                    context.remove_trigger(address);
                }
            }
            I::Wait => {
                let duration = self.pop_value()?;
                let seconds = duration.as_f64().ok_or_else(|| {
                    ExecutionError::runtime(format!(
                        "Cannot wait for a {}",
                        duration.type_name()
                    ))
                })?;
                self.start_wait(seconds);
            }
            I::EndWait => self.end_wait(),
        }
        Ok(1)
    }

    fn binary(&mut self, op: BinaryOp) -> Result<(), ExecutionError> {
        let right = self.pop_value()?;
        let left = self.pop_value()?;
        let result = operators::calculate(op, &left, &right)?;
        self.stack.push(result)
    }

    fn call(&mut self, target: &CallTarget, ip: usize) -> Result<isize, ExecutionError> {
        match target {
            CallTarget::Pointer(pointer) => {
                let cell = self.get_value(&Value::Identifier(pointer.clone()))?;
                let address = cell.as_address().ok_or_else(|| {
                    ExecutionError::runtime(format!("{} does not point to code", pointer))
                })?;
                self.stack.push_frame(CallFrame {
                    return_address: ip + 1,
                    target: pointer.clone(),
                })?;
                self.stack.move_pointer(-1);
                Ok(address as isize - ip as isize)
            }
            CallTarget::Builtin(_) | CallTarget::Function(_) => {
                let name = target.function_name().unwrap_or_default();
                let function = self
                    .functions
                    .get(name)
                    .ok_or_else(|| ExecutionError::UnknownFunction(target.to_string().into()))?;
                function.execute(self)?;
                Ok(1)
            }
        }
    }

    /// Assignment target: a variable reference or a plain name.
    fn pop_name(&mut self) -> Result<EcoString, ExecutionError> {
        match self.stack.pop_value()? {
            Value::Identifier(name) | Value::Str(name) => Ok(name),
            other => Err(ExecutionError::InvalidStackValue(format!(
                "Expected a variable name but found {:?}",
                other
            ))),
        }
    }

    fn pop_suffix(&mut self) -> Result<EcoString, ExecutionError> {
        match self.stack.pop_value()? {
            Value::Str(name) => Ok(EcoString::from(name.to_ascii_lowercase())),
            other => Err(ExecutionError::InvalidStackValue(format!(
                "Expected a suffix name but found {:?}",
                other
            ))),
        }
    }

    fn pop_address(&mut self) -> Result<usize, ExecutionError> {
        let value = self.pop_value()?;
        value.as_address().ok_or_else(|| {
            ExecutionError::InvalidStackValue(format!("Expected an address but found {:?}", value))
        })
    }
}

fn jump_delta(opcode: &Opcode, ip: usize) -> Result<isize, ExecutionError> {
    opcode
        .target
        .map(|target| target as isize - ip as isize)
        .ok_or_else(|| ExecutionError::runtime(format!("Unresolved destination at {}", ip)))
}

fn no_suffixes(value: &Value) -> ExecutionError {
    ExecutionError::NoSuffixes(EcoString::from(value.type_name()))
}
