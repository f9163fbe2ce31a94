use bumpalo::Bump;
use hashbrown::HashMap;
use tracing::debug;

use super::{CodePart, CompileError, Compiler, Context};
use crate::api::CompilationOptions;
use crate::parser::{self, normalize};

/// Context id of the interactive session. Its output is never cached.
pub const INTERPRETER_CONTEXT: &str = "interpreter";

/// Compile driver: source text in, code parts out.
///
/// Keeps one [`Context`] per id so repeated compiles into the same id keep
/// their label numbering, locks and triggers.
#[derive(Debug, Default)]
pub struct Script {
    contexts: HashMap<String, Context>,
    /// Output of earlier compiles, keyed by context id and normalized source.
    cache: HashMap<(String, String), Vec<CodePart>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `source` into the context named by `options.context_id`.
    ///
    /// Returns the lock parts and trigger parts that are new since the last
    /// compile into the same context, followed by the mainline part. Every
    /// opcode is stamped with the new instruction group id.
    ///
    /// # Example
    ///
    /// ```
    /// use kerbo_core::api::CompilationOptions;
    /// use kerbo_core::compiler::Script;
    ///
    /// let mut script = Script::new();
    /// let parts = script
    ///     .compile("set x to 1.", &CompilationOptions::default())
    ///     .unwrap();
    /// assert_eq!(parts.len(), 1);
    /// ```
    pub fn compile(
        &mut self,
        source: &str,
        options: &CompilationOptions,
    ) -> Result<Vec<CodePart>, CompileError> {
        let context_id = options.context_id.as_str();
        let cacheable = !context_id.is_empty() && context_id != INTERPRETER_CONTEXT;
        let key = (context_id.to_string(), normalize(source));
        if cacheable {
            if let Some(parts) = self.cache.get(&key) {
                debug!(context = context_id, "compile cache hit");
                return Ok(parts.clone());
            }
        }

        let arena = Bump::new();
        let tree = parser::parse(&arena, source)?;

        let mut scratch = Context::new();
        let context = if context_id.is_empty() {
            &mut scratch
        } else {
            self.contexts.entry(context_id.to_string()).or_default()
        };

        let main = Compiler::compile(&tree, context)?;
        let mut parts = context.locks.take_new_parts();
        parts.extend(context.triggers.take_new_parts());
        parts.push(main);

        let instruction_id = context.next_instruction_id();
        for part in &mut parts {
            part.assign_instruction_id(instruction_id);
        }
        debug!(
            context = context_id,
            parts = parts.len(),
            instruction_id,
            "compiled script"
        );

        if cacheable {
            self.cache.insert(key, parts.clone());
        }
        Ok(parts)
    }

    pub fn context(&self, context_id: &str) -> Option<&Context> {
        self.contexts.get(context_id)
    }

    /// Forget a context and everything compiled into it.
    pub fn clear_context(&mut self, context_id: &str) {
        self.contexts.remove(context_id);
        self.cache.retain(|(id, _), _| id != context_id);
    }
}
