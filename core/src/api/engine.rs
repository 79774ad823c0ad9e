//! Pipeline driver: resolution, type checking, then code generation.

use crate::analyzer;
use crate::api::{EngineOptions, Error};
use crate::ast::Program;
use crate::compiler;
use crate::resolver;
use crate::types::Type;
use crate::vm::{Code, Execution, ExecutionError, VM};

/// A program that passed every check, with its generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Type of the program body; `None` when it could not be determined.
    pub ty: Option<Type>,
    pub code: Code,
    options: EngineOptions,
}

impl Compiled {
    /// Run the generated code on the reference machine.
    pub fn run(&self) -> Result<Execution, ExecutionError> {
        VM::new(&self.code, self.options.execution)?.run()
    }
}

/// Compile `program` with default options.
///
/// The tree is annotated in place with bindings and offsets.
pub fn compile(program: &mut Program) -> Result<Compiled, Error> {
    compile_with(program, EngineOptions::default())
}

/// Compile `program`.
///
/// Each pass runs only if the previous one reported no errors: code is never
/// generated for a program that failed resolution or type checking.
pub fn compile_with(program: &mut Program, options: EngineOptions) -> Result<Compiled, Error> {
    resolver::resolve(program)?;
    let ty = analyzer::analyze(program)?;
    let code = compiler::generate(program, &options.compilation)?;
    tracing::debug!(?ty, instructions = code.len(), "Compiled program");
    Ok(Compiled { ty, code, options })
}
