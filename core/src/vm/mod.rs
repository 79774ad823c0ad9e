//! Target stack machine: instruction set, code listings and a reference
//! interpreter used to observe compiled programs.

mod code;
mod instruction_set;
mod runtime;

pub use code::{Code, CodeError};
pub use instruction_set::{Instruction, Operand, ParseInstructionError};
pub use runtime::{Execution, ExecutionError, VmOptions, VM};

/// Words of machine memory. The class directory lives just above it.
pub const MEMORY_SIZE: usize = 10000;

/// Default instruction budget of the interpreter.
pub const MAX_STEPS: usize = 1_000_000;
