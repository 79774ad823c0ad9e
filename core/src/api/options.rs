//! Configuration options for the compiler pipeline.

use crate::compiler::CodegenOptions;
use crate::vm::{VmOptions, MEMORY_SIZE};

/// Options for one compile and run cycle.
///
/// Code generation and the machine must agree on the memory size, since
/// generated code addresses the class directory past the end of memory.
///
/// # Example
///
/// ```
/// use fool_core::api::EngineOptions;
///
/// let options = EngineOptions::with_memory_size(2048);
/// assert_eq!(options.compilation.memory_size, options.execution.memory_size);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub compilation: CodegenOptions,
    pub execution: VmOptions,
}

impl EngineOptions {
    pub fn with_memory_size(memory_size: usize) -> Self {
        Self {
            compilation: CodegenOptions { memory_size },
            execution: VmOptions {
                memory_size,
                ..VmOptions::default()
            },
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::with_memory_size(MEMORY_SIZE)
    }
}
