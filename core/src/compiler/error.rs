//! Code generation errors.

use crate::ast::Line;

/// The tree handed to code generation was not fully resolved.
///
/// Only reachable when code generation runs on a program that reported
/// resolution errors; a clean program never produces one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A use of `name` carries no binding.
    #[error("line {line}: '{name}' has no binding")]
    Unbound { name: String, line: Line },

    /// A method was never assigned a dispatch slot.
    #[error("line {line}: method '{name}' has no dispatch slot")]
    MissingSlot { name: String, line: Line },

    /// A class extends a class whose dispatch table was never built.
    #[error("class '{class}' extends '{superclass}', which has no dispatch table")]
    MissingDispatchTable { class: String, superclass: String },
}
