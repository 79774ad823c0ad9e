//! Code generation for the stack machine.
//!
//! Walks a resolved and type checked tree and emits a flat [`Code`] listing.
//! Function and method bodies are hoisted: each gets a fresh `function<n>`
//! label and is emitted after the top-level `halt`.
//!
//! [`Code`]: crate::vm::Code

mod codegen;
mod error;

#[cfg(test)]
mod codegen_test;

pub use codegen::{generate, CodeGenerator, CodegenOptions};
pub use error::CompileError;
