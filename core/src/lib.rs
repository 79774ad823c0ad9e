//! Back end of a compiler for FOOL, a small object-oriented language with
//! nominal subtyping and single inheritance.
//!
//! The passes run over a tree built by a front end:
//!
//! 1. [`resolver`] binds every name and assigns storage offsets,
//! 2. [`analyzer`] type checks the resolved tree,
//! 3. [`compiler`] emits code for the stack machine in [`vm`].
//!
//! [`api::compile`] runs them in order.

pub mod analyzer;
pub mod api;
pub mod ast;
pub mod compiler;
pub mod resolver;
pub mod scope_stack;
pub mod types;
pub mod vm;
