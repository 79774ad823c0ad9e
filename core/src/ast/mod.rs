//! Syntax tree consumed by the back end.
//!
//! The front end builds these nodes; resolution then fills in the `offset`,
//! `entry` and `binding` fields in place, turning the tree into the enriched
//! form that type checking and code generation read.

#[allow(clippy::module_inception)]
mod ast;
mod build;
mod entry;

pub use ast::*;
pub use entry::{Binding, Entry, EntryRef, MethodBinding};
