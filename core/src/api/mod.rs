//! Public API of the compiler.
//!
//! A front end builds a [`Program`](crate::ast::Program) and hands it to
//! [`compile`], which runs the three passes in order and converts the errors
//! of the first failing pass into [`Diagnostic`]s.
//!
//! # Example
//!
//! ```
//! use fool_core::api::compile;
//! use fool_core::ast::{Expr, Program, VarDecl};
//! use fool_core::types::Type;
//!
//! let mut program = Program::let_in(
//!     vec![],
//!     vec![VarDecl::new("x", Type::Int, Expr::int(5)).into()],
//!     Expr::plus(Expr::ident("x"), Expr::int(1)),
//! );
//! let compiled = compile(&mut program).unwrap();
//! assert_eq!(compiled.ty, Some(Type::Int));
//! assert_eq!(compiled.run().unwrap().top(), Some(6));
//! ```

pub mod engine;
pub mod error;
pub mod options;


pub use engine::{compile, compile_with, Compiled};
pub use error::{Diagnostic, Error, Severity};
pub use options::EngineOptions;
