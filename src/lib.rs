//! FOOL - compiler back end for a small object-oriented language
//!
//! # Overview
//!
//! FOOL programs are expressions preceded by optional class and
//! declaration blocks. Classes support fields, methods, single inheritance
//! and virtual dispatch; types are checked with nominal subtyping.
//!
//! This crate takes a tree built by a front end, resolves its names, type
//! checks it and generates code for a small stack machine. A reference
//! interpreter of that machine is included.
//!
//! # Quick Start
//!
//! ```
//! use fool::ast::{Expr, Program};
//! use fool::compile;
//!
//! let mut program = Program::body(Expr::print(Expr::and(Expr::bool(true), Expr::bool(false))));
//! let compiled = compile(&mut program).unwrap();
//! assert_eq!(compiled.run().unwrap().output, vec![0]);
//! ```

pub use fool_core::{analyzer, api, ast, compiler, resolver, types, vm};

pub use fool_core::api::{
    compile, compile_with, Compiled, Diagnostic, EngineOptions, Error, Severity,
};
