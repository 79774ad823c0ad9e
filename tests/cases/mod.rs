#![allow(dead_code)]

use fool::ast::Program;
use fool::vm::Execution;
use fool::{Compiled, Error, compile};

/// Compile and run a program that must be free of errors.
pub fn run(mut program: Program) -> (Compiled, Execution) {
    let compiled = match compile(&mut program) {
        Ok(compiled) => compiled,
        Err(err) => panic!("compilation failed: {err}\n{:#?}", err.diagnostics()),
    };
    let execution = compiled
        .run()
        .unwrap_or_else(|err| panic!("execution failed: {err}\n{}", compiled.code));
    (compiled, execution)
}

/// Compile a program that must fail, returning the error codes in order.
pub fn error_codes(mut program: Program) -> (Error, Vec<String>) {
    let err = match compile(&mut program) {
        Ok(compiled) => panic!("expected errors, got code:\n{}", compiled.code),
        Err(err) => err,
    };
    let codes = err
        .diagnostics()
        .iter()
        .filter_map(|d| d.code.clone())
        .collect();
    (err, codes)
}

/// Declares a test that compiles and runs `program`, then checks the body
/// type, the printed values and the value left on top of the stack.
#[allow(unused_macros)]
macro_rules! test_case {
    (
        $name:ident,
        program: $program:expr,
        $(ty: $ty:expr,)?
        $(output: $output:expr,)?
        $(top: $top:expr,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_variables)]
            let (compiled, execution) = crate::cases::run($program);
            $( ::pretty_assertions::assert_eq!(compiled.ty, $ty, "body type"); )?
            $( ::pretty_assertions::assert_eq!(execution.output, $output, "printed values"); )?
            $( ::pretty_assertions::assert_eq!(execution.top(), $top, "top of stack"); )?
        }
    };
}
