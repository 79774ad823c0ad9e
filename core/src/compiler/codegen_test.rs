use super::*;
use crate::analyzer::analyze;
use crate::ast::{ClassDecl, Declaration, Expr, FieldDecl, FunDecl, MethodDecl, Param, Program, VarDecl};
use crate::resolver::resolve;
use crate::test_utils::init_test_logging;
use crate::types::Type;
use crate::vm::{Code, Execution, Instruction, VM};
use pretty_assertions::assert_eq;

/// Resolve, type check and generate; both earlier passes must succeed.
fn compile(mut program: Program) -> Code {
    init_test_logging();
    resolve(&mut program).expect("resolution should succeed");
    analyze(&program).expect("type checking should succeed");
    generate(&program, &CodegenOptions::default()).expect("code generation should succeed")
}

fn run(program: Program) -> Execution {
    let code = compile(program);
    VM::execute(&code).unwrap_or_else(|err| panic!("execution failed: {err}\n{code}"))
}

fn listing(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

fn var(name: &str, ty: Type, init: Expr) -> Declaration {
    VarDecl::new(name, ty, init).into()
}

fn int_param(name: &str) -> Param {
    Param::new(name, Type::Int)
}

// ============================================================================
// Exact code shapes
// ============================================================================

#[test]
fn test_let_form_starts_with_placeholder() {
    let program = Program::let_in(
        vec![],
        vec![var("x", Type::Int, Expr::int(5))],
        Expr::plus(Expr::ident("x"), Expr::int(1)),
    );
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 0", "push 5", "lfp", "push -2", "add", "lw", "push 1", "add", "halt",
        ])
    );
}

#[test]
fn test_bare_form_has_no_placeholder() {
    let program = Program::body(Expr::print(Expr::null()));
    assert_eq!(
        compile(program).to_string(),
        listing(&["push -1", "print", "halt"])
    );
}

#[test]
fn test_function_block_is_hoisted() {
    let fun = FunDecl::new(
        "inc",
        Type::Int,
        vec![int_param("n")],
        Expr::plus(Expr::ident("n"), Expr::int(1)),
    );
    let program = Program::let_in(
        vec![],
        vec![fun.into()],
        Expr::call("inc", vec![Expr::int(41)]),
    );
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 0",
            "push function0",
            // call
            "lfp", "push 41", "lfp", "stm", "ltm", "ltm", "push -2", "add", "lw", "js",
            "halt",
            // hoisted body
            "function0:",
            "cfp", "lra",
            "lfp", "push 1", "add", "lw", "push 1", "add",
            "stm", "sra", "pop", "pop", "sfp", "ltm", "lra", "js",
        ])
    );
}

#[test]
fn test_and_shape() {
    let program = Program::body(Expr::print(Expr::and(Expr::bool(true), Expr::bool(false))));
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 1", "push 0", "beq label0",
            "push 0", "push 0", "beq label0",
            "push 1", "b label1",
            "label0:", "push 0",
            "label1:",
            "print", "halt",
        ])
    );
}

#[test]
fn test_or_shape() {
    let program = Program::body(Expr::or(Expr::bool(false), Expr::bool(true)));
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 0", "push 0", "beq label0", "b label1",
            "label0:", "push 1", "push 0", "beq label2",
            "label1:", "push 1", "b label3",
            "label2:", "push 0",
            "label3:",
            "halt",
        ])
    );
}

#[test]
fn test_if_and_ge_shapes() {
    let program = Program::body(Expr::if_(
        Expr::greater_eq(Expr::int(1), Expr::int(2)),
        Expr::int(10),
        Expr::int(20),
    ));
    // The conditional takes label0 and label1 before its condition is compiled.
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 2", "push 1", "sub", "push 0", "bleq label2",
            "push 0", "b label3",
            "label2:", "push 1",
            "label3:",
            "push 1", "beq label0",
            "push 20", "b label1",
            "label0:", "push 10",
            "label1:",
            "halt",
        ])
    );
}

#[test]
fn test_dispatch_tables_share_slots() {
    let classes = vec![
        ClassDecl::new("A").method(MethodDecl::new("m", Type::Int, vec![], Expr::int(1))),
        ClassDecl::new("B")
            .extends("A")
            .method(MethodDecl::new("m", Type::Int, vec![], Expr::int(2)))
            .method(MethodDecl::new("n", Type::Int, vec![], Expr::int(3))),
        ClassDecl::new("C").extends("A"),
    ];
    let code = compile(Program::let_in(classes, vec![], Expr::int(0)));
    let store = ["lhp", "sw", "lhp", "push 1", "add", "shp"];

    let mut expected = vec!["push 0"];
    // A: [A.m]
    expected.extend(["lhp", "push function0"]);
    expected.extend(store);
    // B: [B.m, B.n]
    expected.extend(["lhp", "push function1"]);
    expected.extend(store);
    expected.extend(["push function2"]);
    expected.extend(store);
    // C: [A.m]
    expected.extend(["lhp", "push function0"]);
    expected.extend(store);
    expected.extend(["push 0", "halt"]);

    let text = code.to_string();
    assert!(
        text.starts_with(&listing(&expected)),
        "unexpected class code:\n{text}"
    );
}

#[test]
fn test_new_stores_fields_then_dispatch_pointer() {
    let classes = vec![ClassDecl::new("P")
        .field(FieldDecl::new("x", Type::Int))
        .field(FieldDecl::new("y", Type::Int))];
    let program = Program::let_in(
        classes,
        vec![],
        Expr::new_object("P", vec![Expr::int(3), Expr::int(4)]),
    );
    assert_eq!(
        compile(program).to_string(),
        listing(&[
            "push 0",
            "lhp",
            "push 3", "push 4",
            "lhp", "sw", "lhp", "push 1", "add", "shp",
            "lhp", "sw", "lhp", "push 1", "add", "shp",
            "push 10000", "push -2", "add", "lw",
            "lhp", "sw", "lhp",
            "lhp", "push 1", "add", "shp",
            "halt",
        ])
    );
}

#[test]
fn test_memory_size_option_moves_class_directory() {
    let mut program = Program::let_in(
        vec![ClassDecl::new("A")],
        vec![],
        Expr::new_object("A", vec![]),
    );
    resolve(&mut program).unwrap();
    let code = generate(&program, &CodegenOptions { memory_size: 64 }).unwrap();
    assert_eq!(code.count(&Instruction::push(64)), 1);
    assert_eq!(code.count(&Instruction::push(10000)), 0);
}

#[test]
fn test_labels_are_unique_and_defined() {
    let fun = FunDecl::new(
        "f",
        Type::Bool,
        vec![int_param("a")],
        Expr::or(
            Expr::less_eq(Expr::ident("a"), Expr::int(0)),
            Expr::equal(Expr::ident("a"), Expr::int(5)),
        ),
    );
    let body = Expr::and(
        Expr::call("f", vec![Expr::int(5)]),
        Expr::negate(Expr::call("f", vec![Expr::int(1)])),
    );
    let code = compile(Program::let_in(vec![], vec![fun.into()], body));
    assert_eq!(code.validate(), Ok(()));
    assert_eq!(code.count(&Instruction::Halt), 1);
}

#[test]
fn test_unbound_use_is_an_error() {
    let program = Program::body(Expr::ident("x").at(3));
    assert_eq!(
        generate(&program, &CodegenOptions::default()),
        Err(CompileError::Unbound {
            name: "x".into(),
            line: 3,
        })
    );
}

// ============================================================================
// Behavior on the reference machine
// ============================================================================

#[test]
fn test_operators_evaluate() {
    let program = Program::body(Expr::print(Expr::divide(
        Expr::times(Expr::minus(Expr::int(10), Expr::int(4)), Expr::int(7)),
        Expr::int(2),
    )));
    assert_eq!(run(program).output, vec![21]);

    for (expr, expected) in [
        (Expr::greater_eq(Expr::int(3), Expr::int(2)), 1),
        (Expr::greater_eq(Expr::int(2), Expr::int(3)), 0),
        (Expr::greater_eq(Expr::int(3), Expr::int(3)), 1),
        (Expr::less_eq(Expr::int(3), Expr::int(2)), 0),
        (Expr::equal(Expr::int(4), Expr::int(4)), 1),
        (Expr::negate(Expr::bool(false)), 1),
        (Expr::negate(Expr::bool(true)), 0),
        (Expr::or(Expr::bool(false), Expr::bool(false)), 0),
        (Expr::if_(Expr::bool(false), Expr::int(1), Expr::int(2)), 2),
    ] {
        assert_eq!(run(Program::body(expr)).top(), Some(expected));
    }
}

#[test]
fn test_short_circuit_skips_right_operand() {
    let and = Expr::and(Expr::bool(false), Expr::print(Expr::bool(true)));
    assert_eq!(run(Program::body(and)).output, Vec::<i64>::new());

    let or = Expr::or(Expr::bool(true), Expr::print(Expr::bool(false)));
    assert_eq!(run(Program::body(or)).output, Vec::<i64>::new());

    let evaluated = Expr::and(Expr::bool(true), Expr::print(Expr::bool(true)));
    assert_eq!(run(Program::body(evaluated)).output, vec![1]);
}

#[test]
fn test_recursive_function() {
    let fact = FunDecl::new(
        "fact",
        Type::Int,
        vec![int_param("n")],
        Expr::if_(
            Expr::less_eq(Expr::ident("n"), Expr::int(1)),
            Expr::int(1),
            Expr::times(
                Expr::ident("n"),
                Expr::call("fact", vec![Expr::minus(Expr::ident("n"), Expr::int(1))]),
            ),
        ),
    );
    let program = Program::let_in(vec![], vec![fact.into()], Expr::call("fact", vec![Expr::int(5)]));
    assert_eq!(run(program).top(), Some(120));
}

#[test]
fn test_nested_function_reaches_enclosing_frame() {
    let inner = FunDecl::new(
        "inner",
        Type::Int,
        vec![int_param("c")],
        Expr::plus(Expr::ident("c"), Expr::ident("b")),
    );
    let outer = FunDecl::new(
        "outer",
        Type::Int,
        vec![int_param("a"), int_param("k")],
        Expr::minus(Expr::call("inner", vec![Expr::int(1)]), Expr::ident("k")),
    )
    .with_declarations(vec![
        var("b", Type::Int, Expr::times(Expr::ident("a"), Expr::int(2))),
        inner.into(),
    ]);
    let program = Program::let_in(
        vec![],
        vec![outer.into()],
        Expr::print(Expr::call("outer", vec![Expr::int(5), Expr::int(3)])),
    );
    assert_eq!(run(program).output, vec![8]);
}

#[test]
fn test_fields_are_read_through_the_object() {
    let point = ClassDecl::new("P")
        .field(FieldDecl::new("x", Type::Int))
        .field(FieldDecl::new("y", Type::Int))
        .method(MethodDecl::new(
            "diff",
            Type::Int,
            vec![],
            Expr::minus(Expr::ident("x"), Expr::ident("y")),
        ));
    let program = Program::let_in(
        vec![point],
        vec![var(
            "p",
            Type::class_ref("P"),
            Expr::new_object("P", vec![Expr::int(10), Expr::int(4)]),
        )],
        Expr::method_call("p", "diff", vec![]),
    );
    assert_eq!(run(program).top(), Some(6));
}

#[test]
fn test_override_dispatches_on_dynamic_class() {
    let classes = vec![
        ClassDecl::new("A").method(MethodDecl::new("m", Type::Int, vec![int_param("x")], Expr::ident("x"))),
        ClassDecl::new("B").extends("A").method(MethodDecl::new(
            "m",
            Type::Int,
            vec![int_param("x")],
            Expr::plus(Expr::ident("x"), Expr::int(1)),
        )),
    ];
    let program = Program::let_in(
        classes,
        vec![
            var("a", Type::class_ref("A"), Expr::new_object("B", vec![])),
            var("plain", Type::class_ref("A"), Expr::new_object("A", vec![])),
        ],
        Expr::minus(
            Expr::method_call("a", "m", vec![Expr::int(5)]),
            Expr::method_call("plain", "m", vec![Expr::int(5)]),
        ),
    );
    assert_eq!(run(program).top(), Some(1));
}

#[test]
fn test_method_calls_sibling_method() {
    let counter = ClassDecl::new("C")
        .field(FieldDecl::new("step", Type::Int))
        .method(MethodDecl::new("one", Type::Int, vec![], Expr::ident("step")))
        .method(MethodDecl::new(
            "two",
            Type::Int,
            vec![int_param("extra")],
            Expr::plus(
                Expr::plus(Expr::call("one", vec![]), Expr::call("one", vec![])),
                Expr::ident("extra"),
            ),
        ));
    let program = Program::let_in(
        vec![counter],
        vec![var("c", Type::class_ref("C"), Expr::new_object("C", vec![Expr::int(3)]))],
        Expr::print(Expr::method_call("c", "two", vec![Expr::int(100)])),
    );
    assert_eq!(run(program).output, vec![106]);
}

#[test]
fn test_redeclared_variable_reads_last_value() {
    let mut program = Program::let_in(
        vec![],
        vec![var("x", Type::Int, Expr::int(1)), var("x", Type::Int, Expr::int(2))],
        Expr::ident("x"),
    );
    init_test_logging();
    assert_eq!(resolve(&mut program).map_err(|errors| errors.len()), Err(1));
    let code = generate(&program, &CodegenOptions::default()).unwrap();
    assert_eq!(VM::execute(&code).unwrap().top(), Some(2));
}
