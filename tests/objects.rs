#[macro_use]
mod cases;

use fool::ast::{ClassDecl, Declaration, Expr, FieldDecl, FunDecl, MethodDecl, Param, Program, VarDecl};
use fool::types::Type;

fn var(name: &str, class: &str, init: Expr) -> Declaration {
    VarDecl::new(name, Type::class_ref(class), init).into()
}

fn shapes() -> Vec<ClassDecl> {
    vec![
        ClassDecl::new("Shape")
            .field(FieldDecl::new("size", Type::Int))
            .method(MethodDecl::new("area", Type::Int, vec![], Expr::int(0)))
            .method(MethodDecl::new(
                "twice",
                Type::Int,
                vec![],
                Expr::times(Expr::call("area", vec![]), Expr::int(2)),
            )),
        ClassDecl::new("Square").extends("Shape").method(MethodDecl::new(
            "area",
            Type::Int,
            vec![],
            Expr::times(Expr::ident("size"), Expr::ident("size")),
        )),
        ClassDecl::new("Cube")
            .extends("Square")
            .method(MethodDecl::new(
                "volume",
                Type::Int,
                vec![],
                Expr::times(Expr::call("area", vec![]), Expr::ident("size")),
            )),
    ]
}

test_case!(
    inherited_method_uses_overriding_slot,
    program: Program::let_in(
        shapes(),
        vec![var("s", "Shape", Expr::new_object("Square", vec![Expr::int(3)]))],
        Expr::method_call("s", "twice", vec![]),
    ),
    top: Some(18),
);

test_case!(
    base_implementation_when_not_overridden,
    program: Program::let_in(
        shapes(),
        vec![var("s", "Shape", Expr::new_object("Shape", vec![Expr::int(3)]))],
        Expr::method_call("s", "twice", vec![]),
    ),
    top: Some(0),
);

test_case!(
    grandchild_inherits_override_and_adds_method,
    program: Program::let_in(
        shapes(),
        vec![var("c", "Cube", Expr::new_object("Cube", vec![Expr::int(2)]))],
        Expr::print(Expr::plus(
            Expr::method_call("c", "volume", vec![]),
            Expr::method_call("c", "area", vec![]),
        )),
    ),
    output: vec![12],
);

test_case!(
    field_override_keeps_position,
    program: Program::let_in(
        vec![
            ClassDecl::new("Pair")
                .field(FieldDecl::new("first", Type::Int))
                .field(FieldDecl::new("second", Type::Int))
                .method(MethodDecl::new("first_of", Type::Int, vec![], Expr::ident("first"))),
            ClassDecl::new("Flagged")
                .extends("Pair")
                .field(FieldDecl::new("first", Type::Bool))
                .field(FieldDecl::new("flag", Type::Bool))
                .method(MethodDecl::new("second_of", Type::Int, vec![], Expr::ident("second"))),
        ],
        vec![var(
            "p",
            "Flagged",
            Expr::new_object("Flagged", vec![Expr::bool(true), Expr::int(7), Expr::bool(false)]),
        )],
        Expr::print(Expr::plus(
            Expr::method_call("p", "first_of", vec![]),
            Expr::method_call("p", "second_of", vec![]),
        )),
    ),
    output: vec![8],
);

fn list() -> ClassDecl {
    ClassDecl::new("Node")
        .field(FieldDecl::new("value", Type::Int))
        .field(FieldDecl::new("next", Type::class_ref("Node")))
        .method(MethodDecl::new(
            "sum",
            Type::Int,
            vec![],
            Expr::if_(
                Expr::equal(Expr::ident("next"), Expr::null()),
                Expr::ident("value"),
                Expr::plus(Expr::ident("value"), Expr::method_call("next", "sum", vec![])),
            ),
        ))
}

fn node(value: i64, next: Expr) -> Expr {
    Expr::new_object("Node", vec![Expr::int(value), next])
}

test_case!(
    recursive_structure_through_fields,
    program: Program::let_in(
        vec![list()],
        vec![var("l", "Node", node(1, node(2, node(3, Expr::null()))))],
        Expr::method_call("l", "sum", vec![]),
    ),
    ty: Some(Type::Int),
    top: Some(6),
);

test_case!(
    object_passed_to_function,
    program: Program::let_in(
        shapes(),
        vec![
            FunDecl::new(
                "measure",
                Type::Int,
                vec![Param::new("s", Type::class_ref("Shape"))],
                Expr::method_call("s", "area", vec![]),
            )
            .into(),
            var("sq", "Square", Expr::new_object("Square", vec![Expr::int(4)])),
        ],
        Expr::print(Expr::call("measure", vec![Expr::ident("sq")])),
    ),
    output: vec![16],
);

test_case!(
    method_with_parameters_and_locals,
    program: Program::let_in(
        vec![ClassDecl::new("Acc").field(FieldDecl::new("base", Type::Int)).method(
            MethodDecl::new(
                "add",
                Type::Int,
                vec![Param::new("a", Type::Int), Param::new("b", Type::Int)],
                Expr::plus(Expr::ident("base"), Expr::ident("doubled")),
            )
            .with_declarations(vec![VarDecl::new(
                "doubled",
                Type::Int,
                Expr::times(Expr::minus(Expr::ident("a"), Expr::ident("b")), Expr::int(2)),
            )
            .into()]),
        )],
        vec![var("acc", "Acc", Expr::new_object("Acc", vec![Expr::int(100)]))],
        Expr::method_call("acc", "add", vec![Expr::int(10), Expr::int(3)]),
    ),
    top: Some(114),
);

test_case!(
    null_object_and_join,
    program: Program::let_in(
        shapes(),
        vec![
            var("none", "Shape", Expr::null()),
            var(
                "some",
                "Shape",
                Expr::if_(
                    Expr::equal(Expr::ident("none"), Expr::null()),
                    Expr::new_object("Square", vec![Expr::int(5)]),
                    Expr::new_object("Shape", vec![Expr::int(0)]),
                ),
            ),
        ],
        Expr::method_call("some", "area", vec![]),
    ),
    top: Some(25),
);
