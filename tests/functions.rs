#[macro_use]
mod cases;

use fool::ast::{Declaration, Expr, FunDecl, Param, Program, VarDecl};
use fool::types::Type;

fn int(name: &str) -> Param {
    Param::new(name, Type::Int)
}

fn var(name: &str, init: Expr) -> Declaration {
    VarDecl::new(name, Type::Int, init).into()
}

fn fib() -> Declaration {
    FunDecl::new(
        "fib",
        Type::Int,
        vec![int("n")],
        Expr::if_(
            Expr::less_eq(Expr::ident("n"), Expr::int(1)),
            Expr::ident("n"),
            Expr::plus(
                Expr::call("fib", vec![Expr::minus(Expr::ident("n"), Expr::int(1))]),
                Expr::call("fib", vec![Expr::minus(Expr::ident("n"), Expr::int(2))]),
            ),
        ),
    )
    .into()
}

test_case!(
    recursive_calls,
    program: Program::let_in(vec![], vec![fib()], Expr::call("fib", vec![Expr::int(10)])),
    ty: Some(Type::Int),
    top: Some(55),
);

test_case!(
    arguments_keep_textual_order,
    program: Program::let_in(
        vec![],
        vec![FunDecl::new(
            "sub3",
            Type::Int,
            vec![int("a"), int("b"), int("c")],
            Expr::minus(Expr::minus(Expr::ident("a"), Expr::ident("b")), Expr::ident("c")),
        )
        .into()],
        Expr::call("sub3", vec![Expr::int(100), Expr::int(30), Expr::int(5)]),
    ),
    top: Some(65),
);

test_case!(
    globals_visible_from_function_body,
    program: Program::let_in(
        vec![],
        vec![
            var("offset", Expr::int(1000)),
            FunDecl::new(
                "shift",
                Type::Int,
                vec![int("n")],
                Expr::plus(Expr::ident("n"), Expr::ident("offset")),
            )
            .into(),
        ],
        Expr::call("shift", vec![Expr::int(7)]),
    ),
    top: Some(1007),
);

test_case!(
    nested_functions_follow_access_links,
    program: Program::let_in(
        vec![],
        vec![
            var("g", Expr::int(1)),
            FunDecl::new(
                "outer",
                Type::Int,
                vec![int("a")],
                Expr::call("middle", vec![Expr::int(10)]),
            )
            .with_declarations(vec![
                var("local", Expr::times(Expr::ident("a"), Expr::int(100))),
                FunDecl::new(
                    "middle",
                    Type::Int,
                    vec![int("b")],
                    Expr::call("inner", vec![Expr::ident("b")]),
                )
                .with_declarations(vec![FunDecl::new(
                    "inner",
                    Type::Int,
                    vec![int("c")],
                    Expr::plus(
                        Expr::plus(Expr::ident("c"), Expr::ident("local")),
                        Expr::plus(Expr::ident("a"), Expr::ident("g")),
                    ),
                )
                .into()])
                .into(),
            ])
            .into(),
        ],
        Expr::print(Expr::call("outer", vec![Expr::int(3)])),
    ),
    output: vec![314],
);

test_case!(
    inner_declaration_shadows_global,
    program: Program::let_in(
        vec![],
        vec![
            var("x", Expr::int(1)),
            FunDecl::new("f", Type::Int, vec![], Expr::ident("x"))
                .with_declarations(vec![var("x", Expr::int(2))])
                .into(),
        ],
        Expr::plus(Expr::times(Expr::call("f", vec![]), Expr::int(10)), Expr::ident("x")),
    ),
    top: Some(21),
);

test_case!(
    print_is_an_expression,
    program: Program::let_in(
        vec![],
        vec![var("x", Expr::print(Expr::int(4)))],
        Expr::print(Expr::times(Expr::ident("x"), Expr::print(Expr::int(5)))),
    ),
    output: vec![4, 5, 20],
    top: Some(20),
);

test_case!(
    boolean_function_in_condition,
    program: Program::let_in(
        vec![],
        vec![FunDecl::new(
            "between",
            Type::Bool,
            vec![int("lo"), int("x"), int("hi")],
            Expr::and(
                Expr::greater_eq(Expr::ident("x"), Expr::ident("lo")),
                Expr::less_eq(Expr::ident("x"), Expr::ident("hi")),
            ),
        )
        .into()],
        Expr::plus(
            Expr::if_(Expr::call("between", vec![Expr::int(1), Expr::int(5), Expr::int(9)]), Expr::int(10), Expr::int(0)),
            Expr::if_(Expr::call("between", vec![Expr::int(1), Expr::int(12), Expr::int(9)]), Expr::int(1), Expr::int(0)),
        ),
    ),
    top: Some(10),
);
