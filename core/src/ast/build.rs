//! Constructors for building trees by hand.
//!
//! A parser front end produces the same shapes; tests use these directly:
//! ```ignore
//! let body = Expr::plus(Expr::ident("x"), Expr::int(1));
//! let program = Program::let_in(vec![], vec![VarDecl::new("x", Type::Int, Expr::int(5)).into()], body);
//! ```
//! Every node starts at line 0 and without resolution data; use `at` to set
//! a source line.

use crate::ast::ast::*;
use crate::types::Type;

impl Program {
    pub fn let_in(classes: Vec<ClassDecl>, declarations: Vec<Declaration>, body: Expr) -> Self {
        Program::LetIn {
            classes,
            declarations,
            body,
        }
    }

    pub fn body(body: Expr) -> Self {
        Program::Body(body)
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind, line: 0 }
    }

    /// Set the source line.
    pub fn at(mut self, line: Line) -> Self {
        self.line = line;
        self
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Bool(value))
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Null)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn plus(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn minus(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Sub, left, right)
    }

    pub fn times(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Mul, left, right)
    }

    pub fn divide(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Div, left, right)
    }

    pub fn comparison(op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn equal(left: Expr, right: Expr) -> Self {
        Self::comparison(ComparisonOp::Eq, left, right)
    }

    pub fn less_eq(left: Expr, right: Expr) -> Self {
        Self::comparison(ComparisonOp::Le, left, right)
    }

    pub fn greater_eq(left: Expr, right: Expr) -> Self {
        Self::comparison(ComparisonOp::Ge, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Boolean {
            op: BoolOp::And,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Boolean {
            op: BoolOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn negate(operand: Expr) -> Self {
        Self::new(ExprKind::Not(Box::new(operand)))
    }

    pub fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Self::new(ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn print(operand: Expr) -> Self {
        Self::new(ExprKind::Print(Box::new(operand)))
    }

    pub fn ident(name: &str) -> Self {
        Self::new(ExprKind::Ident {
            name: name.to_string(),
            binding: None,
        })
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            name: name.to_string(),
            args,
            binding: None,
        })
    }

    pub fn method_call(receiver: &str, method: &str, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::MethodCall {
            receiver: receiver.to_string(),
            method: method.to_string(),
            args,
            binding: None,
        })
    }

    pub fn new_object(class: &str, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::New {
            class: class.to_string(),
            args,
            class_entry: None,
        })
    }
}

impl VarDecl {
    pub fn new(name: &str, ty: Type, init: Expr) -> Self {
        VarDecl {
            name: name.to_string(),
            ty,
            init,
            line: 0,
            offset: None,
        }
    }

    pub fn at(mut self, line: Line) -> Self {
        self.line = line;
        self
    }
}

impl Param {
    pub fn new(name: &str, ty: Type) -> Self {
        Param {
            name: name.to_string(),
            ty,
            line: 0,
            offset: None,
        }
    }
}

impl FunDecl {
    pub fn new(name: &str, ret: Type, params: Vec<Param>, body: Expr) -> Self {
        FunDecl {
            name: name.to_string(),
            ret,
            params,
            declarations: Vec::new(),
            body,
            line: 0,
            offset: None,
        }
    }

    pub fn with_declarations(mut self, declarations: Vec<Declaration>) -> Self {
        self.declarations = declarations;
        self
    }

    pub fn at(mut self, line: Line) -> Self {
        self.line = line;
        self
    }
}

impl FieldDecl {
    pub fn new(name: &str, ty: Type) -> Self {
        FieldDecl {
            name: name.to_string(),
            ty,
            line: 0,
            offset: None,
        }
    }
}

impl MethodDecl {
    pub fn new(name: &str, ret: Type, params: Vec<Param>, body: Expr) -> Self {
        MethodDecl {
            name: name.to_string(),
            ret,
            params,
            declarations: Vec::new(),
            body,
            line: 0,
            offset: None,
        }
    }

    pub fn with_declarations(mut self, declarations: Vec<Declaration>) -> Self {
        self.declarations = declarations;
        self
    }

    pub fn at(mut self, line: Line) -> Self {
        self.line = line;
        self
    }
}

impl ClassDecl {
    pub fn new(name: &str) -> Self {
        ClassDecl {
            name: name.to_string(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
            line: 0,
            entry: None,
            super_entry: None,
        }
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn at(mut self, line: Line) -> Self {
        self.line = line;
        self
    }
}

impl From<VarDecl> for Declaration {
    fn from(var: VarDecl) -> Self {
        Declaration::Var(var)
    }
}

impl From<FunDecl> for Declaration {
    fn from(fun: FunDecl) -> Self {
        Declaration::Fun(fun)
    }
}
