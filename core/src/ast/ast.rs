use crate::ast::{Binding, EntryRef, MethodBinding};
use crate::types::{ArrowType, Type};

/// Source line a node was parsed from, used only for diagnostics.
pub type Line = u32;

#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    /// `let <classes> <declarations> in <body>`
    LetIn {
        classes: Vec<ClassDecl>,
        declarations: Vec<Declaration>,
        body: Expr,
    },
    /// A bare expression without declarations.
    Body(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Var(VarDecl),
    Fun(FunDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub init: Expr,
    pub line: Line,
    /// Frame offset, set by resolution.
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub line: Line,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunDecl {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Param>,
    pub declarations: Vec<Declaration>,
    pub body: Expr,
    pub line: Line,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub line: Line,
    /// Global entry of this class, set by resolution.
    pub entry: Option<EntryRef>,
    /// Global entry of the superclass, set by resolution.
    pub super_entry: Option<EntryRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub line: Line,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Param>,
    pub declarations: Vec<Declaration>,
    pub body: Expr,
    pub line: Line,
    /// Dispatch-table index, set by resolution.
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Bool(bool),
    Null,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Boolean {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Print(Box<Expr>),
    Ident {
        name: String,
        binding: Option<Binding>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        binding: Option<Binding>,
    },
    /// `receiver.method(args)`
    MethodCall {
        receiver: String,
        method: String,
        args: Vec<Expr>,
        binding: Option<MethodBinding>,
    },
    New {
        class: String,
        args: Vec<Expr>,
        class_entry: Option<EntryRef>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl FunDecl {
    pub fn arrow_type(&self) -> ArrowType {
        signature(&self.params, &self.ret)
    }
}

impl MethodDecl {
    pub fn arrow_type(&self) -> ArrowType {
        signature(&self.params, &self.ret)
    }
}

fn signature(params: &[Param], ret: &Type) -> ArrowType {
    ArrowType::new(params.iter().map(|p| p.ty.clone()).collect(), ret.clone())
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Var(var) => &var.name,
            Declaration::Fun(fun) => &fun.name,
        }
    }

    pub fn line(&self) -> Line {
        match self {
            Declaration::Var(var) => var.line,
            Declaration::Fun(fun) => fun.line,
        }
    }
}

impl core::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

impl core::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "=="),
            ComparisonOp::Le => write!(f, "<="),
            ComparisonOp::Ge => write!(f, ">="),
        }
    }
}

impl core::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoolOp::And => write!(f, "&&"),
            BoolOp::Or => write!(f, "||"),
        }
    }
}
