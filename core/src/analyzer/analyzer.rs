use crate::analyzer::error::{CheckError, TypeError, TypeErrorKind};
use crate::ast::{ClassDecl, Declaration, Expr, ExprKind, FunDecl, MethodDecl, Program, VarDecl};
use crate::types::{ArrowType, ClassHierarchy, ClassType, Type};

type CheckResult<T> = Result<T, CheckError>;

/// Type check a resolved program.
///
/// Errors inside declarations are recovered: they are collected and checking
/// moves on to the next declaration. An error in the program body is fatal.
/// Returns the body's type, or `None` when the body could not be typed
/// because resolution left a binding unset.
pub fn analyze(program: &Program) -> Result<Option<Type>, Vec<TypeError>> {
    let mut analyzer = Analyzer::new(hierarchy_of(program));
    tracing::debug!("Type checking program");
    let body = analyzer.check_program(program);
    match body {
        Err(CheckError::Type(err)) => {
            analyzer.record(err);
            Err(analyzer.errors)
        }
        _ if !analyzer.errors.is_empty() => Err(analyzer.errors),
        Ok(ty) => Ok(Some(ty)),
        Err(CheckError::Incomplete) => Ok(None),
    }
}

/// Superclass edges of every class whose superclass was resolved.
pub fn hierarchy_of(program: &Program) -> ClassHierarchy {
    let mut hierarchy = ClassHierarchy::new();
    if let Program::LetIn { classes, .. } = program {
        for class in classes {
            if let (Some(superclass), Some(_)) = (&class.superclass, &class.super_entry) {
                hierarchy.add_edge(class.name.as_str(), superclass.as_str());
            }
        }
    }
    hierarchy
}

struct Analyzer {
    hierarchy: ClassHierarchy,
    errors: Vec<TypeError>,
}

impl Analyzer {
    fn new(hierarchy: ClassHierarchy) -> Self {
        Self {
            hierarchy,
            errors: Vec::new(),
        }
    }

    fn record(&mut self, err: TypeError) {
        tracing::warn!(line = err.line, "Type checking error: {}", err.kind);
        self.errors.push(err);
    }

    fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        self.hierarchy.is_subtype(a, b)
    }

    /// Declaration-list boundary: type errors are recorded, incomplete
    /// declarations are skipped silently.
    fn recover(&mut self, result: CheckResult<()>) {
        match result {
            Ok(()) => {}
            Err(CheckError::Incomplete) => tracing::trace!("Skipping incomplete declaration"),
            Err(CheckError::Type(err)) => self.record(err),
        }
    }

    fn check_program(&mut self, program: &Program) -> CheckResult<Type> {
        match program {
            Program::LetIn {
                classes,
                declarations,
                body,
            } => {
                for class in classes {
                    self.check_class(class);
                }
                self.check_declarations(declarations);
                self.check_expr(body)
            }
            Program::Body(body) => self.check_expr(body),
        }
    }

    fn check_declarations(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            let result = match declaration {
                Declaration::Var(var) => self.check_var(var),
                Declaration::Fun(fun) => self.check_fun(fun),
            };
            self.recover(result);
        }
    }

    fn check_var(&mut self, var: &VarDecl) -> CheckResult<()> {
        let found = self.check_expr(&var.init)?;
        if !self.is_subtype(&found, &var.ty) {
            return Err(TypeError::new(
                TypeErrorKind::IncompatibleValue {
                    name: var.name.clone(),
                    expected: var.ty.clone(),
                    found,
                },
                var.line,
            )
            .into());
        }
        Ok(())
    }

    fn check_fun(&mut self, fun: &FunDecl) -> CheckResult<()> {
        tracing::trace!(name = %fun.name, "Checking function");
        self.check_declarations(&fun.declarations);
        self.check_return(&fun.name, &fun.body, &fun.ret, fun.line)
    }

    fn check_method(&mut self, method: &MethodDecl) -> CheckResult<()> {
        tracing::trace!(name = %method.name, "Checking method");
        self.check_declarations(&method.declarations);
        self.check_return(&method.name, &method.body, &method.ret, method.line)
    }

    fn check_return(&mut self, name: &str, body: &Expr, ret: &Type, line: u32) -> CheckResult<()> {
        let found = self.check_expr(body)?;
        if !self.is_subtype(&found, ret) {
            return Err(TypeError::new(
                TypeErrorKind::WrongReturnType {
                    name: name.to_string(),
                    expected: ret.clone(),
                    found,
                },
                line,
            )
            .into());
        }
        Ok(())
    }

    /// Overrides must be safe, then every method body is checked on its own.
    fn check_class(&mut self, class: &ClassDecl) {
        tracing::trace!(name = %class.name, "Checking class");
        let result = self.check_overrides(class);
        self.recover(result);
        for method in &class.methods {
            let result = self.check_method(method);
            self.recover(result);
        }
    }

    fn check_overrides(&mut self, class: &ClassDecl) -> CheckResult<()> {
        let Some(super_entry) = &class.super_entry else {
            return Ok(());
        };
        let shape = class_shape(class.entry.as_ref().map(|e| &e.ty)).ok_or(CheckError::Incomplete)?;
        let inherited = class_shape(Some(&super_entry.ty)).ok_or(CheckError::Incomplete)?;

        for (index, (expected, found)) in inherited.fields.iter().zip(&shape.fields).enumerate() {
            if !self.is_subtype(found, expected) {
                return Err(TypeError::new(
                    TypeErrorKind::UnsafeFieldOverride {
                        class: class.name.clone(),
                        index,
                        expected: expected.clone(),
                        found: found.clone(),
                    },
                    class.line,
                )
                .into());
            }
        }
        for (index, (expected, found)) in inherited.methods.iter().zip(&shape.methods).enumerate() {
            if !self.hierarchy.is_arrow_subtype(found, expected) {
                return Err(TypeError::new(
                    TypeErrorKind::UnsafeMethodOverride {
                        class: class.name.clone(),
                        index,
                        expected: Type::Arrow(expected.clone()),
                        found: Type::Arrow(found.clone()),
                    },
                    class.line,
                )
                .into());
            }
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> CheckResult<Type> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Int(_) => Ok(Type::Int),
            ExprKind::Bool(_) => Ok(Type::Bool),
            ExprKind::Null => Ok(Type::Empty),
            ExprKind::Binary { op, left, right } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                if self.is_subtype(&left, &Type::Int) && self.is_subtype(&right, &Type::Int) {
                    Ok(Type::Int)
                } else {
                    Err(TypeError::new(
                        TypeErrorKind::NonIntegerOperands {
                            op: op.to_string(),
                            left,
                            right,
                        },
                        line,
                    )
                    .into())
                }
            }
            ExprKind::Comparison { op, left, right } => {
                self.check_comparable(&op.to_string(), left, right, line)
            }
            ExprKind::Boolean { op, left, right } => {
                self.check_comparable(&op.to_string(), left, right, line)
            }
            ExprKind::Not(operand) => {
                let found = self.check_expr(operand)?;
                if self.is_subtype(&found, &Type::Int) {
                    Ok(Type::Bool)
                } else {
                    Err(TypeError::new(TypeErrorKind::NonIntegerNegation { found }, line).into())
                }
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let found = self.check_expr(cond)?;
                if !self.is_subtype(&found, &Type::Bool) {
                    return Err(
                        TypeError::new(TypeErrorKind::NonBooleanCondition { found }, line).into(),
                    );
                }
                let then_type = self.check_expr(then_branch)?;
                let else_type = self.check_expr(else_branch)?;
                self.hierarchy.join(&then_type, &else_type).ok_or_else(|| {
                    TypeError::new(
                        TypeErrorKind::IncompatibleBranches {
                            then_type,
                            else_type,
                        },
                        line,
                    )
                    .into()
                })
            }
            ExprKind::Print(operand) => self.check_expr(operand),
            ExprKind::Ident { name, binding } => {
                let binding = binding.as_ref().ok_or(CheckError::Incomplete)?;
                match &binding.entry.ty {
                    Type::Arrow(_) | Type::Method(_) => Err(TypeError::new(
                        TypeErrorKind::FunctionAsValue { name: name.clone() },
                        line,
                    )
                    .into()),
                    Type::Class(_) => Err(TypeError::new(
                        TypeErrorKind::ClassAsValue { name: name.clone() },
                        line,
                    )
                    .into()),
                    ty => Ok(ty.clone()),
                }
            }
            ExprKind::Call {
                name,
                args,
                binding,
            } => {
                let binding = binding.as_ref().ok_or(CheckError::Incomplete)?;
                let Some(signature) = binding.entry.ty.as_callable() else {
                    return Err(TypeError::new(
                        TypeErrorKind::NotCallable {
                            name: name.clone(),
                            found: binding.entry.ty.clone(),
                        },
                        line,
                    )
                    .into());
                };
                self.check_arguments(name, signature, args, line)
            }
            ExprKind::MethodCall {
                method,
                args,
                binding,
                ..
            } => {
                let binding = binding.as_ref().ok_or(CheckError::Incomplete)?;
                let Type::Method(signature) = &binding.method.ty else {
                    return Err(TypeError::new(
                        TypeErrorKind::NotCallable {
                            name: method.clone(),
                            found: binding.method.ty.clone(),
                        },
                        line,
                    )
                    .into());
                };
                self.check_arguments(method, signature, args, line)
            }
            ExprKind::New {
                class,
                args,
                class_entry,
            } => {
                let entry = class_entry.as_ref().ok_or(CheckError::Incomplete)?;
                let Type::Class(shape) = &entry.ty else {
                    return Err(
                        TypeError::new(TypeErrorKind::NotAClass { name: class.clone() }, line)
                            .into(),
                    );
                };
                let constructor = ArrowType::new(shape.fields.clone(), Type::class_ref(class.as_str()));
                self.check_arguments(class, &constructor, args, line)
            }
        }
    }

    /// Comparisons and boolean connectives: operands must be comparable in
    /// either direction.
    fn check_comparable(&mut self, op: &str, left: &Expr, right: &Expr, line: u32) -> CheckResult<Type> {
        let left = self.check_expr(left)?;
        let right = self.check_expr(right)?;
        if self.hierarchy.are_comparable(&left, &right) {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(
                TypeErrorKind::IncomparableOperands {
                    op: op.to_string(),
                    left,
                    right,
                },
                line,
            )
            .into())
        }
    }

    /// Count and types of the arguments against `signature`; yields its
    /// return type.
    fn check_arguments(
        &mut self,
        name: &str,
        signature: &ArrowType,
        args: &[Expr],
        line: u32,
    ) -> CheckResult<Type> {
        if signature.arity() != args.len() {
            return Err(TypeError::new(
                TypeErrorKind::ArityMismatch {
                    name: name.to_string(),
                    expected: signature.arity(),
                    found: args.len(),
                },
                line,
            )
            .into());
        }
        for (position, (arg, expected)) in args.iter().zip(&signature.params).enumerate() {
            let found = self.check_expr(arg)?;
            if !self.is_subtype(&found, expected) {
                return Err(TypeError::new(
                    TypeErrorKind::WrongArgumentType {
                        name: name.to_string(),
                        position: position + 1,
                        expected: expected.clone(),
                        found,
                    },
                    line,
                )
                .into());
            }
        }
        Ok((*signature.ret).clone())
    }
}

fn class_shape(ty: Option<&Type>) -> Option<&ClassType> {
    match ty {
        Some(Type::Class(shape)) => Some(shape),
        _ => None,
    }
}
