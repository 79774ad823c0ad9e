use hashbrown::HashSet;

use crate::ast::{
    Binding, ClassDecl, Declaration, Entry, EntryRef, Expr, ExprKind, FunDecl, Line, MethodBinding,
    MethodDecl, Param, Program, VarDecl,
};
use crate::resolver::class_table::{ClassLayout, ClassTable, Placement};
use crate::resolver::error::{DeclKind, ResolveError, ResolveErrorKind};
use crate::scope_stack::{Scope, ScopeStack};
use crate::types::Type;

/// First offset of a local declaration: below the return address and the
/// control link.
const FIRST_LOCAL_OFFSET: i32 = -2;

/// First offset of a parameter: just above the control link.
const FIRST_PARAM_OFFSET: i32 = 1;

/// Resolve every name in `program` and assign storage offsets in place.
///
/// The whole tree is always visited, so every error is reported in one run.
/// On failure the tree is left with the bindings that could be resolved.
pub fn resolve(program: &mut Program) -> Result<(), Vec<ResolveError>> {
    let mut resolver = Resolver::new();
    resolver.resolve_program(program);
    resolver.finish()
}

/// Name resolution state for one program.
///
/// The scope stack, the class table and the offset counter are private to a
/// run; later passes only see what was written into the tree.
pub struct Resolver {
    scopes: ScopeStack,
    classes: ClassTable,
    decl_offset: i32,
    /// Class whose members are being laid out, which may refer to itself.
    current_class: Option<String>,
    errors: Vec<ResolveError>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            classes: ClassTable::new(),
            decl_offset: FIRST_LOCAL_OFFSET,
            current_class: None,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn finish(self) -> Result<(), Vec<ResolveError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn record(&mut self, kind: ResolveErrorKind, line: Line) {
        tracing::warn!(line, "{}", kind);
        self.errors.push(ResolveError::new(kind, line));
    }

    /// Run `f` one nesting level deeper, with `scope` as the innermost scope
    /// and a fresh local offset counter.
    ///
    /// The scope stack and the counter are restored afterwards whatever `f`
    /// did, so a subtree never leaves its scopes behind for its siblings.
    fn in_scope<R>(&mut self, scope: Scope, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.scopes.depth();
        let saved_offset = self.decl_offset;
        self.scopes.push(scope);
        self.decl_offset = FIRST_LOCAL_OFFSET;
        let result = f(self);
        self.scopes.truncate(depth);
        self.decl_offset = saved_offset;
        result
    }

    fn nesting_level(&self) -> usize {
        self.scopes.nesting_level()
    }

    fn next_decl_offset(&mut self) -> i32 {
        let offset = self.decl_offset;
        self.decl_offset -= 1;
        offset
    }

    /// Bind `name` in the innermost scope. A binding already present in that
    /// scope is replaced and reported.
    fn declare(&mut self, name: &str, entry: EntryRef, what: DeclKind, line: Line) {
        if let Ok(Some(_)) = self.scopes.declare(name, entry) {
            self.record(
                ResolveErrorKind::Redeclared {
                    name: name.to_string(),
                    what,
                },
                line,
            );
        }
    }

    /// Every class named in a type annotation must already be declared.
    fn check_type(&mut self, ty: &Type, line: Line) {
        for name in ty.referenced_classes() {
            let is_current = self.current_class.as_deref() == Some(name);
            if !is_current && !self.classes.contains(name) {
                self.record(
                    ResolveErrorKind::UndeclaredClass {
                        name: name.to_string(),
                    },
                    line,
                );
            }
        }
    }

    fn check_signature(&mut self, params: &[Param], ret: &Type, line: Line) {
        for param in params {
            self.check_type(&param.ty, param.line.max(line));
        }
        self.check_type(ret, line);
    }

    pub fn resolve_program(&mut self, program: &mut Program) {
        tracing::debug!("Resolving program");
        match program {
            Program::LetIn {
                classes,
                declarations,
                body,
            } => self.in_scope(Scope::new(), |this| {
                for class in classes.iter_mut() {
                    this.resolve_class(class);
                }
                this.resolve_declarations(declarations);
                this.resolve_expr(body);
            }),
            Program::Body(body) => self.in_scope(Scope::new(), |this| this.resolve_expr(body)),
        }
        tracing::debug!(errors = self.errors.len(), "Resolution finished");
    }

    fn resolve_declarations(&mut self, declarations: &mut [Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Var(var) => self.resolve_var(var),
                Declaration::Fun(fun) => self.resolve_fun(fun),
            }
        }
    }

    fn resolve_var(&mut self, var: &mut VarDecl) {
        tracing::trace!(name = %var.name, "var");
        self.check_type(&var.ty, var.line);
        // The initializer cannot see the variable it initializes.
        self.resolve_expr(&mut var.init);
        let entry = Entry::new(self.nesting_level(), var.ty.clone(), self.next_decl_offset());
        var.offset = Some(entry.offset);
        self.declare(&var.name, entry, DeclKind::Variable, var.line);
    }

    fn resolve_fun(&mut self, fun: &mut FunDecl) {
        tracing::trace!(name = %fun.name, "fun");
        self.check_signature(&fun.params, &fun.ret, fun.line);
        let ty = Type::Arrow(fun.arrow_type());
        let entry = Entry::new(self.nesting_level(), ty, self.next_decl_offset());
        fun.offset = Some(entry.offset);
        // Declared before the body so the function can call itself.
        self.declare(&fun.name, entry, DeclKind::Function, fun.line);

        self.in_scope(Scope::new(), |this| {
            this.declare_params(&mut fun.params, fun.line);
            this.resolve_declarations(&mut fun.declarations);
            this.resolve_expr(&mut fun.body);
        });
    }

    fn declare_params(&mut self, params: &mut [Param], line: Line) {
        let level = self.nesting_level();
        for (offset, param) in (FIRST_PARAM_OFFSET..).zip(params.iter_mut()) {
            let entry = Entry::new(level, param.ty.clone(), offset);
            param.offset = Some(offset);
            self.declare(&param.name, entry, DeclKind::Parameter, param.line.max(line));
        }
    }

    /// Lay out a class, bind it globally, then resolve its method bodies with
    /// every member (inherited ones included) in scope.
    fn resolve_class(&mut self, class: &mut ClassDecl) {
        tracing::trace!(name = %class.name, superclass = ?class.superclass, "class");
        self.current_class = Some(class.name.clone());

        let mut layout = match class.superclass.as_deref() {
            Some(superclass) => match self.classes.lookup(superclass) {
                Some(parent) => {
                    let inherited = parent.clone();
                    class.super_entry = self.classes.entry(superclass).cloned();
                    inherited
                }
                None => {
                    self.record(
                        ResolveErrorKind::UndeclaredSuperclass {
                            name: superclass.to_string(),
                        },
                        class.line,
                    );
                    ClassLayout::new()
                }
            },
            None => ClassLayout::new(),
        };

        let member_level = self.nesting_level() + 1;
        let mut declared: HashSet<String> = HashSet::new();

        for field in class.fields.iter_mut() {
            self.check_type(&field.ty, field.line);
            if !declared.insert(field.name.clone()) {
                self.record(
                    ResolveErrorKind::Redeclared {
                        name: field.name.clone(),
                        what: DeclKind::Field,
                    },
                    field.line,
                );
            }
            let (entry, placement) = layout.add_field(&field.name, field.ty.clone(), member_level);
            if placement == Placement::KindMismatch {
                self.record(
                    ResolveErrorKind::OverrideKindMismatch {
                        name: field.name.clone(),
                        class: class.name.clone(),
                        what: DeclKind::Field,
                    },
                    field.line,
                );
            }
            field.offset = Some(entry.offset);
        }

        for method in class.methods.iter_mut() {
            self.check_signature(&method.params, &method.ret, method.line);
            if !declared.insert(method.name.clone()) {
                self.record(
                    ResolveErrorKind::Redeclared {
                        name: method.name.clone(),
                        what: DeclKind::Method,
                    },
                    method.line,
                );
            }
            let (entry, placement) =
                layout.add_method(&method.name, method.arrow_type(), member_level);
            if placement == Placement::KindMismatch {
                self.record(
                    ResolveErrorKind::OverrideKindMismatch {
                        name: method.name.clone(),
                        class: class.name.clone(),
                        what: DeclKind::Method,
                    },
                    method.line,
                );
            }
            method.offset = Some(entry.offset);
        }
        self.current_class = None;

        let entry = Entry::new(
            self.nesting_level(),
            Type::Class(layout.shape()),
            self.next_decl_offset(),
        );
        class.entry = Some(entry.clone());
        if let Ok(Some(_)) = self.scopes.declare_global(&class.name, entry.clone()) {
            self.record(
                ResolveErrorKind::Redeclared {
                    name: class.name.clone(),
                    what: DeclKind::Class,
                },
                class.line,
            );
        }

        let members = Scope::from_bindings(layout.members().clone());
        self.classes.insert(&class.name, layout, entry);

        self.in_scope(members, |this| {
            for method in class.methods.iter_mut() {
                this.resolve_method(method);
            }
        });
    }

    fn resolve_method(&mut self, method: &mut MethodDecl) {
        tracing::trace!(name = %method.name, offset = ?method.offset, "method");
        self.in_scope(Scope::new(), |this| {
            this.declare_params(&mut method.params, method.line);
            this.resolve_declarations(&mut method.declarations);
            this.resolve_expr(&mut method.body);
        });
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        let line = expr.line;
        let nesting_level = self.nesting_level();
        match &mut expr.kind {
            ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::Null => {}
            ExprKind::Binary { left, right, .. }
            | ExprKind::Comparison { left, right, .. }
            | ExprKind::Boolean { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Not(operand) | ExprKind::Print(operand) => self.resolve_expr(operand),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(cond);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }
            ExprKind::Ident { name, binding } => {
                *binding = self.bind_use(name, DeclKind::Variable, line);
            }
            ExprKind::Call {
                name,
                args,
                binding,
            } => {
                *binding = self.bind_use(name, DeclKind::Function, line);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::MethodCall {
                receiver,
                method,
                args,
                binding,
            } => {
                *binding = self.bind_method(receiver, method, line).map(|(receiver, method)| {
                    MethodBinding {
                        receiver,
                        method,
                        nesting_level,
                    }
                });
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::New {
                class,
                args,
                class_entry,
            } => {
                *class_entry = self.classes.entry(class).cloned();
                if class_entry.is_none() {
                    self.record(
                        ResolveErrorKind::UndeclaredClass {
                            name: class.clone(),
                        },
                        line,
                    );
                }
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    fn bind_use(&mut self, name: &str, what: DeclKind, line: Line) -> Option<Binding> {
        match self.scopes.lookup(name).cloned() {
            Some(entry) => Some(Binding {
                entry,
                nesting_level: self.nesting_level(),
            }),
            None => {
                self.record(
                    ResolveErrorKind::Undeclared {
                        name: name.to_string(),
                        what,
                    },
                    line,
                );
                None
            }
        }
    }

    /// Resolve `receiver.method`: the receiver must be an object whose class
    /// has a method of that name.
    fn bind_method(
        &mut self,
        receiver: &str,
        method: &str,
        line: Line,
    ) -> Option<(EntryRef, EntryRef)> {
        let Some(receiver_entry) = self.scopes.lookup(receiver).cloned() else {
            self.record(
                ResolveErrorKind::Undeclared {
                    name: receiver.to_string(),
                    what: DeclKind::Object,
                },
                line,
            );
            return None;
        };
        let Type::Ref(class_name) = &receiver_entry.ty else {
            self.record(
                ResolveErrorKind::NotAnObject {
                    name: receiver.to_string(),
                },
                line,
            );
            return None;
        };
        let method_entry = self
            .classes
            .lookup(class_name)
            .and_then(|layout| layout.method(method))
            .cloned();
        match method_entry {
            Some(method_entry) => Some((receiver_entry, method_entry)),
            None => {
                self.record(
                    ResolveErrorKind::UnknownMethod {
                        receiver: receiver.to_string(),
                        method: method.to_string(),
                    },
                    line,
                );
                None
            }
        }
    }
}
