use core::mem;

use hashbrown::HashMap;

use crate::ast::{
    BinaryOp, Binding, BoolOp, ClassDecl, ComparisonOp, Declaration, Expr, ExprKind, FunDecl,
    Line, MethodBinding, Program,
};
use crate::compiler::error::CompileError;
use crate::types::Type;
use crate::vm::{Code, Instruction, MEMORY_SIZE};

type Result<T> = core::result::Result<T, CompileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Memory size of the target machine. The class directory starts here.
    pub memory_size: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
        }
    }
}

/// Generate code for a program that resolved and type checked cleanly.
pub fn generate(program: &Program, options: &CodegenOptions) -> Result<Code> {
    CodeGenerator::new(*options).program(program)
}

/// Emits instructions for one program.
///
/// Holds the label counters, the hoisted function blocks and the dispatch
/// table of every class generated so far.
pub struct CodeGenerator {
    options: CodegenOptions,
    out: Vec<Instruction>,
    deferred: Vec<Instruction>,
    dispatch_tables: HashMap<String, Vec<String>>,
    next_label: usize,
    next_function: usize,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            out: Vec::new(),
            deferred: Vec::new(),
            dispatch_tables: HashMap::new(),
            next_label: 0,
            next_function: 0,
        }
    }

    pub fn program(mut self, program: &Program) -> Result<Code> {
        tracing::debug!("Generating code");
        match program {
            Program::LetIn {
                classes,
                declarations,
                body,
            } => {
                self.emit(Instruction::push(0));
                for class in classes {
                    self.class(class)?;
                }
                self.declarations(declarations)?;
                self.expr(body)?;
            }
            Program::Body(body) => self.expr(body)?,
        }
        self.emit(Instruction::Halt);

        let mut instructions = self.out;
        instructions.append(&mut self.deferred);
        tracing::debug!(instructions = instructions.len(), "Code generated");
        Ok(Code::new(instructions))
    }

    fn emit(&mut self, instruction: Instruction) {
        self.out.push(instruction);
    }

    fn emit_all(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        self.out.extend(instructions);
    }

    fn fresh_label(&mut self) -> String {
        let label = format!("label{}", self.next_label);
        self.next_label += 1;
        label
    }

    fn fresh_function(&mut self) -> String {
        let label = format!("function{}", self.next_function);
        self.next_function += 1;
        label
    }

    /// `lhp; push 1; add; shp`
    fn bump_heap(&mut self) {
        self.emit_all([
            Instruction::LoadHp,
            Instruction::push(1),
            Instruction::Add,
            Instruction::StoreHp,
        ]);
    }

    /// Store the top of the stack at the heap pointer and advance it.
    fn store_on_heap(&mut self) {
        self.emit_all([Instruction::LoadHp, Instruction::StoreWord]);
        self.bump_heap();
    }

    /// `lw` repeated once per access link to follow.
    fn follow_links(&mut self, hops: usize) {
        self.emit_all(core::iter::repeat_n(Instruction::LoadWord, hops));
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declarations(&mut self, declarations: &[Declaration]) -> Result<()> {
        for declaration in declarations {
            match declaration {
                Declaration::Var(var) => self.expr(&var.init)?,
                Declaration::Fun(fun) => self.function(fun)?,
            }
        }
        Ok(())
    }

    fn function(&mut self, fun: &FunDecl) -> Result<()> {
        let label = self.fresh_function();
        tracing::trace!(name = %fun.name, %label, "Function block");
        self.block(&label, fun.params.len(), &fun.declarations, &fun.body)?;
        self.emit(Instruction::push_label(label));
        Ok(())
    }

    /// Emit a hoisted function or method body into the deferred buffer.
    fn block(
        &mut self,
        label: &str,
        params: usize,
        declarations: &[Declaration],
        body: &Expr,
    ) -> Result<()> {
        let enclosing = mem::take(&mut self.out);

        self.emit(Instruction::Label(label.to_string()));
        self.emit_all([Instruction::CopyFp, Instruction::LoadRa]);
        let generated = self
            .declarations(declarations)
            .and_then(|()| self.expr(body));

        self.emit(Instruction::StoreTm);
        self.emit_all(core::iter::repeat_n(Instruction::Pop, declarations.len()));
        self.emit_all([Instruction::StoreRa, Instruction::Pop]);
        self.emit_all(core::iter::repeat_n(Instruction::Pop, params));
        self.emit_all([
            Instruction::StoreFp,
            Instruction::LoadTm,
            Instruction::LoadRa,
            Instruction::JumpSub,
        ]);

        let block = mem::replace(&mut self.out, enclosing);
        generated?;
        self.deferred.extend(block);
        Ok(())
    }

    /// Dispatch table: the superclass table with overrides replaced in place
    /// and new methods appended. Leaves the table address on the stack.
    fn class(&mut self, class: &ClassDecl) -> Result<()> {
        let mut table = match &class.superclass {
            Some(superclass) => self
                .dispatch_tables
                .get(superclass)
                .cloned()
                .ok_or_else(|| CompileError::MissingDispatchTable {
                    class: class.name.clone(),
                    superclass: superclass.clone(),
                })?,
            None => Vec::new(),
        };

        for method in &class.methods {
            let slot = method
                .offset
                .and_then(|offset| usize::try_from(offset).ok())
                .ok_or_else(|| CompileError::MissingSlot {
                    name: method.name.clone(),
                    line: method.line,
                })?;
            let label = self.fresh_function();
            tracing::trace!(class = %class.name, method = %method.name, slot, %label, "Method block");
            self.block(&label, method.params.len(), &method.declarations, &method.body)?;
            match table.get_mut(slot) {
                Some(entry) => *entry = label,
                None => table.push(label),
            }
        }

        self.emit(Instruction::LoadHp);
        for label in &table {
            self.emit(Instruction::push_label(label.as_str()));
            self.store_on_heap();
        }
        self.dispatch_tables.insert(class.name.clone(), table);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Int(value) => self.emit(Instruction::push(*value)),
            ExprKind::Bool(value) => self.emit(Instruction::push(i64::from(*value))),
            ExprKind::Null => self.emit(Instruction::push(-1)),
            ExprKind::Binary { op, left, right } => {
                self.expr(left)?;
                self.expr(right)?;
                self.emit(match op {
                    BinaryOp::Add => Instruction::Add,
                    BinaryOp::Sub => Instruction::Sub,
                    BinaryOp::Mul => Instruction::Mult,
                    BinaryOp::Div => Instruction::Div,
                });
            }
            ExprKind::Comparison { op, left, right } => self.comparison(*op, left, right)?,
            ExprKind::Boolean {
                op: BoolOp::And,
                left,
                right,
            } => self.and(left, right)?,
            ExprKind::Boolean {
                op: BoolOp::Or,
                left,
                right,
            } => self.or(left, right)?,
            ExprKind::Not(operand) => {
                self.expr(operand)?;
                self.emit(Instruction::push(0));
                self.truth_value(Instruction::BranchEq);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let then_label = self.fresh_label();
                let end = self.fresh_label();
                self.expr(cond)?;
                self.emit(Instruction::push(1));
                self.emit(Instruction::BranchEq(then_label.clone()));
                self.expr(else_branch)?;
                self.emit(Instruction::Branch(end.clone()));
                self.emit(Instruction::Label(then_label));
                self.expr(then_branch)?;
                self.emit(Instruction::Label(end));
            }
            ExprKind::Print(operand) => {
                self.expr(operand)?;
                self.emit(Instruction::Print);
            }
            ExprKind::Ident { name, binding } => {
                let binding = bound(binding.as_ref(), name, expr.line)?;
                self.emit(Instruction::LoadFp);
                self.follow_links(binding.hops());
                self.emit_all([
                    Instruction::push(i64::from(binding.entry.offset)),
                    Instruction::Add,
                    Instruction::LoadWord,
                ]);
            }
            ExprKind::Call {
                name,
                args,
                binding,
            } => self.call(bound(binding.as_ref(), name, expr.line)?, args)?,
            ExprKind::MethodCall {
                receiver,
                args,
                binding,
                ..
            } => self.method_call(bound(binding.as_ref(), receiver, expr.line)?, args)?,
            ExprKind::New {
                class,
                args,
                class_entry,
            } => {
                let entry = bound(class_entry.as_ref(), class, expr.line)?;
                for arg in args {
                    self.expr(arg)?;
                }
                for _ in args {
                    self.store_on_heap();
                }
                self.emit_all([
                    Instruction::push(self.options.memory_size as i64),
                    Instruction::push(i64::from(entry.offset)),
                    Instruction::Add,
                    Instruction::LoadWord,
                    Instruction::LoadHp,
                    Instruction::StoreWord,
                    Instruction::LoadHp,
                ]);
                self.bump_heap();
            }
        }
        Ok(())
    }

    /// `[..., a, b] -> [..., a <branch> b ? 1 : 0]`
    fn truth_value(&mut self, branch: fn(String) -> Instruction) {
        let yes = self.fresh_label();
        let end = self.fresh_label();
        self.emit_all([
            branch(yes.clone()),
            Instruction::push(0),
            Instruction::Branch(end.clone()),
            Instruction::Label(yes),
            Instruction::push(1),
            Instruction::Label(end),
        ]);
    }

    fn comparison(&mut self, op: ComparisonOp, left: &Expr, right: &Expr) -> Result<()> {
        match op {
            ComparisonOp::Eq => {
                self.expr(left)?;
                self.expr(right)?;
                self.truth_value(Instruction::BranchEq);
            }
            ComparisonOp::Le => {
                self.expr(left)?;
                self.expr(right)?;
                self.truth_value(Instruction::BranchLessEq);
            }
            // right - left <= 0
            ComparisonOp::Ge => {
                self.expr(right)?;
                self.expr(left)?;
                self.emit_all([Instruction::Sub, Instruction::push(0)]);
                self.truth_value(Instruction::BranchLessEq);
            }
        }
        Ok(())
    }

    fn and(&mut self, left: &Expr, right: &Expr) -> Result<()> {
        let falsy = self.fresh_label();
        let end = self.fresh_label();
        self.expr(left)?;
        self.emit_all([Instruction::push(0), Instruction::BranchEq(falsy.clone())]);
        self.expr(right)?;
        self.emit_all([
            Instruction::push(0),
            Instruction::BranchEq(falsy.clone()),
            Instruction::push(1),
            Instruction::Branch(end.clone()),
            Instruction::Label(falsy),
            Instruction::push(0),
            Instruction::Label(end),
        ]);
        Ok(())
    }

    fn or(&mut self, left: &Expr, right: &Expr) -> Result<()> {
        let check_right = self.fresh_label();
        let truthy = self.fresh_label();
        let falsy = self.fresh_label();
        let end = self.fresh_label();
        self.expr(left)?;
        self.emit_all([
            Instruction::push(0),
            Instruction::BranchEq(check_right.clone()),
            Instruction::Branch(truthy.clone()),
            Instruction::Label(check_right),
        ]);
        self.expr(right)?;
        self.emit_all([
            Instruction::push(0),
            Instruction::BranchEq(falsy.clone()),
            Instruction::Label(truthy),
            Instruction::push(1),
            Instruction::Branch(end.clone()),
            Instruction::Label(falsy),
            Instruction::push(0),
            Instruction::Label(end),
        ]);
        Ok(())
    }

    /// Control link, arguments last to first, then the callee's access link.
    fn call_frame(&mut self, args: &[Expr]) -> Result<()> {
        self.emit(Instruction::LoadFp);
        for arg in args.iter().rev() {
            self.expr(arg)?;
        }
        self.emit(Instruction::LoadFp);
        Ok(())
    }

    /// `stm; ltm; ltm`: keep one copy as the access link, use the other.
    fn duplicate_top(&mut self) {
        self.emit_all([Instruction::StoreTm, Instruction::LoadTm, Instruction::LoadTm]);
    }

    fn call(&mut self, binding: &Binding, args: &[Expr]) -> Result<()> {
        self.call_frame(args)?;
        self.follow_links(binding.hops());
        self.duplicate_top();
        // Methods called from their own class go through the object's table.
        if matches!(binding.entry.ty, Type::Method(_)) {
            self.emit(Instruction::LoadWord);
        }
        self.emit_all([
            Instruction::push(i64::from(binding.entry.offset)),
            Instruction::Add,
            Instruction::LoadWord,
            Instruction::JumpSub,
        ]);
        Ok(())
    }

    fn method_call(&mut self, binding: &MethodBinding, args: &[Expr]) -> Result<()> {
        self.call_frame(args)?;
        self.follow_links(binding.hops());
        self.emit_all([
            Instruction::push(i64::from(binding.receiver.offset)),
            Instruction::Add,
            Instruction::LoadWord,
        ]);
        self.duplicate_top();
        self.emit_all([
            Instruction::LoadWord,
            Instruction::push(i64::from(binding.method.offset)),
            Instruction::Add,
            Instruction::LoadWord,
            Instruction::JumpSub,
        ]);
        Ok(())
    }
}

fn bound<'a, T>(binding: Option<&'a T>, name: &str, line: Line) -> Result<&'a T> {
    binding.ok_or_else(|| CompileError::Unbound {
        name: name.to_string(),
        line,
    })
}
