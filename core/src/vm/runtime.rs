use crate::vm::code::{Code, CodeError};
use crate::vm::instruction_set::{Instruction, Operand};
use crate::vm::{MEMORY_SIZE, MAX_STEPS};

/// Configuration of the reference machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmOptions {
    /// Words of memory shared by the heap (growing up from 0) and the stack
    /// (growing down from `memory_size`).
    pub memory_size: usize,
    /// Instructions executed before giving up on a diverging program.
    pub max_steps: usize,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
            max_steps: MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("out of memory: stack met heap (sp = {sp}, hp = {hp})")]
    OutOfMemory { sp: i64, hp: i64 },
    #[error("address {0} is outside memory")]
    InvalidAddress(i64),
    #[error("pop from an empty stack")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("jump to {0}, outside the code")]
    InvalidJump(i64),
    #[error("no halt after {0} steps")]
    StepLimitExceeded(usize),
    #[error(transparent)]
    Code(#[from] CodeError),
}

/// Result of running a program to `halt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    /// Values emitted by `print`, in order.
    pub output: Vec<i64>,
    /// Stack contents at `halt`, bottom first.
    pub stack: Vec<i64>,
}

impl Execution {
    pub fn top(&self) -> Option<i64> {
        self.stack.last().copied()
    }
}

/// Instruction with its label resolved to a code address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Push(i64),
    Pop,
    Add,
    Sub,
    Mult,
    Div,
    BranchEq(usize),
    BranchLessEq(usize),
    Branch(usize),
    JumpSub,
    LoadWord,
    StoreWord,
    LoadFp,
    StoreFp,
    CopyFp,
    LoadRa,
    StoreRa,
    LoadTm,
    StoreTm,
    LoadHp,
    StoreHp,
    Print,
    Halt,
}

/// Resolve labels to addresses and drop the label markers.
fn assemble(code: &Code) -> Result<Vec<Op>, CodeError> {
    let addresses = code.label_addresses()?;
    let resolve = |label: &str| {
        addresses
            .get(label)
            .copied()
            .ok_or_else(|| CodeError::UndefinedLabel(label.to_string()))
    };

    let mut ops = Vec::with_capacity(code.len());
    for instruction in code.iter() {
        let op = match instruction {
            Instruction::Label(_) => continue,
            Instruction::Push(Operand::Int(value)) => Op::Push(*value),
            Instruction::Push(Operand::Label(label)) => Op::Push(resolve(label)? as i64),
            Instruction::Pop => Op::Pop,
            Instruction::Add => Op::Add,
            Instruction::Sub => Op::Sub,
            Instruction::Mult => Op::Mult,
            Instruction::Div => Op::Div,
            Instruction::BranchEq(label) => Op::BranchEq(resolve(label)?),
            Instruction::BranchLessEq(label) => Op::BranchLessEq(resolve(label)?),
            Instruction::Branch(label) => Op::Branch(resolve(label)?),
            Instruction::JumpSub => Op::JumpSub,
            Instruction::LoadWord => Op::LoadWord,
            Instruction::StoreWord => Op::StoreWord,
            Instruction::LoadFp => Op::LoadFp,
            Instruction::StoreFp => Op::StoreFp,
            Instruction::CopyFp => Op::CopyFp,
            Instruction::LoadRa => Op::LoadRa,
            Instruction::StoreRa => Op::StoreRa,
            Instruction::LoadTm => Op::LoadTm,
            Instruction::StoreTm => Op::StoreTm,
            Instruction::LoadHp => Op::LoadHp,
            Instruction::StoreHp => Op::StoreHp,
            Instruction::Print => Op::Print,
            Instruction::Halt => Op::Halt,
        };
        ops.push(op);
    }
    Ok(ops)
}

/// Reference interpreter for the stack machine.
pub struct VM {
    ops: Vec<Op>,
    options: VmOptions,
    memory: Vec<i64>,
    ip: usize,
    sp: i64,
    fp: i64,
    hp: i64,
    ra: i64,
    tm: i64,
    output: Vec<i64>,
}

impl VM {
    pub fn new(code: &Code, options: VmOptions) -> Result<Self, ExecutionError> {
        let top = options.memory_size as i64;
        Ok(VM {
            ops: assemble(code)?,
            options,
            memory: vec![0; options.memory_size],
            ip: 0,
            sp: top,
            fp: top,
            hp: 0,
            ra: 0,
            tm: 0,
            output: Vec::new(),
        })
    }

    /// Assemble and run `code` with default options.
    pub fn execute(code: &Code) -> Result<Execution, ExecutionError> {
        VM::new(code, VmOptions::default())?.run()
    }

    fn address(&self, value: i64) -> Result<usize, ExecutionError> {
        usize::try_from(value)
            .ok()
            .filter(|address| *address < self.memory.len())
            .ok_or(ExecutionError::InvalidAddress(value))
    }

    fn load(&self, address: i64) -> Result<i64, ExecutionError> {
        Ok(self.memory[self.address(address)?])
    }

    fn store(&mut self, address: i64, value: i64) -> Result<(), ExecutionError> {
        let address = self.address(address)?;
        self.memory[address] = value;
        Ok(())
    }

    fn push(&mut self, value: i64) -> Result<(), ExecutionError> {
        self.sp -= 1;
        if self.sp < self.hp {
            return Err(ExecutionError::OutOfMemory {
                sp: self.sp,
                hp: self.hp,
            });
        }
        self.store(self.sp, value)
    }

    fn pop(&mut self) -> Result<i64, ExecutionError> {
        if self.sp >= self.options.memory_size as i64 {
            return Err(ExecutionError::StackUnderflow);
        }
        let value = self.load(self.sp)?;
        self.sp += 1;
        Ok(value)
    }

    fn peek(&self) -> Result<i64, ExecutionError> {
        if self.sp >= self.options.memory_size as i64 {
            return Err(ExecutionError::StackUnderflow);
        }
        self.load(self.sp)
    }

    /// Pops `top` then `second`, returning `(second, top)`.
    fn pop_pair(&mut self) -> Result<(i64, i64), ExecutionError> {
        let top = self.pop()?;
        let second = self.pop()?;
        Ok((second, top))
    }

    fn jump(&mut self, target: i64) -> Result<(), ExecutionError> {
        match usize::try_from(target) {
            Ok(target) if target < self.ops.len() => {
                self.ip = target;
                Ok(())
            }
            _ => Err(ExecutionError::InvalidJump(target)),
        }
    }

    pub fn run(mut self) -> Result<Execution, ExecutionError> {
        for _ in 0..self.options.max_steps {
            if self.sp <= self.hp {
                return Err(ExecutionError::OutOfMemory {
                    sp: self.sp,
                    hp: self.hp,
                });
            }
            let Some(&op) = self.ops.get(self.ip) else {
                return Err(ExecutionError::InvalidJump(self.ip as i64));
            };
            tracing::trace!(ip = self.ip, sp = self.sp, fp = self.fp, hp = self.hp, ?op);
            self.ip += 1;

            match op {
                Op::Push(value) => self.push(value)?,
                Op::Pop => {
                    self.pop()?;
                }
                Op::Add => {
                    let (a, b) = self.pop_pair()?;
                    self.push(a.wrapping_add(b))?;
                }
                Op::Sub => {
                    let (a, b) = self.pop_pair()?;
                    self.push(a.wrapping_sub(b))?;
                }
                Op::Mult => {
                    let (a, b) = self.pop_pair()?;
                    self.push(a.wrapping_mul(b))?;
                }
                Op::Div => {
                    let (a, b) = self.pop_pair()?;
                    if b == 0 {
                        return Err(ExecutionError::DivisionByZero);
                    }
                    self.push(a.wrapping_div(b))?;
                }
                Op::BranchEq(target) => {
                    let (a, b) = self.pop_pair()?;
                    if a == b {
                        self.ip = target;
                    }
                }
                Op::BranchLessEq(target) => {
                    let (a, b) = self.pop_pair()?;
                    if a <= b {
                        self.ip = target;
                    }
                }
                Op::Branch(target) => self.ip = target,
                Op::JumpSub => {
                    let target = self.pop()?;
                    self.ra = self.ip as i64;
                    self.jump(target)?;
                }
                Op::LoadWord => {
                    let address = self.pop()?;
                    let value = self.load(address)?;
                    self.push(value)?;
                }
                Op::StoreWord => {
                    let address = self.pop()?;
                    let value = self.pop()?;
                    self.store(address, value)?;
                }
                Op::LoadFp => self.push(self.fp)?,
                Op::StoreFp => self.fp = self.pop()?,
                Op::CopyFp => self.fp = self.sp,
                Op::LoadRa => self.push(self.ra)?,
                Op::StoreRa => self.ra = self.pop()?,
                Op::LoadTm => self.push(self.tm)?,
                Op::StoreTm => self.tm = self.pop()?,
                Op::LoadHp => self.push(self.hp)?,
                Op::StoreHp => self.hp = self.pop()?,
                Op::Print => {
                    let value = self.peek()?;
                    tracing::debug!(value, "print");
                    self.output.push(value);
                }
                Op::Halt => return Ok(self.finish()),
            }
        }
        Err(ExecutionError::StepLimitExceeded(self.options.max_steps))
    }

    fn finish(self) -> Execution {
        let top = self.options.memory_size;
        let sp = usize::try_from(self.sp).unwrap_or(top).min(top);
        let mut stack = self.memory[sp..top].to_vec();
        stack.reverse();
        Execution {
            output: self.output,
            stack,
        }
    }
}
