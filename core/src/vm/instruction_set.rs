//! Stack machine instructions.
//!
//! One variant per machine instruction, plus [`Instruction::Label`], a pseudo
//! instruction marking a branch or call target. Text form is one instruction
//! per line, with labels written `name:`.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., second, top] -> [..., result]`. Binary
//! operations compute `second op top`.

use core::fmt;
use core::str::FromStr;

/// Operand of `push`: an immediate or the code address of a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Int(i64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    // ========================================================================
    // Stack & Arithmetic
    // ========================================================================
    /// `push n` | Stack: [...] -> [..., n]
    Push(Operand),

    /// `pop` | Stack: [..., a] -> [...]
    Pop,

    /// `add` | Stack: [..., a, b] -> [..., a + b]
    Add,

    /// `sub` | Stack: [..., a, b] -> [..., a - b]
    Sub,

    /// `mult` | Stack: [..., a, b] -> [..., a * b]
    Mult,

    /// `div` | Stack: [..., a, b] -> [..., a / b]
    Div,

    // ========================================================================
    // Control Flow
    // ========================================================================
    /// `beq l` | Stack: [..., a, b] -> [...], jumps when `a == b`
    BranchEq(String),

    /// `bleq l` | Stack: [..., a, b] -> [...], jumps when `a <= b`
    BranchLessEq(String),

    /// `b l` | unconditional jump
    Branch(String),

    /// `js` | Stack: [..., addr] -> [...], saves the next address in `ra`
    JumpSub,

    // ========================================================================
    // Memory
    // ========================================================================
    /// `lw` | Stack: [..., addr] -> [..., memory[addr]]
    LoadWord,

    /// `sw` | Stack: [..., value, addr] -> [...], writes memory[addr]
    StoreWord,

    // ========================================================================
    // Registers
    // ========================================================================
    /// `lfp` | push the frame pointer
    LoadFp,
    /// `sfp` | pop into the frame pointer
    StoreFp,
    /// `cfp` | copy the stack pointer into the frame pointer
    CopyFp,
    /// `lra` | push the return address
    LoadRa,
    /// `sra` | pop into the return address
    StoreRa,
    /// `ltm` | push the temp register
    LoadTm,
    /// `stm` | pop into the temp register
    StoreTm,
    /// `lhp` | push the heap pointer
    LoadHp,
    /// `shp` | pop into the heap pointer
    StoreHp,

    // ========================================================================
    // Special
    // ========================================================================
    /// `print` | emit the top of the stack
    Print,

    /// `halt` | stop execution
    Halt,

    /// `l:` | marks the address of the next instruction
    Label(String),
}

impl Instruction {
    pub fn push(value: i64) -> Self {
        Instruction::Push(Operand::Int(value))
    }

    pub fn push_label(label: impl Into<String>) -> Self {
        Instruction::Push(Operand::Label(label.into()))
    }

    /// Label this instruction refers to, for branches and `push label`.
    pub fn target(&self) -> Option<&str> {
        match self {
            Instruction::BranchEq(label)
            | Instruction::BranchLessEq(label)
            | Instruction::Branch(label)
            | Instruction::Push(Operand::Label(label)) => Some(label),
            _ => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{}", value),
            Operand::Label(label) => write!(f, "{}", label),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            Push(operand) => write!(f, "push {}", operand),
            Pop => write!(f, "pop"),
            Add => write!(f, "add"),
            Sub => write!(f, "sub"),
            Mult => write!(f, "mult"),
            Div => write!(f, "div"),
            BranchEq(label) => write!(f, "beq {}", label),
            BranchLessEq(label) => write!(f, "bleq {}", label),
            Branch(label) => write!(f, "b {}", label),
            JumpSub => write!(f, "js"),
            LoadWord => write!(f, "lw"),
            StoreWord => write!(f, "sw"),
            LoadFp => write!(f, "lfp"),
            StoreFp => write!(f, "sfp"),
            CopyFp => write!(f, "cfp"),
            LoadRa => write!(f, "lra"),
            StoreRa => write!(f, "sra"),
            LoadTm => write!(f, "ltm"),
            StoreTm => write!(f, "stm"),
            LoadHp => write!(f, "lhp"),
            StoreHp => write!(f, "shp"),
            Print => write!(f, "print"),
            Halt => write!(f, "halt"),
            Label(label) => write!(f, "{}:", label),
        }
    }
}

/// Error parsing one line of machine code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseInstructionError {
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    #[error("'{0}' expects an operand")]
    MissingOperand(String),
    #[error("unexpected operand '{operand}' after '{mnemonic}'")]
    UnexpectedOperand { mnemonic: String, operand: String },
    #[error("invalid label '{0}'")]
    InvalidLabel(String),
}

fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for Instruction {
    type Err = ParseInstructionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if let Some(label) = line.strip_suffix(':') {
            return if is_label_name(label) {
                Ok(Instruction::Label(label.to_string()))
            } else {
                Err(ParseInstructionError::InvalidLabel(label.to_string()))
            };
        }

        let mut parts = line.split_whitespace();
        let mnemonic = parts.next().unwrap_or_default();
        let operand = parts.next();
        if let Some(extra) = parts.next() {
            return Err(ParseInstructionError::UnexpectedOperand {
                mnemonic: mnemonic.to_string(),
                operand: extra.to_string(),
            });
        }

        let label_operand = |operand: Option<&str>| -> Result<String, ParseInstructionError> {
            let operand =
                operand.ok_or_else(|| ParseInstructionError::MissingOperand(mnemonic.to_string()))?;
            if is_label_name(operand) {
                Ok(operand.to_string())
            } else {
                Err(ParseInstructionError::InvalidLabel(operand.to_string()))
            }
        };

        use Instruction::*;
        let instruction = match mnemonic {
            "push" => {
                let operand = operand
                    .ok_or_else(|| ParseInstructionError::MissingOperand(mnemonic.to_string()))?;
                return match operand.parse::<i64>() {
                    Ok(value) => Ok(Push(Operand::Int(value))),
                    Err(_) => label_operand(Some(operand)).map(|l| Push(Operand::Label(l))),
                };
            }
            "beq" => return label_operand(operand).map(BranchEq),
            "bleq" => return label_operand(operand).map(BranchLessEq),
            "b" => return label_operand(operand).map(Branch),
            "pop" => Pop,
            "add" => Add,
            "sub" => Sub,
            "mult" => Mult,
            "div" => Div,
            "js" => JumpSub,
            "lw" => LoadWord,
            "sw" => StoreWord,
            "lfp" => LoadFp,
            "sfp" => StoreFp,
            "cfp" => CopyFp,
            "lra" => LoadRa,
            "sra" => StoreRa,
            "ltm" => LoadTm,
            "stm" => StoreTm,
            "lhp" => LoadHp,
            "shp" => StoreHp,
            "print" => Print,
            "halt" => Halt,
            other => return Err(ParseInstructionError::UnknownInstruction(other.to_string())),
        };
        match operand {
            Some(operand) => Err(ParseInstructionError::UnexpectedOperand {
                mnemonic: mnemonic.to_string(),
                operand: operand.to_string(),
            }),
            None => Ok(instruction),
        }
    }
}
