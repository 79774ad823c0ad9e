use core::fmt;
use core::str::FromStr;

use hashbrown::{HashMap, HashSet};

use crate::vm::instruction_set::{Instruction, ParseInstructionError};

/// A machine code listing: instructions and label definitions in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    pub instructions: Vec<Instruction>,
}

/// Structural problem in a listing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("label '{0}' defined more than once")]
    DuplicateLabel(String),
    #[error("label '{0}' is used but never defined")]
    UndefinedLabel(String),
    #[error("line {line}: {error}")]
    Parse {
        line: usize,
        error: ParseInstructionError,
    },
}

impl Code {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn count(&self, instruction: &Instruction) -> usize {
        self.instructions.iter().filter(|i| *i == instruction).count()
    }

    /// Address of every label: the index of the next real instruction.
    ///
    /// Fails when a label is defined twice.
    pub fn label_addresses(&self) -> Result<HashMap<String, usize>, CodeError> {
        let mut addresses = HashMap::new();
        let mut address = 0;
        for instruction in &self.instructions {
            match instruction {
                Instruction::Label(label) => {
                    if addresses.insert(label.clone(), address).is_some() {
                        return Err(CodeError::DuplicateLabel(label.clone()));
                    }
                }
                _ => address += 1,
            }
        }
        Ok(addresses)
    }

    /// Every label is defined exactly once and every referenced label exists.
    pub fn validate(&self) -> Result<(), CodeError> {
        let defined: HashSet<String> = self.label_addresses()?.into_keys().collect();
        match self
            .instructions
            .iter()
            .filter_map(Instruction::target)
            .find(|label| !defined.contains(*label))
        {
            Some(label) => Err(CodeError::UndefinedLabel(label.to_string())),
            None => Ok(()),
        }
    }
}

impl FromIterator<Instruction> for Code {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Code::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = CodeError;

    /// Parse a listing, one instruction per line. Blank lines are skipped.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                line.parse::<Instruction>().map_err(|error| CodeError::Parse {
                    line: index + 1,
                    error,
                })
            })
            .collect()
    }
}
