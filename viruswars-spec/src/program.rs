//! Compiled program unit

use serde::{Deserialize, Serialize};

use crate::Word;

/// An immutable compiled virus: a name, the instruction words, and the
/// offset of the cell the initial thread starts at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub name: String,
    pub code: Vec<Word>,
    pub start_offset: usize,
}

impl CompiledProgram {
    pub fn new(name: impl Into<String>, code: Vec<Word>, start_offset: usize) -> Self {
        Self {
            name: name.into(),
            code,
            start_offset,
        }
    }

    /// Number of cells the program occupies in the core
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
