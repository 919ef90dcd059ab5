//! Two-pass assembly driver
//!
//! Errors never abort a compile: the failing line assembles to a NOP so
//! the instruction vector stays aligned with the source, and the report
//! carries every error and warning for the caller to inspect.

use viruswars_spec::{encoding, CompiledProgram, Opcode, VmConfig, Word};

use crate::error::{AssembleError, AssembleWarning};
use crate::parser::{parse_statement, LineContext};
use crate::preprocess::preprocess;
use crate::symbols::SymbolTable;

/// Substituted for statements that failed to compile
const NOP_WORD: Word = encoding::encode(Opcode::Nop as u8, 0, 0);

/// Entry label that selects the initial thread's start cell
const START_LABEL: &str = "start";

/// Outcome of one compilation
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub program: CompiledProgram,
    pub errors: Vec<AssembleError>,
    pub warnings: Vec<AssembleWarning>,
}

impl CompileReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// True when the program compiled without errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compile source text into a program named `name`
pub fn compile(name: &str, source: &str, config: &VmConfig) -> CompileReport {
    let symbols = SymbolTable::from_config(config);
    let pre = preprocess(source, &symbols);

    let mut errors = pre.errors;
    let mut warnings = Vec::new();
    let mut code = Vec::with_capacity(pre.statements.len());

    for stmt in &pre.statements {
        let ctx = LineContext {
            line: stmt.line,
            address: stmt.address,
            symbols: &symbols,
            labels: &pre.labels,
        };
        let word = parse_statement(&stmt.text, &ctx, &mut warnings)
            .and_then(|inst| {
                inst.encode().map_err(|e| AssembleError::BadExpression {
                    line: stmt.line,
                    detail: e.to_string(),
                })
            })
            .unwrap_or_else(|err| {
                errors.push(err);
                NOP_WORD
            });
        code.push(word);
    }

    let start_offset = pre.labels.address_of(START_LABEL).unwrap_or(0);

    CompileReport {
        program: CompiledProgram::new(name, code, start_offset),
        errors,
        warnings,
    }
}
