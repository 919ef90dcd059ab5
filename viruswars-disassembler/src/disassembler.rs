//! Whole-program listings

use std::fmt::Write as _;

use viruswars_spec::CompiledProgram;

use crate::decoder::decode;
use crate::formatter::format_instruction;

/// Render a compiled program as re-assemblable source. The entry cell is
/// labelled `start:` so the listing compiles back to the same start
/// offset; addresses and raw words ride along in a comment gutter.
pub fn disassemble(program: &CompiledProgram) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; {} ({} cells)", program.name, program.len());

    for (addr, &word) in program.code.iter().enumerate() {
        let label = if addr == program.start_offset {
            "start:"
        } else {
            ""
        };
        let statement = format_instruction(&decode(word));
        let _ = writeln!(out, "{:<8}{:<28}; {:>5}  {:08x}", label, statement, addr, word);
    }

    out
}
