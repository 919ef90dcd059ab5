//! First pass: comment stripping, whitespace normalization, label capture
//!
//! Line numbering is preserved exactly: blank lines (after stripping) keep
//! their number but do not advance the address, and every surviving
//! statement occupies exactly one cell.

use crate::error::AssembleError;
use crate::symbols::{is_identifier, LabelTable, SymbolTable};

/// One statement that survived the first pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based source line
    pub line: usize,
    /// Cell offset within the program
    pub address: usize,
    /// Normalized statement text, single-spaced
    pub text: String,
}

/// First-pass output
#[derive(Debug, Default)]
pub struct Preprocessed {
    pub statements: Vec<Statement>,
    pub labels: LabelTable,
    pub errors: Vec<AssembleError>,
}

/// Strip a `;` comment, trim, and collapse whitespace runs
fn normalize(line: &str) -> String {
    let without_comment = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };
    without_comment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a leading `label:` off a normalized line. Returns the label (if
/// the prefix has identifier shape) and the remaining statement text.
fn split_label(text: &str) -> (Option<&str>, &str) {
    if let Some(pos) = text.find(':') {
        let candidate = text[..pos].trim_end();
        if is_identifier(candidate) {
            return (Some(candidate), text[pos + 1..].trim_start());
        }
    }
    (None, text)
}

/// Run the first pass over the source
pub fn preprocess(source: &str, symbols: &SymbolTable) -> Preprocessed {
    let mut out = Preprocessed::default();
    let mut address = 0usize;

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let text = normalize(raw_line);
        let (label, statement) = split_label(&text);

        if let Some(label) = label {
            if symbols.is_reserved(label) {
                out.errors.push(AssembleError::ReservedLabel {
                    line,
                    label: label.to_string(),
                });
            } else if !out.labels.insert(label, address) {
                out.errors.push(AssembleError::DuplicateLabel {
                    line,
                    label: label.to_string(),
                });
            }
        }

        if statement.is_empty() {
            continue;
        }

        out.statements.push(Statement {
            line,
            address,
            text: statement.to_string(),
        });
        address += 1;
    }

    out
}
