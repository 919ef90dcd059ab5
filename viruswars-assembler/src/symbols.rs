//! Predefined symbols and the label table
//!
//! Viruses can size themselves against the arena they will run in:
//! `MEM_SIZE`, `MAX_THREADS`, `MAX_CYCLES`, `MAX_LENGTH`, `MIN_DISTANCE`,
//! `VIRUSES` and `ROUNDS` mirror the configuration, and the implicit
//! `OFFSET` evaluates to the address of the statement using it.

use std::collections::HashMap;

use viruswars_spec::VmConfig;

/// The implicit current-address symbol
pub const OFFSET_SYMBOL: &str = "OFFSET";

/// Configuration-derived symbol values
#[derive(Debug, Clone)]
pub struct SymbolTable {
    values: HashMap<&'static str, i64>,
}

impl SymbolTable {
    pub fn from_config(config: &VmConfig) -> Self {
        let mut values = HashMap::new();
        values.insert("MEM_SIZE", config.memory_size as i64);
        values.insert("MAX_THREADS", config.max_threads as i64);
        values.insert("MAX_CYCLES", config.cycles_to_completion as i64);
        values.insert("MAX_LENGTH", config.max_program_length as i64);
        values.insert("MIN_DISTANCE", config.min_program_distance as i64);
        values.insert("VIRUSES", config.viruses_per_match as i64);
        values.insert("ROUNDS", config.rounds_per_setup as i64);
        Self { values }
    }

    /// Look a symbol up; `OFFSET` resolves to the current address
    pub fn lookup(&self, name: &str, current_address: usize) -> Option<i64> {
        if name == OFFSET_SYMBOL {
            return Some(current_address as i64);
        }
        self.values.get(name).copied()
    }

    /// Names a virus may not declare as labels
    pub fn is_reserved(&self, name: &str) -> bool {
        if name == OFFSET_SYMBOL || self.values.contains_key(name) {
            return true;
        }
        is_keyword(name)
    }
}

/// Statement keywords and register shapes (`r<digits>`, `s<digits>`)
pub fn is_keyword(name: &str) -> bool {
    if matches!(name, "jump" | "if" | "fork" | "data" | "nop") {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some('r') | Some('s') => {
            let rest: String = chars.collect();
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Label addresses collected by the first pass
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    addresses: HashMap<String, usize>,
}

impl LabelTable {
    pub fn insert(&mut self, label: &str, address: usize) -> bool {
        if self.addresses.contains_key(label) {
            return false;
        }
        self.addresses.insert(label.to_string(), address);
        true
    }

    pub fn address_of(&self, label: &str) -> Option<usize> {
        self.addresses.get(label).copied()
    }
}

/// Valid label shape: `[A-Za-z_][A-Za-z_0-9]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
