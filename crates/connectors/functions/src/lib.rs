//! Function-backed tables.
//!
//! Each table of the virtual schema is a pure function from request
//! parameters to a list of strings. The set of functions is closed: a table
//! name either maps to a [`VirtualFunction`] variant or does not exist.

use std::collections::HashMap;
use tabulon_common::{Error, Result, SchemaTableName, TableData};

/// Longest word `permutations` accepts; 8 letters give 40320 rows.
pub const MAX_PERMUTATION_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualFunction {
    /// Every ordering of the characters of `word`, duplicates included.
    Permutations,
}

impl VirtualFunction {
    pub const ALL: [VirtualFunction; 1] = [VirtualFunction::Permutations];

    pub fn table_name(&self) -> &'static str {
        match self {
            VirtualFunction::Permutations => "permutations",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.table_name() == name)
    }

    /// The parameter that feeds the function; it is echoed back as the first column.
    pub fn parameter(&self) -> &'static str {
        match self {
            VirtualFunction::Permutations => "word",
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        match self {
            VirtualFunction::Permutations => vec![self.parameter().to_string(), "result".to_string()],
        }
    }

    pub fn evaluate(&self, parameters: &HashMap<String, String>) -> Result<Vec<String>> {
        let input = parameters
            .get(self.parameter())
            .ok_or_else(|| Error::MissingParameter(self.parameter().to_string()))?;
        match self {
            VirtualFunction::Permutations => permutations(input),
        }
    }

    /// Function output as table rows: `(input, output)` pairs.
    pub fn table(&self, parameters: &HashMap<String, String>) -> Result<TableData> {
        let outputs = self.evaluate(parameters)?;
        let input = parameters.get(self.parameter()).cloned().unwrap_or_default();
        let rows = outputs.into_iter().map(|output| vec![input.clone(), output]).collect();
        Ok(TableData::new(self.column_names(), rows))
    }
}

/// The schema exposing every [`VirtualFunction`] as a table.
#[derive(Debug, Clone)]
pub struct VirtualSchema {
    name: String,
}

impl VirtualSchema {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn list_tables(&self) -> Vec<SchemaTableName> {
        VirtualFunction::ALL
            .iter()
            .map(|f| SchemaTableName::new(&self.name, f.table_name()))
            .collect()
    }

    pub fn function(&self, table: &str) -> Result<VirtualFunction> {
        VirtualFunction::from_table_name(table).ok_or_else(|| Error::table_not_found(&self.name, table))
    }
}

fn permutations(word: &str) -> Result<Vec<String>> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() > MAX_PERMUTATION_LEN {
        return Err(Error::InvalidParameter(format!(
            "word has {} characters, at most {} are allowed",
            chars.len(),
            MAX_PERMUTATION_LEN
        )));
    }
    let mut out = Vec::new();
    let mut current = String::with_capacity(word.len());
    let mut used = vec![false; chars.len()];
    permute(&chars, &mut used, &mut current, &mut out);
    Ok(out)
}

// Emits orderings in lexicographic order of character positions.
fn permute(chars: &[char], used: &mut [bool], current: &mut String, out: &mut Vec<String>) {
    if current.chars().count() == chars.len() {
        out.push(current.clone());
        return;
    }
    for i in 0..chars.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(chars[i]);
        permute(chars, used, current, out);
        current.pop();
        used[i] = false;
    }
}
