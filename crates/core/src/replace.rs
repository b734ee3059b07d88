//! Ordered literal find/replace table.
//!
//! Rules are applied one after another to the running result, so a later
//! rule sees the output of every earlier rule. Matching is exact and
//! case-sensitive.

use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An ordered sequence of (pattern, replacement) pairs with unique patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTable {
    rules: Vec<(String, String)>,
}

impl ReplacementTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw records.
    ///
    /// Each record must hold exactly two fields. Fields are trimmed and
    /// records with the wrong arity are skipped. An empty key is kept and
    /// matches between every character.
    pub fn load<I, R, S>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in records {
            let fields: Vec<S> = record.into_iter().collect();
            if fields.len() != 2 {
                continue;
            }
            let key = trim_field(fields[0].as_ref());
            let value = trim_field(fields[1].as_ref());

            match positions.get(key) {
                // A later duplicate keeps the first position.
                Some(&idx) => table.rules[idx].1 = value.to_string(),
                None => {
                    positions.insert(key.to_string(), table.rules.len());
                    table.rules.push((key.to_string(), value.to_string()));
                }
            }
        }

        table
    }

    /// Parse `key,value` lines from a reader. Invalid UTF-8 is replaced
    /// with U+FFFD rather than rejected.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let decoded = String::from_utf8_lossy(&raw);
        let source = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);
        let table = Self::load(source.lines().map(split_record));
        log::debug!("Loaded {} replacement rules", table.len());
        Ok(table)
    }

    /// Load a replacement table from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    /// Apply every rule in order to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (pattern, replacement) in &self.rules {
            if result.contains(pattern.as_str()) {
                result = result.replace(pattern.as_str(), replacement);
            }
        }
        result
    }

    /// Iterate rules in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Split a line on commas, dropping trailing empty fields.
fn split_record(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Trim ASCII control characters and spaces, leaving other whitespace intact.
fn trim_field(field: &str) -> &str {
    field.trim_matches(|c: char| c <= ' ')
}
