//! The per-format document visitor contract.

use crate::{DocumentFormat, DocumentStats, FormatNormalizer, ReplacementTable, Result};

/// Read-only state shared by every document in one run.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub table: &'a ReplacementTable,
    pub normalizer: &'a FormatNormalizer,
}

impl<'a> RewriteContext<'a> {
    pub fn new(table: &'a ReplacementTable, normalizer: &'a FormatNormalizer) -> Self {
        Self { table, normalizer }
    }
}

/// A rewritten document ready to be written back.
#[derive(Debug)]
pub struct Rewritten {
    /// Serialized container bytes.
    pub bytes: Vec<u8>,

    /// What the visitor touched.
    pub stats: DocumentStats,
}

/// Walks one document format, substituting text and normalizing fonts.
pub trait DocumentVisitor {
    /// The container format this visitor handles.
    fn format(&self) -> DocumentFormat;

    /// Parse `data`, rewrite every text container, and serialize the result.
    fn rewrite(&self, data: &[u8], ctx: &RewriteContext<'_>) -> Result<Rewritten>;
}
