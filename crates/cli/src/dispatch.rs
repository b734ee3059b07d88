//! Routing files to the visitor for their format.

use std::fs;
use std::path::Path;
use transfont_core::{
    DocumentFormat, DocumentStats, DocumentVisitor, Error, FileOutcome, FileReport, Result,
    RewriteContext,
};
use transfont_docx::DocxVisitor;
use transfont_pptx::PptxVisitor;
use transfont_xlsx::XlsxVisitor;

/// Classifies files by extension and rewrites them in place.
#[derive(Debug, Default)]
pub struct FileDispatcher {
    docx: DocxVisitor,
    xlsx: XlsxVisitor,
    pptx: PptxVisitor,
}

impl FileDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visitor responsible for `format`.
    pub fn visitor(&self, format: DocumentFormat) -> &dyn DocumentVisitor {
        match format {
            DocumentFormat::Docx => &self.docx,
            DocumentFormat::Xlsx => &self.xlsx,
            DocumentFormat::Pptx => &self.pptx,
        }
    }

    /// Rewrite one file and report the outcome. Never fails: errors are
    /// logged and recorded in the report.
    pub fn dispatch(&self, path: &Path, ctx: &RewriteContext<'_>) -> FileReport {
        if DocumentFormat::from_path(path).is_none() {
            log::debug!("Skipping {}", path.display());
            return FileReport::new(path, FileOutcome::Skipped);
        }

        let outcome = match self.rewrite_file(path, ctx) {
            Ok(stats) => {
                log::info!(
                    "Rewrote {} ({} containers, {} changed)",
                    path.display(),
                    stats.containers,
                    stats.changed
                );
                FileOutcome::Rewritten(stats)
            }
            Err(e) => {
                log::error!("Failed to process {}: {}", path.display(), e);
                FileOutcome::Failed(e.to_string())
            }
        };
        FileReport::new(path, outcome)
    }

    /// Read, rewrite and overwrite `path`. The file is only written once the
    /// new contents are complete.
    pub fn rewrite_file(&self, path: &Path, ctx: &RewriteContext<'_>) -> Result<DocumentStats> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        let data = fs::read(path)?;
        let rewritten = self.visitor(format).rewrite(&data, ctx)?;
        fs::write(path, &rewritten.bytes)?;
        Ok(rewritten.stats)
    }
}
