//! Word-processing (.docx) document visitor.
//!
//! Every body paragraph is substituted and rebuilt into a single run in the
//! configured font. Paragraphs inside tables, headers and footers are not
//! body paragraphs and are left alone.

pub mod paragraph;

pub use paragraph::Paragraph;

use transfont_core::{
    DocumentFormat, DocumentStats, DocumentVisitor, Error, Result, RewriteContext, Rewritten,
};
use transfont_ooxml::{Element, Package};

/// Visitor for .docx packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxVisitor;

impl DocxVisitor {
    /// Create a new word-processing visitor.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentVisitor for DocxVisitor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn rewrite(&self, data: &[u8], ctx: &RewriteContext<'_>) -> Result<Rewritten> {
        let mut package = Package::from_bytes(data)?;
        let main = package.main_part()?;
        log::debug!("Rewriting paragraphs in {}", main);

        let mut document = package.xml_part(&main)?;
        let stats = rewrite_body(document.root_mut(), ctx)?;
        package.set_xml_part(&main, &document)?;

        Ok(Rewritten {
            bytes: package.to_bytes()?,
            stats,
        })
    }
}

/// Substitute and rebuild each direct `w:p` child of `w:body`.
pub fn rewrite_body(document: &mut Element, ctx: &RewriteContext<'_>) -> Result<DocumentStats> {
    let body = document
        .child_mut("body")
        .ok_or_else(|| Error::CorruptedFile("document has no body".to_string()))?;

    let mut stats = DocumentStats::default();
    for element in body.elements_mut().filter(|e| e.is("p")) {
        let mut paragraph = Paragraph::new(element);
        stats.record(ctx.normalizer.normalize(&mut paragraph, ctx.table)?);
    }
    Ok(stats)
}
