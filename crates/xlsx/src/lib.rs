//! Spreadsheet (.xlsx) document visitor.
//!
//! Cells are visited sheet by sheet, row by row, in document order.
//! Textual cells are substituted; every cell, textual or not, is moved to
//! a copy of its cell format that uses the configured font.

pub mod cell;
pub mod strings;
pub mod styles;

pub use cell::Cell;
pub use strings::SharedStrings;
pub use styles::Stylesheet;

use transfont_core::{DocumentFormat, DocumentStats, DocumentVisitor, Result, RewriteContext, Rewritten};
use transfont_ooxml::{Element, Package, Relationships};

/// Visitor for .xlsx packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxVisitor;

impl XlsxVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentVisitor for XlsxVisitor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xlsx
    }

    fn rewrite(&self, data: &[u8], ctx: &RewriteContext<'_>) -> Result<Rewritten> {
        let mut package = Package::from_bytes(data)?;
        let workbook_name = package.main_part()?;
        let workbook = package.xml_part(&workbook_name)?;
        let rels = package.relationships(&workbook_name)?;

        let mut strings = match existing_part(&package, &rels, "sharedStrings") {
            Some(name) => {
                let doc = package.xml_part(&name)?;
                SharedStrings::load(name, doc)
            }
            None => SharedStrings::empty(),
        };
        let mut styles = match existing_part(&package, &rels, "styles") {
            Some(name) => {
                let doc = package.xml_part(&name)?;
                Stylesheet::load(name, doc)
            }
            None => {
                log::warn!("Workbook has no stylesheet; cell fonts are left unchanged");
                Stylesheet::missing()
            }
        };

        let mut stats = DocumentStats::default();
        for name in sheet_parts(workbook.root(), &rels) {
            log::debug!("Rewriting cells in {}", name);
            let mut sheet = package.xml_part(&name)?;
            stats.merge(rewrite_sheet(
                sheet.root_mut(),
                &mut strings,
                &mut styles,
                ctx,
            )?);
            package.set_xml_part(&name, &sheet)?;
        }

        strings.store(&mut package)?;
        styles.store(&mut package)?;

        Ok(Rewritten {
            bytes: package.to_bytes()?,
            stats,
        })
    }
}

/// Worksheet part names in workbook order. Chartsheets, dialog sheets and
/// sheets whose relationship is missing are skipped.
pub fn sheet_parts(workbook: &Element, rels: &Relationships) -> Vec<String> {
    let Some(sheets) = workbook.child("sheets") else {
        return Vec::new();
    };
    sheets
        .elements()
        .filter(|e| e.is("sheet"))
        .filter_map(|sheet| {
            let id = sheet.namespaced_attr("id")?;
            let rel = rels.by_id(&id)?;
            if !rel.is_kind("worksheet") {
                return None;
            }
            rels.target_of(&id)
        })
        .collect()
}

/// Normalize every cell of one worksheet.
pub fn rewrite_sheet(
    worksheet: &mut Element,
    strings: &mut SharedStrings,
    styles: &mut Stylesheet,
    ctx: &RewriteContext<'_>,
) -> Result<DocumentStats> {
    let mut stats = DocumentStats::default();
    let Some(data) = worksheet.child_mut("sheetData") else {
        return Ok(stats);
    };

    for row in data.elements_mut().filter(|e| e.is("row")) {
        for element in row.elements_mut().filter(|e| e.is("c")) {
            let mut cell = Cell::new(element, strings, styles)?;
            stats.record(ctx.normalizer.normalize(&mut cell, ctx.table)?);
        }
    }
    Ok(stats)
}

fn existing_part(package: &Package, rels: &Relationships, kind: &str) -> Option<String> {
    rels.first_of_kind(kind).filter(|name| package.contains(name))
}
