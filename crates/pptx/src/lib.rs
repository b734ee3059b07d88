//! Presentation (.pptx) document visitor.
//!
//! Text shapes on every slide and every slide master are substituted and
//! rebuilt. Each master's theme then has its major and minor Latin
//! typefaces replaced, so placeholder text that inherits from the theme
//! picks up the font as well.

pub mod shape;
pub mod theme;

pub use shape::ShapeText;
pub use theme::ThemeFontSlot;

use std::collections::HashSet;
use transfont_core::{
    ContainerOutcome, DocumentFormat, DocumentStats, DocumentVisitor, Result, RewriteContext,
    Rewritten,
};
use transfont_ooxml::{Element, Package, Relationships};

/// Visitor for .pptx packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxVisitor;

impl PptxVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentVisitor for PptxVisitor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn rewrite(&self, data: &[u8], ctx: &RewriteContext<'_>) -> Result<Rewritten> {
        let mut package = Package::from_bytes(data)?;
        let presentation_name = package.main_part()?;
        let presentation = package.xml_part(&presentation_name)?;
        let rels = package.relationships(&presentation_name)?;

        let slides = listed_parts(presentation.root(), "sldIdLst", &rels, "slide");
        let masters = listed_parts(presentation.root(), "sldMasterIdLst", &rels, "slideMaster");

        let mut stats = DocumentStats::default();
        for name in slides.iter().chain(&masters) {
            log::debug!("Rewriting shapes in {}", name);
            let mut part = package.xml_part(name)?;
            stats.merge(rewrite_shapes(part.root_mut(), ctx)?);
            package.set_xml_part(name, &part)?;
        }

        // Several masters may share one theme.
        let mut themes = HashSet::new();
        for master in &masters {
            let theme = package
                .relationships(master)?
                .first_of_kind("theme")
                .filter(|name| package.contains(name));
            let Some(theme) = theme else {
                log::debug!("{} has no theme", master);
                continue;
            };
            if !themes.insert(theme.clone()) {
                continue;
            }

            let mut part = package.xml_part(&theme)?;
            let theme_stats = rewrite_theme(part.root_mut(), ctx)?;
            if theme_stats.fonts_applied > 0 {
                package.set_xml_part(&theme, &part)?;
            }
            stats.merge(theme_stats);
        }

        Ok(Rewritten {
            bytes: package.to_bytes()?,
            stats,
        })
    }
}

/// Parts listed in `p:<list>` of `presentation.xml`, in list order, whose
/// relationship is of `kind`.
pub fn listed_parts(
    presentation: &Element,
    list: &str,
    rels: &Relationships,
    kind: &str,
) -> Vec<String> {
    let Some(entries) = presentation.child(list) else {
        return Vec::new();
    };
    entries
        .elements()
        .filter_map(|entry| {
            let id = entry.namespaced_attr("id")?;
            if !rels.by_id(&id)?.is_kind(kind) {
                return None;
            }
            rels.target_of(&id)
        })
        .collect()
}

/// Normalize the text body of every top-level shape on a slide or master.
pub fn rewrite_shapes(root: &mut Element, ctx: &RewriteContext<'_>) -> Result<DocumentStats> {
    let mut stats = DocumentStats::default();
    let Some(tree) = root.find_mut(&["cSld", "spTree"]) else {
        return Ok(stats);
    };

    for shape in tree.elements_mut().filter(|e| e.is("sp")) {
        if let Some(body) = shape.child_mut("txBody") {
            let mut text = ShapeText::new(body);
            stats.record(ctx.normalizer.normalize(&mut text, ctx.table)?);
        }
    }
    Ok(stats)
}

/// Point the theme's major and minor Latin typefaces at the configured font.
pub fn rewrite_theme(part: &mut Element, ctx: &RewriteContext<'_>) -> Result<DocumentStats> {
    let mut stats = DocumentStats::default();
    let Some(scheme) = theme::font_scheme(part) else {
        return Ok(stats);
    };

    for slot in theme::SCHEME_SLOTS {
        if let Some(element) = scheme.child_mut(slot) {
            let font_applied = ctx.normalizer.apply_font(&mut ThemeFontSlot::new(element))?;
            stats.record(ContainerOutcome {
                font_applied,
                ..ContainerOutcome::default()
            });
        }
    }
    Ok(stats)
}
