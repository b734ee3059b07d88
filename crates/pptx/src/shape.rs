//! Shape text bodies as text containers.

use transfont_core::{FontSpec, FontTarget, Result, Run, TextContainer};
use transfont_ooxml::{Element, Node};

/// `a:rPr` children in schema order, from the first font slot onward.
const RPR_TAIL: &[&str] = &[
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// Font slots written on every run.
const FONT_SLOTS: &[&str] = &["latin", "ea", "cs"];

/// A `p:txBody` element.
pub struct ShapeText<'a> {
    body: &'a mut Element,
}

impl<'a> ShapeText<'a> {
    pub fn new(body: &'a mut Element) -> Self {
        Self { body }
    }

    /// Number of `a:p` paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.body.elements().filter(|e| e.is("p")).count()
    }
}

impl FontTarget for ShapeText<'_> {
    fn apply_font(&mut self, font: &FontSpec) -> Result<bool> {
        let mut applied = false;
        for paragraph in self.body.elements_mut().filter(|e| e.is("p")) {
            for run in paragraph.elements_mut().filter(|e| is_text_run(e)) {
                set_run_font(run, font.name());
                applied = true;
            }
        }
        Ok(applied)
    }
}

impl TextContainer for ShapeText<'_> {
    fn text(&self) -> Option<String> {
        let mut out = String::new();
        for paragraph in self.body.elements().filter(|e| e.is("p")) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&paragraph_text(paragraph));
        }
        Some(out)
    }

    fn runs(&self) -> Vec<Run> {
        self.body
            .elements()
            .filter(|e| e.is("p"))
            .flat_map(|p| p.elements().filter(|e| is_text_run(e)))
            .map(|r| Run {
                text: r.child("t").map(Element::text).unwrap_or_default(),
                font: r
                    .find(&["rPr", "latin"])
                    .and_then(|latin| latin.attr("typeface")),
            })
            .collect()
    }

    fn replace_runs(&mut self, runs: Vec<Run>) -> Result<()> {
        let prefix = drawing_prefix(self.body);
        self.body.retain_elements(|e| !e.is("p"));

        let mut paragraph = Element::new(format!("{}p", prefix));
        for run in runs.iter().filter(|r| !r.text.is_empty()) {
            let mut element = paragraph.sibling("r");
            if let Some(font) = &run.font {
                set_run_font(&mut element, font);
            }
            let t = element.sibling("t").with_text(&run.text);
            element.push(t);
            paragraph.push(element);
        }
        self.body.push(paragraph);
        Ok(())
    }
}

/// Prefix bound to DrawingML in a text body. The body itself lives in the
/// PresentationML namespace, so the prefix is taken from its children.
fn drawing_prefix(body: &Element) -> String {
    body.elements()
        .find(|e| e.is("p") || e.is("bodyPr") || e.is("lstStyle"))
        .map(Element::prefix)
        .unwrap_or_else(|| "a:".to_string())
}

fn is_text_run(element: &Element) -> bool {
    element.is("r") || element.is("fld")
}

fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    for child in paragraph.elements() {
        if is_text_run(child) {
            if let Some(t) = child.child("t") {
                out.push_str(&t.text());
            }
        } else if child.is("br") {
            out.push('\n');
        }
    }
    out
}

/// Set `typeface` on the Latin, East Asian and complex-script slots of a
/// run, creating `a:rPr` and the slots in schema order where missing.
fn set_run_font(run: &mut Element, font: &str) {
    if run.child("rPr").is_none() {
        let rpr = run.sibling("rPr");
        run.insert(0, rpr);
    }
    let Some(rpr) = run.child_mut("rPr") else {
        return;
    };

    for (i, slot) in FONT_SLOTS.iter().enumerate() {
        if rpr.child(slot).is_none() {
            let later = &RPR_TAIL[i + 1..];
            let index = rpr
                .children()
                .iter()
                .position(|n| matches!(n, Node::Element(e) if later.iter().any(|l| e.is(l))))
                .unwrap_or(rpr.children().len());
            let element = rpr.sibling(slot);
            rpr.insert(index, element);
        }
        if let Some(element) = rpr.child_mut(slot) {
            element.set_attr("typeface", font);
        }
    }
}
