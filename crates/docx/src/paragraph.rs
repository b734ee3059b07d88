//! Word-processing paragraphs as text containers.

use transfont_core::{FontSpec, FontTarget, Result, Run, TextContainer};
use transfont_ooxml::{Element, Node};

/// Elements whose runs belong to the enclosing paragraph's visible text.
const RUN_WRAPPERS: &[&str] = &[
    "hyperlink",
    "smartTag",
    "fldSimple",
    "ins",
    "moveTo",
    "customXml",
    "sdt",
    "sdtContent",
];

/// Paragraph children removed when the runs are rebuilt. Deleted and
/// moved-away text goes with them.
const RUN_CONTENT: &[&str] = &[
    "r",
    "hyperlink",
    "smartTag",
    "fldSimple",
    "ins",
    "del",
    "moveTo",
    "moveFrom",
    "customXml",
    "sdt",
];

/// `w:rFonts` attributes that name a typeface directly.
const FONT_SLOTS: &[&str] = &["ascii", "hAnsi", "eastAsia", "cs"];

/// `w:rFonts` attributes that bind a theme font and would override the name.
const THEME_SLOTS: &[&str] = &["asciiTheme", "hAnsiTheme", "eastAsiaTheme", "cstheme"];

/// A `w:p` element.
pub struct Paragraph<'a> {
    element: &'a mut Element,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a mut Element) -> Self {
        Self { element }
    }
}

impl FontTarget for Paragraph<'_> {
    fn apply_font(&mut self, font: &FontSpec) -> Result<bool> {
        let mut applied = false;
        for_each_run_mut(self.element, &mut |run| {
            set_run_font(run, font.name());
            applied = true;
        });
        Ok(applied)
    }
}

impl TextContainer for Paragraph<'_> {
    fn text(&self) -> Option<String> {
        let mut runs = Vec::new();
        collect_runs(self.element, &mut runs);
        Some(runs.into_iter().map(run_text).collect())
    }

    fn runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        collect_runs(self.element, &mut runs);
        runs.into_iter()
            .map(|r| Run {
                text: run_text(r),
                font: run_font(r),
            })
            .collect()
    }

    fn replace_runs(&mut self, runs: Vec<Run>) -> Result<()> {
        self.element
            .retain_elements(|e| !RUN_CONTENT.iter().any(|name| e.is(name)));
        for run in &runs {
            let built = build_run(self.element, run);
            self.element.push(built);
        }
        Ok(())
    }
}

fn is_wrapper(element: &Element) -> bool {
    RUN_WRAPPERS.iter().any(|name| element.is(name))
}

fn collect_runs<'e>(element: &'e Element, out: &mut Vec<&'e Element>) {
    for child in element.elements() {
        if child.is("r") {
            out.push(child);
        } else if is_wrapper(child) {
            collect_runs(child, out);
        }
    }
}

fn for_each_run_mut(element: &mut Element, f: &mut dyn FnMut(&mut Element)) {
    for child in element.elements_mut() {
        if child.is("r") {
            f(child);
        } else if is_wrapper(child) {
            for_each_run_mut(child, f);
        }
    }
}

/// Visible text of a `w:r`.
fn run_text(run: &Element) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.local_name() {
            b"t" => out.push_str(&child.text()),
            b"tab" => out.push('\t'),
            b"br" | b"cr" => out.push('\n'),
            b"noBreakHyphen" => out.push('\u{2011}'),
            _ => {}
        }
    }
    out
}

fn run_font(run: &Element) -> Option<String> {
    run.find(&["rPr", "rFonts"])
        .and_then(|fonts| fonts.namespaced_attr("ascii"))
}

/// Point every typeface slot of a run at `font`.
fn set_run_font(run: &mut Element, font: &str) {
    if run.child("rPr").is_none() {
        let rpr = run.sibling("rPr");
        run.insert(0, rpr);
    }
    let Some(rpr) = run.child_mut("rPr") else {
        return;
    };

    if rpr.child("rFonts").is_none() {
        // rFonts follows an optional rStyle.
        let index = rpr
            .children()
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is("rStyle")))
            .map_or(0, |i| i + 1);
        let fonts = rpr.sibling("rFonts");
        rpr.insert(index, fonts);
    }

    let prefix = rpr.prefix();
    if let Some(fonts) = rpr.child_mut("rFonts") {
        for slot in FONT_SLOTS {
            fonts.set_attr(&format!("{}{}", prefix, slot), font);
        }
        for slot in THEME_SLOTS {
            fonts.remove_attr(&format!("{}{}", prefix, slot));
        }
    }
}

/// Build a `w:r` for `run`. Tabs and line breaks become `w:tab` and
/// `w:br` inside the same run.
fn build_run(paragraph: &Element, run: &Run) -> Element {
    let mut element = paragraph.sibling("r");
    if let Some(font) = &run.font {
        set_run_font(&mut element, font);
    }

    let mut segment = String::new();
    for ch in run.text.chars() {
        let marker = match ch {
            '\t' => "tab",
            '\n' => "br",
            _ => {
                segment.push(ch);
                continue;
            }
        };
        push_text(&mut element, &mut segment);
        let child = element.sibling(marker);
        element.push(child);
    }
    push_text(&mut element, &mut segment);

    element
}

fn push_text(run: &mut Element, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    let t = run
        .sibling("t")
        .with_attr("xml:space", "preserve")
        .with_text(segment);
    run.push(t);
    segment.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfont_core::{FormatNormalizer, ReplacementTable};
    use transfont_ooxml::XmlDocument;

    fn paragraph_xml(inner: &str) -> XmlDocument {
        let xml = format!(
            "<w:p xmlns:w=\"urn:w\"><w:pPr><w:jc w:val=\"center\"/></w:pPr>{}</w:p>",
            inner
        );
        XmlDocument::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_text_spans_runs_and_wrappers() {
        let mut doc = paragraph_xml(
            "<w:r><w:t>Hello</w:t></w:r>\
             <w:hyperlink r:id=\"rId4\"><w:r><w:t xml:space=\"preserve\"> big</w:t></w:r></w:hyperlink>\
             <w:r><w:tab/><w:t>world</w:t><w:br/></w:r>\
             <w:del><w:r><w:delText>gone</w:delText></w:r></w:del>",
        );
        let paragraph = Paragraph::new(doc.root_mut());
        assert_eq!(paragraph.text().as_deref(), Some("Hello big\tworld\n"));
        assert_eq!(paragraph.runs().len(), 3);
    }

    #[test]
    fn test_rebuild_keeps_properties_and_markers() {
        let mut doc = paragraph_xml(
            "<w:bookmarkStart w:id=\"0\" w:name=\"x\"/>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Hel</w:t></w:r>\
             <w:r><w:rPr><w:i/></w:rPr><w:t>lo</w:t></w:r>\
             <w:bookmarkEnd w:id=\"0\"/>",
        );
        let table = ReplacementTable::load([["Hello", "Bye"]]);
        let normalizer = FormatNormalizer::default();
        {
            let mut paragraph = Paragraph::new(doc.root_mut());
            let outcome = normalizer.normalize(&mut paragraph, &table).unwrap();
            assert!(outcome.changed);
            assert_eq!(outcome.runs_discarded, 2);
        }

        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(
            out,
            "<w:p xmlns:w=\"urn:w\"><w:pPr><w:jc w:val=\"center\"/></w:pPr>\
             <w:bookmarkStart w:id=\"0\" w:name=\"x\"/><w:bookmarkEnd w:id=\"0\"/>\
             <w:r><w:rPr><w:rFonts w:ascii=\"BIZ UDGothic\" w:hAnsi=\"BIZ UDGothic\" \
             w:eastAsia=\"BIZ UDGothic\" w:cs=\"BIZ UDGothic\"/></w:rPr>\
             <w:t xml:space=\"preserve\">Bye</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_rebuilt_run_reads_back_identically() {
        let mut doc = paragraph_xml("<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r>");
        let table = ReplacementTable::load([["b", "B"]]);
        let mut paragraph = Paragraph::new(doc.root_mut());
        FormatNormalizer::default()
            .normalize(&mut paragraph, &table)
            .unwrap();

        let runs = paragraph.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "a\tB\nc");
        assert_eq!(runs[0].font.as_deref(), Some("BIZ UDGothic"));
    }

    #[test]
    fn test_empty_paragraph_has_no_runs() {
        let mut doc = paragraph_xml("<w:r><w:rPr><w:b/></w:rPr></w:r>");
        let mut paragraph = Paragraph::new(doc.root_mut());
        let outcome = FormatNormalizer::default()
            .normalize(&mut paragraph, &ReplacementTable::new())
            .unwrap();

        assert!(!outcome.font_applied);
        assert!(paragraph.runs().is_empty());
    }

    #[test]
    fn test_set_run_font_order_and_theme_binding() {
        let mut run = Element::new("w:r").with_child(
            Element::new("w:rPr")
                .with_child(Element::new("w:rStyle").with_attr("w:val", "Strong"))
                .with_child(Element::new("w:b")),
        );
        set_run_font(&mut run, "Mono");
        let names: Vec<&[u8]> = run
            .child("rPr")
            .unwrap()
            .elements()
            .map(|e| e.local_name())
            .collect();
        assert_eq!(names, vec![&b"rStyle"[..], &b"rFonts"[..], &b"b"[..]]);

        let mut themed = Element::new("w:r").with_child(
            Element::new("w:rPr").with_child(
                Element::new("w:rFonts")
                    .with_attr("w:asciiTheme", "minorHAnsi")
                    .with_attr("w:cstheme", "minorBidi"),
            ),
        );
        set_run_font(&mut themed, "Mono");
        let fonts = themed.find(&["rPr", "rFonts"]).unwrap();
        assert_eq!(fonts.attr("w:asciiTheme"), None);
        assert_eq!(fonts.attr("w:cstheme"), None);
        assert_eq!(fonts.attr("w:ascii").as_deref(), Some("Mono"));
    }
}
