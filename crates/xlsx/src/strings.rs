//! The workbook's shared string table.

use std::collections::HashMap;
use transfont_core::{Error, Result, Run};
use transfont_ooxml::{Element, Package, XmlDocument};

/// Shared strings loaded from `sharedStrings.xml`.
///
/// Items are never rewritten in place: several cells may point at the same
/// item, and substituting it once per cell would chain the rules. A
/// replaced value is interned as a new plain item instead.
#[derive(Debug, Default)]
pub struct SharedStrings {
    part: Option<(String, XmlDocument)>,
    items: Vec<Vec<Run>>,
    plain: HashMap<String, usize>,
    dirty: bool,
}

impl SharedStrings {
    /// A workbook without a shared string part.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index the items of a parsed shared string part.
    pub fn load(name: impl Into<String>, doc: XmlDocument) -> Self {
        let mut items = Vec::new();
        let mut plain = HashMap::new();

        for (idx, si) in doc.root().elements().filter(|e| e.is("si")).enumerate() {
            let runs = string_item_runs(si);
            if is_plain(si) {
                plain.entry(concat(&runs)).or_insert(idx);
            }
            items.push(runs);
        }

        Self {
            part: Some((name.into(), doc)),
            items,
            plain,
            dirty: false,
        }
    }

    /// Runs of item `idx`.
    pub fn runs(&self, idx: usize) -> Option<&[Run]> {
        self.items.get(idx).map(Vec::as_slice)
    }

    /// Full text of item `idx`.
    pub fn text(&self, idx: usize) -> Option<String> {
        self.items.get(idx).map(|runs| concat(runs))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of a plain item holding `text`, appending one if needed.
    pub fn intern(&mut self, text: &str) -> Result<usize> {
        if let Some(&idx) = self.plain.get(text) {
            return Ok(idx);
        }

        let (_, doc) = self
            .part
            .as_mut()
            .ok_or_else(|| Error::MissingPart("shared strings".to_string()))?;
        let root = doc.root_mut();
        let t = root
            .sibling("t")
            .with_attr("xml:space", "preserve")
            .with_text(text);
        let si = root.sibling("si").with_child(t);
        root.push(si);

        let idx = self.items.len();
        self.items.push(vec![Run::new(text)]);
        self.plain.insert(text.to_string(), idx);
        self.dirty = true;
        Ok(idx)
    }

    /// Write the part back if items were added.
    pub fn store(&mut self, package: &mut Package) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some((name, doc)) = self.part.as_mut() {
            let root = doc.root_mut();
            if root.attr("uniqueCount").is_some() {
                root.set_attr("uniqueCount", &self.items.len().to_string());
            }
            package.set_xml_part(name, doc)?;
        }
        self.dirty = false;
        Ok(())
    }
}

/// Runs of a rich string body (`si` or `is`). Phonetic runs are excluded.
pub fn string_item_runs(item: &Element) -> Vec<Run> {
    let mut runs = Vec::new();
    for child in item.elements() {
        if child.is("t") {
            runs.push(Run::new(child.text()));
        } else if child.is("r") {
            runs.push(Run {
                text: child.child("t").map(Element::text).unwrap_or_default(),
                font: child
                    .find(&["rPr", "rFont"])
                    .and_then(|f| f.attr("val")),
            });
        }
    }
    runs
}

fn is_plain(item: &Element) -> bool {
    let mut elements = item.elements();
    matches!((elements.next(), elements.next()), (Some(t), None) if t.is("t"))
}

fn concat(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}
