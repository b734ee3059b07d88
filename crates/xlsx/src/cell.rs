//! Worksheet cells as text containers.

use crate::strings::{string_item_runs, SharedStrings};
use crate::styles::Stylesheet;
use transfont_core::{Error, FontSpec, FontTarget, Result, Run, TextContainer};
use transfont_ooxml::Element;

/// Where a cell keeps its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    /// `t="s"`: index into the shared string table.
    Shared(usize),
    /// `t="inlineStr"`: an `is` body inside the cell.
    Inline,
    /// `t="str"` without a formula: the string sits directly in `v`.
    Literal,
    /// Numbers, booleans, errors, formula results and empty cells.
    Value,
}

/// A `c` element together with the workbook tables it refers to.
pub struct Cell<'a> {
    element: &'a mut Element,
    strings: &'a mut SharedStrings,
    styles: &'a mut Stylesheet,
    storage: Storage,
}

impl<'a> Cell<'a> {
    /// Classify a cell. A shared-string index outside the table is an error.
    pub fn new(
        element: &'a mut Element,
        strings: &'a mut SharedStrings,
        styles: &'a mut Stylesheet,
    ) -> Result<Self> {
        let storage = match element.attr("t").as_deref() {
            Some("s") => match element.child("v") {
                Some(v) => {
                    let raw = v.text();
                    let idx = raw
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|&i| i < strings.len())
                        .ok_or_else(|| {
                            Error::CorruptedFile(format!(
                                "cell {} refers to missing shared string {:?}",
                                element.attr("r").unwrap_or_default(),
                                raw
                            ))
                        })?;
                    Storage::Shared(idx)
                }
                None => Storage::Value,
            },
            Some("inlineStr") => Storage::Inline,
            Some("str") if element.child("f").is_none() => Storage::Literal,
            _ => Storage::Value,
        };

        Ok(Self {
            element,
            strings,
            styles,
            storage,
        })
    }

    /// Cell format index; cells without `s` use format 0.
    pub fn format(&self) -> usize {
        self.element
            .attr("s")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }
}

impl FontTarget for Cell<'_> {
    fn apply_font(&mut self, font: &FontSpec) -> Result<bool> {
        match self.styles.restyle(self.format(), font)? {
            Some(xf) => {
                self.element.set_attr("s", &xf.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl TextContainer for Cell<'_> {
    fn text(&self) -> Option<String> {
        match self.storage {
            Storage::Shared(idx) => self.strings.text(idx),
            Storage::Inline => Some(concat(&self.runs())),
            Storage::Literal => Some(self.element.child("v").map(Element::text).unwrap_or_default()),
            Storage::Value => None,
        }
    }

    fn runs(&self) -> Vec<Run> {
        match self.storage {
            Storage::Shared(idx) => self.strings.runs(idx).map(<[Run]>::to_vec).unwrap_or_default(),
            Storage::Inline => self
                .element
                .child("is")
                .map(string_item_runs)
                .unwrap_or_default(),
            Storage::Literal => self
                .element
                .child("v")
                .map(|v| vec![Run::new(v.text())])
                .unwrap_or_default(),
            Storage::Value => Vec::new(),
        }
    }

    fn replace_runs(&mut self, runs: Vec<Run>) -> Result<()> {
        let text = concat(&runs);
        match self.storage {
            Storage::Shared(_) => {
                let idx = self.strings.intern(&text)?;
                if let Some(v) = self.element.child_mut("v") {
                    v.clear();
                    v.push_text(&idx.to_string());
                }
                self.storage = Storage::Shared(idx);
            }
            Storage::Inline => {
                if self.element.child("is").is_none() {
                    let body = self.element.sibling("is");
                    self.element.push(body);
                }
                if let Some(body) = self.element.child_mut("is") {
                    body.clear();
                    let t = body
                        .sibling("t")
                        .with_attr("xml:space", "preserve")
                        .with_text(&text);
                    body.push(t);
                }
            }
            Storage::Literal => {
                if self.element.child("v").is_none() {
                    let v = self.element.sibling("v");
                    self.element.push(v);
                }
                if let Some(v) = self.element.child_mut("v") {
                    v.clear();
                    v.push_text(&text);
                }
            }
            Storage::Value => {}
        }
        Ok(())
    }
}

fn concat(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}
