//! Cell formats and fonts in `styles.xml`.

use std::collections::HashMap;
use transfont_core::{Error, FontSpec, Result};
use transfont_ooxml::{Element, Node, Package, XmlDocument};

/// Stylesheet children preceding `fonts`.
const BEFORE_FONTS: &[&str] = &["numFmts"];

/// Stylesheet children preceding `cellXfs`.
const BEFORE_CELL_XFS: &[&str] = &["numFmts", "fonts", "fills", "borders", "cellStyleXfs"];

/// The workbook stylesheet, with one registered font and a clone of each
/// cell format that points at it.
#[derive(Debug, Default)]
pub struct Stylesheet {
    part: Option<(String, XmlDocument)>,
    font_id: Option<usize>,
    clones: HashMap<usize, usize>,
}

impl Stylesheet {
    /// A workbook without a stylesheet part. Restyling is a no-op.
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn load(name: impl Into<String>, doc: XmlDocument) -> Self {
        Self {
            part: Some((name.into(), doc)),
            font_id: None,
            clones: HashMap::new(),
        }
    }

    /// Format index equal to cell format `xf` except for its font.
    ///
    /// The first call registers the font. Each distinct `xf` is cloned
    /// once; later calls return the same clone. Returns `None` when the
    /// workbook has no stylesheet.
    pub fn restyle(&mut self, xf: usize, font: &FontSpec) -> Result<Option<usize>> {
        let Some((_, doc)) = self.part.as_mut() else {
            return Ok(None);
        };
        if let Some(&id) = self.clones.get(&xf) {
            return Ok(Some(id));
        }

        let root = doc.root_mut();
        let font_id = match self.font_id {
            Some(id) => id,
            None => {
                let id = register_font(root, font)?;
                self.font_id = Some(id);
                id
            }
        };

        let id = clone_format(root, xf, font_id)?;
        self.clones.insert(xf, id);
        Ok(Some(id))
    }

    /// Write the part back if formats were added.
    pub fn store(&self, package: &mut Package) -> Result<()> {
        match &self.part {
            Some((name, doc)) if !self.clones.is_empty() => package.set_xml_part(name, doc),
            _ => Ok(()),
        }
    }
}

/// Append a copy of the default font renamed to `font`.
///
/// The `scheme` binding is dropped because it would make the theme font
/// win over the name.
fn register_font(stylesheet: &mut Element, font: &FontSpec) -> Result<usize> {
    let fonts = ensure_child(stylesheet, "fonts", BEFORE_FONTS)?;

    let mut entry = fonts
        .child("font")
        .cloned()
        .unwrap_or_else(|| fonts.sibling("font"));
    entry.retain_elements(|e| !e.is("name") && !e.is("scheme"));
    let name = entry.sibling("name").with_attr("val", font.name());
    entry.push(name);
    fonts.push(entry);

    Ok(push_counted(fonts, "font"))
}

/// Append a copy of `cellXfs[xf]` using `font_id`.
fn clone_format(stylesheet: &mut Element, xf: usize, font_id: usize) -> Result<usize> {
    let cell_xfs = ensure_child(stylesheet, "cellXfs", BEFORE_CELL_XFS)?;

    let mut format = cell_xfs
        .elements()
        .filter(|e| e.is("xf"))
        .nth(xf)
        .cloned()
        .unwrap_or_else(|| {
            cell_xfs
                .sibling("xf")
                .with_attr("numFmtId", "0")
                .with_attr("fontId", "0")
                .with_attr("fillId", "0")
                .with_attr("borderId", "0")
                .with_attr("xfId", "0")
        });
    format.set_attr("fontId", &font_id.to_string());
    format.set_attr("applyFont", "1");
    cell_xfs.push(format);

    Ok(push_counted(cell_xfs, "xf"))
}

/// Refresh `count` after an append and return the new item's index.
fn push_counted(list: &mut Element, item: &str) -> usize {
    let count = list.elements().filter(|e| e.is(item)).count();
    list.set_attr("count", &count.to_string());
    count - 1
}

/// Find the child `local`, creating it after the last of `after` if absent.
fn ensure_child<'e>(
    parent: &'e mut Element,
    local: &str,
    after: &[&str],
) -> Result<&'e mut Element> {
    if parent.child(local).is_none() {
        let index = parent
            .children()
            .iter()
            .rposition(|n| match n {
                Node::Element(e) => after.iter().any(|name| e.is(name)),
                _ => false,
            })
            .map_or(0, |i| i + 1);
        let child = parent.sibling(local).with_attr("count", "0");
        parent.insert(index, child);
    }
    parent
        .child_mut(local)
        .ok_or_else(|| Error::XmlError(format!("stylesheet has no {}", local)))
}

/// Font name of cell format `xf`, following its `fontId`.
pub fn format_font_name(stylesheet: &Element, xf: usize) -> Option<String> {
    let font_id: usize = stylesheet
        .child("cellXfs")?
        .elements()
        .filter(|e| e.is("xf"))
        .nth(xf)?
        .attr("fontId")?
        .parse()
        .ok()?;
    stylesheet
        .child("fonts")?
        .elements()
        .filter(|e| e.is("font"))
        .nth(font_id)?
        .child("name")?
        .attr("val")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<styleSheet xmlns="urn:x"><numFmts count="1"><numFmt numFmtId="164" formatCode="0.0"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill/></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="1" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"><alignment horizontal="center"/></xf></cellXfs></styleSheet>"#;

    fn load() -> Stylesheet {
        Stylesheet::load("xl/styles.xml", XmlDocument::parse(STYLES.as_bytes()).unwrap())
    }

    fn root(styles: &Stylesheet) -> &Element {
        styles.part.as_ref().unwrap().1.root()
    }

    #[test]
    fn test_restyle_clones_once_per_format() {
        let mut styles = load();
        let font = FontSpec::new("Mono");

        assert_eq!(styles.restyle(1, &font).unwrap(), Some(2));
        assert_eq!(styles.restyle(0, &font).unwrap(), Some(3));
        assert_eq!(styles.restyle(1, &font).unwrap(), Some(2));

        let root = root(&styles);
        assert_eq!(root.child("fonts").unwrap().attr("count").as_deref(), Some("3"));
        assert_eq!(root.child("cellXfs").unwrap().attr("count").as_deref(), Some("4"));
    }

    #[test]
    fn test_clone_keeps_other_attributes() {
        let mut styles = load();
        styles.restyle(1, &FontSpec::new("Mono")).unwrap();

        let root = root(&styles);
        let clone = root.child("cellXfs").unwrap().elements().nth(2).unwrap();
        assert_eq!(clone.attr("numFmtId").as_deref(), Some("164"));
        assert_eq!(clone.attr("fontId").as_deref(), Some("2"));
        assert_eq!(clone.attr("applyFont").as_deref(), Some("1"));
        assert!(clone.child("alignment").is_some());
        assert_eq!(format_font_name(root, 2).as_deref(), Some("Mono"));
    }

    #[test]
    fn test_registered_font_drops_scheme() {
        let mut styles = load();
        styles.restyle(0, &FontSpec::new("Mono")).unwrap();

        let root = root(&styles);
        let font = root.child("fonts").unwrap().elements().nth(2).unwrap();
        assert!(font.child("scheme").is_none());
        assert_eq!(font.child("sz").unwrap().attr("val").as_deref(), Some("11"));
        assert_eq!(font.child("name").unwrap().attr("val").as_deref(), Some("Mono"));
    }

    #[test]
    fn test_out_of_range_format_gets_default_clone() {
        let mut styles = load();
        assert_eq!(styles.restyle(9, &FontSpec::new("Mono")).unwrap(), Some(2));
        let root = root(&styles);
        assert_eq!(format_font_name(root, 2).as_deref(), Some("Mono"));
    }

    #[test]
    fn test_creates_missing_lists() {
        let doc = XmlDocument::parse(br#"<styleSheet><numFmts count="0"/></styleSheet>"#).unwrap();
        let mut styles = Stylesheet::load("xl/styles.xml", doc);
        assert_eq!(styles.restyle(0, &FontSpec::new("Mono")).unwrap(), Some(0));

        let root = root(&styles);
        let order: Vec<&[u8]> = root.elements().map(|e| e.local_name()).collect();
        assert_eq!(order, vec![&b"numFmts"[..], &b"fonts"[..], &b"cellXfs"[..]]);
        assert_eq!(format_font_name(root, 0).as_deref(), Some("Mono"));
    }

    #[test]
    fn test_missing_stylesheet_is_noop() {
        let mut styles = Stylesheet::missing();
        assert_eq!(styles.restyle(0, &FontSpec::new("Mono")).unwrap(), None);
    }
}
