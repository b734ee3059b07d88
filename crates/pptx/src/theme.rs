//! Theme font scheme slots.

use transfont_core::{FontSpec, FontTarget, Result};
use transfont_ooxml::Element;

/// Font collections of `a:fontScheme` that are rewritten.
pub const SCHEME_SLOTS: &[&str] = &["majorFont", "minorFont"];

/// An `a:majorFont` or `a:minorFont` collection. Only the Latin typeface
/// is replaced; script-specific entries are kept.
pub struct ThemeFontSlot<'a> {
    element: &'a mut Element,
}

impl<'a> ThemeFontSlot<'a> {
    pub fn new(element: &'a mut Element) -> Self {
        Self { element }
    }
}

impl FontTarget for ThemeFontSlot<'_> {
    fn apply_font(&mut self, font: &FontSpec) -> Result<bool> {
        match self.element.child_mut("latin") {
            Some(latin) => {
                latin.set_attr("typeface", font.name());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Font scheme of a theme part, if it has one.
pub fn font_scheme(theme: &mut Element) -> Option<&mut Element> {
    theme.find_mut(&["themeElements", "fontScheme"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfont_ooxml::XmlDocument;

    const THEME: &str = r#"<a:theme xmlns:a="urn:a" name="Office"><a:themeElements><a:clrScheme name="Office"/><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light" panose="020F0302020204030204"/><a:ea typeface=""/><a:cs typeface=""/><a:font script="Jpan" typeface="Yu Gothic Light"/></a:majorFont><a:minorFont><a:ea typeface=""/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#;

    #[test]
    fn test_latin_typeface_replaced() {
        let mut doc = XmlDocument::parse(THEME.as_bytes()).unwrap();
        let scheme = font_scheme(doc.root_mut()).unwrap();
        let font = FontSpec::new("Mono");

        let major = scheme.child_mut("majorFont").unwrap();
        assert!(ThemeFontSlot::new(major).apply_font(&font).unwrap());
        let minor = scheme.child_mut("minorFont").unwrap();
        assert!(!ThemeFontSlot::new(minor).apply_font(&font).unwrap());

        let major = doc
            .root()
            .find(&["themeElements", "fontScheme", "majorFont"])
            .unwrap();
        let latin = major.child("latin").unwrap();
        assert_eq!(latin.attr("typeface").as_deref(), Some("Mono"));
        assert_eq!(latin.attr("panose").as_deref(), Some("020F0302020204030204"));
        let jpan = major.elements().find(|e| e.is("font")).unwrap();
        assert_eq!(jpan.attr("typeface").as_deref(), Some("Yu Gothic Light"));
    }

    #[test]
    fn test_theme_without_font_scheme() {
        let mut doc = XmlDocument::parse(br#"<a:theme xmlns:a="urn:a"><a:themeElements/></a:theme>"#).unwrap();
        assert!(font_scheme(doc.root_mut()).is_none());
    }
}
