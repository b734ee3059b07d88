//! Lossless XML element tree built from quick-xml events.
//!
//! Unchanged elements, text, declarations and comments are written back
//! exactly as they were read. Names are matched by local name so that
//! documents using unusual namespace prefixes still work.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use transfont_core::{Error, Result};

/// A node in the element tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Escaped character data, kept as read.
    Text(BytesText<'static>),
    /// Declarations, comments, CDATA and processing instructions.
    Other(Event<'static>),
}

/// An element with its start tag and ordered children.
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
}

impl Element {
    /// Create an element with a fully qualified name such as `a:p`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: BytesStart::new(name.into()),
            children: Vec::new(),
        }
    }

    /// Create an element with this element's namespace prefix.
    pub fn sibling(&self, local: &str) -> Self {
        Self::new(format!("{}{}", self.prefix(), local))
    }

    /// Qualified name as written in the document.
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &[u8] {
        local_name(self.name())
    }

    /// Whether the local name equals `local`.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local.as_bytes()
    }

    /// Namespace prefix including the trailing colon, or an empty string.
    pub fn prefix(&self) -> String {
        let name = self.name();
        match name.iter().position(|&b| b == b':') {
            Some(pos) => String::from_utf8_lossy(&name[..=pos]).into_owned(),
            None => String::new(),
        }
    }

    /// Unescaped value of the attribute with qualified name `key`.
    pub fn attr(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == key.as_bytes())
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Value of a prefixed attribute by local name, e.g. `r:id` via `"id"`.
    pub fn namespaced_attr(&self, local: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| {
                let key = a.key.as_ref();
                key.contains(&b':') && local_name(key) == local.as_bytes()
            })
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Set or replace an attribute, keeping the position of an existing one.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        let name = String::from_utf8_lossy(self.name()).into_owned();
        let mut start = BytesStart::new(name);
        let mut written = false;

        for attr in self.start.attributes().flatten() {
            if attr.key.as_ref() == key.as_bytes() {
                if !written {
                    start.push_attribute((key, value));
                    written = true;
                }
            } else {
                start.push_attribute(attr);
            }
        }
        if !written {
            start.push_attribute((key, value));
        }

        self.start = start;
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, key: &str) {
        let name = String::from_utf8_lossy(self.name()).into_owned();
        let mut start = BytesStart::new(name);
        for attr in self.start.attributes().flatten() {
            if attr.key.as_ref() != key.as_bytes() {
                start.push_attribute(attr);
            }
        }
        self.start = start;
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Element::push_text`].
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements, skipping text and other nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable child elements, skipping text and other nodes.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    /// First mutable child element with the given local name.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Follow a path of local names from this element.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    /// Mutable form of [`Element::find`].
    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Append escaped character data.
    pub fn push_text(&mut self, text: &str) {
        self.children
            .push(Node::Text(BytesText::new(text).into_owned()));
    }

    /// Drop child elements for which `keep` returns false. Text and other
    /// nodes are left alone.
    pub fn retain_elements<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Element) -> bool,
    {
        self.children.retain(|n| match n {
            Node::Element(e) => keep(e),
            _ => true,
        });
    }

    /// Remove every child node.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Element(child) => collect_text(child, out),
            Node::Text(text) => {
                if let Ok(s) = text.unescape() {
                    out.push_str(&s);
                }
            }
            Node::Other(Event::CData(data)) => out.push_str(&String::from_utf8_lossy(data)),
            Node::Other(_) => {}
        }
    }
}

/// A parsed XML part.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    /// Wrap a freshly built element as a document.
    pub fn from_root(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a UTF-8 XML document.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(data);
        reader.trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };

            match event {
                Event::Start(start) => stack.push(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                }),
                Event::Empty(start) => {
                    let element = Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                    };
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::Text(text) => {
                    text.unescape()
                        .map_err(|e| Error::XmlError(format!("invalid character data: {}", e)))?;
                    attach(&mut stack, &mut nodes, Node::Text(text.into_owned()));
                }
                Event::Eof => break,
                other => attach(&mut stack, &mut nodes, Node::Other(other.into_owned())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlError(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(open.name())
            )));
        }

        let root_index = nodes
            .iter()
            .position(|n| matches!(n, Node::Element(_)))
            .ok_or_else(|| Error::XmlError("document has no root element".to_string()))?;
        let epilog = nodes.split_off(root_index + 1);
        let root = match nodes.pop() {
            Some(Node::Element(root)) => root,
            _ => return Err(Error::XmlError("document has no root element".to_string())),
        };

        Ok(Self {
            prolog: nodes,
            root,
            epilog,
        })
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable document element.
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)
            .map_err(|e| Error::XmlError(format!("write failed: {}", e)))?;
        Ok(writer.into_inner())
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> quick_xml::Result<()> {
        for node in &self.prolog {
            write_node(writer, node)?;
        }
        write_element(writer, &self.root)?;
        for node in &self.epilog {
            write_node(writer, node)?;
        }
        Ok(())
    }
}

fn attach(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> quick_xml::Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => writer.write_event(Event::Text(text.clone())),
        Node::Other(event) => writer.write_event(event),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> quick_xml::Result<()> {
    if element.children.is_empty() {
        return writer.write_event(Event::Empty(element.start.borrow()));
    }
    writer.write_event(Event::Start(element.start.borrow()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(element.start.to_end()))
}

/// Extract the local name from a potentially namespaced XML name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
        <w:document xmlns:w=\"urn:w\"><!-- note --><w:body>\
        <w:p><w:r><w:t xml:space=\"preserve\">Tom &amp; Jerry </w:t></w:r></w:p>\
        <w:sectPr/></w:body></w:document>";

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let out = doc.to_bytes().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn test_text_is_unescaped() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let body = doc.root().child("body").unwrap();
        assert_eq!(body.text(), "Tom & Jerry ");
    }

    #[test]
    fn test_find_and_prefix() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let t = doc.root().find(&["body", "p", "r", "t"]).unwrap();
        assert_eq!(t.name(), b"w:t");
        assert_eq!(t.prefix(), "w:");
        assert_eq!(t.attr("xml:space").as_deref(), Some("preserve"));
        assert_eq!(t.sibling("tab").name(), b"w:tab");
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("a:latin")
            .with_attr("typeface", "Arial")
            .with_attr("panose", "020B");
        el.set_attr("typeface", "Meiryo & Co");
        assert_eq!(el.attr("typeface").as_deref(), Some("Meiryo & Co"));

        let out = XmlDocument::from_root(el).to_bytes().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<a:latin typeface=\"Meiryo &amp; Co\" panose=\"020B\"/>"
        );
    }

    #[test]
    fn test_namespaced_attr() {
        let doc = XmlDocument::parse(b"<p:sldId id=\"256\" r:id=\"rId2\"/>").unwrap();
        assert_eq!(doc.root().attr("id").as_deref(), Some("256"));
        assert_eq!(doc.root().namespaced_attr("id").as_deref(), Some("rId2"));
    }

    #[test]
    fn test_retain_and_push() {
        let mut doc = XmlDocument::parse(b"<r><a/> <b/><a/></r>").unwrap();
        let root = doc.root_mut();
        root.retain_elements(|e| !e.is("a"));
        root.push(Element::new("c").with_text("x<y"));
        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(out, "<r> <b/><c>x&lt;y</c></r>");
    }

    #[test]
    fn test_malformed_xml_rejected() {
        assert!(XmlDocument::parse(b"<a><b></a>").is_err());
        assert!(XmlDocument::parse(b"<a>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
    }
}
