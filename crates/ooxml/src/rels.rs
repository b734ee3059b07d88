//! Package relationships (`_rels/*.rels`).

use crate::xml::XmlDocument;
use transfont_core::Result;

/// One `Relationship` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI names the given kind, e.g. `"slide"` or `"theme"`.
    ///
    /// Only the last path segment is compared, so `"slide"` does not match
    /// `slideLayout` or `slideMaster`.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

/// The relationships declared by one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    source: String,
    items: Vec<Relationship>,
}

impl Relationships {
    /// An empty set for a part without a relationships file.
    pub fn empty(source: &str) -> Self {
        Self {
            source: source.to_string(),
            items: Vec::new(),
        }
    }

    /// Parse the relationships file belonging to part `source`.
    pub fn parse(source: &str, data: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(data)?;
        let items = doc
            .root()
            .elements()
            .filter(|e| e.is("Relationship"))
            .map(|e| Relationship {
                id: e.attr("Id").unwrap_or_default(),
                rel_type: e.attr("Type").unwrap_or_default(),
                target: e.attr("Target").unwrap_or_default(),
                external: e.attr("TargetMode").as_deref() == Some("External"),
            })
            .collect();

        Ok(Self {
            source: source.to_string(),
            items,
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Internal relationships of the given kind, in declaration order.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.items
            .iter()
            .filter(move |r| !r.external && r.is_kind(kind))
    }

    /// Part name targeted by relationship `id`.
    pub fn target_of(&self, id: &str) -> Option<String> {
        self.by_id(id)
            .filter(|r| !r.external)
            .map(|r| resolve_target(&self.source, &r.target))
    }

    /// Part name of the first internal relationship of `kind`.
    pub fn first_of_kind(&self, kind: &str) -> Option<String> {
        self.of_kind(kind)
            .next()
            .map(|r| resolve_target(&self.source, &r.target))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Name of the relationships part for `part`; the empty name is the package.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    let base = source.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if base.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", base, target))
    }
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
