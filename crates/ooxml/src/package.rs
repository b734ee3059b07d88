//! OPC zip package reading and writing.

use crate::rels::{rels_path, Relationships};
use crate::xml::XmlDocument;
use std::io::{Cursor, Read, Write};
use transfont_core::{Error, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Name of the content types part every package carries.
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

/// A zip entry held in memory.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    modified: Option<DateTime>,
    is_dir: bool,
}

/// An in-memory Office Open XML package.
///
/// Entries keep their original order, compression and timestamps so that a
/// rewrite only differs in the parts that were replaced.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read every entry of a zip container.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", idx, e)))?;

            // The declared size is untrusted, so the buffer grows as data
            // actually arrives.
            let name = file.name().to_string();
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

            entries.push(Entry {
                compression: file.compression(),
                modified: Some(file.last_modified()),
                is_dir: file.is_dir(),
                name,
                data: buf,
            });
        }

        log::debug!("Read {} zip entries", entries.len());
        let package = Self { entries };
        if !package.contains(CONTENT_TYPES) {
            return Err(Error::CorruptedFile(format!(
                "not an Office Open XML package: {} is missing",
                CONTENT_TYPES
            )));
        }
        Ok(package)
    }

    /// Build a package from named parts, all deflated.
    pub fn from_entries<I, N, D>(parts: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<Vec<u8>>,
    {
        let entries = parts
            .into_iter()
            .map(|(name, data)| Entry {
                name: name.into(),
                data: data.into(),
                compression: CompressionMethod::Deflated,
                modified: None,
                is_dir: false,
            })
            .collect();
        Self { entries }
    }

    /// Write the package back into a zip container.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut options = FileOptions::default()
                .compression_method(method)
                .large_file(entry.data.len() as u64 >= u32::MAX as u64);
            if let Some(modified) = entry.modified {
                options = options.last_modified_time(modified);
            }

            if entry.is_dir {
                zip.add_directory(entry.name.clone(), options)
                    .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", entry.name, e)))?;
                continue;
            }

            zip.start_file(entry.name.clone(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", entry.name, e)))?;
            zip.write_all(&entry.data)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", entry.name, e)))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        let bytes = cursor.into_inner();
        log::debug!("Wrote {} zip entries ({} bytes)", self.entries.len(), bytes.len());
        Ok(bytes)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .or_else(|| {
                // Part names are case-insensitive.
                self.entries
                    .iter()
                    .position(|e| e.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.position(name).map(|idx| self.entries[idx].data.as_slice())
    }

    /// Replace a part's bytes, or append a new deflated part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        log::debug!("Replacing part {} ({} bytes)", name, data.len());
        match self.position(name) {
            Some(idx) => self.entries[idx].data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                modified: None,
                is_dir: false,
            }),
        }
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    /// Parse a part as XML.
    pub fn xml_part(&self, name: &str) -> Result<XmlDocument> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        XmlDocument::parse(data).map_err(|e| Error::XmlError(format!("{}: {}", name, e)))
    }

    /// Serialize an XML document into a part.
    pub fn set_xml_part(&mut self, name: &str, doc: &XmlDocument) -> Result<()> {
        let data = doc
            .to_bytes()
            .map_err(|e| Error::XmlError(format!("{}: {}", name, e)))?;
        self.set_part(name, data);
        Ok(())
    }

    /// Relationships declared by `source`; the empty name is the package.
    ///
    /// A part without a relationships file has no relationships.
    pub fn relationships(&self, source: &str) -> Result<Relationships> {
        let path = rels_path(source);
        match self.part(&path) {
            Some(data) => Relationships::parse(source, data)
                .map_err(|e| Error::XmlError(format!("{}: {}", path, e))),
            None => Ok(Relationships::empty(source)),
        }
    }

    /// The main document part named by the package's officeDocument relationship.
    pub fn main_part(&self) -> Result<String> {
        self.relationships("")?
            .first_of_kind("officeDocument")
            .ok_or_else(|| Error::MissingPart("officeDocument relationship".to_string()))
    }
}
