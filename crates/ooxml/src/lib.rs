//! Office Open XML codec shared by the document visitors.
//!
//! Packages are zip archives of XML parts linked by relationship files.
//! This crate reads them into memory, exposes parts as lossless element
//! trees, and writes them back.

pub mod package;
pub mod rels;
pub mod xml;

pub use package::{Package, CONTENT_TYPES};
pub use rels::{Relationship, Relationships};
pub use xml::{Element, Node, XmlDocument};
