//! Core domain types for bulk office document rewriting: the replacement
//! table, the text container capability, run normalization and the
//! document visitor contract.

pub mod container;
pub mod error;
pub mod normalize;
pub mod replace;
pub mod report;
pub mod types;
pub mod visitor;

pub use container::{FontTarget, TextContainer};
pub use error::{Error, Result};
pub use normalize::{ContainerOutcome, FormatNormalizer};
pub use replace::ReplacementTable;
pub use report::{BatchReport, FileOutcome, FileReport};
pub use types::{DocumentFormat, DocumentStats, FontSpec, Run, DEFAULT_FONT};
pub use visitor::{DocumentVisitor, RewriteContext, Rewritten};
