//! Capabilities every format exposes for its replaceable text units.
//!
//! A paragraph, a spreadsheet cell and a shape text body all implement
//! [`TextContainer`]; a theme font slot only implements [`FontTarget`].
//! The substitution algorithm in [`crate::FormatNormalizer`] depends on
//! nothing else.

use crate::{FontSpec, Result, Run};

/// Something that can carry the configured font.
pub trait FontTarget {
    /// Apply `font`. Returns `true` when a font attribute was written.
    fn apply_font(&mut self, font: &FontSpec) -> Result<bool>;
}

/// A unit of replaceable text backed by a list of formatting runs.
pub trait TextContainer: FontTarget {
    /// Current text, or `None` when the container holds no text value
    /// (a numeric cell, for example).
    fn text(&self) -> Option<String>;

    /// The formatting runs currently making up the text.
    fn runs(&self) -> Vec<Run>;

    /// Replace every existing run with `runs`.
    fn replace_runs(&mut self, runs: Vec<Run>) -> Result<()>;
}
