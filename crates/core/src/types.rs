//! Domain types shared by every document visitor.

use crate::ContainerOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Font applied when none is configured explicitly.
pub const DEFAULT_FONT: &str = "BIZ UDGothic";

/// The container format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Word-processing document (.docx).
    Docx,
    /// Spreadsheet workbook (.xlsx).
    Xlsx,
    /// Presentation deck (.pptx).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from the extension of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical lowercase extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The single font name applied to every rebuilt run and theme slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec(String);

impl FontSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FONT)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contiguous span of text sharing one set of font attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Run {
    /// Text carried by the run.
    pub text: String,

    /// Typeface of the run, if the run names one.
    pub font: Option<String>,
}

impl Run {
    /// Create a run without an explicit font.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
        }
    }

    /// Create a run carrying the given font.
    pub fn with_font(text: impl Into<String>, font: &FontSpec) -> Self {
        Self {
            text: text.into(),
            font: Some(font.name().to_string()),
        }
    }
}

/// Counters collected while rewriting one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Text containers visited.
    pub containers: usize,

    /// Containers whose text was changed by the replacement table.
    pub changed: usize,

    /// Formatting runs discarded by the rebuild.
    pub runs_discarded: usize,

    /// Containers, cells and theme font slots that received the font.
    pub fonts_applied: usize,
}

impl DocumentStats {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: DocumentStats) {
        self.containers += other.containers;
        self.changed += other.changed;
        self.runs_discarded += other.runs_discarded;
        self.fonts_applied += other.fonts_applied;
    }

    /// Account for one normalized container.
    pub fn record(&mut self, outcome: ContainerOutcome) {
        if outcome.rebuilt {
            self.containers += 1;
        }
        if outcome.changed {
            self.changed += 1;
        }
        self.runs_discarded += outcome.runs_discarded;
        if outcome.font_applied {
            self.fonts_applied += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_ignores_case() {
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("Xlsx"), Some(DocumentFormat::Xlsx));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), None);
        assert_eq!(DocumentFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b/Report.PPTX")),
            Some(DocumentFormat::Pptx)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("a/b/notes")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("a/b/docx")), None);
    }

    #[test]
    fn test_default_font() {
        assert_eq!(FontSpec::default().name(), "BIZ UDGothic");
    }

    #[test]
    fn test_stats_merge() {
        let mut total = DocumentStats {
            containers: 2,
            changed: 1,
            runs_discarded: 3,
            fonts_applied: 0,
        };
        total.merge(DocumentStats {
            containers: 1,
            changed: 1,
            runs_discarded: 0,
            fonts_applied: 4,
        });
        assert_eq!(total.containers, 3);
        assert_eq!(total.changed, 2);
        assert_eq!(total.runs_discarded, 3);
        assert_eq!(total.fonts_applied, 4);
    }

    #[test]
    fn test_stats_record_counts_only_rebuilt_containers() {
        let mut stats = DocumentStats::default();
        stats.record(ContainerOutcome {
            rebuilt: true,
            changed: true,
            runs_discarded: 3,
            font_applied: true,
        });
        stats.record(ContainerOutcome {
            font_applied: true,
            ..ContainerOutcome::default()
        });
        assert_eq!(stats.containers, 1);
        assert_eq!(stats.changed, 1);
        assert_eq!(stats.runs_discarded, 3);
        assert_eq!(stats.fonts_applied, 2);
    }
}
