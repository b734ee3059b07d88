//! Per-file and per-batch results.

use crate::DocumentStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    /// The file was recognized, rewritten and written back.
    Rewritten(DocumentStats),
    /// The extension is not one of the handled formats.
    Skipped,
    /// Reading, rewriting or writing failed. The file is left as it was.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, outcome: FileOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }
}

/// Reports for every regular file of a batch, in walk order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn rewritten(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Rewritten(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    /// Failed files with their causes.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.files.iter().filter_map(|f| match &f.outcome {
            FileOutcome::Failed(cause) => Some((&f.path, cause.as_str())),
            _ => None,
        })
    }

    /// Stats summed over every rewritten file.
    pub fn totals(&self) -> DocumentStats {
        let mut totals = DocumentStats::default();
        for file in &self.files {
            if let FileOutcome::Rewritten(stats) = file.outcome {
                totals.merge(stats);
            }
        }
        totals
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}
