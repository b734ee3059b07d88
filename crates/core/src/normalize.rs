//! Run rebuilding and font normalization.
//!
//! Every container is collapsed to at most one formatting run holding the
//! substituted text in the configured font. Prior run formatting is
//! discarded.

use crate::{FontSpec, FontTarget, ReplacementTable, Result, Run, TextContainer};

/// What happened to a single container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerOutcome {
    /// The container held text and was rebuilt.
    pub rebuilt: bool,

    /// The replacement table changed the text.
    pub changed: bool,

    /// Number of runs removed by the rebuild.
    pub runs_discarded: usize,

    /// The container accepted the font.
    pub font_applied: bool,
}

/// Rebuilds text containers into a single run carrying one font.
#[derive(Debug, Clone, Default)]
pub struct FormatNormalizer {
    font: FontSpec,
}

impl FormatNormalizer {
    /// Create a normalizer applying the given font.
    pub fn new(font: FontSpec) -> Self {
        Self { font }
    }

    /// The font applied to rebuilt runs.
    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    /// Produce the replacement run list for a container.
    ///
    /// The result holds one run with `text` in the configured font, or no
    /// run at all when `text` is empty.
    pub fn rebuild_runs(&self, text: &str) -> Vec<Run> {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::with_font(text, &self.font)]
        }
    }

    /// Substitute and rebuild one container, then apply the font to it.
    ///
    /// Containers without text still receive the font.
    pub fn normalize<C: TextContainer + ?Sized>(
        &self,
        container: &mut C,
        table: &ReplacementTable,
    ) -> Result<ContainerOutcome> {
        let mut outcome = ContainerOutcome::default();

        if let Some(original) = container.text() {
            let replaced = table.apply(&original);
            let new_runs = self.rebuild_runs(&replaced);

            outcome.rebuilt = true;
            outcome.changed = replaced != original;
            outcome.runs_discarded = container.runs().len();

            container.replace_runs(new_runs)?;
        }

        outcome.font_applied = container.apply_font(&self.font)?;
        Ok(outcome)
    }

    /// Apply the font to a target that carries no text.
    pub fn apply_font<T: FontTarget + ?Sized>(&self, target: &mut T) -> Result<bool> {
        target.apply_font(&self.font)
    }
}
