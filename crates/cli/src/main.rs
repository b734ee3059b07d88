//! Rewrite every .docx, .xlsx and .pptx file below a folder in place.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use transfont_cli::{run_batch, FileDispatcher};
use transfont_core::{FormatNormalizer, ReplacementTable, RewriteContext};

/// Apply a replacement table and a uniform font to office documents.
#[derive(Parser, Debug)]
#[command(name = "transfont")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Replacement table: one `key,value` rule per line, applied in order
    rules: PathBuf,

    /// Folder whose documents are rewritten, recursively
    folder: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let table = ReplacementTable::from_path(&args.rules)
        .with_context(|| format!("Failed to load replacement table {}", args.rules.display()))?;
    log::info!("Loaded {} replacement rules", table.len());

    if !args.folder.is_dir() {
        bail!("Folder not found: {}", args.folder.display());
    }

    let normalizer = FormatNormalizer::default();
    log::info!("Applying font {}", normalizer.font());
    let ctx = RewriteContext::new(&table, &normalizer);
    let report = run_batch(&args.folder, &FileDispatcher::new(), &ctx);

    log::info!(
        "Done: {} rewritten, {} skipped, {} failed",
        report.rewritten(),
        report.skipped(),
        report.failed()
    );
    for (path, cause) in report.failures() {
        log::warn!("  {}: {}", path.display(), cause);
    }

    Ok(())
}
