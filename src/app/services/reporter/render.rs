//! Operator-facing rendering of the upload summary

use colored::Colorize;
use std::fmt::Write;

use crate::Result;
use crate::app::models::UploadSummary;

/// Render the summary as a human-readable block
pub fn render_human(summary: &UploadSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=== Upload Summary ===".bold());
    if summary.dry_run {
        let _ = writeln!(out, "{}", "(dry run: nothing was sent)".yellow());
    }
    if summary.cancelled {
        let _ = writeln!(out, "{}", "Run cancelled before all rows were processed".yellow());
    }

    let _ = writeln!(out, "Total rows: {}", summary.total);
    let _ = writeln!(out, "{}", format!("Successful: {}", summary.succeeded).green());
    let failed = format!("Failed: {}", summary.failed);
    if summary.failed > 0 {
        let _ = writeln!(out, "{}", failed.red());
    } else {
        let _ = writeln!(out, "{}", failed);
    }
    let _ = writeln!(out, "Skipped (validation): {}", summary.skipped_validation);
    if summary.transport_failures > 0 {
        let _ = writeln!(
            out,
            "{}",
            format!("Batches lost to transport errors: {}", summary.transport_failures).red()
        );
    }
    let _ = writeln!(out, "Success rate: {:.1}%", summary.success_rate());

    if !summary.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Failures:".bold());
        for failure in &summary.failures {
            let _ = writeln!(out, "  row {}: {}", failure.row, failure.reason);
        }
    }

    out
}

/// Render the summary as pretty-printed JSON
pub fn render_json(summary: &UploadSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
