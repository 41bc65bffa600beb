//! Post-run export and recommendations report.
//!
//! Both steps are best effort: tool failures and a missing log are logged and
//! the run still ends successfully.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::constants;
use crate::core::tools::{self, Tool};
use crate::state::AutotuneLayout;

// ── Export ──────────────────────────────────────────────────────────────────

/// Exports the autotune directory to a spreadsheet at `xlsx`.
pub fn export(tool: &impl Tool, layout: &AutotuneLayout, xlsx: &Path) {
    tracing::info!(output = %xlsx.display(), "exporting to spreadsheet");
    if let tools::ToolOutcome::Failed(reason) = tools::export_to_xlsx(tool, layout.base(), xlsx) {
        tracing::warn!(%reason, "spreadsheet export failed");
    }
}

// ── Recommendations ─────────────────────────────────────────────────────────

/// Runs the recommendations report and echoes its log to stdout.
pub fn show_recommendations(tool: &impl Tool, layout: &AutotuneLayout) {
    let stdout = io::stdout();
    if let Err(e) = write_recommendations(tool, layout, &mut stdout.lock()) {
        tracing::warn!(error = %e, "could not print recommendations");
    }
}

/// Returns whether the log was found and echoed.
fn write_recommendations(
    tool: &impl Tool,
    layout: &AutotuneLayout,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out)?;
    writeln!(out, "{}", constants::CLI_MSG_REPORT_HEADER)?;
    writeln!(out, "{}", constants::CLI_MSG_REPORT_RULE)?;

    if let tools::ToolOutcome::Failed(reason) = tools::recommends_report(tool, layout.base()) {
        tracing::warn!(%reason, "recommendations report failed");
    }

    let report_file = layout.recommendations_log();
    writeln!(out, "{}{}", constants::CLI_MSG_REPORT_LOG_FILE, report_file.display())?;

    match fs::read_to_string(&report_file) {
        Ok(content) => {
            write_filtered(&content, out)?;
            Ok(true)
        }
        Err(e) => {
            tracing::warn!(path = %report_file.display(), error = %e, "no recommendations log");
            out.flush()?;
            Ok(false)
        }
    }
}

// ── Filtering ───────────────────────────────────────────────────────────────

/// A table row with no content: only pipes and whitespace, at least one pipe.
fn is_blank_row(line: &str) -> bool {
    line.contains('|') && line.chars().all(|c| c == '|' || c.is_whitespace())
}

/// Writes `content` minus blank table rows.
fn write_filtered(content: &str, out: &mut impl Write) -> io::Result<()> {
    for line in content.lines().filter(|l| !is_blank_row(l)) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
