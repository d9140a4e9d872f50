//! Rendering of command results and notices
//!
//! Results go to stdout; notices go to stderr so they never mix with
//! machine-readable output.

use std::io::Write;

use colored::Colorize;
use comfy_table::{Table, presets};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result as CliResult;

/// Spaces between aligned columns
const COLUMN_GAP: u16 = 4;

/// Print serialized data as JSON or YAML
///
/// Table output is resource specific, so callers render it themselves; JSON
/// is used if one ends up here anyway.
pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> CliResult<()> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&data)?.trim_end().to_string(),
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(&data)?,
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered)?;
    Ok(())
}

/// Print rendered table lines to stdout
pub fn print_lines(lines: &[String]) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}

/// Print an informational one-liner to stderr
pub fn print_notice(message: &str) {
    eprintln!("{}: {}", "Notice".green(), message);
}

/// Render rows as borderless, left-aligned columns
///
/// Each column is as wide as its widest cell plus a four space gap.
/// Trailing whitespace is trimmed from every line.
pub fn render_columns(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Vec<String> {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);

    if let Some(header) = header {
        table.set_header(header);
    }
    for row in rows {
        table.add_row(row);
    }
    for column in table.column_iter_mut() {
        column.set_padding((0, COLUMN_GAP));
    }

    table
        .to_string()
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}
