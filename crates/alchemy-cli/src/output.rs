//! Output formatting for search results and recipe reports.

use std::fmt::Write;

use alchemy_lib::{JobResult, RecipeReport, RenderMode, SearchSummary};
use clap::ValueEnum;
use serde::Serialize;

use crate::terminal::ColorPalette;

/// How command results are printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered steps, one per line.
    #[default]
    Text,
    /// Markdown-flavoured listing.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

/// Render one search summary.
pub fn render_search(
    summary: &SearchSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(summary)?),
        OutputFormat::Rich => summary.render(RenderMode::RichText),
        OutputFormat::Text => {
            let mut buffer = status_line(&summary.target, summary.found, palette);
            buffer.push_str(&summary.render(RenderMode::PlainText));
            buffer
        }
    })
}

fn status_line(target: &str, found: bool, palette: &ColorPalette) -> String {
    let (color, label) = if found {
        (palette.green, "FOUND")
    } else {
        (palette.red, "NOT FOUND")
    };
    format!(
        "{color}{label}{reset} {bold}{target}{reset}\n",
        color = color,
        label = label,
        bold = palette.white_bold,
        target = target,
        reset = palette.reset
    )
}

/// One batch job as printed by `alchemy batch`.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub id: u64,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SearchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    /// Pair a job result with the target it was submitted for.
    pub fn from_job(result: &JobResult, targets: &[String]) -> Self {
        let target = usize::try_from(result.id)
            .ok()
            .and_then(|index| targets.get(index))
            .cloned()
            .unwrap_or_default();
        match &result.outcome {
            Ok(outcome) => Self {
                id: result.id,
                target,
                result: Some(SearchSummary::from_outcome(outcome)),
                error: None,
            },
            Err(error) => Self {
                id: result.id,
                target,
                result: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Render batch entries in job order.
pub fn render_batch(
    entries: &[BatchEntry],
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(entries)?));
    }

    let mut buffer = String::new();
    for entry in entries {
        let _ = write!(buffer, "{}[{}]{} ", palette.gray, entry.id, palette.reset);
        match (&entry.result, &entry.error) {
            (Some(summary), _) => buffer.push_str(&render_search(summary, format, palette)?),
            (None, Some(error)) => {
                let _ = writeln!(
                    buffer,
                    "{}ERROR{} {}: {}",
                    palette.red, palette.reset, entry.target, error
                );
            }
            (None, None) => buffer.push('\n'),
        }
    }
    Ok(buffer)
}

/// Render the `recipes` report.
pub fn render_recipes(report: &RecipeReport, format: OutputFormat) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
        OutputFormat::Text | OutputFormat::Rich => report.render_plain(),
    })
}
