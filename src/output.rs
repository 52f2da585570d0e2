//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photo.png → photo.jpg
//!     Size: 800x600
//!     Encoded: 48213 bytes
//! ```
//!
//! ## Batch
//!
//! ```text
//! Resizing 3 images
//! 001 beach.png → out/beach.jpg (800x600)
//! 002 cat.webp
//!     Error: invalid data source format
//! 003 dog.jpg → out/dog.jpg (800x533)
//!
//! Resized 2 of 3 images, 1 failed
//! ```
//!
//! Batch lines arrive in completion order, so the index is what ties a line
//! back to its input.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::ProcessResult;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "image" } else { "images" }
}

// ============================================================================
// resize
// ============================================================================

/// Format the result of a single-file resize.
pub fn format_resize_result(input: &Path, output: &Path, result: &ProcessResult) -> Vec<String> {
    vec![
        format!("{} \u{2192} {}", file_name(input), output.display()),
        format!("{}Size: {}x{}", indent(1), result.width, result.height),
        format!("{}Encoded: {} bytes", indent(1), result.data.len()),
    ]
}

/// Print resize output to stdout.
pub fn print_resize_result(input: &Path, output: &Path, result: &ProcessResult) {
    for line in format_resize_result(input, output, result) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Resizing {} {}", total, plural(*total))]
        }
        BatchEvent::Resized {
            index,
            source,
            output,
            width,
            height,
            ..
        } => vec![format!(
            "{} {} \u{2192} {} ({}x{})",
            format_index(*index),
            file_name(source),
            output.display(),
            width,
            height
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(*index), file_name(source)),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// Format the closing summary of a batch.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let total = summary.total();
    let mut line = format!(
        "Resized {} of {} {}",
        summary.resized,
        total,
        plural(total)
    );
    if !summary.failed.is_empty() {
        line.push_str(&format!(", {} failed", summary.failed.len()));
    }
    vec![String::new(), line]
}

/// Print batch summary to stdout.
pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}
