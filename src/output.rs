//! CLI output formatting for every tool.
//!
//! # Result-First Display
//!
//! Each tool prints its answer on the first line, with supporting numbers as
//! indented context lines. File tools lead with the source identity and show
//! what was produced beneath it:
//!
//! ```text
//! holiday.png (1200x800, 1.2 MB)
//!     → holiday.jpg  1200x800 JPEG, 184.3 KB (-85.0%)
//! ```
//!
//! ```text
//! slides.pdf → slides.zip
//!     archive, 12 items, 3.4 MB
//! ```
//!
//! Calculators:
//!
//! ```text
//! BMI 22.9 (Normal weight)
//!
//! Monthly payment: 1,419.47
//!     Payments: 360
//!     Total paid: 511,010.10
//!     Total interest: 261,010.10
//! ```
//!
//! Malformed numeric input produces no output lines at all.
//!
//! # Architecture
//!
//! Each tool has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! with no I/O and no side effects.

use crate::calculators::bmi::Bmi;
use crate::calculators::discount::Discount;
use crate::calculators::loan::{Installment, LoanSummary};
use crate::calculators::tip::TipSplit;
use crate::calculators::units::Unit;
use crate::conversion::{ConversionOutput, Flow};
use crate::imaging::{ImagingError, Reencoded, SizeDelta};
use crate::password::Strength;
use crate::spin_wheel::Spin;
use crate::text::TextStats;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size (1024-based).
///
/// ```text
/// 842 B
/// 84.3 KB
/// 1.2 MB
/// ```
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Signed percentage of a size change, or `n/a` when the original was empty.
pub fn format_delta(delta: &SizeDelta) -> String {
    match delta.percent_change() {
        Some(p) if p > 0.0 => format!("+{p:.1}%"),
        Some(p) => format!("{p:.1}%"),
        None => "n/a".to_string(),
    }
}

/// Two decimals with thousands separators: `1,419.47`.
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

/// Up to six decimals, trailing zeros trimmed: `3.28084`, `212`.
pub fn format_quantity(value: f64) -> String {
    let text = format!("{value:.6}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Re-encode output
// ============================================================================

/// Format one re-encoded file.
///
/// ```text
/// holiday.png (1200x800, 1.2 MB)
///     → holiday.jpg  1200x800 JPEG, 184.3 KB (-85.0%)
/// ```
pub fn format_reencoded(item: &Reencoded) -> Vec<String> {
    let source = item.source_dimensions;
    let result = &item.result;
    vec![
        format!(
            "{} ({}x{}, {})",
            item.source_name,
            source.width,
            source.height,
            human_size(item.source_size)
        ),
        format!(
            "{}→ {}  {}x{} {}, {} ({})",
            indent(1),
            item.output_name,
            result.width,
            result.height,
            result.format.label(),
            human_size(result.byte_size),
            format_delta(&item.size_delta())
        ),
    ]
}

/// Format a failed file.
pub fn format_reencode_failure(name: &str, error: &ImagingError) -> Vec<String> {
    vec![name.to_string(), format!("{}✗ {}", indent(1), error)]
}

/// Format the batch summary line.
pub fn format_reencode_summary(succeeded: usize, failed: usize, total: &SizeDelta) -> String {
    let files = if succeeded == 1 { "file" } else { "files" };
    let mut line = format!(
        "Re-encoded {succeeded} {files}: {} → {} ({})",
        human_size(total.original),
        human_size(total.encoded),
        format_delta(total)
    );
    if failed > 0 {
        line.push_str(&format!(", {failed} failed"));
    }
    line
}

pub fn print_reencoded(item: &Reencoded) {
    for line in format_reencoded(item) {
        println!("{}", line);
    }
}

// ============================================================================
// Conversion output
// ============================================================================

/// Format a finished remote conversion.
///
/// ```text
/// slides.pdf → slides.zip
///     archive, 12 items, 3.4 MB
/// ```
pub fn format_conversion(flow: Flow, source_name: &str, output: &ConversionOutput) -> Vec<String> {
    let kind = if output.payload.is_archive() {
        "archive"
    } else {
        flow.output_extension()
    };
    let items = if output.item_count == 1 { "item" } else { "items" };
    vec![
        format!("{} → {}", source_name, output.result_name),
        format!(
            "{}{}, {} {}, {}",
            indent(1),
            kind,
            output.item_count,
            items,
            human_size(output.payload.bytes().len() as u64)
        ),
    ]
}

pub fn print_conversion(flow: Flow, source_name: &str, output: &ConversionOutput) {
    for line in format_conversion(flow, source_name, output) {
        println!("{}", line);
    }
}

/// Format the list of available flows.
pub fn format_flow_list() -> Vec<String> {
    Flow::ALL
        .iter()
        .map(|flow| {
            format!(
                "{:<16} .{} → .{}{}",
                flow.name(),
                flow.input_extensions().join(", ."),
                flow.output_extension(),
                if flow.may_return_archive() {
                    " (zip when several)"
                } else {
                    ""
                }
            )
        })
        .collect()
}

// ============================================================================
// Calculator output
// ============================================================================

pub fn format_bmi(bmi: Option<&Bmi>) -> Vec<String> {
    match bmi {
        Some(b) => vec![format!("BMI {:.1} ({})", b.value, b.category)],
        None => Vec::new(),
    }
}

/// Format a loan summary, optionally followed by its schedule.
///
/// ```text
/// Monthly payment: 1,419.47
///     Payments: 360
///     Total paid: 511,010.10
///     Total interest: 261,010.10
/// ```
pub fn format_loan(summary: Option<&LoanSummary>, schedule: Option<&[Installment]>) -> Vec<String> {
    let Some(s) = summary else {
        return Vec::new();
    };
    let mut lines = vec![
        format!("Monthly payment: {}", format_money(s.monthly_payment)),
        format!("{}Payments: {}", indent(1), s.payments),
        format!("{}Total paid: {}", indent(1), format_money(s.total_paid)),
        format!("{}Total interest: {}", indent(1), format_money(s.total_interest)),
    ];
    if let Some(rows) = schedule {
        lines.push(String::new());
        lines.push(format!(
            "{:>4}  {:>12}  {:>12}  {:>12}  {:>14}",
            "#", "Payment", "Interest", "Principal", "Balance"
        ));
        for row in rows {
            lines.push(format!(
                "{:>4}  {:>12}  {:>12}  {:>12}  {:>14}",
                row.number,
                format_money(row.payment),
                format_money(row.interest),
                format_money(row.principal),
                format_money(row.balance)
            ));
        }
    }
    lines
}

/// One labelled percentage answer, e.g. `5% of 200 = 10`.
pub fn format_percent(question: &str, answer: Option<String>) -> Vec<String> {
    match answer {
        Some(a) => vec![format!("{question} = {a}")],
        None => Vec::new(),
    }
}

pub fn format_discount(discount: Option<&Discount>) -> Vec<String> {
    match discount {
        Some(d) => vec![
            format!("Final price: {}", format_money(d.final_price)),
            format!("{}You save: {}", indent(1), format_money(d.saved)),
        ],
        None => Vec::new(),
    }
}

pub fn format_tip(split: Option<&TipSplit>, people: u32) -> Vec<String> {
    let Some(s) = split else {
        return Vec::new();
    };
    let mut lines = vec![
        format!("Total: {}", format_money(s.total)),
        format!("{}Tip: {}", indent(1), format_money(s.tip)),
    ];
    if people > 1 {
        lines.push(format!(
            "{}Per person ({people}): {}",
            indent(1),
            format_money(s.per_person)
        ));
    }
    lines
}

pub fn format_units(value: f64, from: &Unit, result: f64, to: &Unit) -> Vec<String> {
    vec![format!(
        "{} {} = {} {}",
        format_quantity(value),
        from.symbol,
        format_quantity(result),
        to.symbol
    )]
}

// ============================================================================
// Text, password, wheel
// ============================================================================

pub fn format_text_stats(stats: &TextStats) -> Vec<String> {
    vec![
        format!("Words: {}", stats.words),
        format!("{}Characters: {}", indent(1), stats.characters),
        format!(
            "{}Characters (no spaces): {}",
            indent(1),
            stats.characters_no_spaces
        ),
        format!("{}Lines: {}", indent(1), stats.lines),
        format!("{}Sentences: {}", indent(1), stats.sentences),
    ]
}

pub fn format_passwords(passwords: &[String], strength: Strength, entropy_bits: f64) -> Vec<String> {
    let mut lines = passwords.to_vec();
    lines.push(format!(
        "{}Strength: {} ({:.0} bits)",
        indent(1),
        strength,
        entropy_bits
    ));
    lines
}

pub fn format_spin(spin: &Spin<'_>, segments: usize) -> Vec<String> {
    vec![
        format!("→ {}", spin.label),
        format!(
            "{}segment {} of {}, stopped at {:.1}°",
            indent(1),
            spin.index + 1,
            segments,
            spin.angle_degrees
        ),
    ]
}

/// Print pre-formatted lines to stdout.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
