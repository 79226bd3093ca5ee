//! Terminal output: colored notes and validation report rendering.

use clove_config::ValidationReport;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

fn note(color: &str, symbol: &str, plain: &str, msg: &str) -> String {
    if supports_color() {
        format!("{color}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{plain}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(CYAN, "ℹ", "INFO", msg));
}

pub fn note_warn(msg: &str) {
    println!("{}", note(YELLOW, "⚠", "WARN", msg));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", note(RED, "✗", "ERROR", msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(GREEN, "✓", "OK", msg));
}

/// One line per finding, errors first.
pub fn report_lines(report: &ValidationReport) -> Vec<(bool, String)> {
    report
        .errors
        .iter()
        .map(|e| (true, format!("{}: {}", e.path, e.message)))
        .chain(report.warnings.iter().map(|w| (false, format!("{}: {}", w.path, w.message))))
        .collect()
}

pub fn print_report(report: &ValidationReport) {
    if !print_findings(report) {
        note_success("Config is complete");
    }
}

/// Print errors and warnings, if any. Returns whether anything was printed.
pub fn print_findings(report: &ValidationReport) -> bool {
    let lines = report_lines(report);
    let any = !lines.is_empty();
    for (is_error, line) in lines {
        if is_error {
            note_error(&line);
        } else {
            note_warn(&line);
        }
    }
    any
}

/// A dimmed section heading.
pub fn heading(title: &str) {
    if supports_color() {
        println!("\n{DIM}── {title} ──{RESET}");
    } else {
        println!("\n== {title} ==");
    }
}
