//! User-facing console lines, separate from tracing output.
use owo_colors::OwoColorize;

use crate::report::BatchReport;

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
pub fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix) that scripts may parse.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// End-of-run summary: one line per failed species, then the totals.
pub fn print_batch_summary(report: &BatchReport) {
    for species in report.species.iter().filter(|s| !s.succeeded()) {
        if let Some(err) = &species.error {
            print_error(&format!("{} ({}): {}", species.name, err.kind, err.message));
        }
    }
    for err in &report.resolver_errors {
        print_error(&format!("metadata: {err}"));
    }
    let line = report.summary_line();
    if report.failed() > 0 || report.interrupted {
        print_warn(&line);
    } else {
        print_success(&line);
    }
}
