// file: src/utils/logging.rs
// description: Tracing subscriber initialization and run-summary formatting

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::new(level);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg.blue())
}

/// One summary line per failed transfer: the repository path first so runs
/// are grep-able by path, then the diagnostic.
pub fn format_failure_detail(label: &str, reason: &str) -> String {
    format!("  {} {}: {}", "✗".red().bold(), label.red().bold(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_lines_keep_the_message_text() {
        assert!(format_success("3 transfers succeeded").contains("3 transfers succeeded"));
        assert!(format_error("1 of 3 transfers failed").contains("1 of 3 transfers failed"));
        assert!(format_info("dry run").contains("dry run"));
    }

    #[test]
    fn test_failure_detail_names_path_and_diagnostic() {
        let line = format_failure_detail("team-x/tool", "remote hung up");
        assert!(line.contains("team-x/tool"));
        assert!(line.contains("remote hung up"));
    }
}
