use colored::Colorize;
use declarative::{Reporter, StatusLine};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Status reporting
// ============================================================================

/// Prints status lines and previews to stdout.
///
/// Status lines stay uncoloured so scripts can match on
/// `<kind>/<name> <action>`.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn status(&mut self, line: &StatusLine) {
        println!("{line}");
    }

    fn message(&mut self, text: &str) {
        println!("{}", text.trim_end());
    }
}
