use colored::Colorize;
use declarative::{Action, Outcome, RunReport};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
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

/// Print one reconciliation action
pub fn action(action: &Action) {
    let id = action.identifier.as_str();
    match action.outcome {
        Outcome::SkippedAlreadyPresent => {
            println!("  {} {}", "✓".dimmed(), id.dimmed());
        }
        Outcome::Pending => {
            println!("  {} {} {}", "○".blue(), id, action.detail.dimmed());
        }
        Outcome::Succeeded => {
            println!("  {} {}", "✓".green(), id);
        }
        Outcome::Failed => {
            println!("  {} {} {}", "✗".red(), id, action.detail.red());
        }
        Outcome::ManualRequired => {
            println!("  {} {} {}", "⚠".yellow(), id, action.detail.yellow());
        }
    }
}

/// Print the end-of-run summary
pub fn summary(report: &RunReport) {
    header("Summary");
    for outcome in Outcome::ALL {
        let count = report.summary().count(outcome);
        if count > 0 {
            kv(outcome.label(), &count.to_string());
        }
    }

    for failure in report.setup_failures() {
        error(&format!("{}: {}", failure.category.title(), failure.message));
    }

    let line = report.summary_line();
    println!();
    if report.has_setup_failure() || report.summary().count(Outcome::Failed) > 0 {
        warn(&line);
    } else {
        success(&line);
    }
}
