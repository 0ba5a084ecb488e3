//! Diff display - kdbkey-specific UI

use colored::Colorize;
use declarative::{DiffSummary, ResourceDiff, ResourceState};
use similar::{ChangeTag, TextDiff};

/// Line-level changes between two rendered states
///
/// Returns `(tag, line)` pairs for changed lines only.
pub fn changed_lines(from: &str, to: &str) -> Vec<(ChangeTag, String)> {
    TextDiff::from_lines(from, to)
        .iter_all_changes()
        .filter(|c| c.tag() != ChangeTag::Equal)
        .map(|c| (c.tag(), c.value().trim_end_matches('\n').to_string()))
        .collect()
}

fn print_added(details: Option<&str>) {
    for line in details.unwrap_or_default().lines() {
        println!("│       {}", format!("+ {line}").green());
    }
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Key Diff".bold()
    );
    println!("│");

    for diff in diffs {
        match (&diff.current, &diff.desired) {
            (ResourceState::Absent, ResourceState::Present { details }) => {
                println!("│   {} {} {}", "+".green(), diff.resource_id, "(create)".dimmed());
                print_added(details.as_deref());
            }
            (ResourceState::Present { .. }, ResourceState::Absent) => {
                println!("│   {} {} {}", "-".red(), diff.resource_id, "(remove)".dimmed());
            }
            (ResourceState::Present { details: from }, ResourceState::Present { details: to }) => {
                println!("│   {} {}", "~".yellow(), diff.resource_id);
                let from = from.as_deref().unwrap_or_default();
                let to = to.as_deref().unwrap_or_default();
                for (tag, line) in changed_lines(from, to) {
                    match tag {
                        ChangeTag::Insert => println!("│       {}", format!("+ {line}").green()),
                        ChangeTag::Delete => println!("│       {}", format!("- {line}").red()),
                        ChangeTag::Equal => {}
                    }
                }
            }
            _ => println!("│   {} {}", "?".dimmed(), diff.resource_id),
        }
    }
    println!("│");

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} create, {} modify, {} remove)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_lines_only_reports_differences() {
        let from = "value = \"1\"\nmeta type = \"long\"";
        let to = "value = \"2\"\nmeta type = \"long\"";

        assert_eq!(
            changed_lines(from, to),
            vec![
                (ChangeTag::Delete, "value = \"1\"".to_string()),
                (ChangeTag::Insert, "value = \"2\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_changed_lines_equal_input() {
        assert!(changed_lines("a\nb", "a\nb").is_empty());
    }
}
