use crate::classify::DisplaySummary;

/// Label shown while nothing is announced.
pub const IDLE_LABEL: &str = "[ ]";

/// Wrap a summary in the idle marker's brackets: `[ summary ]`.
pub fn announced_label(summary: &DisplaySummary) -> String {
    let mut chars = IDLE_LABEL.chars();
    match (chars.next(), chars.next_back()) {
        (Some(left), Some(right)) => format!("{left} {summary} {right}"),
        _ => summary.to_string(),
    }
}
