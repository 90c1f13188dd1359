//! Shared formatting utilities for UI components.

use crate::facet_tree::CheckState;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a number with thousand separators.
pub(super) fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Checkbox drawn for a checklist row.
pub(super) fn check_box(state: CheckState) -> &'static str {
    match state {
        CheckState::Checked => "[x]",
        CheckState::Indeterminate => "[-]",
        CheckState::Unchecked => "[ ]",
    }
}

/// Applied value, followed by the staged one when it differs.
pub(super) fn format_param_change(current: &str, staged: &str) -> String {
    let show = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    if current == staged {
        show(current)
    } else {
        format!("{} → {}", show(current), show(staged))
    }
}

/// Cut `text` to at most `max` display columns, marking the cut with `…`.
pub(super) fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_and_changes() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(12), "12");
        assert_eq!(format_param_change("a", "a"), "a");
        assert_eq!(format_param_change("", "b"), "- → b");
        assert_eq!(check_box(CheckState::Indeterminate), "[-]");
    }

    #[test]
    fn truncation_counts_columns() {
        assert_eq!(truncate_to_width("Velocities", 20), "Velocities");
        assert_eq!(truncate_to_width("Velocities", 5), "Velo…");
        assert_eq!(truncate_to_width("地震観測", 5), "地震…");
    }
}
