//! In-memory edit batches and dry-run diffs

use similar::TextDiff;

use crate::types::{EditOperation, EditStatus};

/// Apply `edits` in order to `content`
///
/// Each edit replaces every occurrence of `old_text` in the content as left
/// by the edits before it. Missing text is reported, not fatal.
pub fn apply_edits(content: &str, edits: &[EditOperation]) -> (String, Vec<EditStatus>) {
    let mut current = content.to_string();
    let mut statuses = Vec::with_capacity(edits.len());

    for edit in edits {
        let occurrences = current.matches(edit.old_text.as_str()).count();
        if occurrences == 0 {
            statuses.push(EditStatus::NotFound);
            continue;
        }
        current = current.replace(edit.old_text.as_str(), &edit.new_text);
        statuses.push(EditStatus::Replaced { occurrences });
    }

    (current, statuses)
}

/// Unified diff between the original and edited content
pub fn unified_diff(original: &str, modified: &str, label: &str) -> String {
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(
            &format!("{} (original)", label),
            &format!("{} (modified)", label),
        )
        .to_string()
}

/// One summary line per edit, e.g. `Replaced 2 occurrence(s) of 'foo'`
pub fn describe(edit: &EditOperation, status: &EditStatus) -> String {
    match status {
        EditStatus::Replaced { occurrences } => format!(
            "Replaced {} occurrence(s) of '{}' with '{}'",
            occurrences,
            preview(&edit.old_text),
            preview(&edit.new_text)
        ),
        EditStatus::NotFound => format!("Not found: '{}'", preview(&edit.old_text)),
    }
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 50;
    let mut out: String = text.chars().take(MAX_CHARS).collect();
    if text.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(old: &str, new: &str) -> EditOperation {
        EditOperation {
            old_text: old.to_string(),
            new_text: new.to_string(),
        }
    }

    #[test]
    fn test_edits_apply_sequentially() {
        let (out, statuses) = apply_edits("A", &[edit("A", "B"), edit("B", "C")]);
        assert_eq!(out, "C");
        assert_eq!(
            statuses,
            vec![
                EditStatus::Replaced { occurrences: 1 },
                EditStatus::Replaced { occurrences: 1 }
            ]
        );
    }

    #[test]
    fn test_replace_all_and_not_found() {
        let (out, statuses) = apply_edits("x y x", &[edit("x", "z"), edit("q", "r")]);
        assert_eq!(out, "z y z");
        assert_eq!(
            statuses,
            vec![EditStatus::Replaced { occurrences: 2 }, EditStatus::NotFound]
        );
    }

    #[test]
    fn test_unified_diff_headers() {
        let diff = unified_diff("one\ntwo\n", "one\nthree\n", "notes.txt");
        assert!(diff.contains("--- notes.txt (original)"));
        assert!(diff.contains("+++ notes.txt (modified)"));
        assert!(diff.contains("-two"));
        assert!(diff.contains("+three"));
    }

    #[test]
    fn test_describe_truncates_long_text() {
        let long = "a".repeat(80);
        let line = describe(&edit(&long, "b"), &EditStatus::NotFound);
        assert!(line.ends_with("...'"));
    }
}
