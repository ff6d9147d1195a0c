use similar::{Algorithm, ChangeTag, TextDiff};

use crate::application::dto::bulk_replace::{DiffLine, DiffLineType};

pub fn line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(old, new);
    let mut lines = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;
    for op in diff.ops() {
        for change in diff.iter_changes(op) {
            let content = change.to_string().trim_end().to_string();
            match change.tag() {
                ChangeTag::Delete => {
                    old_line += 1;
                    lines.push(DiffLine {
                        line_type: DiffLineType::Deleted,
                        old_line_number: Some(old_line),
                        new_line_number: None,
                        content,
                    });
                }
                ChangeTag::Insert => {
                    new_line += 1;
                    lines.push(DiffLine {
                        line_type: DiffLineType::Added,
                        old_line_number: None,
                        new_line_number: Some(new_line),
                        content,
                    });
                }
                ChangeTag::Equal => {
                    old_line += 1;
                    new_line += 1;
                    lines.push(DiffLine {
                        line_type: DiffLineType::Context,
                        old_line_number: Some(old_line),
                        new_line_number: Some(new_line),
                        content,
                    });
                }
            }
        }
    }
    lines
}
