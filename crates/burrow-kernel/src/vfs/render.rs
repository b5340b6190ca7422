//! Bounded-depth tree rendering for `ls`.
//!
//! One line per child, box-drawing connectors, last child marked with
//! the corner connector. Locked or unavailable children are listed with
//! an annotation but never expanded. When the depth budget runs out and
//! children remain, a single continuation marker line is printed.

use super::node::{Access, Folder};

/// Marker printed in place of children beyond the depth cutoff.
const MORE_MARKER: &str = "...";

/// Render the children of `folder` down to `max_depth` levels.
pub fn render(folder: &Folder, max_depth: usize) -> String {
    let mut out = String::new();
    render_children(folder, max_depth, "", &mut out);
    out
}

fn render_children(folder: &Folder, depth: usize, indent: &str, out: &mut String) {
    let mut remaining = folder.child_count();
    if remaining == 0 {
        return;
    }
    if depth == 0 {
        out.push_str(indent);
        out.push_str("└── ");
        out.push_str(MORE_MARKER);
        out.push('\n');
        return;
    }

    for sub in folder.folders.values() {
        remaining -= 1;
        let last = remaining == 0;
        let annotation = annotate(&sub.access);
        out.push_str(indent);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&sub.name);
        out.push_str(annotation);
        out.push('\n');

        if annotation.is_empty() {
            let child_indent = format!("{indent}{}", if last { "    " } else { "│   " });
            render_children(sub, depth - 1, &child_indent, out);
        }
    }

    for file in folder.files.values() {
        remaining -= 1;
        out.push_str(indent);
        out.push_str(if remaining == 0 { "└── " } else { "├── " });
        out.push_str(&file.name);
        out.push_str(annotate(&file.access));
        out.push('\n');
    }
}

fn annotate(access: &Access) -> &'static str {
    if access.locked {
        " [locked]"
    } else if !access.window.is_open() {
        " [unavailable]"
    } else {
        ""
    }
}
