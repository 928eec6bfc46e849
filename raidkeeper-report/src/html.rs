//! Plain text → simple HTML for email bodies.
//!
//! Understands the handful of constructs the text template emits:
//! `## heading`, `- item` lists, `> note` call-outs and `|`-delimited tables.
//! Everything after the `## Log` heading is copied into a `<pre>` block.

use tera::escape_html as escape;

#[derive(PartialEq)]
enum Block {
    None,
    List,
    Table { header_done: bool },
}

/// Convert rendered report text to a standalone HTML document.
pub fn text_to_html(text: &str) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head>\n<body style=\"font-family: sans-serif\">\n",
    );
    let mut block = Block::None;
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_end();

        if !trimmed.starts_with("- ") && block == Block::List {
            html.push_str("</ul>\n");
            block = Block::None;
        }
        if !trimmed.starts_with('|') && matches!(block, Block::Table { .. }) {
            html.push_str("</table>\n");
            block = Block::None;
        }

        if let Some(heading) = trimmed.strip_prefix("## ") {
            html.push_str(&format!("<h3>{}</h3>\n", escape(heading)));
            if heading == "Log" {
                let rest: Vec<&str> = lines.by_ref().collect();
                html.push_str("<pre>");
                html.push_str(&escape(rest.join("\n").trim_matches('\n')));
                html.push_str("</pre>\n");
                break;
            }
        } else if let Some(item) = trimmed.strip_prefix("- ") {
            if block != Block::List {
                html.push_str("<ul>\n");
                block = Block::List;
            }
            html.push_str(&format!("<li>{}</li>\n", escape(item)));
        } else if let Some(note) = trimmed.strip_prefix("> ") {
            html.push_str(&format!("<p><strong>{}</strong></p>\n", escape(note)));
        } else if trimmed.starts_with('|') {
            let cells: Vec<&str> = trimmed
                .trim_matches('|')
                .split('|')
                .map(str::trim)
                .collect();
            if cells.iter().all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-')) {
                continue;
            }
            let header_done = match block {
                Block::Table { header_done } => header_done,
                _ => {
                    html.push_str("<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n");
                    false
                }
            };
            let tag = if header_done { "td" } else { "th" };
            html.push_str("<tr>");
            for cell in cells {
                html.push_str(&format!("<{tag}>{}</{tag}>", escape(cell)));
            }
            html.push_str("</tr>\n");
            block = Block::Table { header_done: true };
        } else if !trimmed.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape(trimmed)));
        }
    }

    match block {
        Block::List => html.push_str("</ul>\n"),
        Block::Table { .. } => html.push_str("</table>\n"),
        Block::None => {}
    }
    html.push_str("</body></html>\n");
    html
}
