//! Directory listing module
//!
//! Generates the HTML index page returned for directories without an index
//! file: one link per immediate child, sorted by name.

use crate::http::path;
use std::io;
use std::path::Path;
use tokio::fs;

/// A single directory entry prepared for rendering
struct Entry {
    /// Raw file name, undecorated
    name: String,
    is_dir: bool,
    /// Symlinks are marked in the displayed text but not in the href
    is_symlink: bool,
}

/// Render the HTML listing for `dir`, titled with the request path.
pub async fn render(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut reader = fs::read_dir(dir).await?;

    while let Some(entry) = reader.next_entry().await? {
        // Lossy conversion: non-UTF-8 names are rendered, not omitted
        let name = entry.file_name().to_string_lossy().into_owned();

        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|ft| ft.is_symlink());

        // metadata() follows symlinks, so a link to a directory gets the
        // trailing slash too
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());

        entries.push(Entry {
            name,
            is_dir,
            is_symlink,
        });
    }

    // Sort on the raw name; the `/` suffix is added when rendering
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(render_page(request_path, &entries))
}

fn render_page(request_path: &str, entries: &[Entry]) -> String {
    let title = format!("Directory listing for {}", escape_html(request_path));

    let mut page = String::new();
    page.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{title}</title>\n"));
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));

    for entry in entries {
        let dir_suffix = if entry.is_dir { "/" } else { "" };
        // A symlink's marker overrides the directory suffix in the text;
        // the href keeps the suffix so the link still resolves
        let display = if entry.is_symlink {
            format!("{}@", escape_html(&entry.name))
        } else {
            format!("{}{dir_suffix}", escape_html(&entry.name))
        };
        page.push_str(&format!(
            "<li><a href=\"{}{dir_suffix}\">{display}</a></li>\n",
            path::percent_encode(&entry.name)
        ));
    }

    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    page
}

/// Escape text for inclusion in HTML element content and attribute values
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
