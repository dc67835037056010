//! HTML pages
//!
//! Rendering is kept apart from the handlers: the index page takes the
//! listing, the message page takes a single line of text.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::storage::ListedEntry;

const STYLE: &str = r#"
    body { font-family: 'Segoe UI', sans-serif; background: #fafafa; color: #333; padding: 20px; }
    .container { max-width: 700px; margin: auto; }
    h1 { text-align: center; color: #b8860b; }
    .card { background: white; padding: 24px; margin-bottom: 24px; border-radius: 14px;
            box-shadow: 0 4px 12px rgba(0,0,0,0.1); }
    h2 { margin-top: 0; font-size: 1.3em; }
    button, .back { margin-top: 10px; padding: 10px 18px; background: #b8860b; color: white;
                    border: none; border-radius: 6px; cursor: pointer; text-decoration: none;
                    display: inline-block; }
    ul { list-style: none; padding: 0; }
    li { margin: 8px 0; padding: 10px; border: 1px solid #eee; border-radius: 8px; background: #fff8dc; }
    li .size { float: right; color: #999; font-size: 0.9em; }
    a { color: #b8860b; }
"#;

/// Main page: upload forms plus the current contents of the storage root
pub fn render_index(entries: &[ListedEntry]) -> String {
    let items: String = entries.iter().map(render_entry).collect();
    let listing = if items.is_empty() {
        "<p>No files yet.</p>".to_string()
    } else {
        format!("<ul>{items}</ul>")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Phone &harr; PC File Transfer</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Phone &harr; PC Transfer</h1>
        <div class="card">
            <h2>Upload Files</h2>
            <form method="POST" enctype="multipart/form-data" action="/upload">
                <input type="file" name="files" multiple><br>
                <button type="submit">Upload Files</button>
            </form>
        </div>
        <div class="card">
            <h2>Upload Folder</h2>
            <form method="POST" enctype="multipart/form-data" action="/upload_folder">
                <input type="file" name="folder" webkitdirectory directory multiple><br>
                <button type="submit">Upload Folder</button>
            </form>
        </div>
        <div class="card">
            <h2>Download</h2>
            {listing}
        </div>
    </div>
</body>
</html>
"#
    )
}

/// Result page with a single message and a link back to the index
pub fn render_message(title: &str, message: &str) -> String {
    let title = encode_text(title);
    let message = encode_text(message);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="card" style="text-align: center;">
            <h2>{title}</h2>
            <p>{message}</p>
            <a class="back" href="/">Go Back</a>
        </div>
    </div>
</body>
</html>
"#
    )
}

fn render_entry(entry: &ListedEntry) -> String {
    let name = encode_text(&entry.name);

    if entry.is_dir {
        return format!("<li>{name}/</li>");
    }

    let href = format!("/download/{}", encode_path_segment(&entry.name));
    format!(
        r#"<li><a href="{}">{name}</a><span class="size">{}</span></li>"#,
        encode_double_quoted_attribute(&href),
        human_readable_size(entry.size)
    )
}

/// Percent-encodes everything outside the RFC 3986 unreserved set
pub fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn human_readable_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
