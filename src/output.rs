use std::fmt::Write;

use crate::document::Document;
use crate::types::DocumentKind;

/// Serialize a [`Document`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(doc: &Document<'_>, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    result.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a [`Document`] in a human-readable debug format.
pub fn format_debug(doc: &Document<'_>) -> String {
    let mut out = String::with_capacity(256);

    match doc.kind() {
        DocumentKind::Request => {
            out.push_str("=== HTTP Request ===\n");
            let _ = writeln!(out, "Method:  {}", doc.method());
            let _ = writeln!(out, "URI:     {}", doc.uri());
        }
        DocumentKind::Response => {
            out.push_str("=== HTTP Response ===\n");
            let _ = writeln!(out, "Status:  {}", doc.status());
            let _ = writeln!(out, "Reason:  {}", doc.reason());
        }
    }
    let _ = writeln!(out, "Version: {}", doc.version());

    let _ = writeln!(out, "\n--- Headers ({}) ---", doc.headers().len());
    for header in doc.headers() {
        let _ = writeln!(out, "  {}: {}", header.name, header.value);
    }

    match doc.body() {
        Some(body) => {
            let _ = writeln!(out, "\n--- Body ({} bytes) ---", body.len());
            match body.as_str() {
                Some(s) => out.push_str(s),
                None => {
                    let _ = write!(out, "<binary data: {} bytes>", body.len());
                }
            }
            out.push('\n');
        }
        None => out.push_str("\n--- No Body ---\n"),
    }

    out.push_str("====================\n");
    out
}

/// Render only the start line and headers (no body).
pub fn format_headers_only(doc: &Document<'_>) -> String {
    let mut out = String::with_capacity(64 + doc.headers().len() * 40);

    let _ = match doc.kind() {
        DocumentKind::Request => writeln!(out, "{} {} {}", doc.method(), doc.uri(), doc.version()),
        DocumentKind::Response => {
            writeln!(out, "{} {:03} {}", doc.version(), doc.status(), doc.reason())
        }
    };

    for header in doc.headers() {
        let _ = writeln!(out, "{}: {}", header.name, header.value);
    }

    out
}
