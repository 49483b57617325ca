use crate::core_registry::FileEntry;

/// RFC 959 Appendix II quoting for paths embedded in replies: double every
/// embedded quote. The first backslash is additionally turned into a
/// forward slash (single replacement, matching the wire behavior clients
/// already depend on).
pub fn path_escape(text: &str) -> String {
    text.replace('"', "\"\"").replacen('\\', "/", 1)
}

/// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
pub fn format_pasv_reply(host: &str, port: u16) -> String {
    format!(
        "227 Entering Passive Mode ({},{},{})",
        host.replace('.', ","),
        port / 256,
        port % 256
    )
}

/// One fixed-width LIST line per file entry.
pub fn format_list_line(file: &FileEntry) -> String {
    format!(
        "-rw-rw-rw- 1 s3username groupname {:>12} {:>12} {}\r\n",
        file.length,
        file.updated_at.format("%b %d %H:%M").to_string(),
        file.filename
    )
}

/// Splits an inbound line into uppercased verb and trimmed argument.
pub fn parse_command_line(line: &str) -> (String, String) {
    match line.trim_start().split_once(' ') {
        Some((verb, rest)) => (verb.trim().to_ascii_uppercase(), rest.trim().to_string()),
        None => (line.trim().to_ascii_uppercase(), String::new()),
    }
}
