//! Output file naming and Linux-safe filename sanitization.

/// Removes `[...]` qualifiers such as region tags (`[UK Only]`).
pub fn strip_bracketed(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Clip file name: `<channel>_<start>_<end>.mp4`, with bracketed qualifiers
/// dropped and whitespace runs in the channel name turned into `-`.
///
/// `"BBC One London [UK Only] "`, 100, 200 → `"BBC-One-London_100_200.mp4"`
pub fn clip_file_name(channel: &str, start_unix: i64, end_unix: i64) -> String {
    let stripped = strip_bracketed(channel);
    let dashed = stripped.split_whitespace().collect::<Vec<_>>().join("-");
    let channel_part = sanitize_filename_for_linux(&dashed);
    let channel_part = if channel_part.is_empty() {
        "clip".to_string()
    } else {
        channel_part
    };
    format!("{}_{}_{}.mp4", channel_part, start_unix, end_unix)
}

/// Sanitizes a candidate filename for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length to 200 bytes, leaving room for the timestamp suffix
pub fn sanitize_filename_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 200;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
