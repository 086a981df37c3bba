//! Scratch document text format.
//!
//! ```text
//! # <prompt name>
//!
//! <raw content>
//! ```
//!
//! [`extract_content`] is best-effort header stripping, not a strict parser:
//! if the user edits or deletes the header the split point moves with it.

/// First character of a header line.
pub const HEADER_MARKER: char = '#';

/// Characters that may not appear in a backing file name.
const UNSAFE_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Seed text for a scratch document.
pub fn render(prompt_name: &str, content: &str) -> String {
    let title = prompt_name.replace(['\r', '\n'], " ");
    format!("{HEADER_MARKER} {title}\n\n{content}")
}

/// Recover prompt content from scratch text.
///
/// Skips leading header and blank lines. A blank line directly after a
/// header line ends the skipped run; the first line that is neither blank
/// nor a header starts the content. Trailing whitespace is trimmed. Text
/// made up only of headers and blank lines (without that terminating blank)
/// is returned whole.
pub fn extract_content(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut start = 0;
    for (i, line) in lines.iter().enumerate() {
        let blank = line.trim().is_empty();
        if !blank && !line.starts_with(HEADER_MARKER) {
            start = i;
            break;
        }
        if blank && i > 0 && lines[i - 1].starts_with(HEADER_MARKER) {
            start = i + 1;
            break;
        }
    }
    lines[start..].join("\n").trim_end().to_string()
}

/// Replace characters that are invalid in file names with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if UNSAFE_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `<preset stem>-<sanitized prompt name>-<millis>.md`
pub fn backing_name(preset_stem: &str, prompt_name: &str, millis: i64) -> String {
    format!(
        "{}-{}-{millis}.md",
        sanitize_name(preset_stem),
        sanitize_name(prompt_name)
    )
}
