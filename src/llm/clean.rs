//! Cleanup of model output before it is shown as a commit message.
//!
//! Models are told not to use markdown, but some still wrap the message in
//! a fenced block or pad it with blank lines.

/// Normalize a raw model response into commit message text.
///
/// Strips one surrounding ``` fence (with or without a language tag),
/// trailing whitespace on each line, and leading/trailing blank lines.
/// Returns an empty string when nothing usable is left.
pub fn clean_message(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = strip_fence(trimmed).unwrap_or(trimmed);

    unfenced
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let body_start = rest.find('\n')?;
    let body = rest[body_start + 1..].trim_end();
    body.strip_suffix("```")
}
