//! Prompt construction for commit message generation.

/// Maximum length for sanitized diff text.
const MAX_DIFF_SANITIZED_LENGTH: usize = 30_000;

/// Phrases stripped from diff text before it reaches the model.
const INJECTION_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "ignore all previous instructions",
    "disregard previous instructions",
    "ignore the above",
    "you are now",
    "new instructions:",
    "system prompt:",
];

/// What the model is asked to describe.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub diff: &'a str,
    pub deleted_files: &'a [String],
    pub refinement: Option<&'a str>,
    pub truncated: bool,
}

/// Build the LLM prompt for generating a commit message.
///
/// `include_deleted_files` mirrors the generator's capability flag; when it
/// is off the deleted-file list is left out entirely.
pub fn build_commit_prompt(input: &PromptInput<'_>, include_deleted_files: bool) -> String {
    let focus = match input.refinement.map(str::trim).filter(|r| !r.is_empty()) {
        Some(clue) => format!(" with additional focus on {}", sanitize_clue(clue)),
        None => String::new(),
    };

    let deleted_section = if include_deleted_files && !input.deleted_files.is_empty() {
        let list = input
            .deleted_files
            .iter()
            .map(|f| format!("- {f}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n## Deleted Files\n{list}")
    } else {
        String::new()
    };

    let truncation_note = if input.truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    let diff = sanitize_diff(input.diff, MAX_DIFF_SANITIZED_LENGTH);

    format!(
        r#"You write conventional git commit messages from staged changes.

Analyze the following diff{focus}.

## Diff
```
{diff}
```{truncation_note}{deleted_section}

## Rules
1. Describe every staged change except package manager lock files, sum files and generated artifacts.
2. Be concise and direct. Focus on why the changes were made.
3. Use a conventional commit type: feat, fix, docs, style, refactor, perf, test, chore.
4. Pick a scope: a shared component or feature area when the changes are related, "misc" when they touch unrelated areas.
5. No emojis or decorative elements.
6. Deleted files count as changes and must be mentioned.

## Format
- First line: `type(scope): subject` summarizing all changes, at most 60 characters
- Blank line
- Body wrapped at 72 characters. List each change separately with its purpose and impact, naming files where it helps. With a "misc" scope, explain each unrelated change on its own.

## Output
Your entire response is passed directly to `git commit`. Output only the commit message text: no introduction, no notes after it, and NEVER markdown formatting or code fences."#
    )
}

/// Sanitize diff text for inclusion in an LLM prompt.
///
/// Applies control char removal, ANSI removal, injection pattern filtering,
/// blank-line collapsing, and finally truncation on a char boundary.
pub fn sanitize_diff(text: &str, max_len: usize) -> String {
    let mut result = remove_control_chars(text);
    result = remove_ansi_escapes(&result);
    result = filter_injection_patterns(&result);
    result = normalize_whitespace(&result);

    if result.len() > max_len {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    result
}

/// Clues are short user hints; keep them on one line.
fn sanitize_clue(clue: &str) -> String {
    let cleaned = remove_ansi_escapes(&remove_control_chars(clue));
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove control characters except newlines and tabs. ESC is kept so the
/// ANSI pass can see whole sequences.
fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t' || c == '\x1b')
        .collect()
}

/// Strip CSI escape sequences (`ESC [ ... final-byte`) and stray ESC bytes.
fn remove_ansi_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if ('@'..='~').contains(&next) {
                    break;
                }
            }
        }
    }

    out
}

fn filter_injection_patterns(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in INJECTION_PATTERNS {
        loop {
            let lower = result.to_lowercase();
            // Lowercasing can change byte lengths for some scripts; only
            // splice when the offsets line up with the original.
            let Some(start) = lower.find(pattern) else {
                break;
            };
            let end = start + pattern.len();
            if lower.len() != result.len()
                || !result.is_char_boundary(start)
                || !result.is_char_boundary(end)
            {
                break;
            }
            result.replace_range(start..end, "[filtered]");
        }
    }
    result
}

/// Collapse runs of more than two blank lines.
fn normalize_whitespace(text: &str) -> String {
    let mut kept = Vec::new();
    let mut blank_run = 0;

    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        kept.push(line);
    }

    kept.join("\n")
}
