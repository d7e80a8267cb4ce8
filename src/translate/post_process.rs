//! Deterministic, locale-independent text shaping around model calls.

/// Finalizes model output text for presentation.
///
/// Trims surrounding whitespace, uppercases the first letter, and appends a
/// terminal `.` unless the text already ends with `.`, `!`, or `?`.
/// Idempotent: applying it twice yields the same string.
pub fn finalize_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut text = String::with_capacity(trimmed.len() + 1);
    let mut chars = trimmed.chars();
    if let Some(first) = chars.next() {
        text.extend(first.to_uppercase());
        text.push_str(chars.as_str());
    }

    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}

/// Normalizes caller text before sign generation.
///
/// Trims, lowercases, and collapses runs of repeated terminal punctuation
/// (`...` → `.`, `!!` → `!`, `??` → `?`).
pub fn normalize_input(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev: Option<char> = None;
    for ch in lowered.chars() {
        if matches!(ch, '.' | '!' | '?') && prev == Some(ch) {
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}
