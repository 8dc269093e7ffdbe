//! Sanitization of free-text model replies into filesystem-safe labels.
//!
//! The sanitizer is a security boundary: the reply text is untrusted and
//! ends up as a filename, so anything outside `[a-z0-9_]` is rejected or
//! replaced rather than passed through. The function is total and
//! idempotent on its own output.

/// Normalize a raw model reply into a label.
///
/// Takes only the first line, lowercases it, collapses every run of
/// characters outside `[a-z0-9]` into a single underscore, and strips
/// leading/trailing underscores. Empty results fall back to
/// `"<letter-or-item>_unknown"`; when an expected letter is given the
/// label is reprefixed so it always starts with that letter.
pub fn sanitize(raw: &str, expected_letter: Option<char>) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("").to_lowercase();

    let mut cleaned = String::with_capacity(first_line.len());
    for c in first_line.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            cleaned.push(c);
        } else if !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }
    let cleaned = cleaned.trim_matches('_');

    let mut label = if cleaned.is_empty() {
        fallback_label(expected_letter)
    } else {
        cleaned.to_string()
    };

    if let Some(letter) = expected_letter {
        if !label.starts_with(letter) {
            label = format!("{letter}_{label}");
        }
    }

    if !label
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
    {
        label = format!("{}_{}", prefix_stem(expected_letter), label);
    }

    label
}

/// The deterministic placeholder used when classification permanently fails.
pub fn fallback_label(expected_letter: Option<char>) -> String {
    format!("{}_unknown", prefix_stem(expected_letter))
}

fn prefix_stem(expected_letter: Option<char>) -> String {
    match expected_letter {
        Some(letter) => letter.to_string(),
        None => "item".to_string(),
    }
}
