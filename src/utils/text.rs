/// Takes the first `max` characters of a string and appends "...".
/// Counts chars, not bytes, so multi-byte text never splits mid-character.
/// The ellipsis is appended even when nothing was cut; prompt snippets
/// always read as excerpts.
pub fn snippet(s: &str, max: usize) -> String {
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut)
}

/// Strips a surrounding ```json ... ``` or ``` ... ``` code fence the model
/// sometimes adds despite instructions. Unfenced text is returned as-is.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim())
    } else {
        text
    }
}
