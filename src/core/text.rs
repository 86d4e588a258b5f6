/// Text helpers shared by the similarity checker, scoring and tone passes.

/// Split text into lower-cased maximal alphanumeric runs.
///
/// Apostrophes and other punctuation are separators, so `"Mira's"`
/// yields `["mira", "s"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Round to two decimal places, ties to even (`0.125` → `0.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
