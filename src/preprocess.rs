//! Text cleaning applied before every classifier call.
//!
//! Emoji and punctuation are noise for the emotion models, so input is reduced
//! to ASCII letters, digits, and single spaces.
//!
//! ```rust
//! use emotion_pipelines::preprocess::normalize;
//!
//! assert_eq!(normalize("I am happy 😀😀"), "I am happy");
//! assert_eq!(normalize("Wow!!!   That's   great..."), "Wow That s great");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

// Keycaps, flags, pictographs with their modifiers/tags/ZWJ continuations, then stray components.
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[0-9#*]\x{FE0F}?\x{20E3}",
        r"|\p{Regional_Indicator}{1,2}",
        r"|\p{Extended_Pictographic}[\x{FE0F}\p{Emoji_Modifier}\x{E0020}-\x{E007F}]*",
        r"(?:\x{200D}\p{Extended_Pictographic}[\x{FE0F}\p{Emoji_Modifier}\x{E0020}-\x{E007F}]*)*",
        r"|\p{Emoji_Modifier}",
        r"|\x{20E3}",
    ))
    .expect("emoji pattern is valid")
});

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("non-word pattern is valid"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Drops every emoji sequence without leaving a placeholder.
///
/// Only the emoji code points go; a letter carrying a stray emoji component is kept.
pub fn strip_emoji(text: &str) -> String {
    EMOJI.replace_all(text, "").into_owned()
}

/// Returns the canonical cleaned form of `text`.
///
/// Emoji are removed, every other character outside `[A-Za-z0-9]` and whitespace
/// becomes a space, whitespace runs collapse to one space, and the ends are trimmed.
/// Total over all inputs: all-emoji or all-punctuation text yields `""`.
pub fn normalize(text: &str) -> String {
    let text = strip_emoji(text);
    let text = NON_WORD.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
