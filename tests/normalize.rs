use emotion_pipelines::preprocess::{normalize, strip_emoji};

fn is_clean(s: &str) -> bool {
    s.is_empty()
        || (s.split(' ').all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphanumeric())))
}

const SAMPLES: &[&str] = &[
    "I am happy 😀😀",
    "Wow!!!   That's   great...",
    "   leading and trailing   ",
    "tabs\tand\nnewlines\r\n",
    "👨‍👩‍👧 family 🇮🇸 flag 1️⃣ keycap 👍🏽 tone",
    "café crème brûlée",
    "!!!???",
    "😀",
    "",
    "mixed-case_Under_scores & ampersands #hashtag @mention",
    "x a\u{20E3} y",
    "a🏽b",
];

#[test]
fn emoji_are_removed() {
    assert_eq!(normalize("I am happy 😀😀"), "I am happy");
}

#[test]
fn punctuation_and_spacing_collapse() {
    assert_eq!(normalize("Wow!!!   That's   great..."), "Wow That s great");
}

#[test]
fn output_is_ascii_words_separated_by_single_spaces() {
    for sample in SAMPLES {
        let cleaned = normalize(sample);
        assert!(is_clean(&cleaned), "{sample:?} -> {cleaned:?}");
    }
}

#[test]
fn normalize_is_idempotent() {
    for sample in SAMPLES {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "{sample:?}");
    }
}

#[test]
fn only_symbols_yields_empty() {
    assert_eq!(normalize("😀 !!! 🎉 ..."), "");
}

#[test]
fn strip_emoji_keeps_other_text() {
    assert_eq!(strip_emoji("ok 👍🏽!"), "ok !");
}

#[test]
fn letters_next_to_stray_emoji_components_survive() {
    assert_eq!(normalize("x a\u{20E3} y"), "x a y");
    assert_eq!(normalize("a🏽b"), "ab");
}
