//! Local blurbs for when no generator is available.
//!
//! The output depends only on the inputs, so the same book always gets the
//! same fallback text, and it is never empty.
//!
//! ## With a description
//! 1. Keep it whole if it fits in [`BLURB_MAX_CHARS`]
//! 2. Otherwise cut to [`BLURB_MAX_CHARS`] and end on the last `.`, `!` or `?`
//!    past character 100; failing that, on the last space past character
//!    120 followed by "..."; failing that, hard-cut with "..."
//! 3. Prefix "Discover " (lower-casing the text) unless it already opens
//!    with discover / experience / dive
//!
//! ## Without one
//! An opener picked from title words, then the author.

use catalog::UNKNOWN_AUTHOR;

/// Target length of a blurb, in characters
pub const BLURB_MAX_CHARS: usize = 150;

/// A sentence end must fall after this many characters to be used as the cut
const MIN_SENTENCE_CUT: usize = 100;

/// A word boundary must fall after this many characters to be used as the cut
const MIN_WORD_CUT: usize = 120;

const ENGAGING_OPENERS: [&str; 3] = ["discover", "experience", "dive"];

/// Title keyword -> opener, checked in order
const GENRE_HINTS: [(&str, &str); 6] = [
    ("love", "A heartwarming tale"),
    ("murder", "A gripping mystery"),
    ("magic", "An enchanting adventure"),
    ("war", "A powerful story"),
    ("space", "An epic journey"),
    ("secret", "A thrilling discovery"),
];

const DEFAULT_OPENER: &str = "A captivating read";

/// Build a blurb from what the book already carries.
pub fn fallback_blurb(title: &str, author: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => from_description(description),
        None => from_title(title, author),
    }
}

fn from_description(description: &str) -> String {
    let chars: Vec<char> = description.chars().collect();
    if chars.len() <= BLURB_MAX_CHARS {
        return make_engaging(description.to_string());
    }

    let window = &chars[..BLURB_MAX_CHARS];
    let sentence_end = window.iter().rposition(|c| matches!(c, '.' | '!' | '?'));
    let text = match sentence_end {
        Some(end) if end > MIN_SENTENCE_CUT => window[..=end].iter().collect(),
        _ => {
            let cut = match window.iter().rposition(|c| *c == ' ') {
                Some(space) if space > MIN_WORD_CUT => space,
                _ => window.len(),
            };
            let mut text: String = window[..cut].iter().collect();
            text.push_str("...");
            text
        }
    };
    make_engaging(text)
}

fn make_engaging(text: String) -> String {
    let lower = text.to_lowercase();
    if ENGAGING_OPENERS.iter().any(|opener| lower.starts_with(opener)) {
        text
    } else {
        format!("Discover {}", lower)
    }
}

fn from_title(title: &str, author: &str) -> String {
    let title = title.to_lowercase();
    let words: Vec<&str> = title.split_whitespace().collect();
    let opener = GENRE_HINTS
        .iter()
        .find(|(hint, _)| words.iter().any(|word| word.contains(hint)))
        .map(|(_, opener)| *opener)
        .unwrap_or(DEFAULT_OPENER);

    let author = match author.trim() {
        "" => UNKNOWN_AUTHOR,
        name => name,
    };
    format!(
        "{} by {}. This engaging story will keep you turning pages.",
        opener, author
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "Ryland Grace is the sole survivor on a desperate, last-chance mission, \
        and if he fails, humanity and the earth itself will perish. Except that right now, \
        he doesn't know that.";

    #[test]
    fn test_short_description_is_kept_whole() {
        assert_eq!(
            fallback_blurb("Dune", "Frank Herbert", Some("Spice must flow.")),
            "Discover spice must flow."
        );
        assert_eq!(
            fallback_blurb("Dune", "Frank Herbert", Some("Experience Arrakis.")),
            "Experience Arrakis."
        );
    }

    #[test]
    fn test_long_description_ends_on_sentence() {
        let blurb = fallback_blurb("Project Hail Mary", "Andy Weir", Some(LONG));
        assert!(blurb.starts_with("Discover ryland grace"));
        assert!(blurb.ends_with("will perish."));
        assert!(blurb.chars().count() <= BLURB_MAX_CHARS + "Discover ".len());
    }

    #[test]
    fn test_long_description_without_sentence_end() {
        let text = "word ".repeat(60);
        let blurb = fallback_blurb("T", "A", Some(&text));
        assert!(blurb.ends_with("..."));
        assert!(blurb.starts_with("Discover word"));
        // cut on a space, so no partial trailing word
        assert!(!blurb.contains("wor..."));
    }

    #[test]
    fn test_title_hints() {
        assert_eq!(
            fallback_blurb("Murder on the Orient Express", "Agatha Christie", None),
            "A gripping mystery by Agatha Christie. This engaging story will keep you turning pages."
        );
        assert_eq!(
            fallback_blurb("The Lost Love Letters", "Anon", Some("   ")),
            "A heartwarming tale by Anon. This engaging story will keep you turning pages."
        );
        assert!(fallback_blurb("Dune", "", None).starts_with("A captivating read by Unknown Author."));
    }

    #[test]
    fn test_deterministic_and_non_empty() {
        let a = fallback_blurb("Project Hail Mary", "Andy Weir", Some(LONG));
        let b = fallback_blurb("Project Hail Mary", "Andy Weir", Some(LONG));
        assert_eq!(a, b);
        assert!(!fallback_blurb("", "", None).is_empty());
    }

    #[test]
    fn test_multibyte_text_is_cut_on_chars() {
        let text = "é".repeat(400);
        let blurb = fallback_blurb("T", "A", Some(&text));
        assert!(blurb.ends_with("..."));
    }
}
