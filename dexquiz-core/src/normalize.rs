//! Reduction of guesses and catalog names to a comparable token.

/// Normalize a catalog name or a raw guess for comparison.
///
/// Every character that is not an ASCII letter is dropped and the rest is
/// lowercased, so "Mr. Mime", "mr mime" and "MRMIME" all become `mrmime`.
/// An empty result never matches a catalog entry.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_case() {
        assert_eq!(normalize("Mr. Mime"), "mrmime");
        assert_eq!(normalize("mrmime"), "mrmime");
        assert_eq!(normalize("Farfetch'd"), "farfetchd");
        assert_eq!(normalize("  bulba saur "), "bulbasaur");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  123 !? "), "");
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        // "é" is alphabetic but not ASCII
        assert_eq!(normalize("Flabébé"), "flabb");
        assert_eq!(normalize("Nidoran♀"), "nidoran");
    }
}
