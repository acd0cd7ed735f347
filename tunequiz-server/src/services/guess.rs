//! Guess evaluation
//!
//! Lenient containment in either direction, case-insensitive.

/// True when the guess names the title or the artist
pub fn evaluate(guess: &str, title: &str, artist: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    if guess.is_empty() {
        return false;
    }

    [title, artist].iter().any(|field| {
        let field = field.trim().to_lowercase();
        field.contains(&guess) || (!field.is_empty() && guess.contains(&field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_of_title() {
        assert!(evaluate("kesar", "Kesariya", "Arijit Singh"));
    }

    #[test]
    fn test_guess_contains_artist() {
        assert!(evaluate("arijit singh live", "Kesariya", "Arijit Singh"));
    }

    #[test]
    fn test_case_and_whitespace_ignored() {
        assert!(evaluate("  KESARIYA ", "Kesariya", "Arijit Singh"));
    }

    #[test]
    fn test_unrelated_guess() {
        assert!(!evaluate("zzz", "Kesariya", "Arijit Singh"));
    }

    #[test]
    fn test_empty_guess_never_correct() {
        assert!(!evaluate("", "Kesariya", "Arijit Singh"));
        assert!(!evaluate("   ", "Kesariya", "Arijit Singh"));
    }

    #[test]
    fn test_blank_artist_does_not_match_everything() {
        assert!(!evaluate("anything", "Kesariya", ""));
        assert!(evaluate("kesariya", "Kesariya", ""));
    }
}
