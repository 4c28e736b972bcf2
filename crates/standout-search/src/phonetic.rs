//! Soundex and reverse Soundex phonetic codes.
//!
//! A code is a letter followed by three digits. Consonants map to classes:
//!
//! ```text
//! B F P V          -> 1
//! C G J K Q S X Z  -> 2
//! D T              -> 3
//! L                -> 4
//! M N              -> 5
//! R                -> 6
//! ```
//!
//! Vowels, `H`, `W` and `Y` produce no digit. Adjacent letters of the same
//! class produce one digit, also when separated by `H` or `W`; a vowel (or
//! `Y`) between them keeps both. Characters other than ASCII letters are
//! skipped.

/// Encodes `word`, keeping its first letter as written.
///
/// Returns an empty string when `word` contains no letters.
///
/// ```
/// use standout_search::soundex;
///
/// assert_eq!(soundex("Robert"), "R163");
/// assert_eq!(soundex("Rupert"), "R163");
/// assert_eq!(soundex("Tymczak"), "T522");
/// ```
pub fn soundex(word: &str) -> String {
    encode(word.chars(), false)
}

/// Encodes `word` read backwards, starting from its last letter uppercased.
///
/// ```
/// use standout_search::reverse_soundex;
///
/// assert_eq!(reverse_soundex("Robert"), "T616");
/// ```
pub fn reverse_soundex(word: &str) -> String {
    encode(word.chars().rev(), true)
}

/// Encodes with the direction chosen at runtime.
pub fn phonetic_code(word: &str, reversed: bool) -> String {
    if reversed {
        reverse_soundex(word)
    } else {
        soundex(word)
    }
}

fn encode(chars: impl Iterator<Item = char>, uppercase_first: bool) -> String {
    let mut letters = chars.filter(char::is_ascii_alphabetic);
    let Some(first) = letters.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(4);
    code.push(if uppercase_first {
        first.to_ascii_uppercase()
    } else {
        first
    });

    let mut previous = class(first);
    for letter in letters {
        if code.len() == 4 {
            break;
        }
        match class(letter) {
            Some(digit) => {
                if previous != Some(digit) {
                    code.push(digit);
                }
                previous = Some(digit);
            }
            // H and W are transparent; vowels separate.
            None if matches!(letter.to_ascii_uppercase(), 'H' | 'W') => {}
            None => previous = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

fn class(letter: char) -> Option<char> {
    match letter.to_ascii_uppercase() {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_codes() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Rubin"), "R150");
        assert_eq!(soundex("Tymczak"), "T522");
        assert_eq!(soundex("Pfister"), "P236");
        assert_eq!(soundex("Honeyman"), "H555");
    }

    #[test]
    fn h_and_w_do_not_separate() {
        assert_eq!(soundex("Ashcraft"), "A261");
        assert_eq!(soundex("Ashcraft"), soundex("Aschroft"));
    }

    #[test]
    fn vowels_separate_repeats() {
        assert_eq!(soundex("Sacks"), "S200");
        assert_eq!(soundex("Tymczak"), "T522");
        // c and k on either side of a vowel both count
        assert_eq!(soundex("Cakec"), "C220");
    }

    #[test]
    fn pads_short_words() {
        assert_eq!(soundex("Lee"), "L000");
        assert_eq!(soundex("a"), "a000");
    }

    #[test]
    fn keeps_first_letter_as_written() {
        assert_eq!(soundex("robert"), "r163");
    }

    #[test]
    fn skips_non_letters() {
        assert_eq!(soundex("O'Brien"), "O165");
        assert_eq!(soundex("  Robert"), "R163");
        assert_eq!(soundex(""), "");
        assert_eq!(soundex("123"), "");
    }

    #[test]
    fn reverse_starts_from_last_letter() {
        assert_eq!(reverse_soundex("robert"), "T616");
        assert_eq!(reverse_soundex("Smith"), "H352");
        assert_eq!(phonetic_code("Smith", true), reverse_soundex("Smith"));
        assert_eq!(phonetic_code("Smith", false), soundex("Smith"));
    }
}
