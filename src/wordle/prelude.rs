// Constants which define the shape of the game, plus a few helpers for working with raw words.
//
// Every persisted artifact (clue table, value caches) is derived from these, so changing WORD_SIZE
// invalidates all of them.


// how many characters are in a word?
pub const WORD_SIZE: usize = 5;
// how many letters are in the english alphabet?
pub const ALPHABET_SIZE: usize = (('z' as usize) - ('a' as usize)) + 1;

// Switch between f64 and f32 for every score / probability calculation.
pub type WordleFloat = f64;

/// Counts how many times each letter of the alphabet occurs in the word, indexed by the position
/// of the letter in the alphabet ('a' = 0, 'b' = 1, ...). The bytes must be a wordle word.
pub fn count_letters_bytes(word: &[u8]) -> [u8; ALPHABET_SIZE] {
    debug_assert!(is_wordle_str_bytes(word));
    let mut out = [0; ALPHABET_SIZE];
    for &letter in word {
        out[letter_idx(letter)] += 1;
    }

    out
}

/// Position of a lowercase ascii letter within the alphabet
#[inline]
pub fn letter_idx(letter: u8) -> usize {
    (letter - b'a') as usize
}

/// A "wordle str" is exactly WORD_SIZE lowercase ascii letters
pub fn is_wordle_str(v: &str) -> bool {
    is_wordle_str_bytes(v.as_bytes())
}

pub fn is_wordle_str_bytes(v: &[u8]) -> bool {
    v.len() == WORD_SIZE && v.iter().all(u8::is_ascii_lowercase)
}

#[inline]
pub fn sigmoid(v: WordleFloat) -> WordleFloat {
    (1.0 + (-v).exp()).recip()
}

/// Trims whitespace and lowercases. The output still has to be checked with is_wordle_str.
pub fn normalize_wordle_word(str: &str) -> String {
    str.trim().to_lowercase()
}

/// Shannon entropy (in bits) of a probability mass. Zero entries contribute nothing.
pub fn entropy_of<'a, I>(probabilities: I) -> WordleFloat
where
    I: IntoIterator<Item = &'a WordleFloat>,
{
    probabilities
        .into_iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * p.recip().log2())
        .sum()
}
