/*
 * MIT License
 *
 * Copyright (c) 2022 Joseph Sacchini
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};
use self::Mark::*;
use super::prelude::*;

///
/// A clue packed into a single number in [0, NUM_CLUES). One byte is enough because 3^5 = 243.
///
pub type ClueCode = u8;

///
/// How many different clues exist for a word of WORD_SIZE letters (3^5 = 243)
///
pub const NUM_CLUES: usize = Mark::NUM.pow(WORD_SIZE as u32);

///
/// The feedback shown for one letter of a guess...
///   * Absent = the letter is not in the answer, or every instance of it has already been used up
///              by other squares
///   * Present = the letter is in the answer, but somewhere else
///   * Correct = the letter is in the answer at exactly this position
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Absent,
    Present,
    Correct,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Absent, Present, Correct];
    pub const NUM: usize = Self::ALL.len();

    /// The base-3 digit for this mark
    pub fn digit(&self) -> ClueCode {
        match self {
            Absent => 0,
            Present => 1,
            Correct => 2,
        }
    }

    pub fn from_digit(digit: ClueCode) -> Option<Self> {
        Some(match digit {
            0 => Absent,
            1 => Present,
            2 => Correct,
            _ => return None,
        })
    }

    /// Accepts the usual ways people type feedback: g/y/b (or '.', 'x'), or the digits 2/1/0
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_lowercase() {
            'g' | '2' => Correct,
            'y' | '1' => Present,
            'b' | 'x' | '.' | '0' => Absent,
            _ => return None,
        })
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Absent => "⬛",
            Present => "🟨",
            Correct => "🟩",
        }
    }
}

pub type MarksArray = [Mark; WORD_SIZE];

/// The per-letter feedback for a whole guess
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Clue(pub MarksArray);

impl From<MarksArray> for Clue {
    fn from(arr: MarksArray) -> Self {
        Self(arr)
    }
}

impl Index<usize> for Clue {
    type Output = Mark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Clue {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Clue {
    /// The code of the all-Correct clue. Seeing it ends the game.
    pub const SOLVED: ClueCode = (NUM_CLUES - 1) as ClueCode;

    ///
    /// Computes the clue the game shows when `guess` is played against `answer`.
    ///
    /// Two passes over the letters, sharing a per-letter budget taken from the answer:
    /// * the Correct pass marks exact matches and spends their budget
    /// * the Present pass walks left to right, marking a letter Present only while budget remains
    ///
    /// Spending the budget in the first pass is what keeps repeated letters honest. For "tooth"
    /// against "roost" the second 't' finds the only 't' already claimed by the first one.
    ///
    /// Both words must be wordle words. Anything else is a caller bug and panics.
    ///
    #[allow(clippy::needless_range_loop)]
    pub fn compute(guess: &str, answer: &str) -> Self {
        assert!(is_wordle_str(guess), "guess '{}' is not a wordle word", guess);
        assert!(is_wordle_str(answer), "answer '{}' is not a wordle word", answer);

        let guess_bytes = guess.as_bytes();
        let answer_bytes = answer.as_bytes();
        let mut out = Self::default();
        let mut budget = count_letters_bytes(answer_bytes);

        for i in 0..WORD_SIZE {
            if guess_bytes[i] == answer_bytes[i] {
                budget[letter_idx(guess_bytes[i])] -= 1;
                out[i] = Correct;
            }
        }

        for i in 0..WORD_SIZE {
            if out[i] != Correct {
                let remaining = &mut budget[letter_idx(guess_bytes[i])];
                if *remaining > 0 {
                    *remaining -= 1;
                    out[i] = Present;
                }
            }
        }

        out
    }

    ///
    /// Packs the clue into a base-3 number. The first letter is the most significant digit, so
    /// [Absent, Correct, Correct, Correct, Correct] is 0*81 + 2*27 + 2*9 + 2*3 + 2 = 80.
    ///
    pub fn encode(&self) -> ClueCode {
        self.0
            .iter()
            .fold(0, |code, mark| code * Mark::NUM as ClueCode + mark.digit())
    }

    ///
    /// Inverse of encode. Digits are peeled off the least significant end, which is the last
    /// letter. Returns None for codes outside [0, NUM_CLUES).
    ///
    pub fn decode(mut code: ClueCode) -> Option<Self> {
        if code as usize >= NUM_CLUES {
            return None;
        }

        let mut out = Self::default();
        for i in (0..WORD_SIZE).rev() {
            out[i] = Mark::from_digit(code % Mark::NUM as ClueCode)?;
            code /= Mark::NUM as ClueCode;
        }

        Some(out)
    }

    pub fn is_solved(&self) -> bool {
        self.0.iter().all(|m| m == &Correct)
    }

    /// Parses typed feedback such as "gybbb" or "21000"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.chars().count() != WORD_SIZE {
            return None;
        }

        let mut out = Self::default();
        for (i, c) in s.chars().enumerate() {
            out[i] = Mark::from_char(c)?;
        }

        Some(out)
    }
}

/// Shorthand for Clue::compute(guess, answer).encode(), the value stored in the clue table
#[inline]
pub fn clue_code(guess: &str, answer: &str) -> ClueCode {
    Clue::compute(guess, answer).encode()
}

impl Default for Clue {
    fn default() -> Self {
        Self([Absent; WORD_SIZE])
    }
}

impl Display for Clue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for mark in &self.0 {
            f.write_str(mark.emoji())?;
        }

        Ok(())
    }
}
