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

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use rayon::prelude::*;
use super::clue::*;
use super::data::{FrequencyTable, WordIdx};
use super::filter::Observation;
use super::prelude::*;
use super::table::ClueTable;

///
/// Guess cost charged to a guess which cannot itself be the answer. The extra 0.01 over a whole
/// guess makes a possible answer win any tie against a pure information-gathering guess.
///
pub const EXTRA_GUESS_COST: WordleFloat = 1.01;

///
/// The three ways of ranking guesses. Lower scores are better for all of them; each one estimates
/// how much work is left after making the guess.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Expected size of the next candidate set, guessing only words which are still possible.
    CountSquared,
    /// Like CountSquared, but the solved bucket costs nothing and any unguessed word may be played.
    CountSquaredExcludingSolved,
    /// Expected number of guesses, estimated from word frequencies and remaining entropy.
    EntropyFrequency,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::CountSquared,
        Strategy::CountSquaredExcludingSolved,
        Strategy::EntropyFrequency,
    ];

    /// Stable identity used for cache file names
    pub fn version(&self) -> u8 {
        match self {
            Strategy::CountSquared => 1,
            Strategy::CountSquaredExcludingSolved => 2,
            Strategy::EntropyFrequency => 3,
        }
    }

    pub fn from_version(version: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.version() == version)
    }

    ///
    /// Which words are worth scoring this turn:
    /// * CountSquared only considers the words which might still be the answer
    /// * the other two consider every word in the corpus which hasn't been guessed yet, because a
    ///   word that can't be the answer may still split the candidates better
    ///
    pub fn guess_pool(&self, context: &TurnContext) -> Vec<WordIdx> {
        match self {
            Strategy::CountSquared => context.candidates.to_vec(),
            Strategy::CountSquaredExcludingSolved | Strategy::EntropyFrequency => (0..context
                .table
                .len())
                .filter(|w| !context.history.iter().any(|o| o.guess == *w))
                .collect(),
        }
    }

    pub fn score(&self, guess: WordIdx, context: &TurnContext) -> WordleFloat {
        match self {
            Strategy::CountSquared => count_squared(context.table, guess, context.candidates),
            Strategy::CountSquaredExcludingSolved => {
                count_squared_excluding_solved(context.table, guess, context.candidates)
            }
            Strategy::EntropyFrequency => entropy_frequency(guess, context),
        }
    }

    ///
    /// Scores every word in the guess pool and sorts them best (lowest) first. Ties go to the
    /// lower corpus index so the ranking is fully deterministic.
    ///
    pub fn rank(&self, context: &TurnContext) -> Vec<ScoredWord> {
        let mut out: Vec<ScoredWord> = self
            .guess_pool(context)
            .into_par_iter()
            .map(|word| ScoredWord {
                word,
                score: self.score(word, context),
            })
            .collect();
        sort_ranked(&mut out);
        out
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::CountSquared => "count-squared",
            Strategy::CountSquaredExcludingSolved => "count-squared-excluding-solved",
            Strategy::EntropyFrequency => "entropy-frequency",
        };
        write!(f, "v{} ({})", self.version(), name)
    }
}

/// A guess and its score. Lower is better.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoredWord {
    pub word: WordIdx,
    pub score: WordleFloat,
}

impl ScoredWord {
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.word.cmp(&other.word))
    }
}

/// Sorts ascending by score, then by corpus index
pub fn sort_ranked(ranked: &mut [ScoredWord]) {
    ranked.sort_unstable_by(ScoredWord::cmp_rank);
}

///
/// Everything the scoring functions need to know about the current turn. Built once per turn and
/// shared (read-only) by every score computed during it.
///
pub struct TurnContext<'a> {
    table: &'a ClueTable,
    history: &'a [Observation],
    candidates: &'a [WordIdx],
    /// probability of each candidate being the answer, parallel to candidates
    probabilities: Vec<WordleFloat>,
    /// Shannon entropy of `probabilities`
    entropy: WordleFloat,
}

impl<'a> TurnContext<'a> {
    ///
    /// `candidates` must be sorted ascending (filter_candidates guarantees this) and non-empty.
    /// The probability mass is only computed for strategies which use it.
    ///
    pub fn new(
        strategy: Strategy,
        table: &'a ClueTable,
        frequencies: &FrequencyTable,
        history: &'a [Observation],
        candidates: &'a [WordIdx],
    ) -> Self {
        debug_assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        let (probabilities, entropy) = match strategy {
            Strategy::EntropyFrequency => {
                let probabilities = frequencies.mass(candidates);
                let entropy = entropy_of(&probabilities);
                (probabilities, entropy)
            }
            _ => (Vec::new(), 0.0),
        };

        Self {
            table,
            history,
            candidates,
            probabilities,
            entropy,
        }
    }

    /// 0-based number of guesses already made
    pub fn turn(&self) -> usize {
        self.history.len()
    }

    pub fn candidates(&self) -> &[WordIdx] {
        self.candidates
    }

    pub fn entropy(&self) -> WordleFloat {
        self.entropy
    }

    /// Probability that `word` is the answer, if it is still a candidate
    pub fn probability_of(&self, word: WordIdx) -> Option<WordleFloat> {
        self.candidates
            .binary_search(&word)
            .ok()
            .and_then(|idx| self.probabilities.get(idx).copied())
    }
}

/// How many candidates fall into each clue bucket if `guess` is played
fn clue_counts(table: &ClueTable, guess: WordIdx, candidates: &[WordIdx]) -> [u32; NUM_CLUES] {
    let row = table.row(guess);
    let mut counts = [0u32; NUM_CLUES];
    for &answer in candidates {
        counts[row[answer] as usize] += 1;
    }
    counts
}

///
/// Sum of count^2 over every clue bucket, divided by the number of candidates.
///
/// If the answer is uniformly one of the candidates, a bucket of size c is hit with probability
/// c/n and leaves c candidates, so this is the expected size of the next candidate set.
///
pub fn count_squared(table: &ClueTable, guess: WordIdx, candidates: &[WordIdx]) -> WordleFloat {
    let sum: u64 = clue_counts(table, guess, candidates)
        .iter()
        .map(|c| (*c as u64) * (*c as u64))
        .sum();
    sum as WordleFloat / candidates.len() as WordleFloat
}

/// count_squared without the solved bucket. Solving the game leaves nothing left to search.
pub fn count_squared_excluding_solved(
    table: &ClueTable,
    guess: WordIdx,
    candidates: &[WordIdx],
) -> WordleFloat {
    let counts = clue_counts(table, guess, candidates);
    let sum: u64 = counts[..Clue::SOLVED as usize]
        .iter()
        .map(|c| (*c as u64) * (*c as u64))
        .sum();
    sum as WordleFloat / candidates.len() as WordleFloat
}

///
/// The entropy left over after seeing the clue for `guess`: the current entropy minus the
/// entropy of the clue distribution induced by `guess`.
///
pub fn entropy_after(guess: WordIdx, context: &TurnContext) -> WordleFloat {
    let row = context.table.row(guess);
    let mut clue_probabilities: [WordleFloat; NUM_CLUES] = [0.0; NUM_CLUES];
    for (answer, p) in context.candidates.iter().zip(&context.probabilities) {
        clue_probabilities[row[*answer] as usize] += p;
    }

    context.entropy - entropy_of(&clue_probabilities)
}

///
/// Estimated number of guesses needed to finish the game if `guess` is played now.
///
/// If the guess might be the answer (probability p), then with probability p the game ends this
/// turn, otherwise it costs this turn plus the remaining entropy plus a little extra:
///   p * (turn + 1) + (1 - p) * (entropy_after + turn + 1.01)
///
/// A guess which can't be the answer always costs turn + 1.01 + entropy_after.
///
pub fn entropy_frequency(guess: WordIdx, context: &TurnContext) -> WordleFloat {
    let turn = context.turn() as WordleFloat;
    let remaining = entropy_after(guess, context);
    match context.probability_of(guess) {
        Some(p) => p * (turn + 1.0) + (1.0 - p) * (remaining + turn + EXTRA_GUESS_COST),
        None => turn + EXTRA_GUESS_COST + remaining,
    }
}

///
/// Ranks the next guess for a history whose candidate set has already been computed.
///
pub fn rank_guesses(
    strategy: Strategy,
    table: &ClueTable,
    frequencies: &FrequencyTable,
    history: &[Observation],
    candidates: &[WordIdx],
) -> Vec<ScoredWord> {
    let context = TurnContext::new(strategy, table, frequencies, history, candidates);
    strategy.rank(&context)
}
