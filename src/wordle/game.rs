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

use std::sync::Arc;
use thiserror::Error;
use super::cache::*;
use super::clue::*;
use super::config::Config;
use super::data::*;
use super::filter::{filter_candidates, Observation};
use super::prelude::*;
use super::strategy::*;
use super::table::ClueTable;

#[derive(Error, Debug)]
pub enum SolverErr {
    #[error("'{0}' is not in the word list")]
    UnknownWord(String),
    #[error("{0} is not a valid clue code")]
    InvalidClueCode(ClueCode),
    #[error("no possible words remain")]
    NoCandidates,
    #[error("the wordle puzzle is already solved")]
    AlreadySolved,
    #[error("no turns remaining")]
    TurnsExhausted,
    #[error(transparent)]
    Data(#[from] LoadDataErr),
    #[error(transparent)]
    Cache(#[from] CacheErr),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    /// no guesses yet
    Start,
    /// at least one guess, and the last clue was not all green
    InProgress,
    /// the last clue was all green. Nothing may be added after this.
    Solved,
}

///
/// The guesses made so far in one game, in the order they were made, each with the clue it
/// produced. Append-only.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuessHistory {
    observations: Vec<Observation>,
}

impl GuessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Records another observation. Fails if the game is already solved or the clue code is out
    /// of range. The caller is responsible for `guess` being a corpus index (see Solver::record).
    ///
    pub fn push(&mut self, observation: Observation) -> Result<(), SolverErr> {
        if self.state() == GameState::Solved {
            return Err(SolverErr::AlreadySolved);
        }

        if observation.clue as usize >= NUM_CLUES {
            return Err(SolverErr::InvalidClueCode(observation.clue));
        }

        self.observations.push(observation);
        Ok(())
    }

    /// Number of guesses already made (0-based turn of the next guess)
    pub fn turn(&self) -> usize {
        self.observations.len()
    }

    pub fn state(&self) -> GameState {
        match self.observations.last() {
            None => GameState::Start,
            Some(o) if o.clue == Clue::SOLVED => GameState::Solved,
            Some(_) => GameState::InProgress,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn contains(&self, word: WordIdx) -> bool {
        self.observations.iter().any(|o| o.guess == word)
    }
}

/// A ranked guess resolved back to its text
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub word: &'a str,
    pub score: WordleFloat,
}

///
/// Ranks the next guess for any game history.
///
/// Owns (or shares) everything derived from the corpus: the clue table, the opening scores for
/// its strategy, and a second-turn cache which fills up as games are played. None of it changes
/// once built, apart from the second-turn cache, so one Solver can serve many games on many
/// threads at once.
///
pub struct Solver {
    corpus: Arc<Corpus>,
    table: Arc<ClueTable>,
    strategy: Strategy,
    first_guess: FirstGuessCache,
    second_guess: SecondGuessCache,
}

impl Solver {
    ///
    /// Reads the corpus named by `config`, then loads (or builds and persists) the clue table and
    /// the opening scores for `strategy`.
    ///
    pub fn load(config: &Config, strategy: Strategy) -> Result<Self, SolverErr> {
        let corpus = Arc::new(Corpus::read(config)?);
        let table = Arc::new(ClueTable::load_or_build(&config.clue_table_path(), &corpus)?);
        let first_guess = FirstGuessCache::load_or_build(
            &config.first_guess_cache_path(strategy),
            &corpus,
            || rank_opening_guesses(&corpus, &table, strategy),
        )?;

        Ok(Self::new(corpus, table, strategy, first_guess))
    }

    ///
    /// Assembles a solver from parts which may be shared with solvers for other strategies.
    ///
    /// Panics if `table` was not built for a corpus of the same size.
    ///
    pub fn new(
        corpus: Arc<Corpus>,
        table: Arc<ClueTable>,
        strategy: Strategy,
        first_guess: FirstGuessCache,
    ) -> Self {
        assert_eq!(
            corpus.len(),
            table.len(),
            "clue table has {} words but the corpus has {}",
            table.len(),
            corpus.len()
        );
        Self {
            corpus,
            table,
            strategy,
            first_guess,
            second_guess: SecondGuessCache::new(),
        }
    }

    /// Replaces the (empty) second-turn cache, for example with one read by SecondGuessCache::load
    pub fn with_second_guess_cache(mut self, cache: SecondGuessCache) -> Self {
        self.second_guess = cache;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn table(&self) -> &ClueTable {
        &self.table
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn second_guess_cache(&self) -> &SecondGuessCache {
        &self.second_guess
    }

    pub fn word_index(&self, word: &str) -> Result<WordIdx, SolverErr> {
        self.corpus
            .index_of(word)
            .ok_or_else(|| SolverErr::UnknownWord(word.to_string()))
    }

    /// Appends (word, clue) to `history` after checking the word is in the corpus
    pub fn record(&self, history: &mut GuessHistory, word: &str, clue: ClueCode) -> Result<(), SolverErr> {
        let guess = self.word_index(word)?;
        history.push(Observation::new(guess, clue))
    }

    /// Validates a textual history
    pub fn history<S: AsRef<str>>(&self, observations: &[(S, ClueCode)]) -> Result<GuessHistory, SolverErr> {
        let mut out = GuessHistory::new();
        for (word, clue) in observations {
            self.record(&mut out, word.as_ref(), *clue)?;
        }
        Ok(out)
    }

    /// Words which might still be the answer, ascending by index
    pub fn candidates(&self, history: &GuessHistory) -> Vec<WordIdx> {
        filter_candidates(&self.table, history.observations())
    }

    ///
    /// Every guess worth making next, best (lowest score) first.
    ///
    /// The opening ranking comes from the persisted cache and the second-turn ranking is memoized
    /// by (first guess, first clue). Later turns are always computed.
    ///
    pub fn rank(&self, history: &GuessHistory) -> Result<Arc<Vec<ScoredWord>>, SolverErr> {
        match history.state() {
            GameState::Solved => Err(SolverErr::AlreadySolved),
            GameState::Start => Ok(self.first_guess.ranked()),
            GameState::InProgress if history.turn() == 1 => {
                let first = history.observations()[0];
                self.second_guess
                    .get_or_try_compute((first.guess, first.clue), || self.compute_rank(history))
            }
            GameState::InProgress => self.compute_rank(history).map(Arc::new),
        }
    }

    fn compute_rank(&self, history: &GuessHistory) -> Result<Vec<ScoredWord>, SolverErr> {
        let candidates = self.candidates(history);
        log::debug!(
            "turn {}: {} of {} words remain",
            history.turn(),
            candidates.len(),
            self.corpus.len()
        );
        if candidates.is_empty() {
            return Err(SolverErr::NoCandidates);
        }

        Ok(rank_guesses(
            self.strategy,
            &self.table,
            self.corpus.frequencies(),
            history.observations(),
            &candidates,
        ))
    }

    /// The top ranked guess
    pub fn best_guess(&self, history: &GuessHistory) -> Result<WordIdx, SolverErr> {
        self.rank(history)?
            .first()
            .map(|s| s.word)
            .ok_or(SolverErr::NoCandidates)
    }

    ///
    /// Same as rank, but takes and returns words instead of corpus indices.
    ///
    pub fn next_words<S: AsRef<str>>(
        &self,
        observations: &[(S, ClueCode)],
    ) -> Result<Vec<ScoredCandidate<'_>>, SolverErr> {
        let history = self.history(observations)?;
        Ok(self
            .rank(&history)?
            .iter()
            .map(|s| ScoredCandidate {
                word: self.corpus.word(s.word),
                score: s.score,
            })
            .collect())
    }
}

/// Scores every word as an opening guess. This is what the first-guess cache stores.
pub fn rank_opening_guesses(corpus: &Corpus, table: &ClueTable, strategy: Strategy) -> Vec<ScoredWord> {
    rank_guesses(
        strategy,
        table,
        corpus.frequencies(),
        &[],
        &corpus.all_indices(),
    )
}

///
/// Whatever produces the clues: a person typing them in, a website, or a simulation. The solver
/// never drives it directly, see play_game.
///
pub trait Game {
    fn submit_guess(&mut self, word: &str) -> Result<ClueCode, SolverErr>;

    fn is_game_over(&self) -> bool;
}

/// A simulated game where the answer is known up front
pub struct KnownAnswerGame<'a> {
    corpus: &'a Corpus,
    answer: String,
    solved: bool,
}

impl<'a> KnownAnswerGame<'a> {
    pub fn new(corpus: &'a Corpus, answer: &str) -> Result<Self, SolverErr> {
        let idx = corpus
            .index_of(answer)
            .ok_or_else(|| SolverErr::UnknownWord(answer.to_string()))?;

        Ok(Self {
            corpus,
            answer: corpus.word(idx).to_string(),
            solved: false,
        })
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

impl Game for KnownAnswerGame<'_> {
    fn submit_guess(&mut self, word: &str) -> Result<ClueCode, SolverErr> {
        if self.solved {
            return Err(SolverErr::AlreadySolved);
        }

        let guess = self
            .corpus
            .index_of(word)
            .ok_or_else(|| SolverErr::UnknownWord(word.to_string()))?;
        let code = clue_code(self.corpus.word(guess), &self.answer);
        self.solved = code == Clue::SOLVED;
        Ok(code)
    }

    fn is_game_over(&self) -> bool {
        self.solved
    }
}

///
/// Plays `game` to the end: the `openings` are guessed first, in order, then the solver's best
/// guess each turn. Returns the full history.
///
/// Every guess after the openings is a word that hasn't been played yet, so the game has to end
/// within one guess per corpus word; TurnsExhausted is returned if it doesn't.
///
pub fn play_game<G: Game>(solver: &Solver, game: &mut G, openings: &[&str]) -> Result<GuessHistory, SolverErr> {
    let mut history = GuessHistory::new();
    let mut openings = openings.iter();

    while !game.is_game_over() {
        if history.turn() >= solver.corpus().len() {
            return Err(SolverErr::TurnsExhausted);
        }

        let guess = match openings.next() {
            Some(word) => solver.word_index(word)?,
            None => solver.best_guess(&history)?,
        };

        let word = solver.corpus().word(guess);
        let clue = game.submit_guess(word)?;
        log::debug!(
            "turn {}: guessed {} got {}",
            history.turn() + 1,
            word,
            Clue::decode(clue).unwrap_or_default()
        );
        history.push(Observation::new(guess, clue))?;
    }

    Ok(history)
}
