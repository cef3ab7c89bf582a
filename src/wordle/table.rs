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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use rayon::prelude::*;
use super::cache::{write_atomically, CacheErr};
use super::clue::*;
use super::data::{Corpus, WordIdx};

const ARTIFACT: &str = "clue table";

// How many rows (and columns within each row) are recomputed when validating a loaded table
const VERIFY_SAMPLES: usize = 64;

///
/// The clue for every (guess, answer) pair in the corpus, stored as an N x N matrix of ClueCode.
/// Row = guess index, column = answer index, row-major.
///
/// Building it costs N^2 clue computations, which dominates everything else the solver does, so
/// it is persisted and only rebuilt when no table exists yet.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClueTable {
    n: usize,
    codes: Vec<ClueCode>,
}

impl ClueTable {
    /// Computes the whole table. Rows are independent so they are filled in parallel.
    pub fn build(corpus: &Corpus) -> Self {
        let n = corpus.len();
        let words = corpus.words();
        let mut codes = vec![0; n * n];

        codes
            .par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(guess, row)| {
                let guess = words[guess].as_str();
                for (answer, slot) in row.iter_mut().enumerate() {
                    *slot = clue_code(guess, &words[answer]);
                }
            });

        Self { n, codes }
    }

    ///
    /// Wraps raw bytes read from disk, checking that they belong to this corpus:
    /// * `words` (the word list stored beside the table) must be exactly the corpus
    /// * the length must be exactly N^2
    /// * every byte must be a valid ClueCode
    /// * a sample of entries must match a fresh computation (catches a corrupted file)
    ///
    pub fn from_bytes(
        corpus: &Corpus,
        codes: Vec<u8>,
        words: &[String],
        path: &Path,
    ) -> Result<Self, CacheErr> {
        let n = corpus.len();
        let mismatch = |reason: String| CacheErr::Mismatch {
            artifact: ARTIFACT,
            path: path.to_path_buf(),
            reason,
        };

        if words.len() != n {
            return Err(mismatch(format!(
                "built for {} words, the corpus has {}",
                words.len(),
                n
            )));
        }

        if let Some((idx, stored)) = words
            .iter()
            .enumerate()
            .find(|(idx, w)| w.as_str() != corpus.word(*idx))
        {
            return Err(mismatch(format!(
                "word {} was '{}' when the table was built, now it is '{}'",
                idx,
                stored,
                corpus.word(idx)
            )));
        }

        if codes.len() != n * n {
            return Err(mismatch(format!(
                "expected {} bytes for {} words, found {}",
                n * n,
                n,
                codes.len()
            )));
        }

        if let Some(bad) = codes.iter().find(|c| **c as usize >= NUM_CLUES) {
            return Err(mismatch(format!("byte {} is not a clue code", bad)));
        }

        let out = Self { n, codes };
        if let Some((guess, answer)) = out.find_sample_mismatch(corpus) {
            return Err(mismatch(format!(
                "stored clue for guess '{}' against '{}' is wrong",
                corpus.word(guess),
                corpus.word(answer)
            )));
        }

        Ok(out)
    }

    /// Loads the persisted table if there is one, otherwise builds and persists it.
    pub fn load_or_build(path: &Path, corpus: &Corpus) -> Result<Self, CacheErr> {
        match fs::read(path) {
            Ok(bytes) => {
                let words = read_table_words(path)?;
                let out = Self::from_bytes(corpus, bytes, &words, path)?;
                log::info!("loaded clue table for {} words from {}", out.n, path.display());
                Ok(out)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no clue table at {}, building one for {} words", path.display(), corpus.len());
                let start_at = Instant::now();
                let out = Self::build(corpus);
                log::info!("built clue table in {:.2}s", start_at.elapsed().as_secs_f64());
                out.persist(path, corpus)?;
                Ok(out)
            }
            Err(source) => Err(CacheErr::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Writes the codes to `path` and the corpus word list to its ".words.json" sibling
    pub fn persist(&self, path: &Path, corpus: &Corpus) -> Result<(), CacheErr> {
        debug_assert_eq!(corpus.len(), self.n);
        let words_path = table_words_path(path);
        let words = serde_json::to_vec(corpus.words()).map_err(|source| CacheErr::Json {
            path: words_path.clone(),
            source,
        })?;

        write_atomically(path, &self.codes)?;
        write_atomically(&words_path, &words)?;
        log::debug!("wrote {} bytes of clues to {}", self.codes.len(), path.display());
        Ok(())
    }

    /// The clue shown when `guess` is played and `answer` is the hidden word
    #[inline]
    pub fn lookup(&self, guess: WordIdx, answer: WordIdx) -> ClueCode {
        self.codes[guess * self.n + answer]
    }

    /// Every clue `guess` can produce, indexed by answer
    #[inline]
    pub fn row(&self, guess: WordIdx) -> &[ClueCode] {
        &self.codes[guess * self.n..(guess + 1) * self.n]
    }

    /// Number of words (the table has len() * len() entries)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.codes
    }

    fn find_sample_mismatch(&self, corpus: &Corpus) -> Option<(WordIdx, WordIdx)> {
        let stride = (self.n / VERIFY_SAMPLES).max(1);
        let words = corpus.words();
        (0..self.n)
            .step_by(stride)
            .flat_map(|guess| (0..self.n).step_by(stride).map(move |answer| (guess, answer)))
            .find(|&(guess, answer)| {
                self.lookup(guess, answer) != clue_code(&words[guess], &words[answer])
            })
    }
}

/// The word list a table was built from is stored beside it, e.g. "clues.bin.words.json"
pub fn table_words_path(path: &Path) -> PathBuf {
    let mut out = path.as_os_str().to_owned();
    out.push(".words.json");
    PathBuf::from(out)
}

fn read_table_words(path: &Path) -> Result<Vec<String>, CacheErr> {
    let words_path = table_words_path(path);
    let raw = match fs::read(&words_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(CacheErr::Mismatch {
                artifact: ARTIFACT,
                path: path.to_path_buf(),
                reason: format!("no word list at {}", words_path.display()),
            })
        }
        Err(source) => {
            return Err(CacheErr::Io {
                path: words_path,
                source,
            })
        }
    };

    serde_json::from_slice(&raw).map_err(|source| CacheErr::Json {
        path: words_path,
        source,
    })
}
