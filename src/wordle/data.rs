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

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use super::config::Config;
use super::prelude::*;

/// Position of a word in the sorted corpus. Every persisted artifact is indexed by this.
pub type WordIdx = usize;

// The logistic curve used to turn raw frequencies into weights: words used more often than
// FREQUENCY_MIDPOINT quickly approach weight 1.0, rarer words fall off towards 0.0.
const FREQUENCY_MIDPOINT: WordleFloat = 2e-6;
const FREQUENCY_WIDTH: WordleFloat = 1e-6;
const FREQUENCY_STEEPNESS: WordleFloat = 6.0;

#[derive(Error, Debug)]
pub enum LoadDataErr {
    #[error("missing source file '{}'", .0.display())]
    MissingSource(PathBuf),
    #[error("failed to read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed json in '{}'", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("the word '{0}' is not a valid wordle word")]
    NonWordleWord(String),
    #[error("the word '{0}' has an invalid frequency {1}")]
    BadFrequency(String, WordleFloat),
    #[error("the corpus contains no words")]
    EmptyCorpus,
    #[error("the answer '{0}' is not in the corpus")]
    UnknownAnswer(String),
}

///
/// Per-word weights derived from raw usage frequencies. The weights are relative, they do not sum
/// to 1.0. Use `mass` to turn them into a probability distribution over a set of candidates.
///
#[derive(Clone, Debug)]
pub struct FrequencyTable {
    weights: Vec<WordleFloat>,
}

impl FrequencyTable {
    /// Applies the logistic transform to each raw frequency (parallel to the corpus order)
    pub fn from_raw(raw: &[WordleFloat]) -> Self {
        Self {
            weights: raw.iter().map(|f| frequency_weight(*f)).collect(),
        }
    }

    pub fn weight(&self, word: WordIdx) -> WordleFloat {
        self.weights[word]
    }

    ///
    /// Restricts the weights to `candidates` and renormalizes them so they sum to 1.0. The output
    /// is parallel to `candidates`.
    ///
    pub fn mass(&self, candidates: &[WordIdx]) -> Vec<WordleFloat> {
        let total: WordleFloat = candidates.iter().map(|w| self.weights[*w]).sum();
        let out: Vec<WordleFloat> = candidates
            .iter()
            .map(|w| self.weights[*w] / total)
            .collect();

        debug_assert!(
            out.is_empty() || (out.iter().sum::<WordleFloat>() - 1.0).abs() < 1e-6,
            "probabilities must add up to 1.0",
        );
        out
    }
}

/// sigmoid(6 * (f - 2e-6) / 1e-6). Always strictly positive for a non-negative frequency.
pub fn frequency_weight(frequency: WordleFloat) -> WordleFloat {
    sigmoid(FREQUENCY_STEEPNESS * (frequency - FREQUENCY_MIDPOINT) / FREQUENCY_WIDTH)
}

///
/// The sorted, immutable list of words which can be guessed (and which might be the answer),
/// along with the weight of each one.
///
#[derive(Clone, Debug)]
pub struct Corpus {
    words: Vec<String>,
    index: HashMap<String, WordIdx>,
    frequencies: FrequencyTable,
}

impl Corpus {
    ///
    /// Builds a corpus from (word, raw frequency) pairs. Words are normalized and sorted; a word
    /// that appears twice keeps its last frequency.
    ///
    pub fn from_frequencies<I, S>(pairs: I) -> Result<Self, LoadDataErr>
    where
        I: IntoIterator<Item = (S, WordleFloat)>,
        S: AsRef<str>,
    {
        let mut sorted = BTreeMap::new();
        for (word, frequency) in pairs {
            let word = normalize_wordle_word(word.as_ref());
            if !is_wordle_str(&word) {
                return Err(LoadDataErr::NonWordleWord(word));
            }
            if !frequency.is_finite() || frequency < 0.0 {
                return Err(LoadDataErr::BadFrequency(word, frequency));
            }
            sorted.insert(word, frequency);
        }

        if sorted.is_empty() {
            return Err(LoadDataErr::EmptyCorpus);
        }

        let (words, raw): (Vec<String>, Vec<WordleFloat>) = sorted.into_iter().unzip();
        let index = words
            .iter()
            .enumerate()
            .map(|(idx, w)| (w.clone(), idx))
            .collect();

        Ok(Self {
            words,
            index,
            frequencies: FrequencyTable::from_raw(&raw),
        })
    }

    /// Reads the words file named by the config (a JSON object of word -> frequency)
    pub fn read(config: &Config) -> Result<Self, LoadDataErr> {
        let path = config.words_path();
        let raw: BTreeMap<String, WordleFloat> = read_json(&path)?;
        let out = Self::from_frequencies(raw)?;
        log::info!("got {} words from {}", out.len(), path.display());
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, idx: WordIdx) -> &str {
        &self.words[idx]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Looks up a word, normalizing it first
    pub fn index_of(&self, word: &str) -> Option<WordIdx> {
        self.index.get(&normalize_wordle_word(word)).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index_of(word).is_some()
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn all_indices(&self) -> Vec<WordIdx> {
        (0..self.len()).collect()
    }
}

///
/// Reads the answer list (a JSON array of words). Only words which might be the hidden answer are
/// listed; every one of them must be in the corpus.
///
pub fn read_answers(config: &Config, corpus: &Corpus) -> Result<Vec<WordIdx>, LoadDataErr> {
    let path = config.answers_path();
    let raw: Vec<String> = read_json(&path)?;
    let out = raw
        .iter()
        .map(|w| corpus.index_of(w).ok_or_else(|| LoadDataErr::UnknownAnswer(w.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("got {} answers from {}", out.len(), path.display());
    Ok(out)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadDataErr> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadDataErr::MissingSource(path.to_path_buf()))
        }
        Err(source) => {
            return Err(LoadDataErr::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| LoadDataErr::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::test_util::*;

    #[test]
    fn test_corpus_is_sorted_and_indexed() {
        let corpus =
            Corpus::from_frequencies(vec![("water", 1e-6), ("Faint ", 3e-6), ("crane", 2e-6)])
                .unwrap();
        assert_eq!(corpus.words(), &["crane", "faint", "water"]);
        assert_eq!(corpus.index_of("faint"), Some(1));
        assert_eq!(corpus.index_of("FAINT"), Some(1));
        assert_eq!(corpus.index_of("zzzzz"), None);
        assert_eq!(corpus.word(2), "water");
    }

    #[test]
    fn test_corpus_rejects_bad_input() {
        assert!(matches!(
            Corpus::from_frequencies(vec![("toolong", 1.0)]),
            Err(LoadDataErr::NonWordleWord(_))
        ));
        assert!(matches!(
            Corpus::from_frequencies(vec![("faint", -1.0)]),
            Err(LoadDataErr::BadFrequency(_, _))
        ));
        assert!(matches!(
            Corpus::from_frequencies(vec![("faint", WordleFloat::NAN)]),
            Err(LoadDataErr::BadFrequency(_, _))
        ));
        assert!(matches!(
            Corpus::from_frequencies(Vec::<(&str, WordleFloat)>::new()),
            Err(LoadDataErr::EmptyCorpus)
        ));
    }

    #[test]
    fn test_frequency_weight_is_monotone_and_positive() {
        let low = frequency_weight(0.0);
        let mid = frequency_weight(2e-6);
        let high = frequency_weight(1e-3);
        assert!(low > 0.0);
        assert!(low < mid && mid < high);
        assert!((mid - 0.5).abs() < 1e-12);
        assert!(high <= 1.0);
    }

    #[test]
    fn test_mass_sums_to_one() {
        let corpus = sample_corpus();
        let candidates = vec![0, 3, 5];
        let mass = corpus.frequencies().mass(&candidates);
        assert_eq!(mass.len(), 3);
        assert!((mass.iter().sum::<WordleFloat>() - 1.0).abs() < 1e-9);
        assert!(mass.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn test_read_missing_source() {
        let dir = TempDir::new("missing-source");
        let config = dir.config();
        match Corpus::read(&config) {
            Err(LoadDataErr::MissingSource(path)) => assert_eq!(path, config.words_path()),
            other => panic!("expected MissingSource, got {:?}", other),
        }
    }

    #[test]
    fn test_read_corpus_and_answers() {
        let dir = TempDir::new("read-corpus");
        let config = dir.config();
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(config.words_path(), r#"{"faint": 3e-6, "crane": 1e-6, "water": 0}"#).unwrap();
        fs::write(config.answers_path(), r#"["water", "faint"]"#).unwrap();

        let corpus = Corpus::read(&config).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(read_answers(&config, &corpus).unwrap(), vec![2, 1]);

        fs::write(config.answers_path(), r#"["zzzzz"]"#).unwrap();
        assert!(matches!(
            read_answers(&config, &corpus),
            Err(LoadDataErr::UnknownAnswer(_))
        ));
    }

    #[test]
    fn test_read_malformed_json() {
        let dir = TempDir::new("malformed-corpus");
        let config = dir.config();
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(config.words_path(), "[not json").unwrap();
        assert!(matches!(Corpus::read(&config), Err(LoadDataErr::Json { .. })));
    }
}
