use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use super::clue::*;
use super::data::{Corpus, WordIdx};
use super::prelude::*;
use super::strategy::{sort_ranked, ScoredWord};

#[derive(Error, Debug)]
pub enum CacheErr {
    #[error("{artifact} at '{}' does not match the corpus: {reason}", .path.display())]
    Mismatch {
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("failed to access cache file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed cache file '{}'", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A ranked guess list as it is stored on disk: `[word, score]` pairs, best first.
type StoredRanking = Vec<(String, WordleFloat)>;

///
/// Writes `bytes` to a sibling ".tmp" file and then renames it over `path`, so readers only ever
/// see a complete file. Missing parent directories are created.
///
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), CacheErr> {
    let io_err = |source: io::Error| CacheErr::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheErr> {
    let bytes = serde_json::to_vec(value).map_err(|source| CacheErr::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, &bytes)
}

/// Ok(None) when there is no file at `path`
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheErr> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheErr::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| CacheErr::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn to_stored(ranked: &[ScoredWord], corpus: &Corpus) -> StoredRanking {
    ranked
        .iter()
        .map(|s| (corpus.word(s.word).to_string(), s.score))
        .collect()
}

///
/// Resolves a stored ranking back to corpus indices. Every word must be in the corpus, appear at
/// most once and carry a finite score. The result is re-sorted.
///
fn from_stored(
    stored: StoredRanking,
    corpus: &Corpus,
    artifact: &'static str,
    path: &Path,
) -> Result<Vec<ScoredWord>, CacheErr> {
    let mismatch = |reason: String| CacheErr::Mismatch {
        artifact,
        path: path.to_path_buf(),
        reason,
    };

    let mut seen = HashSet::with_capacity(stored.len());
    let mut out = Vec::with_capacity(stored.len());
    for (word, score) in stored {
        let idx = corpus
            .index_of(&word)
            .ok_or_else(|| mismatch(format!("'{}' is not in the corpus", word)))?;
        if !seen.insert(idx) {
            return Err(mismatch(format!("'{}' is listed twice", word)));
        }
        if !score.is_finite() {
            return Err(mismatch(format!("'{}' has score {}", word, score)));
        }
        out.push(ScoredWord { word: idx, score });
    }

    sort_ranked(&mut out);
    Ok(out)
}

///
/// Scores of every opening guess for one strategy.
///
/// Scoring the empty history is the most expensive ranking of a game (every word against every
/// word), and its result never changes for a given corpus, so it is computed once and persisted.
///
#[derive(Clone, Debug)]
pub struct FirstGuessCache {
    ranked: Arc<Vec<ScoredWord>>,
}

impl FirstGuessCache {
    const ARTIFACT: &'static str = "first guess cache";

    pub fn from_ranked(mut ranked: Vec<ScoredWord>) -> Self {
        sort_ranked(&mut ranked);
        Self {
            ranked: Arc::new(ranked),
        }
    }

    ///
    /// Loads the persisted ranking at `path`. If there is none, calls `build` to compute it and
    /// persists the result.
    ///
    pub fn load_or_build<F>(path: &Path, corpus: &Corpus, build: F) -> Result<Self, CacheErr>
    where
        F: FnOnce() -> Vec<ScoredWord>,
    {
        if let Some(out) = Self::load(path, corpus)? {
            log::info!("loaded {} opening scores from {}", out.ranked.len(), path.display());
            return Ok(out);
        }

        log::info!("no opening scores at {}, computing them", path.display());
        let out = Self::from_ranked(build());
        out.persist(path, corpus)?;
        Ok(out)
    }

    /// Ok(None) if nothing has been persisted yet
    pub fn load(path: &Path, corpus: &Corpus) -> Result<Option<Self>, CacheErr> {
        let stored: StoredRanking = match read_json(path)? {
            Some(stored) => stored,
            None => return Ok(None),
        };

        if stored.len() != corpus.len() {
            return Err(CacheErr::Mismatch {
                artifact: Self::ARTIFACT,
                path: path.to_path_buf(),
                reason: format!("expected {} entries, found {}", corpus.len(), stored.len()),
            });
        }

        let ranked = from_stored(stored, corpus, Self::ARTIFACT, path)?;
        Ok(Some(Self {
            ranked: Arc::new(ranked),
        }))
    }

    pub fn persist(&self, path: &Path, corpus: &Corpus) -> Result<(), CacheErr> {
        write_json(path, &to_stored(&self.ranked, corpus))?;
        log::debug!("wrote {} opening scores to {}", self.ranked.len(), path.display());
        Ok(())
    }

    pub fn ranked(&self) -> Arc<Vec<ScoredWord>> {
        self.ranked.clone()
    }
}

/// (first guess, clue it produced)
pub type SecondGuessKey = (WordIdx, ClueCode);

#[derive(Serialize, Deserialize)]
struct SecondGuessRecord {
    guess: String,
    clue: ClueCode,
    ranked: StoredRanking,
}

///
/// Rankings for the second turn of a game, keyed by the opening guess and the clue it produced.
///
/// The key space is bounded (words x clues) but far too large to fill up front, so entries are
/// computed on first use and kept for the rest of the process. The map is shared between threads;
/// two threads missing on the same key may both compute it, and whichever stores first wins.
///
#[derive(Debug, Default)]
pub struct SecondGuessCache {
    entries: RwLock<HashMap<SecondGuessKey, Arc<Vec<ScoredWord>>>>,
}

impl SecondGuessCache {
    const ARTIFACT: &'static str = "second guess cache";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SecondGuessKey) -> Option<Arc<Vec<ScoredWord>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    ///
    /// Returns the cached ranking for `key`, computing and storing it on a miss. The computation
    /// runs without holding the lock. Failed computations are not cached. Stored rankings are
    /// always sorted, whatever order `compute` returns them in.
    ///
    pub fn get_or_try_compute<E, F>(&self, key: SecondGuessKey, compute: F) -> Result<Arc<Vec<ScoredWord>>, E>
    where
        F: FnOnce() -> Result<Vec<ScoredWord>, E>,
    {
        if let Some(hit) = self.get(key) {
            log::debug!("second guess cache hit for {:?}", key);
            return Ok(hit);
        }

        let mut computed = compute()?;
        sort_ranked(&mut computed);
        let computed = Arc::new(computed);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(key).or_insert(computed).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every entry, ordered by key so the file is stable between runs
    pub fn persist(&self, path: &Path, corpus: &Corpus) -> Result<(), CacheErr> {
        let records: Vec<SecondGuessRecord> = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            let mut keys: Vec<&SecondGuessKey> = entries.keys().collect();
            keys.sort_unstable();
            keys.into_iter()
                .map(|key| SecondGuessRecord {
                    guess: corpus.word(key.0).to_string(),
                    clue: key.1,
                    ranked: to_stored(&entries[key], corpus),
                })
                .collect()
        };

        write_json(path, &records)?;
        log::debug!("wrote {} second guess rankings to {}", records.len(), path.display());
        Ok(())
    }

    /// Loads persisted entries; a missing file gives an empty cache
    pub fn load(path: &Path, corpus: &Corpus) -> Result<Self, CacheErr> {
        let records: Vec<SecondGuessRecord> = read_json(path)?.unwrap_or_default();
        let mismatch = |reason: String| CacheErr::Mismatch {
            artifact: Self::ARTIFACT,
            path: path.to_path_buf(),
            reason,
        };

        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            let guess = corpus
                .index_of(&record.guess)
                .ok_or_else(|| mismatch(format!("'{}' is not in the corpus", record.guess)))?;
            if Clue::decode(record.clue).is_none() {
                return Err(mismatch(format!("{} is not a clue code", record.clue)));
            }
            let ranked = from_stored(record.ranked, corpus, Self::ARTIFACT, path)?;
            entries.insert((guess, record.clue), Arc::new(ranked));
        }

        log::debug!("loaded {} second guess rankings from {}", entries.len(), path.display());
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::test_util::*;

    fn fake_ranking(corpus: &Corpus) -> Vec<ScoredWord> {
        (0..corpus.len())
            .map(|word| ScoredWord {
                word,
                score: ((word * 7) % 5) as WordleFloat + 0.125,
            })
            .collect()
    }

    #[test]
    fn test_first_guess_builds_once_then_loads() {
        let dir = TempDir::new("first-guess-roundtrip");
        let path = dir.config().cache_dir.join("v1_word_values.json");
        let corpus = sample_corpus();

        let built = FirstGuessCache::load_or_build(&path, &corpus, || fake_ranking(&corpus)).unwrap();
        assert!(built
            .ranked()
            .windows(2)
            .all(|w| w[0].score <= w[1].score));

        let loaded = FirstGuessCache::load_or_build(&path, &corpus, || {
            panic!("should have loaded from disk")
        })
        .unwrap();
        assert_eq!(loaded.ranked(), built.ranked());
    }

    #[test]
    fn test_first_guess_wrong_size_is_fatal() {
        let dir = TempDir::new("first-guess-size");
        let path = dir.config().cache_dir.join("v2_word_values.json");
        let corpus = sample_corpus();
        let mut ranking = fake_ranking(&corpus);
        ranking.pop();
        FirstGuessCache::from_ranked(ranking).persist(&path, &corpus).unwrap();

        assert!(matches!(
            FirstGuessCache::load(&path, &corpus),
            Err(CacheErr::Mismatch { .. })
        ));
    }

    #[test]
    fn test_first_guess_unknown_word_is_fatal() {
        let dir = TempDir::new("first-guess-unknown");
        let path = dir.config().cache_dir.join("v3_word_values.json");
        let corpus = sample_corpus();
        let mut stored = to_stored(&fake_ranking(&corpus), &corpus);
        stored[0].0 = "zzzzz".to_string();
        write_json(&path, &stored).unwrap();

        assert!(matches!(
            FirstGuessCache::load(&path, &corpus),
            Err(CacheErr::Mismatch { .. })
        ));
    }

    #[test]
    fn test_first_guess_malformed_json() {
        let dir = TempDir::new("first-guess-malformed");
        let path = dir.config().cache_dir.join("v3_word_values.json");
        write_atomically(&path, b"{\"nope\": true}").unwrap();
        assert!(matches!(
            FirstGuessCache::load(&path, &sample_corpus()),
            Err(CacheErr::Json { .. })
        ));
    }

    #[test]
    fn test_write_atomically_leaves_no_temp_file() {
        let dir = TempDir::new("atomic-write");
        let path = dir.config().cache_dir.join("nested").join("file.bin");
        write_atomically(&path, b"abc").unwrap();
        write_atomically(&path, b"defg").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"defg");

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }

    #[test]
    fn test_second_guess_memoizes() {
        let corpus = sample_corpus();
        let cache = SecondGuessCache::new();
        let key = (3, 17);

        let first = cache
            .get_or_try_compute::<(), _>(key, || Ok(fake_ranking(&corpus)))
            .unwrap();
        let second = cache
            .get_or_try_compute::<(), _>(key, || panic!("should be cached"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_second_guess_errors_are_not_cached() {
        let cache = SecondGuessCache::new();
        let result = cache.get_or_try_compute(
            (0, Clue::SOLVED),
            || Err::<Vec<ScoredWord>, _>("no candidates"),
        );
        assert_eq!(result, Err("no candidates"));
        assert!(cache.is_empty());
        assert!(cache.get((0, Clue::SOLVED)).is_none());
    }

    #[test]
    fn test_second_guess_persist_and_load() {
        let dir = TempDir::new("second-guess-roundtrip");
        let path = dir.config().cache_dir.join("v3_second_word_values.json");
        let corpus = sample_corpus();

        let missing = SecondGuessCache::load(&path, &corpus).unwrap();
        assert!(missing.is_empty());

        let cache = SecondGuessCache::new();
        for key in [(1, 5), (0, 200), (4, 0)] {
            cache
                .get_or_try_compute::<(), _>(key, || Ok(fake_ranking(&corpus)))
                .unwrap();
        }
        cache.persist(&path, &corpus).unwrap();

        let loaded = SecondGuessCache::load(&path, &corpus).unwrap();
        assert_eq!(loaded.len(), 3);
        for key in [(1, 5), (0, 200), (4, 0)] {
            assert_eq!(loaded.get(key), cache.get(key));
        }
    }

    #[test]
    fn test_second_guess_entries_are_sorted() {
        let corpus = sample_corpus();
        let cache = SecondGuessCache::new();
        let unsorted = fake_ranking(&corpus);
        assert!(unsorted.windows(2).any(|w| w[0].score > w[1].score));

        let stored = cache
            .get_or_try_compute::<(), _>((2, 9), || Ok(unsorted.clone()))
            .unwrap();
        assert_eq!(stored.len(), unsorted.len());
        assert!(stored
            .windows(2)
            .all(|w| w[0].cmp_rank(&w[1]) == std::cmp::Ordering::Less));
    }
}
