use std::env;
use std::path::PathBuf;
use super::strategy::Strategy;

// Stores "input data" which is manually updated/configured
pub const DATA_DIRECTORY: &str = "data/";
pub const WORDS_FILE_NAME: &str = "words.json";
pub const ANSWERS_FILE_NAME: &str = "answers.json";

// Stores "derived data" which is generated on first use from the files above
pub const CACHE_DIRECTORY: &str = "cache/";
pub const CLUE_TABLE_FILE_NAME: &str = "clues.bin";

pub const DATA_DIR_ENV: &str = "WORDLE_DATA_DIR";
pub const CACHE_DIR_ENV: &str = "WORDLE_CACHE_DIR";

/// Where the solver reads its source data from and where it persists derived artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIRECTORY),
            cache_dir: PathBuf::from(CACHE_DIRECTORY),
        }
    }
}

impl Config {
    /// Defaults, overridden by WORDLE_DATA_DIR / WORDLE_CACHE_DIR when they are set
    pub fn from_env() -> Self {
        let mut out = Self::default();
        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            out.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env::var_os(CACHE_DIR_ENV) {
            out.cache_dir = PathBuf::from(dir);
        }
        log::debug!("using data dir {:?} and cache dir {:?}", out.data_dir, out.cache_dir);
        out
    }

    pub fn words_path(&self) -> PathBuf {
        self.data_dir.join(WORDS_FILE_NAME)
    }

    pub fn answers_path(&self) -> PathBuf {
        self.data_dir.join(ANSWERS_FILE_NAME)
    }

    pub fn clue_table_path(&self) -> PathBuf {
        self.cache_dir.join(CLUE_TABLE_FILE_NAME)
    }

    /// One zero-guess value file per strategy, e.g. "v3_word_values.json"
    pub fn first_guess_cache_path(&self, strategy: Strategy) -> PathBuf {
        self.cache_dir
            .join(format!("v{}_word_values.json", strategy.version()))
    }

    pub fn second_guess_cache_path(&self, strategy: Strategy) -> PathBuf {
        self.cache_dir
            .join(format!("v{}_second_word_values.json", strategy.version()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_per_strategy() {
        let config = Config::default();
        assert_eq!(
            config.first_guess_cache_path(Strategy::CountSquared),
            PathBuf::from("cache/v1_word_values.json")
        );
        assert_eq!(
            config.first_guess_cache_path(Strategy::EntropyFrequency),
            PathBuf::from("cache/v3_word_values.json")
        );
        assert_ne!(
            config.second_guess_cache_path(Strategy::CountSquaredExcludingSolved),
            config.first_guess_cache_path(Strategy::CountSquaredExcludingSolved),
        );
        assert_eq!(config.words_path(), PathBuf::from("data/words.json"));
        assert_eq!(config.clue_table_path(), PathBuf::from("cache/clues.bin"));
    }
}
