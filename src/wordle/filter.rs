use rayon::prelude::*;
use super::clue::ClueCode;
use super::data::WordIdx;
use super::table::ClueTable;

/// One guess that was played, together with the clue the game gave back for it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Observation {
    pub guess: WordIdx,
    pub clue: ClueCode,
}

impl Observation {
    pub fn new(guess: WordIdx, clue: ClueCode) -> Self {
        Self { guess, clue }
    }
}

///
/// A word is still a possible answer iff, had it been the answer, every guess made so far would
/// have produced exactly the clue that was observed.
///
/// Stops at the first observation that rules the word out.
///
#[inline]
pub fn is_consistent(table: &ClueTable, history: &[Observation], candidate: WordIdx) -> bool {
    history
        .iter()
        .all(|o| table.lookup(o.guess, candidate) == o.clue)
}

///
/// The subset of the corpus consistent with `history`, in ascending index order. Adding an
/// observation can only ever remove words from this set.
///
pub fn filter_candidates(table: &ClueTable, history: &[Observation]) -> Vec<WordIdx> {
    (0..table.len())
        .into_par_iter()
        .filter(|w| is_consistent(table, history, *w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::clue::{clue_code, Clue};
    use crate::wordle::test_util::*;

    #[test]
    fn test_empty_history_keeps_everything() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        assert_eq!(filter_candidates(&table, &[]), corpus.all_indices());
    }

    #[test]
    fn test_answer_always_survives() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        for answer in 0..corpus.len() {
            let history: Vec<Observation> = (0..corpus.len())
                .step_by(3)
                .map(|g| Observation::new(g, table.lookup(g, answer)))
                .collect();
            let candidates = filter_candidates(&table, &history);
            assert!(candidates.contains(&answer), "answer {} was filtered out", corpus.word(answer));
        }
    }

    #[test]
    fn test_solved_clue_leaves_only_the_guess() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        let faint = corpus.index_of("faint").unwrap();
        let history = [Observation::new(faint, Clue::SOLVED)];
        assert_eq!(filter_candidates(&table, &history), vec![faint]);
    }

    #[test]
    fn test_filter_matches_codec() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        let canes = corpus.index_of("canes").unwrap();
        let clue = clue_code("canes", "faint");
        let candidates = filter_candidates(&table, &[Observation::new(canes, clue)]);
        for w in corpus.all_indices() {
            assert_eq!(
                candidates.contains(&w),
                clue_code("canes", corpus.word(w)) == clue,
                "word={}",
                corpus.word(w)
            );
        }
    }

    #[test]
    fn test_candidates_never_grow() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        for answer in 0..corpus.len() {
            let mut history = Vec::new();
            let mut previous = filter_candidates(&table, &history);
            for guess in (0..corpus.len()).rev().step_by(2) {
                history.push(Observation::new(guess, table.lookup(guess, answer)));
                let next = filter_candidates(&table, &history);
                assert!(next.len() <= previous.len());
                assert!(next.iter().all(|w| previous.contains(w)));
                previous = next;
            }
        }
    }

    #[test]
    fn test_order_of_observations_does_not_matter() {
        let corpus = sample_corpus();
        let table = ClueTable::build(&corpus);
        let answer = corpus.index_of("water").unwrap();
        let mut history: Vec<Observation> = [0, 4, 7]
            .iter()
            .map(|g| Observation::new(*g, table.lookup(*g, answer)))
            .collect();
        let forward = filter_candidates(&table, &history);
        history.reverse();
        assert_eq!(filter_candidates(&table, &history), forward);
    }
}
