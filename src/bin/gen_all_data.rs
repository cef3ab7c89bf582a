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
use std::collections::BTreeSet;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wordle_optimiser::wordle::*;

fn main() {
    env_logger::init();
    if let Err(err) = do_all() {
        log::error!("failed to generate data: {}", err);
        process::exit(1);
    }
}

///
/// Builds every derived artifact from the files in the data directory:
/// * the clue table
/// * the opening scores for each strategy
/// * the second turn rankings that follow each strategy's best opening guess
///
fn do_all() -> Result<(), SolverErr> {
    let config = Config::from_env();
    let corpus = Arc::new(Corpus::read(&config)?);
    let answers = read_answers(&config, &corpus)?;
    log::info!("{} of {} words are possible answers", answers.len(), corpus.len());

    let table_path = config.clue_table_path();
    let (dur, table) = timed(|| ClueTable::load_or_build(&table_path, &corpus));
    let table = Arc::new(table?);
    log::info!("clue table ready after {:.2}s", dur.as_secs_f64());

    for strategy in Strategy::ALL {
        let path = config.first_guess_cache_path(strategy);
        let (dur, first_guess) = timed(|| {
            FirstGuessCache::load_or_build(&path, &corpus, || {
                rank_opening_guesses(&corpus, &table, strategy)
            })
        });
        let first_guess = first_guess?;
        log::info!("{} opening scores ready after {:.2}s", strategy, dur.as_secs_f64());

        let solver = Solver::new(corpus.clone(), table.clone(), strategy, first_guess);
        let (dur, out) = timed(|| write_second_guess_data(&config, &solver));
        let written = out?;
        log::info!(
            "{} wrote {} second turn rankings in {:.2}s",
            strategy,
            written,
            dur.as_secs_f64()
        );
    }

    Ok(())
}

/// Ranks the second turn for every clue the best opening guess can produce, then persists them
fn write_second_guess_data(config: &Config, solver: &Solver) -> Result<usize, SolverErr> {
    let opening = solver.best_guess(&GuessHistory::new())?;
    let clues: BTreeSet<ClueCode> = solver
        .table()
        .row(opening)
        .iter()
        .copied()
        .filter(|clue| *clue != Clue::SOLVED)
        .collect();

    for clue in clues {
        let mut history = GuessHistory::new();
        history.push(Observation::new(opening, clue))?;
        solver.rank(&history)?;
    }

    let path = config.second_guess_cache_path(solver.strategy());
    solver.second_guess_cache().persist(&path, solver.corpus())?;
    Ok(solver.second_guess_cache().len())
}

fn timed<R, F>(f: F) -> (Duration, R)
    where F: FnOnce() -> R
{
    let start_at = Instant::now();
    let out = f();
    let dur = start_at.elapsed();

    (dur, out)
}
