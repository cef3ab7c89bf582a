use std::process;
use clap::{CommandFactory, ErrorKind, Parser};
use wordle_optimiser::wordle::*;

/// Plays one game of wordle against a known answer and prints every clue
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The hidden word
    answer: String,

    /// Words to guess first, in order, before the solver takes over
    openings: Vec<String>,

    /// Scoring strategy: 1 = count squared, 2 = count squared excluding solved,
    /// 3 = entropy / frequency
    #[clap(
        short,
        long,
        env = "WORDLE_STRATEGY",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(1..=3)
    )]
    strategy: u8,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let strategy = match Strategy::from_version(args.strategy) {
        Some(strategy) => strategy,
        None => Args::command()
            .error(ErrorKind::InvalidValue, format!("unknown strategy {}", args.strategy))
            .exit(),
    };

    if let Err(err) = play(strategy, &args.answer, &args.openings) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn play(strategy: Strategy, answer: &str, openings: &[String]) -> Result<(), SolverErr> {
    let config = Config::from_env();
    let solver = Solver::load(&config, strategy)?;
    let second_guess = SecondGuessCache::load(&config.second_guess_cache_path(strategy), solver.corpus())?;
    let solver = solver.with_second_guess_cache(second_guess);

    let mut game = KnownAnswerGame::new(solver.corpus(), answer)?;
    let openings: Vec<&str> = openings.iter().map(String::as_str).collect();
    let history = play_game(&solver, &mut game, &openings)?;

    println!("{} using {}", game.answer(), strategy);
    for o in history.observations() {
        let clue = Clue::decode(o.clue).unwrap_or_default();
        println!("{} {}", clue, solver.corpus().word(o.guess));
    }
    println!("solved in {}", history.turn());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parses_answer_openings_and_strategy() {
        let args = Args::try_parse_from(["play", "water", "crane", "slate", "--strategy", "2"]).unwrap();
        assert_eq!(args.answer, "water");
        assert_eq!(args.openings, vec!["crane", "slate"]);
        assert_eq!(Strategy::from_version(args.strategy), Some(Strategy::CountSquaredExcludingSolved));
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        for bad in ["0", "4", "7", "x"] {
            assert!(
                Args::try_parse_from(["play", "water", "--strategy", bad]).is_err(),
                "strategy {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_requires_answer() {
        assert!(Args::try_parse_from(["play"]).is_err());
    }
}
