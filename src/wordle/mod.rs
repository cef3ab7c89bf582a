mod prelude;
mod clue;
mod config;
mod data;
mod table;
mod filter;
mod strategy;
mod cache;
mod game;

pub use prelude::*;
pub use clue::*;
pub use config::*;
pub use data::*;
pub use table::*;
pub use filter::*;
pub use strategy::*;
pub use cache::*;
pub use game::*;
