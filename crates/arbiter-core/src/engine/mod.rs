pub mod runner;

pub use runner::{PlannedPair, RunOutcome, Runner};
