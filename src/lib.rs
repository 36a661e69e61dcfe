//! # Wordle Tree
//!
//! Precomputes a complete Wordle strategy and replays it.
//!
//! A parallel scorer picks, for any set of remaining answers, the guess that
//! splits it most evenly. The generator applies it recursively over every
//! feedback branch, backtracking whenever a branch would need more turns than
//! allowed, and the resulting tree is stored in a compact binary file that the
//! walker replays without any further scoring.

pub mod cache;
pub mod candidates;
pub mod codec;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod scorer;
pub mod tree;
pub mod vocabulary;
pub mod walker;
pub mod word;

pub use cache::FeedbackMatrix;
pub use candidates::Oracle;
pub use codec::LookupTree;
pub use error::{Error, Result};
pub use feedback::{Feedback, FeedbackPattern};
pub use generator::{generate, generate_to_file, GeneratorConfig};
pub use scorer::{HardModeConstraints, ScoredGuess, Scorer};
pub use tree::DecisionTree;
pub use vocabulary::Vocabulary;
pub use walker::{Outcome, Trace, Walker};
pub use word::Word;

/// Word length for Wordle
pub const WORD_LENGTH: usize = 5;

/// Default turn budget
pub const DEFAULT_DEPTH: u32 = 6;

pub const DEFAULT_START: &str = "roate";

pub const FEEDBACK_TABLE_PATH: &str = "feedback_table.bin";

/// Load the dictionary from the embedded file
pub fn load_dictionary() -> Result<Vocabulary> {
    Vocabulary::from_text(include_str!("../dictionary/dictionary.txt"))
}
