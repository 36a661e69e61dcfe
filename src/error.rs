//! Error types shared by every stage of the pipeline.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A word failed validation at the codec boundary.
    #[error("invalid word {word:?}: {reason}")]
    InvalidWord { word: String, reason: &'static str },

    /// A well-formed word that the vocabulary does not contain.
    #[error("word {0:?} is not in the vocabulary")]
    UnknownWord(String),

    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("feedback matrix has {actual} bytes, expected {expected}")]
    MatrixSize { expected: usize, actual: usize },

    #[error("feedback matrix holds invalid code {code} at byte {offset}")]
    MatrixCorrupt { offset: usize, code: u8 },

    #[error("tree file does not start with the expected magic tag")]
    BadMagic,

    #[error("tree file version {0} is not supported")]
    UnsupportedVersion(u32),

    #[error("tree file was generated for {found} turns, expected {expected}")]
    DepthMismatch { expected: u32, found: u32 },

    #[error("tree file starts with {found}, expected {expected}")]
    StartMismatch { expected: String, found: String },

    #[error("tree file is corrupt: {0}")]
    TreeCorrupt(String),

    /// No depth-conforming tree exists for the requested budget.
    #[error("no decision tree fits within {depth} turns")]
    BudgetExceeded { depth: u32 },

    /// The tree has no entry for an observed feedback code.
    #[error("tree has no branch for feedback {code} on turn {turn}")]
    BranchMissing { turn: u32, code: u8 },

    #[error("answer not found within {depth} turns")]
    DepthExhausted { depth: u32 },
}
