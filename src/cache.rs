//! Precomputed feedback matrix.
//!
//! Row `i` holds the feedback code of guess `i` against every answer in
//! vocabulary order, so byte `i * N + j` is `feedback(words[i], words[j])`.
//! The file has no header; its size alone ties it to a vocabulary.

use std::fs::{self, File};
use std::ops::Deref;
use std::path::Path;

use log::{info, warn};
use memmap2::Mmap;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::feedback::FeedbackPattern;
use crate::vocabulary::Vocabulary;

enum Storage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for Storage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Storage::Owned(bytes) => bytes.as_slice(),
            Storage::Mapped(map) => &map[..],
        }
    }
}

pub struct FeedbackMatrix {
    size: usize,
    storage: Storage,
}

impl FeedbackMatrix {
    /// Compute every (guess, answer) pair for `vocab`, one row per task.
    pub fn compute(vocab: &Vocabulary) -> Self {
        let words = vocab.words();
        let size = words.len();
        let mut bytes = vec![0u8; size * size];
        if size > 0 {
            bytes
                .par_chunks_mut(size)
                .zip(words.par_iter())
                .for_each(|(row, &guess)| {
                    for (cell, &answer) in row.iter_mut().zip(words) {
                        *cell = FeedbackPattern::calculate(guess, answer).0;
                    }
                });
        }
        Self {
            size,
            storage: Storage::Owned(bytes),
        }
    }

    /// Map a matrix file read-only without copying it.
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and never outlives `Self`; the
        // file is not expected to be modified while a solver runs.
        let map = unsafe { Mmap::map(&file)? };
        Self::validated(size, Storage::Mapped(map))
    }

    /// Read a matrix file fully into memory.
    pub fn read(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        Self::validated(size, Storage::Owned(fs::read(path)?))
    }

    /// Try to map the matrix for `vocab`, returning `None` (and logging why)
    /// when it is missing or unusable so callers fall back to the oracle.
    pub fn load_or_fallback(path: impl AsRef<Path>, vocab: &Vocabulary, mmap: bool) -> Option<Self> {
        let path = path.as_ref();
        let loaded = if mmap {
            Self::open(path, vocab.len())
        } else {
            Self::read(path, vocab.len())
        };
        match loaded {
            Ok(matrix) => {
                info!("using feedback matrix {}", path.display());
                Some(matrix)
            }
            Err(e) => {
                warn!(
                    "feedback matrix {} unavailable ({e}); computing feedback directly",
                    path.display()
                );
                None
            }
        }
    }

    fn validated(size: usize, storage: Storage) -> Result<Self> {
        let expected = size * size;
        if storage.len() != expected {
            return Err(Error::MatrixSize {
                expected,
                actual: storage.len(),
            });
        }
        if let Some(offset) = storage
            .iter()
            .position(|&code| usize::from(code) >= FeedbackPattern::NUM_PATTERNS)
        {
            return Err(Error::MatrixCorrupt {
                offset,
                code: storage[offset],
            });
        }
        Ok(Self { size, storage })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, &*self.storage)?;
        Ok(())
    }

    /// Number of words on each side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped(_))
    }

    #[inline]
    pub fn row(&self, guess: usize) -> &[u8] {
        &self.storage[guess * self.size..(guess + 1) * self.size]
    }

    #[inline]
    pub fn get(&self, guess: usize, answer: usize) -> FeedbackPattern {
        FeedbackPattern(self.storage[guess * self.size + answer])
    }
}
