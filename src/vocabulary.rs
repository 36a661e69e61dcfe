//! The ordered, immutable word list every other component indexes into.

use std::fs;
use std::path::Path;

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::word::Word;
use crate::WORD_LENGTH;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<Word>,
    index: FxHashMap<Word, usize>,
    /// Tie-break weight per word: the summed vocabulary-wide frequency of
    /// each distinct letter it contains.
    weights: Vec<u32>,
}

impl Vocabulary {
    /// Build a vocabulary from raw strings. Every entry must be a valid word;
    /// repeats keep the ordinal of their first occurrence.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Vec::new();
        let mut index = FxHashMap::default();

        for word in words {
            let word = Word::encode(word.as_ref().trim())?;
            if index.contains_key(&word) {
                debug!("dropping duplicate word {word}");
                continue;
            }
            index.insert(word, list.len());
            list.push(word);
        }

        let weights = letter_weights(&list);
        Ok(Self {
            words: list,
            index,
            weights,
        })
    }

    /// Load one word per line, ignoring blank lines and case.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_words(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_lowercase),
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_text(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    pub fn word(&self, index: usize) -> Word {
        self.words[index]
    }

    pub fn index_of(&self, word: Word) -> Option<usize> {
        self.index.get(&word).copied()
    }

    /// Like [`index_of`](Self::index_of), reporting the word on failure.
    pub fn require(&self, word: Word) -> Result<usize> {
        self.index_of(word)
            .ok_or_else(|| Error::UnknownWord(word.to_string()))
    }

    #[inline]
    pub fn weight(&self, index: usize) -> u32 {
        self.weights[index]
    }

    /// All ordinals in vocabulary order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.words.len()).collect()
    }
}

fn letter_weights(words: &[Word]) -> Vec<u32> {
    let mut letter_counts = [0u32; 27];
    for word in words {
        for pos in 0..WORD_LENGTH {
            letter_counts[word.code_at(pos) as usize] += 1;
        }
    }

    words
        .iter()
        .map(|word| {
            let mut seen = [false; 27];
            let mut score = 0;
            for pos in 0..WORD_LENGTH {
                let code = word.code_at(pos) as usize;
                if !seen[code] {
                    seen[code] = true;
                    score += letter_counts[code];
                }
            }
            score
        })
        .collect()
}
