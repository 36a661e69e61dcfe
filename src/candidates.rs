//! Candidate filtering and partitioning.
//!
//! [`Oracle`] answers feedback queries by vocabulary ordinal, reading the
//! [`FeedbackMatrix`] when one is loaded and computing the pattern otherwise.
//! Both paths produce identical codes.

use crate::cache::FeedbackMatrix;
use crate::feedback::FeedbackPattern;
use crate::vocabulary::Vocabulary;
use crate::word::Word;

#[derive(Clone, Copy)]
pub struct Oracle<'a> {
    vocab: &'a Vocabulary,
    matrix: Option<&'a FeedbackMatrix>,
}

/// Feedback for one fixed guess against any answer ordinal.
#[derive(Clone, Copy)]
pub enum Row<'a> {
    Cached(&'a [u8]),
    Direct { guess: Word, answers: &'a [Word] },
}

impl Row<'_> {
    #[inline]
    pub fn code(&self, answer: usize) -> u8 {
        match *self {
            Row::Cached(row) => row[answer],
            Row::Direct { guess, answers } => FeedbackPattern::calculate(guess, answers[answer]).0,
        }
    }
}

impl<'a> Oracle<'a> {
    /// A matrix whose size disagrees with the vocabulary is ignored.
    pub fn new(vocab: &'a Vocabulary, matrix: Option<&'a FeedbackMatrix>) -> Self {
        let matrix = matrix.filter(|m| m.size() == vocab.len());
        Self { vocab, matrix }
    }

    pub fn vocabulary(&self) -> &'a Vocabulary {
        self.vocab
    }

    pub fn has_matrix(&self) -> bool {
        self.matrix.is_some()
    }

    #[inline]
    pub fn row(&self, guess: usize) -> Row<'a> {
        match self.matrix {
            Some(matrix) => Row::Cached(matrix.row(guess)),
            None => Row::Direct {
                guess: self.vocab.word(guess),
                answers: self.vocab.words(),
            },
        }
    }

    #[inline]
    pub fn feedback(&self, guess: usize, answer: usize) -> FeedbackPattern {
        FeedbackPattern(self.row(guess).code(answer))
    }

    /// Keep the candidates that would have produced `pattern` for `guess`.
    pub fn filter(&self, candidates: &[usize], guess: usize, pattern: FeedbackPattern) -> Vec<usize> {
        let row = self.row(guess);
        candidates
            .iter()
            .copied()
            .filter(|&idx| row.code(idx) == pattern.0)
            .collect()
    }

    /// Same as [`filter`](Self::filter) for a guess that need not be in the
    /// vocabulary.
    pub fn filter_word(&self, candidates: &[usize], guess: Word, pattern: FeedbackPattern) -> Vec<usize> {
        if let Some(index) = self.vocab.index_of(guess) {
            return self.filter(candidates, index, pattern);
        }
        let answers = self.vocab.words();
        candidates
            .iter()
            .copied()
            .filter(|&idx| FeedbackPattern::calculate(guess, answers[idx]) == pattern)
            .collect()
    }

    /// Split `candidates` by the feedback `guess` would produce, returning
    /// the non-empty buckets in ascending code order. Each bucket keeps the
    /// relative order of `candidates`.
    pub fn partition(&self, candidates: &[usize], guess: usize) -> Vec<(FeedbackPattern, Vec<usize>)> {
        let row = self.row(guess);
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); FeedbackPattern::NUM_PATTERNS];
        for &idx in candidates {
            buckets[row.code(idx) as usize].push(idx);
        }
        buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(code, bucket)| (FeedbackPattern(code as u8), bucket))
            .collect()
    }
}
