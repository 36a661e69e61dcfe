//! Guess selection by partition imbalance.
//!
//! A guess splits the candidate set into up to 243 buckets, one per feedback
//! pattern. The fewer candidates share a bucket the more the guess tells us,
//! so guesses are ranked by the sum of squared bucket sizes. That sum is
//! accumulated one candidate at a time as `2 * count_before + 1`, which lets
//! a guess be abandoned as soon as it can no longer beat the best one found.

use std::cmp::Reverse;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::cache::FeedbackMatrix;
use crate::candidates::Oracle;
use crate::feedback::{Feedback, FeedbackPattern};
use crate::vocabulary::Vocabulary;
use crate::word::Word;
use crate::WORD_LENGTH;

/// Lower bound on the number of chunks the guess domain is split into.
pub const MIN_WORKERS: usize = 4;

/// A guess with the score it achieved against a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredGuess {
    pub index: usize,
    pub word: Word,
    /// Sum of squared bucket sizes.
    pub score: u64,
    pub weight: u32,
}

impl ScoredGuess {
    fn rank(&self) -> (u64, Reverse<u32>, usize) {
        (self.score, Reverse(self.weight), self.index)
    }

    /// Lower score wins, then higher weight, then lower ordinal.
    pub fn beats(&self, other: &Self) -> bool {
        self.rank() < other.rank()
    }
}

/// Result of analyzing a potential guess
#[derive(Debug, Clone)]
pub struct GuessAnalysis {
    pub guess: ScoredGuess,
    pub entropy: f64,
    pub expected_remaining: f64,
    pub buckets: usize,
    pub is_possible_answer: bool,
}

/// Hard mode constraints from previous guesses
#[derive(Debug, Clone, Default)]
pub struct HardModeConstraints {
    /// Letter codes that must be in specific positions (green)
    pub required_positions: [Option<u8>; WORD_LENGTH],
    /// Minimum number of occurrences per letter code, from yellow marks.
    /// Greens are enforced by position alone.
    pub required_counts: [u8; 27],
}

impl HardModeConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_guess(guess: Word, pattern: FeedbackPattern) -> Self {
        let mut constraints = Self::new();
        constraints.update(guess, pattern);
        constraints
    }

    /// Update constraints based on a guess and its feedback
    pub fn update(&mut self, guess: Word, pattern: FeedbackPattern) {
        let mut yellows = [0u8; 27];
        for (pos, fb) in pattern.to_feedbacks().into_iter().enumerate() {
            let code = guess.code_at(pos);
            match fb {
                Feedback::Correct => self.required_positions[pos] = Some(code),
                Feedback::Present => yellows[code as usize] += 1,
                Feedback::Absent => {}
            }
        }
        for (required, seen) in self.required_counts.iter_mut().zip(yellows) {
            *required = (*required).max(seen);
        }
    }

    /// Check if a word satisfies all hard mode constraints
    pub fn is_valid(&self, word: Word) -> bool {
        let positions_ok = self
            .required_positions
            .iter()
            .enumerate()
            .all(|(pos, required)| required.map_or(true, |code| word.code_at(pos) == code));
        if !positions_ok {
            return false;
        }

        let mut counts = [0u8; 27];
        for pos in 0..WORD_LENGTH {
            counts[word.code_at(pos) as usize] += 1;
        }
        counts
            .iter()
            .zip(&self.required_counts)
            .all(|(have, need)| have >= need)
    }

    pub fn is_empty(&self) -> bool {
        self.required_positions.iter().all(|p| p.is_none())
            && self.required_counts.iter().all(|&c| c == 0)
    }

    /// The vocabulary ordinals still playable under these constraints.
    pub fn domain(&self, vocab: &Vocabulary) -> Vec<usize> {
        vocab
            .words()
            .iter()
            .enumerate()
            .filter(|&(_, &word)| self.is_valid(word))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Guesses allowed in hard mode after `previous` drew `pattern`.
pub fn hard_mode_domain(vocab: &Vocabulary, previous: Word, pattern: FeedbackPattern) -> Vec<usize> {
    HardModeConstraints::from_guess(previous, pattern).domain(vocab)
}

#[derive(Clone, Copy)]
pub struct Scorer<'a> {
    oracle: Oracle<'a>,
}

impl<'a> Scorer<'a> {
    pub fn new(vocab: &'a Vocabulary, matrix: Option<&'a FeedbackMatrix>) -> Self {
        Self {
            oracle: Oracle::new(vocab, matrix),
        }
    }

    pub fn oracle(&self) -> Oracle<'a> {
        self.oracle
    }

    /// Number of chunks the guess domain is split into.
    pub fn workers() -> usize {
        rayon::current_num_threads().max(MIN_WORKERS)
    }

    /// Find the guess in `domain` that best splits `candidates`.
    ///
    /// The domain is cut into [`workers`](Self::workers) contiguous chunks
    /// that are scored concurrently; the call returns once every chunk is
    /// done. Returns `None` when there are no candidates or every guess in
    /// the domain is banned.
    pub fn best_guess(
        &self,
        candidates: &[usize],
        domain: &[usize],
        banned: Option<&FxHashSet<usize>>,
    ) -> Option<ScoredGuess> {
        if candidates.is_empty() || domain.is_empty() {
            return None;
        }

        let chunk_len = domain.len().div_ceil(Self::workers());
        domain
            .par_chunks(chunk_len)
            .filter_map(|chunk| self.best_in_chunk(candidates, chunk, banned))
            .reduce_with(|a, b| if b.beats(&a) { b } else { a })
    }

    fn best_in_chunk(
        &self,
        candidates: &[usize],
        chunk: &[usize],
        banned: Option<&FxHashSet<usize>>,
    ) -> Option<ScoredGuess> {
        let vocab = self.oracle.vocabulary();
        let mut counts = [0u32; FeedbackPattern::NUM_PATTERNS];
        let mut best: Option<ScoredGuess> = None;

        for &index in chunk {
            if banned.is_some_and(|banned| banned.contains(&index)) {
                continue;
            }
            let mut guess = ScoredGuess {
                index,
                word: vocab.word(index),
                score: 0,
                weight: vocab.weight(index),
            };
            if self.bounded_score(candidates, &mut guess, best.as_ref(), &mut counts) {
                best = Some(guess);
            }
        }
        best
    }

    /// Accumulate `guess.score`, giving up (and returning false) as soon as
    /// the running total can no longer beat `best`.
    fn bounded_score(
        &self,
        candidates: &[usize],
        guess: &mut ScoredGuess,
        best: Option<&ScoredGuess>,
        counts: &mut [u32; FeedbackPattern::NUM_PATTERNS],
    ) -> bool {
        counts.fill(0);
        let row = self.oracle.row(guess.index);
        for &answer in candidates {
            let slot = &mut counts[row.code(answer) as usize];
            guess.score += 2 * u64::from(*slot) + 1;
            *slot += 1;
            if best.is_some_and(|best| !guess.beats(best)) {
                return false;
            }
        }
        true
    }

    /// Bucket sizes of `candidates` under `guess`, indexed by pattern.
    pub fn bucket_sizes(&self, guess: usize, candidates: &[usize]) -> [u32; FeedbackPattern::NUM_PATTERNS] {
        let mut counts = [0u32; FeedbackPattern::NUM_PATTERNS];
        let row = self.oracle.row(guess);
        for &answer in candidates {
            counts[row.code(answer) as usize] += 1;
        }
        counts
    }

    /// Unpruned score: the sum of squared bucket sizes.
    pub fn score(&self, guess: usize, candidates: &[usize]) -> u64 {
        self.bucket_sizes(guess, candidates)
            .iter()
            .map(|&n| u64::from(n) * u64::from(n))
            .sum()
    }

    pub fn analyze(&self, guess: usize, candidates: &[usize]) -> GuessAnalysis {
        let vocab = self.oracle.vocabulary();
        let counts = self.bucket_sizes(guess, candidates);
        let n = candidates.len() as f64;

        let mut score = 0u64;
        let mut entropy = 0.0;
        let mut buckets = 0;
        for &count in counts.iter().filter(|&&c| c > 0) {
            score += u64::from(count) * u64::from(count);
            buckets += 1;
            let p = f64::from(count) / n;
            entropy -= p * p.log2();
        }

        GuessAnalysis {
            guess: ScoredGuess {
                index: guess,
                word: vocab.word(guess),
                score,
                weight: vocab.weight(guess),
            },
            entropy,
            expected_remaining: if candidates.is_empty() { 0.0 } else { score as f64 / n },
            buckets,
            is_possible_answer: candidates.contains(&guess),
        }
    }

    /// Full analyses of the `n` best guesses, best first.
    pub fn top_guesses(&self, candidates: &[usize], domain: &[usize], n: usize) -> Vec<GuessAnalysis> {
        if candidates.is_empty() {
            return vec![];
        }

        let mut analyses: Vec<GuessAnalysis> = domain
            .par_iter()
            .map(|&guess| self.analyze(guess, candidates))
            .collect();

        analyses.sort_by_key(|a| a.guess.rank());

        analyses.truncate(n);
        analyses
    }
}
