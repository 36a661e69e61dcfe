//! Depth-bounded decision tree generation.
//!
//! Every candidate subset is solved for a number of remaining turns: pick the
//! scorer's best guess, split the subset by feedback and solve each bucket
//! with one turn fewer. When any bucket cannot be solved in time the guess
//! is banned for this subset and the next best one is tried; when no guess
//! is left the subset itself fails and its parent moves on to another guess.
//!
//! Different histories often narrow down to the same subset, so results
//! (failures included) are memoized on the subset bitset and the turns left.

use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cache::FeedbackMatrix;
use crate::codec;
use crate::error::{Error, Result};
use crate::scorer::Scorer;
use crate::tree::{DecisionTree, Edge, Node};
use crate::vocabulary::Vocabulary;
use crate::word::Word;
use crate::DEFAULT_DEPTH;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum number of guesses on any path, the opening included.
    pub depth: u32,
    /// Fixed opening guess; the scorer picks one when unset.
    pub start: Option<Word>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            start: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    pub states_completed: usize,
    pub guesses_tried: usize,
    pub backtracks: usize,
    pub memo_hits: usize,
    pub deepest_turn: u32,
}

/// A candidate subset as a bitset over vocabulary ordinals, together with
/// the turns left to solve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    subset: Box<[u64]>,
    turns: u32,
}

impl MemoKey {
    fn new(candidates: &[usize], vocab_len: usize, turns: u32) -> Self {
        let mut subset = vec![0u64; vocab_len.div_ceil(64)].into_boxed_slice();
        for &idx in candidates {
            subset[idx / 64] |= 1u64 << (idx % 64);
        }
        Self { subset, turns }
    }
}

pub struct Generator<'a> {
    vocab: &'a Vocabulary,
    scorer: Scorer<'a>,
    domain: Vec<usize>,
    depth: u32,
    memo: FxHashMap<MemoKey, Option<Rc<Node>>>,
    stats: GenerationStats,
    last_report: Instant,
}

impl<'a> Generator<'a> {
    pub fn new(vocab: &'a Vocabulary, matrix: Option<&'a FeedbackMatrix>) -> Self {
        Self {
            vocab,
            scorer: Scorer::new(vocab, matrix),
            domain: vocab.all_indices(),
            depth: 0,
            memo: FxHashMap::default(),
            stats: GenerationStats::default(),
            last_report: Instant::now(),
        }
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Build a tree solving every vocabulary word within `config.depth`
    /// guesses. Fails with [`Error::BudgetExceeded`] when no such tree
    /// exists for the given opening.
    pub fn generate(&mut self, config: &GeneratorConfig) -> Result<DecisionTree> {
        if self.vocab.is_empty() {
            return Err(Error::EmptyVocabulary);
        }
        let start = config.start.map(|word| self.vocab.require(word)).transpose()?;

        self.depth = config.depth;
        self.memo.clear();
        self.stats = GenerationStats::default();
        self.last_report = Instant::now();

        let all = self.vocab.all_indices();
        let root = if config.depth == 0 {
            None
        } else {
            match start {
                Some(guess) => self.expand(&all, guess, config.depth).map(Rc::new),
                None => self.solve(&all, config.depth),
            }
        };

        let stats = &self.stats;
        info!(
            "generation finished: states={} guesses={} backtracks={} memo_hits={} max_turn={}",
            stats.states_completed, stats.guesses_tried, stats.backtracks, stats.memo_hits, stats.deepest_turn
        );

        let root = root.ok_or(Error::BudgetExceeded { depth: config.depth })?;
        Ok(DecisionTree {
            start: root.guess,
            depth: config.depth,
            root,
        })
    }

    /// Solve `candidates` with `turns` guesses left, the next one included.
    fn solve(&mut self, candidates: &[usize], turns: u32) -> Option<Rc<Node>> {
        if turns == 0 {
            return None;
        }
        if let [only] = candidates {
            return Some(Rc::new(Node::leaf(self.vocab.word(*only))));
        }
        if turns == 1 {
            return None;
        }

        let key = MemoKey::new(candidates, self.vocab.len(), turns);
        if let Some(cached) = self.memo.get(&key) {
            self.stats.memo_hits += 1;
            return cached.clone();
        }

        let mut banned = FxHashSet::default();
        let solved = loop {
            let Some(best) = self.scorer.best_guess(candidates, &self.domain, Some(&banned)) else {
                break None;
            };
            // With one turn after this guess every bucket must be a
            // singleton, i.e. the score must equal the candidate count. The
            // best remaining score already exceeds it, so nothing will.
            if turns == 2 && best.score > candidates.len() as u64 {
                break None;
            }

            self.stats.guesses_tried += 1;
            if let Some(node) = self.expand(candidates, best.index, turns) {
                break Some(Rc::new(node));
            }
            debug!(
                "turn {}: {} fails for {} candidates, backtracking",
                self.depth - turns + 1,
                best.word,
                candidates.len()
            );
            self.stats.backtracks += 1;
            banned.insert(best.index);
        };

        if solved.is_some() {
            self.stats.states_completed += 1;
            self.report_progress();
        }
        self.memo.insert(key, solved.clone());
        solved
    }

    /// Play `guess` against `candidates` and solve every resulting bucket.
    fn expand(&mut self, candidates: &[usize], guess: usize, turns: u32) -> Option<Node> {
        let turn = self.depth - turns + 1;
        self.stats.deepest_turn = self.stats.deepest_turn.max(turn);

        let mut edges = Vec::new();
        for (pattern, bucket) in self.scorer.oracle().partition(candidates, guess) {
            if pattern.is_win() {
                continue;
            }
            let next = self.solve(&bucket, turns - 1)?;
            edges.push(Edge { pattern, next });
        }
        Some(Node {
            guess: self.vocab.word(guess),
            edges,
        })
    }

    fn report_progress(&mut self) {
        if self.last_report.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        let stats = &self.stats;
        info!(
            "states={} guesses={} backtracks={} memo_hits={} max_turn={}",
            stats.states_completed, stats.guesses_tried, stats.backtracks, stats.memo_hits, stats.deepest_turn
        );
    }
}

pub fn generate(
    vocab: &Vocabulary,
    config: &GeneratorConfig,
    matrix: Option<&FeedbackMatrix>,
) -> Result<DecisionTree> {
    Generator::new(vocab, matrix).generate(config)
}

/// Generate a tree and write it to `path`. Nothing is written unless
/// generation succeeds.
pub fn generate_to_file(
    vocab: &Vocabulary,
    config: &GeneratorConfig,
    matrix: Option<&FeedbackMatrix>,
    path: impl AsRef<Path>,
) -> Result<DecisionTree> {
    let tree = generate(vocab, config, matrix)?;
    codec::write_file(&tree, path)?;
    Ok(tree)
}
