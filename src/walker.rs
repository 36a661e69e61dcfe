//! Replays a loaded tree against a known answer.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::codec::LookupTree;
use crate::error::{Error, Result};
use crate::feedback::FeedbackPattern;
use crate::vocabulary::Vocabulary;
use crate::word::Word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub guess: Word,
    pub feedback: FeedbackPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Solved { turns: u32 },
    /// The last allowed turn was played without a win.
    DepthExhausted { depth: u32 },
    /// The tree has no entry for the observed pattern, meaning it was built
    /// for a different vocabulary.
    BranchMissing { turn: u32, code: u8 },
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub answer: Word,
    pub steps: Vec<Step>,
    pub outcome: Outcome,
}

impl Trace {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved { .. })
    }

    pub fn guesses(&self) -> Vec<Word> {
        self.steps.iter().map(|step| step.guess).collect()
    }

    /// Turn a failed trace into the matching error.
    pub fn into_result(self) -> Result<Self> {
        match self.outcome {
            Outcome::Solved { .. } => Ok(self),
            Outcome::DepthExhausted { depth } => Err(Error::DepthExhausted { depth }),
            Outcome::BranchMissing { turn, code } => Err(Error::BranchMissing { turn, code }),
        }
    }
}

#[derive(Clone, Copy)]
pub struct Walker<'t> {
    tree: &'t LookupTree,
}

impl<'t> Walker<'t> {
    pub fn new(tree: &'t LookupTree) -> Self {
        Self { tree }
    }

    /// Play the tree's guesses against `answer` until it is found, the turn
    /// budget runs out, or the tree has no branch for the feedback.
    pub fn solve(&self, answer: Word) -> Trace {
        let depth = self.tree.depth();
        let mut steps = Vec::new();
        let mut guess = self.tree.start();
        let mut node = Some(self.tree.root());
        let mut turn = 1;

        let outcome = loop {
            let feedback = FeedbackPattern::calculate(guess, answer);
            steps.push(Step { guess, feedback });

            if feedback.is_win() {
                break Outcome::Solved { turns: turn };
            }
            if turn >= depth {
                break Outcome::DepthExhausted { depth };
            }
            let Some(entry) = node.and_then(|node| self.tree.find_child(node, feedback)) else {
                break Outcome::BranchMissing {
                    turn,
                    code: feedback.0,
                };
            };
            guess = entry.guess;
            node = entry.child;
            turn += 1;
        };

        Trace {
            answer,
            steps,
            outcome,
        }
    }

    /// Replay every vocabulary word in parallel.
    pub fn benchmark(&self, vocab: &Vocabulary) -> BenchmarkReport {
        let traces: Vec<Trace> = vocab
            .words()
            .par_iter()
            .map(|&answer| self.solve(answer))
            .collect();

        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        let mut failures = Vec::new();
        for trace in traces {
            match trace.outcome {
                Outcome::Solved { turns } => *counts.entry(turns).or_default() += 1,
                _ => failures.push(trace),
            }
        }

        BenchmarkReport {
            distribution: counts.into_iter().collect(),
            failures,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    /// (turns, words solved in that many turns), ascending.
    pub distribution: Vec<(u32, usize)>,
    pub failures: Vec<Trace>,
}

impl BenchmarkReport {
    pub fn solved(&self) -> usize {
        self.distribution.iter().map(|(_, count)| count).sum()
    }

    pub fn average_turns(&self) -> f64 {
        let solved = self.solved();
        if solved == 0 {
            return 0.0;
        }
        let total: usize = self
            .distribution
            .iter()
            .map(|&(turns, count)| turns as usize * count)
            .sum();
        total as f64 / solved as f64
    }
}
