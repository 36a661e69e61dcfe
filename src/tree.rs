//! In-memory decision tree produced by the generator.

use std::rc::Rc;

use crate::feedback::FeedbackPattern;
use crate::word::Word;

/// One turn of the strategy: the guess to make, and where each feedback
/// pattern leads. A node without edges is a leaf whose guess is the answer.
///
/// Nodes are shared through `Rc` because memoized subsets resolve to the
/// same subtree from different paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub guess: Word,
    /// Sorted by pattern, at most one edge per pattern. The all-correct
    /// pattern never has an edge.
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub pattern: FeedbackPattern,
    pub next: Rc<Node>,
}

impl Node {
    pub fn leaf(guess: Word) -> Self {
        Self {
            guess,
            edges: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn child(&self, pattern: FeedbackPattern) -> Option<&Rc<Node>> {
        self.edges
            .binary_search_by_key(&pattern, |edge| edge.pattern)
            .ok()
            .map(|i| &self.edges[i].next)
    }

    /// Guesses on the longest path from this node, this one included.
    pub fn height(&self) -> u32 {
        1 + self
            .edges
            .iter()
            .map(|edge| edge.next.height())
            .max()
            .unwrap_or(0)
    }

    /// Node count with shared subtrees counted once per path, matching the
    /// layout written to disk.
    pub fn expanded_size(&self) -> usize {
        1 + self
            .edges
            .iter()
            .map(|edge| edge.next.expanded_size())
            .sum::<usize>()
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub start: Word,
    /// Turn budget the tree was generated for.
    pub depth: u32,
    pub root: Rc<Node>,
}

impl DecisionTree {
    /// The guesses the tree plays for `answer`, ending with the answer
    /// itself, or `None` if the tree does not lead there.
    pub fn guesses_for(&self, answer: Word) -> Option<Vec<Word>> {
        let mut guesses = Vec::new();
        let mut node = &self.root;
        loop {
            guesses.push(node.guess);
            let pattern = FeedbackPattern::calculate(node.guess, answer);
            if pattern.is_win() {
                return Some(guesses);
            }
            node = node.child(pattern)?;
        }
    }

    pub fn height(&self) -> u32 {
        self.root.height()
    }

    pub fn node_count(&self) -> usize {
        self.root.expanded_size()
    }
}
