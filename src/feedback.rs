//! Feedback calculation for Wordle guesses.
//!
//! This module handles computing the feedback pattern (green/yellow/gray)
//! for a guess against a target word.

use serde::Serialize;

use crate::word::Word;
use crate::WORD_LENGTH;

/// Represents the feedback for a single letter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// Letter not in word (gray)
    Absent = 0,
    /// Correct letter in wrong position (yellow)
    Present = 1,
    /// Correct letter in correct position (green)
    Correct = 2,
}

impl Feedback {
    /// Convert to a character for display
    pub fn to_char(self) -> char {
        match self {
            Feedback::Correct => '🟩',
            Feedback::Present => '🟨',
            Feedback::Absent => '⬛',
        }
    }

    /// Parse from a character (g=green, y=yellow, b=black/gray)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'g' | '2' => Some(Feedback::Correct),
            'y' | '1' => Some(Feedback::Present),
            'b' | 'x' | '0' | '_' => Some(Feedback::Absent),
            _ => None,
        }
    }

    fn from_digit(digit: u8) -> Self {
        match digit {
            0 => Feedback::Absent,
            1 => Feedback::Present,
            _ => Feedback::Correct,
        }
    }
}

/// A complete feedback pattern for a 5-letter guess.
/// Encoded as a single u8 value (0-242): the five per-letter digits read as a
/// base-3 number with the first letter as the most significant digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FeedbackPattern(pub u8);

impl FeedbackPattern {
    /// The pattern indicating all correct (winning)
    pub const ALL_CORRECT: Self = Self(242);

    /// Total number of possible patterns (3^5)
    pub const NUM_PATTERNS: usize = 243;

    /// Create a new pattern from individual feedback values
    pub fn new(feedbacks: [Feedback; WORD_LENGTH]) -> Self {
        Self(feedbacks.iter().fold(0u8, |acc, &fb| acc * 3 + fb as u8))
    }

    /// Validate a code read from an untrusted source.
    pub fn from_code(code: u16) -> Option<Self> {
        (usize::from(code) < Self::NUM_PATTERNS).then_some(Self(code as u8))
    }

    /// Calculate the feedback pattern for a guess against a target word.
    ///
    /// Greens are resolved first and consume their letter from the answer's
    /// remaining counts; yellows are then handed out left to right while an
    /// unconsumed occurrence is left. Repeated guess letters beyond the
    /// answer's count come back absent.
    pub fn calculate(guess: Word, target: Word) -> Self {
        let mut target_remaining = [0u8; 27];
        let mut digits = [Feedback::Absent; WORD_LENGTH];

        for pos in 0..WORD_LENGTH {
            target_remaining[target.code_at(pos) as usize] += 1;
        }

        for (pos, digit) in digits.iter_mut().enumerate() {
            let code = guess.code_at(pos);
            if code == target.code_at(pos) {
                *digit = Feedback::Correct;
                target_remaining[code as usize] -= 1;
            }
        }

        for (pos, digit) in digits.iter_mut().enumerate() {
            if *digit == Feedback::Correct {
                continue;
            }
            let remaining = &mut target_remaining[guess.code_at(pos) as usize];
            if *remaining > 0 {
                *digit = Feedback::Present;
                *remaining -= 1;
            }
        }

        Self::new(digits)
    }

    /// Convert pattern to array of feedbacks
    pub fn to_feedbacks(self) -> [Feedback; WORD_LENGTH] {
        let mut pattern = self.0;
        let mut feedbacks = [Feedback::Absent; WORD_LENGTH];
        for feedback in feedbacks.iter_mut().rev() {
            *feedback = Feedback::from_digit(pattern % 3);
            pattern /= 3;
        }
        feedbacks
    }

    /// Check if this pattern represents a win (all correct)
    pub fn is_win(self) -> bool {
        self == Self::ALL_CORRECT
    }

    /// Parse a pattern from a string like "gybbb" or "21000"
    pub fn parse(s: &str) -> Option<Self> {
        if s.chars().count() != WORD_LENGTH {
            return None;
        }
        let feedbacks: Option<Vec<_>> = s.chars().map(Feedback::from_char).collect();
        let arr: [Feedback; WORD_LENGTH] = feedbacks?.try_into().ok()?;
        Some(Self::new(arr))
    }

    /// Render as `g`/`y`/`_` letters, the form `parse` accepts back.
    pub fn to_letters(self) -> String {
        self.to_feedbacks()
            .iter()
            .map(|f| match f {
                Feedback::Correct => 'g',
                Feedback::Present => 'y',
                Feedback::Absent => '_',
            })
            .collect()
    }

    /// Display as emoji string
    pub fn to_emoji_string(self) -> String {
        self.to_feedbacks().iter().map(|f| f.to_char()).collect()
    }
}

impl std::fmt::Display for FeedbackPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_emoji_string())
    }
}
