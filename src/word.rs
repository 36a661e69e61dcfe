//! Fixed-width integer encoding of five-letter words.
//!
//! Each letter takes 5 bits (`a` = 1 .. `z` = 26, 0 unused) and the first
//! letter occupies the most significant group, so `abcde` encodes to
//! `0b00001_00010_00011_00100_00101`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::WORD_LENGTH;

const LETTER_BITS: u32 = 5;
const LETTER_MASK: u64 = 0x1F;

/// An encoded five-letter lowercase word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(u64);

impl Word {
    /// Encode a word, rejecting anything that is not exactly five ASCII
    /// lowercase letters.
    pub fn encode(word: &str) -> Result<Self> {
        let bytes = word.as_bytes();
        if bytes.len() != WORD_LENGTH {
            return Err(Error::InvalidWord {
                word: word.to_string(),
                reason: "must be exactly five letters",
            });
        }

        let mut encoded = 0u64;
        for &b in bytes {
            if !b.is_ascii_lowercase() {
                return Err(Error::InvalidWord {
                    word: word.to_string(),
                    reason: "letters must be in a-z",
                });
            }
            encoded = (encoded << LETTER_BITS) | u64::from(b - b'a' + 1);
        }
        Ok(Self(encoded))
    }

    /// Encode user input, ignoring surrounding whitespace and case.
    pub fn from_input(input: &str) -> Result<Self> {
        Self::encode(&input.trim().to_ascii_lowercase())
    }

    /// Accept a raw value read from a file, checking that every letter group
    /// is in range and no stray bits are set.
    pub fn from_raw(raw: u64) -> Result<Self> {
        let valid = raw >> (LETTER_BITS * WORD_LENGTH as u32) == 0
            && (0..WORD_LENGTH).all(|pos| matches!(letter_code(raw, pos), 1..=26));
        if valid {
            Ok(Self(raw))
        } else {
            Err(Error::InvalidWord {
                word: format!("{raw:#x}"),
                reason: "not a valid encoded word",
            })
        }
    }

    /// For values already checked by [`from_raw`](Self::from_raw).
    pub(crate) fn from_validated(raw: u64) -> Self {
        debug_assert!(Self::from_raw(raw).is_ok());
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Letter code (1..=26) at `pos`, position 0 being the first letter.
    #[inline]
    pub fn code_at(self, pos: usize) -> u8 {
        letter_code(self.0, pos)
    }

    /// The five ASCII bytes of the word.
    pub fn letters(self) -> [u8; WORD_LENGTH] {
        let mut out = [0u8; WORD_LENGTH];
        for (pos, letter) in out.iter_mut().enumerate() {
            *letter = b'a' + self.code_at(pos) - 1;
        }
        out
    }

    pub fn decode(self) -> String {
        self.letters().iter().map(|&b| b as char).collect()
    }
}

#[inline]
fn letter_code(raw: u64, pos: usize) -> u8 {
    ((raw >> (LETTER_BITS * (WORD_LENGTH - 1 - pos) as u32)) & LETTER_MASK) as u8
}

impl FromStr for Word {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::encode(s)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.letters() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
