//! Flat binary layout for decision trees.
//!
//! ```text
//! header (32 bytes, little-endian)
//!   0  magic "WDTR"
//!   4  version (u32) = 1
//!   8  depth budget (u32)
//!  12  root node offset (u32, from file start)
//!  16  start word, encoded (u64)
//!  24  start word, 5 ASCII bytes
//!  29  3 zero bytes
//! node
//!   entry count (u32), then per entry (16 bytes):
//!   pattern (u16), 2 zero bytes, next guess (u64), child offset (u32, 0 = leaf)
//! ```
//!
//! Entries are sorted by pattern. Each child node follows its parent's
//! entry table depth-first; its offset is patched into the parent entry once
//! known.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::feedback::FeedbackPattern;
use crate::tree::{DecisionTree, Node};
use crate::word::Word;
use crate::WORD_LENGTH;

pub const MAGIC: [u8; 4] = *b"WDTR";
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 32;
const ENTRY_LEN: usize = 16;

/// Serialize `tree` into a single buffer, header included.
pub fn encode(tree: &DecisionTree) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; HEADER_LEN];
    let root = write_node(&tree.root, &mut buf)?;

    buf[0..4].copy_from_slice(&MAGIC);
    buf[4..8].copy_from_slice(&VERSION.to_le_bytes());
    buf[8..12].copy_from_slice(&tree.depth.to_le_bytes());
    buf[12..16].copy_from_slice(&root.to_le_bytes());
    buf[16..24].copy_from_slice(&tree.start.raw().to_le_bytes());
    buf[24..29].copy_from_slice(&tree.start.letters());
    Ok(buf)
}

pub fn write_file(tree: &DecisionTree, path: impl AsRef<Path>) -> Result<()> {
    let bytes = encode(tree)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn offset_of(buf: &[u8]) -> Result<u32> {
    u32::try_from(buf.len()).map_err(|_| Error::TreeCorrupt("tree exceeds 4 GiB".into()))
}

fn write_node(node: &Node, buf: &mut Vec<u8>) -> Result<u32> {
    let offset = offset_of(buf)?;
    buf.extend_from_slice(&(node.edges.len() as u32).to_le_bytes());

    let mut patches = Vec::with_capacity(node.edges.len());
    for edge in &node.edges {
        buf.extend_from_slice(&u16::from(edge.pattern.0).to_le_bytes());
        buf.extend_from_slice(&[0; 2]);
        buf.extend_from_slice(&edge.next.guess.raw().to_le_bytes());
        patches.push(buf.len());
        buf.extend_from_slice(&0u32.to_le_bytes());
    }

    for (edge, at) in node.edges.iter().zip(patches) {
        if !edge.next.is_leaf() {
            let child = write_node(&edge.next, buf)?;
            buf[at..at + 4].copy_from_slice(&child.to_le_bytes());
        }
    }
    Ok(offset)
}

/// Byte offset of a node inside a [`LookupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef(u32);

impl NodeRef {
    pub fn offset(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub pattern: FeedbackPattern,
    pub guess: Word,
    pub child: Option<NodeRef>,
}

/// A tree file held in memory. The whole structure is checked on load, so
/// lookups afterwards cannot run off the buffer.
#[derive(Debug, Clone)]
pub struct LookupTree {
    bytes: Vec<u8>,
    depth: u32,
    start: Word,
    root: NodeRef,
}

fn array_at<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(array_at(bytes, at))
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array_at(bytes, at))
}

fn u64_at(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(array_at(bytes, at))
}

fn corrupt(msg: impl Into<String>) -> Error {
    Error::TreeCorrupt(msg.into())
}

impl LookupTree {
    /// Parse and validate a tree file without checking what it was
    /// generated for.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(corrupt("file shorter than header"));
        }
        if bytes[0..4] != MAGIC {
            return Err(Error::BadMagic);
        }
        let version = u32_at(&bytes, 4);
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let depth = u32_at(&bytes, 8);
        if depth == 0 {
            return Err(corrupt("depth budget of zero"));
        }
        let root = u32_at(&bytes, 12);
        let start = Word::from_raw(u64_at(&bytes, 16)).map_err(|_| corrupt("invalid start word"))?;
        if bytes[24..24 + WORD_LENGTH] != start.letters() {
            return Err(corrupt("start word bytes disagree with encoded start"));
        }
        if (root as usize) < HEADER_LEN {
            return Err(corrupt(format!("root offset {root} inside header")));
        }

        let tree = Self {
            bytes,
            depth,
            start,
            root: NodeRef(root),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Read a tree file and check it was generated for `depth` turns
    /// opening with `start`.
    pub fn load(path: impl AsRef<Path>, depth: u32, start: Word) -> Result<Self> {
        let tree = Self::from_bytes(fs::read(path)?)?;
        tree.expect(depth, start)?;
        Ok(tree)
    }

    pub fn expect(&self, depth: u32, start: Word) -> Result<()> {
        if self.depth != depth {
            return Err(Error::DepthMismatch {
                expected: depth,
                found: self.depth,
            });
        }
        if self.start != start {
            return Err(Error::StartMismatch {
                expected: start.to_string(),
                found: self.start.to_string(),
            });
        }
        Ok(())
    }

    /// Walk every node once, checking bounds, entry order, encoded words
    /// and that child offsets only point forward to unvisited nodes.
    fn validate(&self) -> Result<()> {
        let len = self.bytes.len();
        let mut visited = FxHashSet::default();
        let mut stack = vec![self.root.0 as usize];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                return Err(corrupt(format!("node {node} referenced twice")));
            }
            if node + 4 > len {
                return Err(corrupt(format!("node {node} out of bounds")));
            }
            let count = u32_at(&self.bytes, node) as usize;
            let end = count
                .checked_mul(ENTRY_LEN)
                .and_then(|n| n.checked_add(node + 4))
                .filter(|&end| end <= len)
                .ok_or_else(|| corrupt(format!("entries of node {node} out of bounds")))?;

            let mut previous: Option<u16> = None;
            for at in (node + 4..end).step_by(ENTRY_LEN) {
                let code = u16_at(&self.bytes, at);
                if FeedbackPattern::from_code(code).is_none() {
                    return Err(corrupt(format!("invalid pattern {code} at {at}")));
                }
                if previous.is_some_and(|prev| prev >= code) {
                    return Err(corrupt(format!("patterns out of order at {at}")));
                }
                previous = Some(code);

                Word::from_raw(u64_at(&self.bytes, at + 4))
                    .map_err(|_| corrupt(format!("invalid guess at {at}")))?;

                let child = u32_at(&self.bytes, at + 12) as usize;
                if child != 0 {
                    if child < end {
                        return Err(corrupt(format!("child offset {child} points backwards")));
                    }
                    stack.push(child);
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn start(&self) -> Word {
        self.start
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn entries(&self, node: NodeRef) -> impl Iterator<Item = Entry> + '_ {
        let base = node.0 as usize;
        let count = u32_at(&self.bytes, base) as usize;
        (0..count).map(move |i| self.entry_at(base + 4 + i * ENTRY_LEN))
    }

    fn entry_at(&self, at: usize) -> Entry {
        let child = u32_at(&self.bytes, at + 12);
        Entry {
            pattern: FeedbackPattern(u16_at(&self.bytes, at) as u8),
            guess: Word::from_validated(u64_at(&self.bytes, at + 4)),
            child: (child != 0).then_some(NodeRef(child)),
        }
    }

    /// The entry for `pattern` in `node`, by linear scan.
    pub fn find_child(&self, node: NodeRef, pattern: FeedbackPattern) -> Option<Entry> {
        self.entries(node).find(|entry| entry.pattern == pattern)
    }

    /// Write a readable listing of the header and every node.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "version={VERSION} depth={} start={} root={} bytes={}",
            self.depth,
            self.start,
            self.root.0,
            self.bytes.len()
        )?;
        self.dump_node(out, self.root, 0)
    }

    fn dump_node(&self, out: &mut impl Write, node: NodeRef, indent: usize) -> io::Result<()> {
        let entries: Vec<Entry> = self.entries(node).collect();
        writeln!(out, "{:indent$}node@{}: entries={}", "", node.0, entries.len())?;
        for entry in entries {
            writeln!(
                out,
                "{:width$}{:03} {} -> {}",
                "",
                entry.pattern.0,
                entry.pattern.to_letters(),
                entry.guess,
                width = indent + 2
            )?;
            if let Some(child) = entry.child {
                self.dump_node(out, child, indent + 4)?;
            }
        }
        Ok(())
    }
}
