use serde::{Deserialize, Serialize};

use crate::chain::ChainNode;
use crate::pow::CompactTarget;

/// The fields of a block header that retargeting reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Header timestamp, in seconds.
    pub time: i64,
    /// Compact target of the block.
    pub bits: CompactTarget,
}

impl BlockRecord {
    /// Creates a new record.
    pub fn new(time: i64, bits: CompactTarget) -> Self {
        Self { time, bits }
    }
}

/// A single linear chain starting at genesis, stored as a height-indexed
/// arena of [`BlockRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChain {
    records: Vec<BlockRecord>,
}

impl ActiveChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block on top of the current tip and returns its height.
    pub fn push(&mut self, record: BlockRecord) -> u32 {
        self.records.push(record);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::arithmetic_side_effects,
            reason = "The chain holds at least one record here and never exceeds u32 heights"
        )]
        let height = (self.records.len() - 1) as u32;
        height
    }

    /// Number of blocks in the chain.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the block at `height`, if present.
    pub fn at(&self, height: u32) -> Option<ChainEntry<'_>> {
        self.records.get(usize::try_from(height).ok()?)?;
        Some(ChainEntry { chain: self, height })
    }

    /// Returns the highest block, `None` for an empty chain.
    pub fn tip(&self) -> Option<ChainEntry<'_>> {
        let height = u32::try_from(self.records.len().checked_sub(1)?).ok()?;
        self.at(height)
    }

    fn record(&self, height: u32) -> Option<&BlockRecord> {
        self.records.get(usize::try_from(height).ok()?)
    }
}

impl FromIterator<BlockRecord> for ActiveChain {
    fn from_iter<I: IntoIterator<Item = BlockRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<BlockRecord> for ActiveChain {
    fn extend<I: IntoIterator<Item = BlockRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

/// A handle to one block of an [`ActiveChain`].
#[derive(Debug, Clone, Copy)]
pub struct ChainEntry<'a> {
    chain: &'a ActiveChain,
    height: u32,
}

impl ChainEntry<'_> {
    /// The stored record for this block.
    pub fn record(&self) -> BlockRecord {
        // entries are only created for heights present in the chain
        self.chain
            .record(self.height)
            .copied()
            .unwrap_or(BlockRecord::new(0, CompactTarget::new(0)))
    }
}

impl ChainNode for ChainEntry<'_> {
    fn height(&self) -> u32 {
        self.height
    }

    fn time(&self) -> i64 {
        self.record().time
    }

    fn bits(&self) -> CompactTarget {
        self.record().bits
    }

    fn ancestor(&self, height: u32) -> Option<Self> {
        if height > self.height {
            return None;
        }
        self.chain.at(height)
    }
}
