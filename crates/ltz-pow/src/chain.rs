//! Read-only view of the chain that retargeting walks backwards over.
//!
//! Difficulty algorithms never own blocks. They only need the height, time and
//! compact bits of a node and a way to reach its ancestors, which is what
//! [`ChainNode`] describes. [`ActiveChain`] is a contiguous in-memory
//! implementation used by tests and tools.

use crate::pow::CompactTarget;

mod index;

pub use index::{ActiveChain, BlockRecord, ChainEntry};

/// Number of preceding block times whose median defines a node's
/// median-time-past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// A block in the chain index as seen by difficulty retargeting.
pub trait ChainNode: Sized {
    /// Height of this block; genesis is at height 0.
    fn height(&self) -> u32;

    /// Timestamp claimed by the block header, in seconds.
    fn time(&self) -> i64;

    /// Compact target carried in the block header.
    fn bits(&self) -> CompactTarget;

    /// Returns the ancestor at `height`.
    ///
    /// # Arguments
    ///
    /// * `height` - Height of the requested ancestor
    ///
    /// # Returns
    ///
    /// * `Some(Self)` - The ancestor, or the node itself when `height` equals
    ///   [`ChainNode::height`]
    /// * `None` - If `height` lies above this node or the ancestor is unknown
    fn ancestor(&self, height: u32) -> Option<Self>;

    /// Returns the parent of this block, `None` at genesis.
    fn prev(&self) -> Option<Self> {
        let height = self.height().checked_sub(1)?;
        self.ancestor(height)
    }

    /// Median of the timestamps of this block and up to ten of its ancestors.
    ///
    /// Near genesis fewer than [`MEDIAN_TIME_SPAN`] blocks exist and the
    /// median is taken over what is available.
    fn median_time_past(&self) -> i64 {
        let mut times = Vec::with_capacity(MEDIAN_TIME_SPAN);
        times.push(self.time());
        let mut node = self.prev();
        while let Some(current) = node {
            if times.len() == MEDIAN_TIME_SPAN {
                break;
            }
            times.push(current.time());
            node = current.prev();
        }
        times.sort_unstable();
        times.get(times.len() / 2).copied().unwrap_or_else(|| self.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with_times(times: &[i64]) -> ActiveChain {
        times
            .iter()
            .map(|&time| BlockRecord::new(time, CompactTarget::new(0x1f07ffff)))
            .collect()
    }

    #[test]
    fn test_prev_walks_to_genesis() {
        let chain = chain_with_times(&[0, 10, 20]);
        let tip = chain.tip().unwrap();
        let parent = tip.prev().unwrap();
        assert_eq!(parent.height(), 1);
        assert_eq!(parent.time(), 10);
        assert!(parent.prev().unwrap().prev().is_none());
    }

    #[test]
    fn test_median_time_past_short_chain() {
        let chain = chain_with_times(&[100, 300, 200]);
        // sorted: 100, 200, 300
        assert_eq!(chain.tip().unwrap().median_time_past(), 200);
        assert_eq!(chain.at(0).unwrap().median_time_past(), 100);
    }

    #[test]
    fn test_median_time_past_uses_eleven_blocks() {
        // the first block is outside the eleven-block span of the tip
        let times: Vec<i64> = std::iter::once(1_000_000).chain((1..=11).map(|t| t * 10)).collect();
        let chain = chain_with_times(&times);
        assert_eq!(chain.tip().unwrap().median_time_past(), 60);
    }

    #[test]
    fn test_median_time_past_unordered_times() {
        let chain = chain_with_times(&[5, 1, 9, 3, 7, 2]);
        // sorted: 1, 2, 3, 5, 7, 9 -> index 3
        assert_eq!(chain.tip().unwrap().median_time_past(), 5);
    }
}
