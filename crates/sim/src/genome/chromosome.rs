use crate::base::{AncestryBlock, BlockArena, BlockId};
use crate::errors::PartitionError;

/// One copy of one chromosome, as an ordered list of ancestry block handles.
///
/// The blocks are contiguous and non-overlapping and together cover exactly
/// `[0, length)`. A chromosome is built once (at initialization or by
/// [`commit_gamete`]) and never edited afterwards.
///
/// [`commit_gamete`]: crate::evolution::commit_gamete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    blocks: Vec<BlockId>,
}

impl Chromosome {
    pub fn from_blocks(blocks: Vec<BlockId>) -> Self {
        Self { blocks }
    }

    /// A founding chromosome: a single block spanning the whole chromosome.
    pub fn founder(block: BlockId) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Resolve the handles against `arena`, in coordinate order.
    pub fn iter_blocks<'a>(&'a self, arena: &'a BlockArena) -> impl Iterator<Item = &'a AncestryBlock> + 'a {
        self.blocks.iter().map(move |&id| arena.get(id))
    }

    /// Slot of the block covering `position`, if `position` is on the chromosome.
    pub fn locate(&self, arena: &BlockArena, position: f64) -> Option<usize> {
        let slot = self
            .blocks
            .partition_point(|&id| arena.get(id).end() <= position);
        (slot < self.blocks.len() && arena.get(self.blocks[slot]).contains(position)).then_some(slot)
    }

    /// The block covering `position`.
    pub fn block_at<'a>(&self, arena: &'a BlockArena, position: f64) -> Option<&'a AncestryBlock> {
        self.locate(arena, position).map(|slot| arena.get(self.blocks[slot]))
    }

    /// Verify that the blocks exactly partition `[0, length)`.
    ///
    /// # Errors
    /// Returns the first violation found, in slot order.
    pub fn check_partition(&self, arena: &BlockArena, length: f64) -> Result<(), PartitionError> {
        let mut expected = 0.0;
        for (slot, &id) in self.blocks.iter().enumerate() {
            let block = arena.try_get(id).ok_or(PartitionError::Dangling(id))?;
            if block.start() >= block.end() {
                return Err(PartitionError::EmptyBlock {
                    slot,
                    block: id,
                    start: block.start(),
                    end: block.end(),
                });
            }
            if slot == 0 && block.start() != 0.0 {
                return Err(PartitionError::StartNotZero {
                    block: id,
                    start: block.start(),
                });
            }
            if block.start() != expected {
                return Err(PartitionError::Discontiguous {
                    slot,
                    block: id,
                    start: block.start(),
                    expected,
                });
            }
            expected = block.end();
        }

        if self.blocks.is_empty() {
            return Err(PartitionError::Empty);
        }
        if expected != length {
            return Err(PartitionError::EndMismatch {
                end: expected,
                length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{AncestryId, Locus};

    fn alloc(arena: &mut BlockArena, start: f64, end: f64, ancestry: u16) -> BlockId {
        arena.allocate(AncestryBlock::new(
            start,
            end,
            AncestryId::new(ancestry),
            Vec::<Locus>::new(),
        ))
    }

    #[test]
    fn test_founder_is_single_block() {
        let mut arena = BlockArena::new();
        let id = alloc(&mut arena, 0.0, 1.5, 0);
        let chrom = Chromosome::founder(id);
        assert_eq!(chrom.len(), 1);
        assert!(chrom.check_partition(&arena, 1.5).is_ok());
    }

    #[test]
    fn test_locate() {
        let mut arena = BlockArena::new();
        let a = alloc(&mut arena, 0.0, 0.3, 0);
        let b = alloc(&mut arena, 0.3, 0.8, 1);
        let c = alloc(&mut arena, 0.8, 1.0, 0);
        let chrom = Chromosome::from_blocks(vec![a, b, c]);

        assert_eq!(chrom.locate(&arena, 0.0), Some(0));
        assert_eq!(chrom.locate(&arena, 0.3), Some(1));
        assert_eq!(chrom.locate(&arena, 0.79), Some(1));
        assert_eq!(chrom.locate(&arena, 0.8), Some(2));
        assert_eq!(chrom.locate(&arena, 1.0), None);
        assert_eq!(
            chrom.block_at(&arena, 0.5).map(AncestryBlock::ancestry),
            Some(AncestryId::new(1))
        );
    }

    #[test]
    fn test_check_partition_detects_gap() {
        let mut arena = BlockArena::new();
        let a = alloc(&mut arena, 0.0, 0.3, 0);
        let b = alloc(&mut arena, 0.4, 1.0, 0);
        let chrom = Chromosome::from_blocks(vec![a, b]);

        assert_eq!(
            chrom.check_partition(&arena, 1.0),
            Err(PartitionError::Discontiguous {
                slot: 1,
                block: b,
                start: 0.4,
                expected: 0.3
            })
        );
    }

    #[test]
    fn test_check_partition_detects_short_chromosome() {
        let mut arena = BlockArena::new();
        let a = alloc(&mut arena, 0.0, 0.9, 0);
        let chrom = Chromosome::founder(a);
        assert_eq!(
            chrom.check_partition(&arena, 1.0),
            Err(PartitionError::EndMismatch { end: 0.9, length: 1.0 })
        );
    }

    #[test]
    fn test_check_partition_detects_bad_start_and_empty() {
        let mut arena = BlockArena::new();
        let a = alloc(&mut arena, 0.1, 1.0, 0);
        assert!(matches!(
            Chromosome::founder(a).check_partition(&arena, 1.0),
            Err(PartitionError::StartNotZero { .. })
        ));
        assert_eq!(
            Chromosome::from_blocks(Vec::new()).check_partition(&arena, 1.0),
            Err(PartitionError::Empty)
        );
    }

    #[test]
    fn test_check_partition_detects_dangling() {
        let mut arena = BlockArena::new();
        let a = alloc(&mut arena, 0.0, 1.0, 0);
        arena.sweep(std::iter::empty());
        assert_eq!(
            Chromosome::founder(a).check_partition(&arena, 1.0),
            Err(PartitionError::Dangling(a))
        );
    }
}
