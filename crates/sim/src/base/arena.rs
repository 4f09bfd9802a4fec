use bitvec::prelude::*;

use super::AncestryBlock;

/// Handle to an [`AncestryBlock`] stored in a [`BlockArena`].
///
/// Handles are plain indices. They stay valid until a sweep finds them
/// unreachable; after that the slot may be reused by a later allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot storage for every ancestry block alive in a simulation.
///
/// Blocks are shared by reference between chromosomes of many individuals, so
/// nothing is ever freed implicitly. Reclamation is an explicit mark-and-sweep
/// over the chromosomes of the current population (see [`BlockArena::sweep`]).
/// Freed slots are reused lowest index first, which keeps handle assignment a
/// pure function of the allocation sequence.
#[derive(Debug, Default)]
pub struct BlockArena {
    slots: Vec<Option<AncestryBlock>>,
    /// Free slot indices; the lowest index sits at the end.
    free: Vec<u32>,
    live: usize,
    allocated_since_sweep: usize,
}

impl BlockArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block and returns its handle.
    pub fn allocate(&mut self, block: AncestryBlock) -> BlockId {
        self.live += 1;
        self.allocated_since_sweep += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(block);
                BlockId(index)
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("block arena exceeded {} slots", u32::MAX));
                self.slots.push(Some(block));
                BlockId(index)
            }
        }
    }

    /// Access a live block.
    ///
    /// # Panics
    /// Panics if `id` was never allocated or has been swept.
    #[inline]
    pub fn get(&self, id: BlockId) -> &AncestryBlock {
        match self.slots.get(id.index()) {
            Some(Some(block)) => block,
            _ => panic!("dereferenced dangling block handle {id:?}"),
        }
    }

    /// Access a block without panicking.
    #[inline]
    pub fn try_get(&self, id: BlockId) -> Option<&AncestryBlock> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn contains(&self, id: BlockId) -> bool {
        self.try_get(id).is_some()
    }

    /// Number of live blocks.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots ever created (live or free).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn allocated_since_sweep(&self) -> usize {
        self.allocated_since_sweep
    }

    /// Mark every block reachable from `roots` and free the rest.
    ///
    /// Returns the number of freed blocks. Sweeping again with the same roots
    /// frees nothing.
    ///
    /// # Panics
    /// Panics if a root refers to a block that is not live: that would mean a
    /// chromosome outlived one of its blocks.
    pub fn sweep<I>(&mut self, roots: I) -> usize
    where
        I: IntoIterator<Item = BlockId>,
    {
        let mut marks = bitvec![0; self.slots.len()];
        for id in roots {
            assert!(
                self.contains(id),
                "live chromosome references freed block {id:?}"
            );
            marks.set(id.index(), true);
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some() && !marks[index] {
                *slot = None;
                freed += 1;
            }
        }

        // Rebuild the free list in descending order so `pop` yields the lowest slot.
        self.free.clear();
        self.free.extend(
            self.slots
                .iter()
                .enumerate()
                .rev()
                .filter(|(_, slot)| slot.is_none())
                .map(|(index, _)| index as u32),
        );

        self.live -= freed;
        self.allocated_since_sweep = 0;
        freed
    }

    /// Iterate over live blocks with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &AncestryBlock)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|b| (BlockId(index as u32), b)))
    }
}
