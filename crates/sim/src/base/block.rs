use super::{AncestryId, Locus};

/// A genomic interval `[start, end)` inherited from a single ancestral
/// population, together with the selected sites it carries.
///
/// Blocks are immutable once allocated in the [`BlockArena`]. Chromosomes of
/// many individuals (across many generations) refer to the same block by
/// handle; recombination never edits a block, it allocates a new one for the
/// piece it needs (see [`AncestryBlock::piece`]).
///
/// [`BlockArena`]: super::BlockArena
#[derive(Debug, Clone, PartialEq)]
pub struct AncestryBlock {
    start: f64,
    end: f64,
    ancestry: AncestryId,
    /// Sorted positions of the selected mutations carried on this interval.
    mutations: Box<[Locus]>,
}

impl AncestryBlock {
    /// Create a block. `mutations` must be sorted and lie inside `[start, end)`.
    pub fn new(start: f64, end: f64, ancestry: AncestryId, mutations: impl Into<Box<[Locus]>>) -> Self {
        let mutations = mutations.into();
        debug_assert!(start < end, "empty block [{start}, {end})");
        debug_assert!(
            mutations.windows(2).all(|w| w[0] < w[1]),
            "block mutations must be strictly sorted"
        );
        debug_assert!(
            mutations.iter().all(|m| m.get() >= start && m.get() < end),
            "block mutations must lie inside [{start}, {end})"
        );
        Self {
            start,
            end,
            ancestry,
            mutations,
        }
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn ancestry(&self) -> AncestryId {
        self.ancestry
    }

    #[inline]
    pub fn mutations(&self) -> &[Locus] {
        &self.mutations
    }

    #[inline]
    pub fn contains(&self, position: f64) -> bool {
        self.start <= position && position < self.end
    }

    /// Whether the selected mutation at `locus` is carried by this block.
    #[inline]
    pub fn carries(&self, locus: Locus) -> bool {
        self.mutations.binary_search(&locus).is_ok()
    }

    /// A new block covering `[start, end) ∩ self` with the same ancestry and
    /// the mutations that fall inside the piece.
    pub fn piece(&self, start: f64, end: f64) -> Self {
        let start = start.max(self.start);
        let end = end.min(self.end);
        let lo = self.mutations.partition_point(|m| m.get() < start);
        let hi = self.mutations.partition_point(|m| m.get() < end);
        Self::new(start, end, self.ancestry, &self.mutations[lo..hi])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> AncestryBlock {
        AncestryBlock::new(
            0.0,
            1.0,
            AncestryId::new(2),
            vec![Locus::new(0.1), Locus::new(0.5), Locus::new(0.9)],
        )
    }

    #[test]
    fn test_block_accessors() {
        let b = block();
        assert_eq!(b.start(), 0.0);
        assert_eq!(b.end(), 1.0);
        assert_eq!(b.length(), 1.0);
        assert_eq!(b.ancestry(), AncestryId::new(2));
        assert_eq!(b.mutations().len(), 3);
    }

    #[test]
    fn test_block_contains_is_half_open() {
        let b = block();
        assert!(b.contains(0.0));
        assert!(b.contains(0.999));
        assert!(!b.contains(1.0));
    }

    #[test]
    fn test_block_carries() {
        let b = block();
        assert!(b.carries(Locus::new(0.5)));
        assert!(!b.carries(Locus::new(0.4)));
    }

    #[test]
    fn test_piece_partitions_mutations() {
        let b = block();
        let left = b.piece(0.0, 0.5);
        let right = b.piece(0.5, 1.0);

        assert_eq!(left.mutations(), &[Locus::new(0.1)]);
        assert_eq!(right.mutations(), &[Locus::new(0.5), Locus::new(0.9)]);
        assert_eq!(left.ancestry(), b.ancestry());
        assert_eq!(right.ancestry(), b.ancestry());
        assert_eq!(left.end(), right.start());
    }

    #[test]
    fn test_piece_clamps_to_block() {
        let b = AncestryBlock::new(0.2, 0.6, AncestryId::new(0), Vec::new());
        let p = b.piece(0.0, 0.4);
        assert_eq!(p.start(), 0.2);
        assert_eq!(p.end(), 0.4);
    }
}
