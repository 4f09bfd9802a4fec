use crate::base::BlockId;
use crate::genome::Chromosome;

/// A haplotype: one chromosome per configured chromosome index.
///
/// `Haplotype` owns its `Chromosome`s (which are lightweight lists of block
/// handles) and provides accessors to query chromosomes by index and iterate
/// over the block handles they reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Haplotype {
    chromosomes: Vec<Chromosome>,
}

impl Haplotype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `Haplotype` with reserved capacity for `capacity` chromosomes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chromosomes: Vec::with_capacity(capacity),
        }
    }

    pub fn from_chromosomes(chromosomes: Vec<Chromosome>) -> Self {
        Self { chromosomes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Get the chromosome at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Chromosome> {
        self.chromosomes.get(index)
    }

    pub fn push(&mut self, chromosome: Chromosome) {
        self.chromosomes.push(chromosome);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chromosome> {
        self.chromosomes.iter()
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Every block handle referenced by this haplotype.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.chromosomes
            .iter()
            .flat_map(|chrom| chrom.blocks().iter().copied())
    }
}

impl std::ops::Index<usize> for Haplotype {
    type Output = Chromosome;

    fn index(&self, index: usize) -> &Self::Output {
        &self.chromosomes[index]
    }
}

impl<'a> IntoIterator for &'a Haplotype {
    type Item = &'a Chromosome;
    type IntoIter = std::slice::Iter<'a, Chromosome>;

    fn into_iter(self) -> Self::IntoIter {
        self.chromosomes.iter()
    }
}

impl FromIterator<Chromosome> for Haplotype {
    fn from_iter<T: IntoIterator<Item = Chromosome>>(iter: T) -> Self {
        Self {
            chromosomes: iter.into_iter().collect(),
        }
    }
}
