use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A genomic position in Morgans.
///
/// Positions identify selected sites, so they need equality, ordering and
/// hashing. `Locus` provides a total order over the wrapped `f64` via
/// [`f64::total_cmp`], which makes it usable as a map key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locus(f64);

impl Locus {
    #[inline]
    pub const fn new(position: f64) -> Self {
        Self(position)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Locus {
    fn from(position: f64) -> Self {
        Self(position)
    }
}

impl PartialEq for Locus {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Locus {}

impl PartialOrd for Locus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Locus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Locus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an ancestral source population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestryId(u16);

impl AncestryId {
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Index into per-ancestry tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AncestryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A selected site: chromosome index plus position on that chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteKey {
    pub chromosome: usize,
    pub position: Locus,
}

impl SiteKey {
    pub fn new(chromosome: usize, position: impl Into<Locus>) -> Self {
        Self {
            chromosome,
            position: position.into(),
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.chromosome, self.position)
    }
}
