//! Chain relationships
//!
//! Predicates between two chains answer with a three-valued [`TriState`]
//! rather than a plain boolean, so "undecidable given available strand
//! data" is never silently collapsed into "no relation". Unstranded acts
//! as a wildcard for sense-matching predicates; only antisense testing is
//! genuinely undecidable against an unstranded chain.

use std::cmp::Ordering;

use crate::core::chain::SegmentChain;
use crate::core::segment::{intersect_intervals, GenomicSegment};

/// Three-valued predicate outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    /// The relation definitely holds
    Yes,
    /// The relation definitely does not hold
    No,
    /// Available strand data cannot decide the relation
    Undefined,
}

impl TriState {
    /// `Some(bool)` for decided outcomes, `None` for `Undefined`
    pub fn decided(self) -> Option<bool> {
        match self {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::Undefined => None,
        }
    }

    /// True only for `Yes`
    pub fn is_yes(self) -> bool {
        self == TriState::Yes
    }

    /// True only for `No`
    pub fn is_no(self) -> bool {
        self == TriState::No
    }

    /// True only for `Undefined`
    pub fn is_undefined(self) -> bool {
        self == TriState::Undefined
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::Yes
        } else {
            TriState::No
        }
    }
}

/// Whether two canonical (sorted, disjoint) segment runs share a position
fn footprints_intersect(a: &[GenomicSegment], b: &[GenomicSegment]) -> bool {
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if intersect_intervals(a[i].start(), a[i].end(), b[j].start(), b[j].end()).is_some() {
            return true;
        }
        if a[i].end() <= b[j].end() {
            i += 1;
        } else {
            j += 1;
        }
    }
    false
}

impl SegmentChain {
    /// Segments genomic-identical between the two chains, strand ignored
    ///
    /// Identity means equal chromosome, start and end. Returns copies of
    /// this chain's segments, so the result carries this chain's strand.
    /// This is the primitive beneath the richer predicates.
    pub fn shares_segments_with(&self, other: &SegmentChain) -> Vec<GenomicSegment> {
        self.segments()
            .iter()
            .filter(|seg| {
                other.segments().iter().any(|o| {
                    o.chrom() == seg.chrom() && o.start() == seg.start() && o.end() == seg.end()
                })
            })
            .cloned()
            .collect()
    }

    /// Positional overlap on the same chromosome, strand ignored
    ///
    /// Never `Undefined`: strand plays no part in the question.
    pub fn unstranded_overlaps(&self, other: &SegmentChain) -> TriState {
        if self.chromosome().is_none() || self.chromosome() != other.chromosome() {
            return TriState::No;
        }
        footprints_intersect(self.segments(), other.segments()).into()
    }

    /// Positional overlap with matching sense
    ///
    /// `Yes` when the footprints intersect and the strands are equal or
    /// either is unstranded (wildcard); `No` otherwise.
    pub fn overlaps(&self, other: &SegmentChain) -> TriState {
        if !self.unstranded_overlaps(other).is_yes() {
            return TriState::No;
        }
        self.strand().compatible_with(other.strand()).into()
    }

    /// Positional overlap with opposite sense
    ///
    /// `Yes` when the footprints intersect and both strands are concrete
    /// and opposite; `No` when they do not intersect or both strands are
    /// concrete and equal; `Undefined` when they intersect but either side
    /// is unstranded, because opposition cannot be decided.
    pub fn antisense_overlaps(&self, other: &SegmentChain) -> TriState {
        if !self.unstranded_overlaps(other).is_yes() {
            return TriState::No;
        }
        if self.strand().is_stranded() && other.strand().is_stranded() {
            (self.strand() == other.strand().complement()).into()
        } else {
            TriState::Undefined
        }
    }

    /// Position-wise coverage of `other` by this chain
    ///
    /// `Yes` when every genomic position occupied by `other` is occupied
    /// by this chain and the strands are compatible. Position-wise, not
    /// span-wise: an intron position in this chain is not covered. An
    /// empty `other` is vacuously covered.
    pub fn covers(&self, other: &SegmentChain) -> TriState {
        if other.is_empty() {
            return TriState::Yes;
        }
        if self.is_empty()
            || self.chromosome() != other.chromosome()
            || !self.strand().compatible_with(other.strand())
        {
            return TriState::No;
        }
        other
            .segments()
            .iter()
            .all(|o| {
                self.segments()
                    .iter()
                    .any(|s| s.start() <= o.start() && o.end() <= s.end())
            })
            .into()
    }

    /// Splice-exact containment of `other` in this chain
    ///
    /// Stricter than [`covers`](Self::covers): every internal splice
    /// junction of `other` must coincide with a junction of this chain,
    /// and the matched segments must be consecutive. The outermost edges
    /// of `other` may fall mid-segment, so a sub-feature clipped inside a
    /// terminal exon still qualifies.
    pub fn contains(&self, other: &SegmentChain) -> TriState {
        let covered = self.covers(other);
        if !covered.is_yes() {
            return covered;
        }
        let inner = other.segments();
        if inner.len() < 2 {
            return TriState::Yes;
        }
        let outer = self.segments();
        let anchor = match outer
            .iter()
            .position(|s| s.start() <= inner[0].start() && inner[0].end() <= s.end())
        {
            Some(i) => i,
            None => return TriState::No,
        };
        if anchor + inner.len() > outer.len() {
            return TriState::No;
        }
        // 5'-terminal piece must run to its exon's end
        if inner[0].end() != outer[anchor].end() {
            return TriState::No;
        }
        // interior pieces must match whole exons
        for (k, seg) in inner.iter().enumerate().take(inner.len() - 1).skip(1) {
            let exon = &outer[anchor + k];
            if seg.start() != exon.start() || seg.end() != exon.end() {
                return TriState::No;
            }
        }
        // 3'-terminal piece must start at its exon's start
        let last = &inner[inner.len() - 1];
        let exon = &outer[anchor + inner.len() - 1];
        (last.start() == exon.start() && last.end() <= exon.end()).into()
    }
}

impl PartialOrd for SegmentChain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentChain {
    /// Total order over (chromosome, leftmost start, rightmost end,
    /// strand), with the full segment vector as final tie-break so the
    /// ordering stays consistent with positional equality. Empty chains
    /// sort first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.chromosome()
            .cmp(&other.chromosome())
            .then_with(|| {
                let a = self.segments().first().map(|s| s.start());
                let b = other.segments().first().map(|s| s.start());
                a.cmp(&b)
            })
            .then_with(|| {
                let a = self.segments().last().map(|s| s.end());
                let b = other.segments().last().map(|s| s.end());
                a.cmp(&b)
            })
            .then_with(|| self.strand().cmp(&other.strand()))
            .then_with(|| self.segments().cmp(other.segments()))
    }
}
