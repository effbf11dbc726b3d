//! Genome hash
//!
//! A per-chromosome interval index over a population of chains, answering
//! "which chains overlap this region or chain" in O(log n + k). The main
//! consumer is mask annotation: a hash built from masking features (for
//! example repeat or blacklist regions) stamps its footprint onto target
//! chains, in parallel across an independent target population.
//!
//! The hash is strand-blind at retrieval time; strand rules apply where
//! they mean something, in the mask application step.

use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;
use rust_lapper::{Interval, Lapper};

use crate::core::{ChainResult, GenomicSegment, SegmentChain, Strand};

/// Segment interval stored in the hash; the value indexes the chain
/// population
pub type SegmentInterval = Interval<u64, usize>;

/// Interval index over a population of chains, organized by chromosome
pub struct GenomeHash {
    /// Chromosome -> interval tree over every segment on it
    maps: HashMap<String, Lapper<u64, usize>>,
    /// The indexed population, addressed by the interval values
    chains: Vec<SegmentChain>,
}

impl GenomeHash {
    /// Build a hash over a chain population
    ///
    /// Every segment of every chain lands in its chromosome's tree; a
    /// multi-segment chain is retrieved once no matter how many of its
    /// segments a query hits.
    pub fn from_chains(chains: impl IntoIterator<Item = SegmentChain>) -> Self {
        let chains: Vec<SegmentChain> = chains.into_iter().collect();
        let mut by_chrom: HashMap<String, Vec<SegmentInterval>> = HashMap::new();
        for (idx, chain) in chains.iter().enumerate() {
            for seg in chain.segments() {
                by_chrom
                    .entry(seg.chrom().to_string())
                    .or_default()
                    .push(Interval {
                        start: seg.start(),
                        stop: seg.end(),
                        val: idx,
                    });
            }
        }
        let maps: HashMap<String, Lapper<u64, usize>> = by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();
        debug!(
            "built genome hash: {} chains across {} chromosomes",
            chains.len(),
            maps.len()
        );
        GenomeHash { maps, chains }
    }

    /// Number of chains in the population
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// True when the population is empty
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// The indexed population
    pub fn chains(&self) -> &[SegmentChain] {
        &self.chains
    }

    /// Chromosomes with at least one indexed segment, sorted
    pub fn chromosomes(&self) -> Vec<&str> {
        let mut chroms: Vec<&str> = self.maps.keys().map(|s| s.as_str()).collect();
        chroms.sort_unstable();
        chroms
    }

    /// Total number of indexed segment intervals
    pub fn segment_count(&self) -> usize {
        self.maps.values().map(|l| l.len()).sum()
    }

    /// Chains with at least one position inside the query segment
    ///
    /// Strand-blind; the segment's strand is ignored.
    pub fn overlapping(&self, region: &GenomicSegment) -> Vec<&SegmentChain> {
        self.overlapping_region(region.chrom(), region.start(), region.end())
    }

    /// Chains with at least one position inside `[start, end)` on `chrom`
    ///
    /// Strand-blind; each chain appears once, in population order.
    pub fn overlapping_region(&self, chrom: &str, start: u64, end: u64) -> Vec<&SegmentChain> {
        let lapper = match self.maps.get(chrom) {
            Some(l) => l,
            None => return Vec::new(),
        };
        let mut hits: Vec<usize> = lapper.find(start, end).map(|iv| iv.val).collect();
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter().map(|i| &self.chains[i]).collect()
    }

    /// Chains whose footprint shares a position with the query chain
    ///
    /// Position-wise, not span-wise: a chain sitting entirely inside one
    /// of the query's introns is not returned. Strand-blind.
    pub fn overlapping_chain(&self, query: &SegmentChain) -> Vec<&SegmentChain> {
        let chrom = match query.chromosome() {
            Some(c) => c,
            None => return Vec::new(),
        };
        let lapper = match self.maps.get(chrom) {
            Some(l) => l,
            None => return Vec::new(),
        };
        let mut hits: Vec<usize> = Vec::new();
        for seg in query.segments() {
            hits.extend(lapper.find(seg.start(), seg.end()).map(|iv| iv.val));
        }
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter().map(|i| &self.chains[i]).collect()
    }

    /// Mask one target chain against the hash population
    ///
    /// Hash entries whose strand equals the target's (or is unstranded)
    /// are clipped to the target's segment footprint and merged into the
    /// target's mask sub-chain. Clipping keeps every mask inside the
    /// footprint, so a well-formed target cannot fail containment.
    pub fn mask_chain(&self, target: &mut SegmentChain) -> ChainResult<()> {
        let masks = self.mask_segments_for(target);
        target.add_masks(masks)
    }

    /// Mask a slice of independent target chains in parallel
    pub fn mask_chains(&self, targets: &mut [SegmentChain]) -> ChainResult<()> {
        targets
            .par_iter_mut()
            .try_for_each(|target| self.mask_chain(target))
    }

    fn mask_segments_for(&self, target: &SegmentChain) -> Vec<GenomicSegment> {
        let chrom = match target.chromosome() {
            Some(c) => c,
            None => return Vec::new(),
        };
        let lapper = match self.maps.get(chrom) {
            Some(l) => l,
            None => return Vec::new(),
        };
        let mut clipped = Vec::new();
        for seg in target.segments() {
            for iv in lapper.find(seg.start(), seg.end()) {
                let source = &self.chains[iv.val];
                // mirror the mask acceptance rule: equal strand or none
                if source.strand() != target.strand() && source.strand() != Strand::Unstranded {
                    continue;
                }
                let start = iv.start.max(seg.start());
                let end = iv.stop.min(seg.end());
                clipped.push(GenomicSegment::from_parts(chrom, start, end, target.strand()));
            }
        }
        clipped
    }
}
