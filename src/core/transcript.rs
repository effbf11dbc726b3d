//! Transcripts
//!
//! A transcript is a segment chain carrying optional CDS boundaries. The
//! boundaries live in chain-relative (5' to 3') coordinates; their genomic
//! counterparts are derived through the chain's coordinate machinery and
//! rederived after every segment-set change, since adding an exon shifts
//! what a chain offset points at.
//!
//! Composition, not inheritance: `Transcript` holds a [`SegmentChain`],
//! delegates the common query surface, and layers the CDS hook onto the
//! mutators. The full chain API stays reachable through
//! [`chain`](Transcript::chain).

use std::fmt;

use crate::core::chain::{AttrValue, SegmentChain};
use crate::core::error::{ChainError, ChainResult};
use crate::core::segment::GenomicSegment;
use crate::core::strand::Strand;

/// A segment chain with optional coding-region boundaries
///
/// Equality follows the chain's positional equality plus the CDS
/// boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    chain: SegmentChain,
    /// CDS window in chain coordinates, half-open, nonempty
    cds: Option<(u64, u64)>,
    /// Genomic CDS bounds, half-open, derived from `cds`
    cds_genome: Option<(u64, u64)>,
}

impl Transcript {
    /// Wrap a chain as a non-coding transcript
    pub fn new(chain: SegmentChain) -> Self {
        Transcript {
            chain,
            cds: None,
            cds_genome: None,
        }
    }

    /// Wrap a chain and set CDS boundaries
    ///
    /// # Examples
    /// ```
    /// use segchain::core::{GenomicSegment, SegmentChain, Strand, Transcript};
    ///
    /// let chain = SegmentChain::from_segments([
    ///     GenomicSegment::new("chr1", 100, 110, Strand::Forward).unwrap(),
    ///     GenomicSegment::new("chr1", 200, 215, Strand::Forward).unwrap(),
    /// ])
    /// .unwrap();
    /// let tx = Transcript::with_cds(chain, 5, 20).unwrap();
    /// assert_eq!(tx.cds_genome_start(), Some(105));
    /// assert_eq!(tx.cds_genome_end(), Some(210));
    /// ```
    pub fn with_cds(chain: SegmentChain, cds_start: u64, cds_end: u64) -> ChainResult<Self> {
        let mut tx = Transcript::new(chain);
        tx.set_cds(cds_start, cds_end)?;
        Ok(tx)
    }

    /// The underlying chain
    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    /// Consume the transcript, yielding the underlying chain
    pub fn into_chain(self) -> SegmentChain {
        self.chain
    }

    /// CDS start in chain coordinates
    pub fn cds_start(&self) -> Option<u64> {
        self.cds.map(|(start, _)| start)
    }

    /// CDS end in chain coordinates (exclusive)
    pub fn cds_end(&self) -> Option<u64> {
        self.cds.map(|(_, end)| end)
    }

    /// Genomic CDS start (inclusive, leftmost regardless of strand)
    pub fn cds_genome_start(&self) -> Option<u64> {
        self.cds_genome.map(|(start, _)| start)
    }

    /// Genomic CDS end (exclusive, rightmost regardless of strand)
    pub fn cds_genome_end(&self) -> Option<u64> {
        self.cds_genome.map(|(_, end)| end)
    }

    /// True when CDS boundaries are set
    pub fn is_coding(&self) -> bool {
        self.cds.is_some()
    }

    /// Set CDS boundaries in chain coordinates
    ///
    /// Requires `start < end <= span_length()`. The genomic bounds are
    /// derived immediately.
    pub fn set_cds(&mut self, start: u64, end: u64) -> ChainResult<()> {
        if start >= end {
            return Err(ChainError::InvalidCds { start, end });
        }
        let genome = self.derive_genome_bounds(start, end)?;
        self.cds = Some((start, end));
        self.cds_genome = Some(genome);
        Ok(())
    }

    /// Drop the CDS boundaries, making the transcript non-coding
    pub fn clear_cds(&mut self) {
        self.cds = None;
        self.cds_genome = None;
    }

    /// Genomic bounds of the chain window `[start, end)`
    ///
    /// On the reverse strand the window's 5' offset maps to the highest
    /// genomic coordinate, so the bounds come out swapped into genomic
    /// orientation.
    fn derive_genome_bounds(&self, start: u64, end: u64) -> ChainResult<(u64, u64)> {
        let five_prime = self.chain.chain_to_genomic(start, true)?;
        let last = self.chain.chain_to_genomic(end - 1, true)?;
        Ok(match self.chain.strand() {
            Strand::Reverse => (last, five_prime + 1),
            _ => (five_prime, last + 1),
        })
    }

    /// Rederive the genomic CDS bounds from the stored chain offsets
    ///
    /// Called after every segment-set change. The offsets are kept as-is;
    /// what they point at may have moved. Propagates the range error when
    /// the offsets no longer fit the chain.
    fn refresh_cds(&mut self) -> ChainResult<()> {
        if let Some((start, end)) = self.cds {
            self.cds_genome = Some(self.derive_genome_bounds(start, end)?);
        }
        Ok(())
    }

    /// Merge segments into the transcript, rederiving the CDS bounds
    ///
    /// See [`SegmentChain::add_segments`] for the merge rules.
    pub fn add_segments(
        &mut self,
        segments: impl IntoIterator<Item = GenomicSegment>,
    ) -> ChainResult<()> {
        self.chain.add_segments(segments)?;
        self.refresh_cds()
    }

    /// Replace the mask sub-chain
    ///
    /// Masks never move the CDS: coordinate translation is mask-blind.
    pub fn set_masks(&mut self, masks: impl IntoIterator<Item = GenomicSegment>) -> ChainResult<()> {
        self.chain.set_masks(masks)
    }

    /// Merge segments into the mask sub-chain
    pub fn add_masks(&mut self, masks: impl IntoIterator<Item = GenomicSegment>) -> ChainResult<()> {
        self.chain.add_masks(masks)
    }

    /// Drop every mask segment
    pub fn reset_masks(&mut self) {
        self.chain.reset_masks();
    }

    /// Canonicalize segment order
    pub fn sort(&mut self) {
        self.chain.sort();
    }

    /// Insert or replace one attribute on the underlying chain
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.chain.set_attribute(key, value);
    }

    /// Strand of the underlying chain
    pub fn strand(&self) -> Strand {
        self.chain.strand()
    }

    /// Chromosome of the underlying chain
    pub fn chromosome(&self) -> Option<&str> {
        self.chain.chromosome()
    }

    /// Count of unmasked genomic positions
    pub fn length(&self) -> u64 {
        self.chain.length()
    }

    /// Count of genomic positions covered, mask-blind
    pub fn span_length(&self) -> u64 {
        self.chain.span_length()
    }

    /// Translate a genomic coordinate to a chain-relative offset
    pub fn genomic_to_chain(&self, position: u64, stranded: bool) -> ChainResult<u64> {
        self.chain.genomic_to_chain(position, stranded)
    }

    /// Translate a chain-relative offset to its genomic coordinate
    pub fn chain_to_genomic(&self, position: u64, stranded: bool) -> ChainResult<u64> {
        self.chain.chain_to_genomic(position, stranded)
    }

    /// The coding region as its own chain; empty when non-coding
    pub fn cds_chain(&self) -> ChainResult<SegmentChain> {
        match self.cds {
            Some((start, end)) => self.chain.subchain(start, end, true),
            None => Ok(SegmentChain::new()),
        }
    }

    /// The 5' untranslated region as its own chain; empty when non-coding
    ///
    /// Chain coordinates run 5' to 3', so `[0, cds_start)` is strand-correct
    /// by construction.
    pub fn utr5_chain(&self) -> ChainResult<SegmentChain> {
        match self.cds {
            Some((start, _)) => self.chain.subchain(0, start, true),
            None => Ok(SegmentChain::new()),
        }
    }

    /// The 3' untranslated region as its own chain; empty when non-coding
    pub fn utr3_chain(&self) -> ChainResult<SegmentChain> {
        match self.cds {
            Some((_, end)) => self.chain.subchain(end, self.chain.span_length(), true),
            None => Ok(SegmentChain::new()),
        }
    }
}

impl From<SegmentChain> for Transcript {
    fn from(chain: SegmentChain) -> Self {
        Transcript::new(chain)
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chain.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(chrom: &str, start: u64, end: u64, strand: Strand) -> GenomicSegment {
        GenomicSegment::new(chrom, start, end, strand).unwrap()
    }

    fn spliced_chain(strand: Strand) -> SegmentChain {
        SegmentChain::from_segments([
            seg("chr1", 100, 110, strand),
            seg("chr1", 200, 215, strand),
        ])
        .unwrap()
    }

    #[test]
    fn test_forward_cds_genome_bounds() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        assert_eq!(tx.cds_start(), Some(5));
        assert_eq!(tx.cds_end(), Some(20));
        assert_eq!(tx.cds_genome_start(), Some(105));
        assert_eq!(tx.cds_genome_end(), Some(210));
        assert!(tx.is_coding());
    }

    #[test]
    fn test_reverse_cds_genome_bounds() {
        // offsets 0..5 of a reverse chain are its 3'-most genomic bases
        let tx = Transcript::with_cds(spliced_chain(Strand::Reverse), 0, 5).unwrap();
        assert_eq!(tx.cds_genome_start(), Some(210));
        assert_eq!(tx.cds_genome_end(), Some(215));
        // bounds stay in genomic orientation: start < end
        let tx = Transcript::with_cds(spliced_chain(Strand::Reverse), 5, 20).unwrap();
        assert_eq!(tx.cds_genome_start(), Some(105));
        assert_eq!(tx.cds_genome_end(), Some(210));
    }

    #[test]
    fn test_cds_covering_whole_chain() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Forward), 0, 25).unwrap();
        assert_eq!(tx.cds_genome_start(), Some(100));
        assert_eq!(tx.cds_genome_end(), Some(215));
    }

    #[test]
    fn test_set_cds_validation() {
        let mut tx = Transcript::new(spliced_chain(Strand::Forward));
        let err = tx.set_cds(10, 10).unwrap_err();
        assert!(matches!(err, ChainError::InvalidCds { start: 10, end: 10 }));
        let err = tx.set_cds(20, 26).unwrap_err();
        assert!(matches!(err, ChainError::ChainPositionOutOfRange { .. }));
        assert!(!tx.is_coding());
        // empty transcript cannot carry a CDS
        let mut empty = Transcript::new(SegmentChain::new());
        assert!(empty.set_cds(0, 1).is_err());
    }

    #[test]
    fn test_adding_upstream_exon_reanchors_cds() {
        let mut tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        assert_eq!(tx.cds_genome_start(), Some(105));
        tx.add_segments([seg("chr1", 50, 60, Strand::Forward)]).unwrap();
        // chain offsets are unchanged but now point upstream
        assert_eq!(tx.cds_start(), Some(5));
        assert_eq!(tx.cds_genome_start(), Some(55));
        assert_eq!(tx.cds_genome_end(), Some(110));
    }

    #[test]
    fn test_masks_leave_cds_alone() {
        let mut tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        tx.set_masks([seg("chr1", 100, 110, Strand::Forward)]).unwrap();
        assert_eq!(tx.length(), 15);
        assert_eq!(tx.span_length(), 25);
        assert_eq!(tx.cds_genome_start(), Some(105));
        assert_eq!(tx.cds_genome_end(), Some(210));
    }

    #[test]
    fn test_cds_and_utr_partition() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        let utr5 = tx.utr5_chain().unwrap();
        let cds = tx.cds_chain().unwrap();
        let utr3 = tx.utr3_chain().unwrap();
        assert_eq!(utr5.length(), 5);
        assert_eq!(cds.length(), 15);
        assert_eq!(utr3.length(), 5);
        let mut union = utr5.position_set();
        union.extend(cds.position_set());
        union.extend(utr3.position_set());
        assert_eq!(union, tx.chain().position_set());
        // 5' UTR of a forward transcript is genomic-leftmost
        assert_eq!(utr5.position_list(), (100..105).collect::<Vec<u64>>());
    }

    #[test]
    fn test_reverse_utr_orientation() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Reverse), 5, 20).unwrap();
        let utr5 = tx.utr5_chain().unwrap();
        let utr3 = tx.utr3_chain().unwrap();
        // 5' UTR of a reverse transcript is genomic-rightmost
        assert_eq!(utr5.position_list(), (210..215).collect::<Vec<u64>>());
        assert_eq!(utr3.position_list(), (100..105).collect::<Vec<u64>>());
    }

    #[test]
    fn test_non_coding_accessors() {
        let tx = Transcript::new(spliced_chain(Strand::Forward));
        assert!(!tx.is_coding());
        assert_eq!(tx.cds_start(), None);
        assert_eq!(tx.cds_genome_start(), None);
        assert!(tx.cds_chain().unwrap().is_empty());
        assert!(tx.utr5_chain().unwrap().is_empty());
        assert!(tx.utr3_chain().unwrap().is_empty());
    }

    #[test]
    fn test_clear_cds() {
        let mut tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        tx.clear_cds();
        assert!(!tx.is_coding());
        assert_eq!(tx.cds_genome_start(), None);
    }

    #[test]
    fn test_delegated_queries() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        assert_eq!(tx.length(), 25);
        assert_eq!(tx.strand(), Strand::Forward);
        assert_eq!(tx.chromosome(), Some("chr1"));
        assert_eq!(tx.genomic_to_chain(205, true).unwrap(), 15);
        assert_eq!(tx.chain_to_genomic(15, true).unwrap(), 205);
        assert_eq!(tx.to_string(), "chr1:100-110^200-215(+)");
    }

    #[test]
    fn test_cds_subchain_segments() {
        let tx = Transcript::with_cds(spliced_chain(Strand::Forward), 5, 20).unwrap();
        let cds = tx.cds_chain().unwrap();
        let flat: Vec<(u64, u64)> = cds.segments().iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(flat, vec![(105, 110), (200, 210)]);
    }
}
