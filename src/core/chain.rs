//! Segment chains
//!
//! A `SegmentChain` is an ordered, strand-consistent collection of disjoint
//! genomic segments modeling one (possibly spliced) feature, with
//! bidirectional translation between chain-relative offsets and genomic
//! coordinates.
//!
//! Chain-relative coordinates are 0-indexed and run 5' to 3': offset 0 sits at
//! the leftmost genomic position of a forward-strand chain and at the
//! rightmost genomic position of a reverse-strand chain. An optional mask
//! sub-chain excludes positions from length and position enumeration
//! without removing them from the coordinate domain.
//!
//! The derived position indexes are rebuilt lazily on the first query after
//! a mutation, so bulk segment addition stays O(total input) instead of
//! paying an O(span) rebuild per call.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::debug;

use crate::core::error::{ChainError, ChainResult, ParseError};
use crate::core::segment::{parse_coord, positions_to_segments, GenomicSegment};
use crate::core::strand::Strand;

/// Conventional attribute key for a feature identifier
pub const ATTR_ID: &str = "ID";
/// Conventional attribute key for a parent gene identifier
pub const ATTR_GENE_ID: &str = "gene_id";

/// Tagged value for the free-form attribute map
///
/// The core stores attributes but never interprets them; readers and
/// exporters agree on keys by convention (`ID`, `gene_id`, `type`).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Text value
    Str(String),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// Boolean flag
    Flag(bool),
    /// List of text values
    List(Vec<String>),
}

impl AttrValue {
    /// Text content, if this is a `Str` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an `Int` value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

/// Derived position indexes, rebuilt together
///
/// `to_genomic[offset]` is the genomic coordinate of a chain offset in
/// 5'-to-3' order; `to_chain` is its exact inverse over the positions the
/// segments occupy (masks do not filter it); `masked[offset]` marks
/// offsets excluded by the mask sub-chain.
#[derive(Debug, Clone)]
struct PositionIndex {
    to_genomic: Vec<u64>,
    to_chain: HashMap<u64, usize>,
    masked: Vec<bool>,
    unmasked: u64,
}

impl PositionIndex {
    fn build(segments: &[GenomicSegment], masks: &[GenomicSegment], strand: Strand) -> Self {
        let span: u64 = segments.iter().map(|s| s.len()).sum();
        let mut to_genomic = Vec::with_capacity(span as usize);
        match strand {
            Strand::Forward | Strand::Unstranded => {
                for seg in segments {
                    to_genomic.extend(seg.start()..seg.end());
                }
            }
            Strand::Reverse => {
                for seg in segments.iter().rev() {
                    to_genomic.extend((seg.start()..seg.end()).rev());
                }
            }
        }
        let to_chain: HashMap<u64, usize> = to_genomic
            .iter()
            .enumerate()
            .map(|(offset, &pos)| (pos, offset))
            .collect();
        let masked: Vec<bool> = to_genomic
            .iter()
            .map(|&pos| masks.iter().any(|m| m.contains_position(pos)))
            .collect();
        let unmasked = masked.iter().filter(|&&m| !m).count() as u64;
        debug!(
            "rebuilt position index: {} positions, {} masked",
            span,
            span - unmasked
        );
        PositionIndex {
            to_genomic,
            to_chain,
            masked,
            unmasked,
        }
    }
}

/// An ordered, strand-consistent collection of disjoint genomic segments
///
/// Segments are kept canonical: sorted ascending by start, pairwise
/// disjoint and non-adjacent (overlapping or touching input is coalesced),
/// all on one chromosome and one strand. Zero-length input segments occupy
/// no positions and are dropped during assembly.
///
/// Equality is positional: two chains are equal iff their segment vectors
/// and strands match. Masks and attributes do not participate.
#[derive(Debug, Clone, Default)]
pub struct SegmentChain {
    segments: Vec<GenomicSegment>,
    masks: Vec<GenomicSegment>,
    strand: Strand,
    attributes: HashMap<String, AttrValue>,
    index: OnceLock<PositionIndex>,
}

impl PartialEq for SegmentChain {
    fn eq(&self, other: &Self) -> bool {
        self.strand == other.strand && self.segments == other.segments
    }
}

impl Eq for SegmentChain {}

impl SegmentChain {
    /// Create an empty chain
    pub fn new() -> Self {
        SegmentChain::default()
    }

    /// Create a chain from a segment sequence
    ///
    /// Overlapping or adjacent segments are coalesced; the segments must
    /// agree on chromosome and strand.
    ///
    /// # Examples
    /// ```
    /// use segchain::core::{GenomicSegment, SegmentChain, Strand};
    ///
    /// let chain = SegmentChain::from_segments([
    ///     GenomicSegment::new("chr1", 100, 110, Strand::Forward).unwrap(),
    ///     GenomicSegment::new("chr1", 200, 215, Strand::Forward).unwrap(),
    /// ])
    /// .unwrap();
    /// assert_eq!(chain.length(), 25);
    /// ```
    pub fn from_segments(segments: impl IntoIterator<Item = GenomicSegment>) -> ChainResult<Self> {
        let mut chain = SegmentChain::new();
        chain.add_segments(segments)?;
        Ok(chain)
    }

    /// Internal constructor for chain arithmetic
    ///
    /// Callers guarantee `segments` is already canonical for `strand`.
    pub(crate) fn from_canonical(
        segments: Vec<GenomicSegment>,
        strand: Strand,
        attributes: HashMap<String, AttrValue>,
    ) -> Self {
        SegmentChain {
            segments,
            masks: Vec::new(),
            strand,
            attributes,
            index: OnceLock::new(),
        }
    }

    /// The canonical segment sequence
    pub fn segments(&self) -> &[GenomicSegment] {
        &self.segments
    }

    /// The canonical mask sub-chain
    pub fn masks(&self) -> &[GenomicSegment] {
        &self.masks
    }

    /// Strand shared by all segments; `Unstranded` for an empty chain
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Chromosome shared by all segments; `None` for an empty chain
    pub fn chromosome(&self) -> Option<&str> {
        self.segments.first().map(|s| s.chrom())
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// True when the chain holds no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Count of genomic positions covered, mask-blind
    ///
    /// This is the size of the chain coordinate domain used by
    /// [`chain_to_genomic`](Self::chain_to_genomic) and
    /// [`subchain`](Self::subchain).
    pub fn span_length(&self) -> u64 {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Count of unmasked genomic positions
    pub fn length(&self) -> u64 {
        self.index().unmasked
    }

    /// Single segment spanning from the leftmost start to the rightmost end
    pub fn spanning_segment(&self) -> Option<GenomicSegment> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some(GenomicSegment::from_parts(
            first.chrom(),
            first.start(),
            last.end(),
            self.strand,
        ))
    }

    /// The attribute map
    pub fn attributes(&self) -> &HashMap<String, AttrValue> {
        &self.attributes
    }

    /// Look up one attribute
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Insert or replace one attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Feature identifier, read from the conventional `ID` attribute
    pub fn name(&self) -> Option<&str> {
        self.attribute(ATTR_ID).and_then(AttrValue::as_str)
    }

    /// Parent gene identifier, read from the conventional `gene_id` attribute
    pub fn gene(&self) -> Option<&str> {
        self.attribute(ATTR_GENE_ID).and_then(AttrValue::as_str)
    }

    /// Merge segments into the chain
    ///
    /// Incoming segments must share the chain's chromosome and strand; an
    /// empty chain adopts them from the first non-empty incoming segment.
    /// Overlapping and adjacent spans are coalesced. The batch is validated
    /// before the chain is touched, so a failed call leaves the chain
    /// unchanged. Marks the derived indexes stale.
    pub fn add_segments(
        &mut self,
        segments: impl IntoIterator<Item = GenomicSegment>,
    ) -> ChainResult<()> {
        let mut reference: Option<(String, Strand)> = self
            .segments
            .first()
            .map(|s| (s.chrom().to_string(), self.strand));
        let mut incoming = Vec::new();
        for seg in segments {
            if seg.is_empty() {
                continue;
            }
            match &reference {
                Some((chrom, strand)) => {
                    if seg.chrom() != chrom {
                        return Err(ChainError::ChromosomeMismatch {
                            expected: chrom.clone(),
                            found: seg.chrom().to_string(),
                        });
                    }
                    if seg.strand() != *strand {
                        return Err(ChainError::StrandMismatch {
                            expected: *strand,
                            found: seg.strand(),
                        });
                    }
                }
                None => {
                    reference = Some((seg.chrom().to_string(), seg.strand()));
                }
            }
            incoming.push(seg);
        }
        let (chrom, strand) = match reference {
            Some(r) => r,
            None => return Ok(()),
        };
        if incoming.is_empty() {
            return Ok(());
        }
        let mut spans: Vec<(u64, u64)> = self
            .segments
            .iter()
            .chain(incoming.iter())
            .map(|s| (s.start(), s.end()))
            .collect();
        spans.sort_unstable();
        let merged = coalesce(spans);
        self.segments = merged
            .into_iter()
            .map(|(start, end)| GenomicSegment::from_parts(&chrom, start, end, strand))
            .collect();
        self.strand = strand;
        self.index.take();
        Ok(())
    }

    /// Canonicalize segment order (ascending start, ties by end)
    ///
    /// Idempotent; the chain maintains this order through every mutation,
    /// so an explicit call only matters after manual reconstruction.
    pub fn sort(&mut self) {
        self.segments.sort();
        self.masks.sort();
        self.index.take();
    }

    /// Replace the mask sub-chain
    ///
    /// See [`add_masks`](Self::add_masks) for validation rules. A failed
    /// call leaves the previous masks in place.
    pub fn set_masks(&mut self, masks: impl IntoIterator<Item = GenomicSegment>) -> ChainResult<()> {
        let previous = std::mem::take(&mut self.masks);
        self.index.take();
        match self.add_masks(masks) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.masks = previous;
                self.index.take();
                Err(e)
            }
        }
    }

    /// Merge segments into the mask sub-chain
    ///
    /// Masked positions stay in the coordinate domain but are excluded
    /// from [`length`](Self::length) and position enumeration. Each mask
    /// must fall entirely inside the chain's segment footprint and carry
    /// the chain's strand or none. Zero-length masks are dropped.
    pub fn add_masks(&mut self, masks: impl IntoIterator<Item = GenomicSegment>) -> ChainResult<()> {
        let mut incoming = Vec::new();
        for mask in masks {
            if mask.is_empty() {
                continue;
            }
            if mask.strand() != self.strand && mask.strand() != Strand::Unstranded {
                return Err(ChainError::StrandMismatch {
                    expected: self.strand,
                    found: mask.strand(),
                });
            }
            let contained = self.chromosome() == Some(mask.chrom())
                && self
                    .segments
                    .iter()
                    .any(|s| s.start() <= mask.start() && mask.end() <= s.end());
            if !contained {
                return Err(ChainError::MaskOutOfBounds {
                    chrom: mask.chrom().to_string(),
                    start: mask.start(),
                    end: mask.end(),
                });
            }
            incoming.push(mask);
        }
        if incoming.is_empty() {
            return Ok(());
        }
        let mut spans: Vec<(u64, u64)> = self
            .masks
            .iter()
            .chain(incoming.iter())
            .map(|m| (m.start(), m.end()))
            .collect();
        spans.sort_unstable();
        let merged = coalesce(spans);
        let chrom = self.chromosome().unwrap_or_default().to_string();
        self.masks = merged
            .into_iter()
            .map(|(start, end)| GenomicSegment::from_parts(&chrom, start, end, self.strand))
            .collect();
        self.index.take();
        Ok(())
    }

    /// Drop every mask segment
    pub fn reset_masks(&mut self) {
        self.masks.clear();
        self.index.take();
    }

    /// Lazily rebuilt derived indexes
    fn index(&self) -> &PositionIndex {
        self.index
            .get_or_init(|| PositionIndex::build(&self.segments, &self.masks, self.strand))
    }

    /// Translate a genomic coordinate to a chain-relative offset
    ///
    /// The offset runs 5' to 3'. With `stranded == false` on a reverse-strand
    /// chain it is re-expressed left-to-right instead. Masked positions
    /// translate like any other. Fails when no segment covers `position`.
    pub fn genomic_to_chain(&self, position: u64, stranded: bool) -> ChainResult<u64> {
        let index = self.index();
        let offset = *index.to_chain.get(&position).ok_or_else(|| {
            ChainError::GenomicPositionOutOfRange {
                chrom: self.chromosome().unwrap_or_default().to_string(),
                position,
            }
        })? as u64;
        if !stranded && self.strand == Strand::Reverse {
            let span = index.to_genomic.len() as u64;
            Ok(span - 1 - offset)
        } else {
            Ok(offset)
        }
    }

    /// Translate a chain-relative offset to its genomic coordinate
    ///
    /// The offset indexes the 5'-to-3' chain domain `[0, span_length)`. With
    /// `stranded == false` on a reverse-strand chain it is interpreted
    /// left-to-right instead.
    pub fn chain_to_genomic(&self, position: u64, stranded: bool) -> ChainResult<u64> {
        let index = self.index();
        let span = index.to_genomic.len() as u64;
        if position >= span {
            return Err(ChainError::ChainPositionOutOfRange { position, span });
        }
        let offset = if !stranded && self.strand == Strand::Reverse {
            span - 1 - position
        } else {
            position
        };
        Ok(index.to_genomic[offset as usize])
    }

    /// Extract the sub-chain covering chain-relative `[start, end)`
    ///
    /// Segments are split at the cut points; the window addresses the same
    /// chain domain as [`chain_to_genomic`](Self::chain_to_genomic), so
    /// masked offsets can be extracted. With `stranded == false` on a
    /// reverse-strand chain the window is first re-expressed 5' to 3'.
    /// Attributes are copied into the result; masks are not.
    pub fn subchain(&self, start: u64, end: u64, stranded: bool) -> ChainResult<SegmentChain> {
        let index = self.index();
        let span = index.to_genomic.len() as u64;
        if end > span {
            return Err(ChainError::ChainPositionOutOfRange {
                position: end,
                span,
            });
        }
        if start > end {
            return Err(ChainError::ChainPositionOutOfRange {
                position: start,
                span: end,
            });
        }
        let (start, end) = if !stranded && self.strand == Strand::Reverse {
            (span - end, span - start)
        } else {
            (start, end)
        };
        let positions = index.to_genomic[start as usize..end as usize].iter().copied();
        match self.chromosome() {
            Some(chrom) => {
                let segments = positions_to_segments(chrom, self.strand, positions);
                Ok(SegmentChain::from_canonical(
                    segments,
                    self.strand,
                    self.attributes.clone(),
                ))
            }
            None => Ok(SegmentChain::from_canonical(
                Vec::new(),
                Strand::Unstranded,
                self.attributes.clone(),
            )),
        }
    }

    /// Ascending genomic positions covered by the chain, masked excluded
    pub fn position_list(&self) -> Vec<u64> {
        let index = self.index();
        let mut positions: Vec<u64> = index
            .to_genomic
            .iter()
            .zip(index.masked.iter())
            .filter(|(_, &masked)| !masked)
            .map(|(&pos, _)| pos)
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Genomic positions covered by the chain, masked excluded
    pub fn position_set(&self) -> BTreeSet<u64> {
        let index = self.index();
        index
            .to_genomic
            .iter()
            .zip(index.masked.iter())
            .filter(|(_, &masked)| !masked)
            .map(|(&pos, _)| pos)
            .collect()
    }

    /// Genomic positions excluded by the mask sub-chain
    pub fn masked_position_set(&self) -> BTreeSet<u64> {
        let index = self.index();
        index
            .to_genomic
            .iter()
            .zip(index.masked.iter())
            .filter(|(_, &masked)| masked)
            .map(|(&pos, _)| pos)
            .collect()
    }

    /// New chain with every strand flipped between forward and reverse
    ///
    /// Masks flip alongside the segments; attributes are copied. Applying
    /// the operation twice restores the original chain.
    pub fn antisense(&self) -> SegmentChain {
        SegmentChain {
            segments: self.segments.iter().map(|s| s.antisense()).collect(),
            masks: self.masks.iter().map(|m| m.antisense()).collect(),
            strand: self.strand.complement(),
            attributes: self.attributes.clone(),
            index: OnceLock::new(),
        }
    }

    /// New chain with strand information erased
    pub fn unstranded(&self) -> SegmentChain {
        SegmentChain {
            segments: self
                .segments
                .iter()
                .map(|s| s.with_strand(Strand::Unstranded))
                .collect(),
            masks: self
                .masks
                .iter()
                .map(|m| m.with_strand(Strand::Unstranded))
                .collect(),
            strand: Strand::Unstranded,
            attributes: self.attributes.clone(),
            index: OnceLock::new(),
        }
    }
}

/// Merge sorted half-open spans, coalescing overlapping and adjacent ones
fn coalesce(spans: Vec<(u64, u64)>) -> Vec<(u64, u64)> {
    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

impl fmt::Display for SegmentChain {
    /// Render as `chrom:start-end^start-end(strand)`, or `na` when empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chrom = match self.chromosome() {
            Some(chrom) => chrom,
            None => return write!(f, "na"),
        };
        write!(f, "{}:", chrom)?;
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "^")?;
            }
            write!(f, "{}-{}", seg.start(), seg.end())?;
        }
        write!(f, "({})", self.strand)
    }
}

impl FromStr for SegmentChain {
    type Err = ParseError;

    /// Parse the `chrom:start-end^start-end(strand)` form produced by
    /// `Display`; `na` parses to the empty chain
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "na" {
            return Ok(SegmentChain::new());
        }
        let malformed = || ParseError::MalformedChain(s.to_string());
        let body = s.strip_suffix(')').ok_or_else(malformed)?;
        let (rest, strand) = body.rsplit_once('(').ok_or_else(malformed)?;
        let strand: Strand = strand.parse()?;
        let (chrom, ranges) = rest.rsplit_once(':').ok_or_else(malformed)?;
        if chrom.is_empty() || ranges.is_empty() {
            return Err(malformed());
        }
        let mut segments = Vec::new();
        for range in ranges.split('^') {
            let (start, end) = range.split_once('-').ok_or_else(malformed)?;
            let start = parse_coord(start)?;
            let end = parse_coord(end)?;
            let seg = GenomicSegment::new(chrom, start, end, strand).map_err(|_| malformed())?;
            segments.push(seg);
        }
        SegmentChain::from_segments(segments).map_err(|_| malformed())
    }
}
