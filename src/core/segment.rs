//! Genomic segments
//!
//! The leaf value type of the interval algebra: an immutable half-open
//! interval `[start, end)` on a named chromosome with a strand. Segments
//! are assembled into chains; chain arithmetic produces new segments.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ChainError, ChainResult, ParseError};
use crate::core::strand::Strand;

/// Intersect two half-open intervals
///
/// Returns `None` when the intervals do not overlap. Touching intervals
/// (`end1 == start2`) do not overlap under half-open semantics.
#[inline]
pub(crate) fn intersect_intervals(
    start1: u64,
    end1: u64,
    start2: u64,
    end2: u64,
) -> Option<(u64, u64)> {
    if start1 >= end2 || end1 <= start2 {
        return None;
    }
    Some((start1.max(start2), end1.min(end2)))
}

/// An immutable half-open genomic interval `[start, end)` with a strand
///
/// Value-comparable: two segments are equal iff chromosome, start, end and
/// strand all match. The derived ordering is the sort key used throughout
/// the crate: (chromosome, start, end, strand).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenomicSegment {
    chrom: String,
    start: u64,
    end: u64,
    strand: Strand,
}

impl GenomicSegment {
    /// Create a segment, validating `start <= end`
    ///
    /// Zero-length segments (`start == end`) are permitted and contribute
    /// zero length.
    ///
    /// # Examples
    /// ```
    /// use segchain::core::{GenomicSegment, Strand};
    ///
    /// let seg = GenomicSegment::new("chrI", 100, 110, Strand::Forward).unwrap();
    /// assert_eq!(seg.len(), 10);
    /// assert!(GenomicSegment::new("chrI", 110, 100, Strand::Forward).is_err());
    /// ```
    pub fn new(
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
    ) -> ChainResult<Self> {
        let chrom = chrom.into();
        if start > end {
            return Err(ChainError::InvalidRange { chrom, start, end });
        }
        Ok(GenomicSegment {
            chrom,
            start,
            end,
            strand,
        })
    }

    /// Chromosome name
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Start coordinate (inclusive)
    pub fn start(&self) -> u64 {
        self.start
    }

    /// End coordinate (exclusive)
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Strand orientation
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Number of genomic positions covered
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// True when the segment covers no positions
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `position` falls inside `[start, end)`
    pub fn contains_position(&self, position: u64) -> bool {
        position >= self.start && position < self.end
    }

    /// True when the two segments share at least one genomic position
    ///
    /// Chromosome-aware and strand-blind: strand filtering belongs to the
    /// chain-level predicates.
    pub fn overlaps(&self, other: &GenomicSegment) -> bool {
        self.chrom == other.chrom
            && intersect_intervals(self.start, self.end, other.start, other.end).is_some()
    }

    /// Copy of this segment with the complement strand
    pub fn antisense(&self) -> GenomicSegment {
        GenomicSegment {
            chrom: self.chrom.clone(),
            start: self.start,
            end: self.end,
            strand: self.strand.complement(),
        }
    }

    /// Copy of this segment with the given strand
    pub(crate) fn with_strand(&self, strand: Strand) -> GenomicSegment {
        GenomicSegment {
            chrom: self.chrom.clone(),
            start: self.start,
            end: self.end,
            strand,
        }
    }

    /// Internal unchecked constructor for chain arithmetic
    ///
    /// Callers guarantee `start <= end`.
    pub(crate) fn from_parts(chrom: &str, start: u64, end: u64, strand: Strand) -> GenomicSegment {
        debug_assert!(start <= end);
        GenomicSegment {
            chrom: chrom.to_string(),
            start,
            end,
            strand,
        }
    }
}

impl fmt::Display for GenomicSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}({})",
            self.chrom, self.start, self.end, self.strand
        )
    }
}

impl FromStr for GenomicSegment {
    type Err = ParseError;

    /// Parse the `chrom:start-end(strand)` form produced by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedSegment(s.to_string());
        let body = s.strip_suffix(')').ok_or_else(malformed)?;
        let (rest, strand) = body.rsplit_once('(').ok_or_else(malformed)?;
        let strand: Strand = strand.parse()?;
        let (chrom, range) = rest.rsplit_once(':').ok_or_else(malformed)?;
        let (start, end) = range.split_once('-').ok_or_else(malformed)?;
        if chrom.is_empty() {
            return Err(malformed());
        }
        let start = parse_coord(start)?;
        let end = parse_coord(end)?;
        GenomicSegment::new(chrom, start, end, strand)
            .map_err(|_| ParseError::MalformedSegment(s.to_string()))
    }
}

pub(crate) fn parse_coord(value: &str) -> Result<u64, ParseError> {
    value
        .trim()
        .replace(',', "")
        .parse::<u64>()
        .map_err(|e| ParseError::InvalidCoordinate {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Assemble the minimal sorted segment cover of a position set
///
/// Consecutive genomic positions collapse into maximal half-open runs, so
/// the result is sorted, pairwise disjoint and non-adjacent. Duplicate
/// positions are ignored.
///
/// # Examples
/// ```
/// use segchain::core::{positions_to_segments, Strand};
///
/// let segs = positions_to_segments("chrI", Strand::Forward, [102, 100, 101, 200]);
/// assert_eq!(segs.len(), 2);
/// assert_eq!((segs[0].start(), segs[0].end()), (100, 103));
/// assert_eq!((segs[1].start(), segs[1].end()), (200, 201));
/// ```
pub fn positions_to_segments(
    chrom: &str,
    strand: Strand,
    positions: impl IntoIterator<Item = u64>,
) -> Vec<GenomicSegment> {
    let positions: BTreeSet<u64> = positions.into_iter().collect();
    let mut segments = Vec::new();
    let mut run: Option<(u64, u64)> = None;
    for pos in positions {
        run = match run {
            Some((start, end)) if pos == end => Some((start, end + 1)),
            Some((start, end)) => {
                segments.push(GenomicSegment::from_parts(chrom, start, end, strand));
                Some((pos, pos + 1))
            }
            None => Some((pos, pos + 1)),
        };
    }
    if let Some((start, end)) = run {
        segments.push(GenomicSegment::from_parts(chrom, start, end, strand));
    }
    segments
}
