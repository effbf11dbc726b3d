//! SegChain - Strand-aware genomic segment chains
//!
//! Building blocks for spliced genomic features: immutable half-open
//! segments, discontinuous segment chains with masking, and transcripts
//! with coding-region annotations.
//!
//! # Features
//!
//! - O(1) conversion between genomic and chain-relative coordinates
//! - 5'-to-3' coordinate walk on either strand
//! - Mask sub-chains that hide positions without losing them
//! - Tri-state overlap, covers and containment predicates
//! - Per-chromosome interval hashing with parallel mask application
//!
//! # Example
//!
//! ```ignore
//! use segchain::{GenomicSegment, SegmentChain, Strand, Transcript};
//!
//! // Two exons on the forward strand
//! let chain = SegmentChain::from_segments(vec![
//!     GenomicSegment::new("chr1", 100, 110, Strand::Forward)?,
//!     GenomicSegment::new("chr1", 200, 215, Strand::Forward)?,
//! ])?;
//!
//! // Chain offset 15 sits in the second exon
//! let genomic = chain.chain_to_genomic(15, true)?;
//! assert_eq!(genomic, 205);
//!
//! // Annotate a coding region in chain coordinates
//! let transcript = Transcript::with_cds(chain, 5, 20)?;
//! assert_eq!(transcript.cds_genome_start(), Some(105));
//! ```

pub mod core;
pub mod hash;

// Re-export commonly used types
pub use core::{
    positions_to_segments, AttrValue, ChainError, ChainResult, GenomicSegment, ParseError,
    ParseResult, Result, SegChainError, SegmentChain, Strand, Transcript, TriState, ATTR_GENE_ID,
    ATTR_ID,
};
pub use hash::GenomeHash;
