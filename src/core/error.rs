//! Error types for segchain
//!
//! Defines all error types used throughout the library.

use crate::core::strand::Strand;
use thiserror::Error;

/// Main error type for segchain operations
#[derive(Debug, Error)]
pub enum SegChainError {
    /// Chain model violations
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Textual representation parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised by chain construction, mutation, and coordinate queries
#[derive(Debug, Error)]
pub enum ChainError {
    /// Malformed interval at construction
    #[error("Invalid interval on {chrom}: start ({start}) > end ({end})")]
    InvalidRange {
        chrom: String,
        start: u64,
        end: u64,
    },

    /// Incompatible strand combined into one chain
    #[error("Strand mismatch: chain is '{expected}', incoming segment is '{found}'")]
    StrandMismatch { expected: Strand, found: Strand },

    /// Segment from a different chromosome combined into one chain
    #[error("Chromosome mismatch: chain is on '{expected}', incoming segment is on '{found}'")]
    ChromosomeMismatch { expected: String, found: String },

    /// Mask segment not contained in the chain's segment footprint
    #[error("Mask segment {chrom}:{start}-{end} is not contained in the chain")]
    MaskOutOfBounds {
        chrom: String,
        start: u64,
        end: u64,
    },

    /// Chain-relative offset outside the chain's span
    #[error("Chain position {position} is outside [0, {span})")]
    ChainPositionOutOfRange { position: u64, span: u64 },

    /// Genomic position not covered by any segment of the chain
    #[error("Genomic position {chrom}:{position} is not covered by the chain")]
    GenomicPositionOutOfRange { chrom: String, position: u64 },

    /// Malformed CDS boundaries on a transcript
    #[error("Invalid CDS boundaries: start ({start}) >= end ({end})")]
    InvalidCds { start: u64, end: u64 },
}

/// Errors raised while parsing the textual chain/segment notation
#[derive(Debug, Error)]
pub enum ParseError {
    /// Unrecognized strand token
    #[error("Invalid strand: '{0}'")]
    InvalidStrand(String),

    /// Failed to parse a coordinate
    #[error("Failed to parse coordinate '{value}': {message}")]
    InvalidCoordinate { value: String, message: String },

    /// Segment string does not match `chrom:start-end(strand)`
    #[error("Malformed segment string: '{0}'")]
    MalformedSegment(String),

    /// Chain string does not match `chrom:start-end^start-end(strand)`
    #[error("Malformed chain string: '{0}'")]
    MalformedChain(String),
}

/// Result type alias for segchain operations
pub type Result<T> = std::result::Result<T, SegChainError>;

/// Result type alias for chain model operations
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Result type alias for textual parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;
